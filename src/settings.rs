//! Session-wide settings store: hydrates from the `app_settings` key-value
//! table at startup, merges sparse updates, and writes the full bundle back on
//! every change. Storage failures are logged and never surface to callers —
//! the in-memory state always stays fully populated.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::database::Database;
use crate::models::{PdfSettings, PdfSettingsUpdate, ProductSettings, ProductSettingsUpdate};

pub const PDF_SETTINGS_KEY: &str = "pdfSettings";
pub const PRODUCT_SETTINGS_KEY: &str = "productSettings";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("settings database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("settings encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Durable string-keyed storage for settings blobs.
#[allow(async_fn_in_trait)]
pub trait SettingsStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Clone)]
pub struct PgSettingsStorage {
    db: Database,
}

impl PgSettingsStorage {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl SettingsStorage for PgSettingsStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM app_settings WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.db)
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO app_settings (key, value, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM app_settings WHERE key = $1")
            .bind(key)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

pub struct SettingsStore<S> {
    storage: S,
    pdf: PdfSettings,
    product: ProductSettings,
}

impl<S: SettingsStorage> SettingsStore<S> {
    /// Hydrate from storage, once per process. Absent or malformed entries
    /// leave the hardcoded defaults in place; this never fails.
    pub async fn load(storage: S) -> Self {
        let pdf = hydrate(&storage, PDF_SETTINGS_KEY).await;
        let product = hydrate(&storage, PRODUCT_SETTINGS_KEY).await;
        Self {
            storage,
            pdf,
            product,
        }
    }

    pub fn pdf(&self) -> &PdfSettings {
        &self.pdf
    }

    pub fn product(&self) -> &ProductSettings {
        &self.product
    }

    pub async fn update_pdf(&mut self, update: PdfSettingsUpdate) {
        self.pdf.apply(update);
        if let Err(err) = persist(&self.storage, PDF_SETTINGS_KEY, &self.pdf).await {
            log::warn!("failed to persist {}: {}", PDF_SETTINGS_KEY, err);
        }
    }

    pub async fn update_product(&mut self, update: ProductSettingsUpdate) {
        self.product.apply(update);
        if let Err(err) = persist(&self.storage, PRODUCT_SETTINGS_KEY, &self.product).await {
            log::warn!("failed to persist {}: {}", PRODUCT_SETTINGS_KEY, err);
        }
    }

    /// Back to defaults; the stored entry is deleted rather than rewritten.
    pub async fn reset_pdf(&mut self) {
        self.pdf = PdfSettings::default();
        if let Err(err) = self.storage.remove(PDF_SETTINGS_KEY).await {
            log::warn!("failed to clear {}: {}", PDF_SETTINGS_KEY, err);
        }
    }

    pub async fn reset_product(&mut self) {
        self.product = ProductSettings::default();
        if let Err(err) = self.storage.remove(PRODUCT_SETTINGS_KEY).await {
            log::warn!("failed to clear {}: {}", PRODUCT_SETTINGS_KEY, err);
        }
    }
}

async fn hydrate<S, T>(storage: &S, key: &str) -> T
where
    S: SettingsStorage,
    T: DeserializeOwned + Default,
{
    match storage.get(key).await {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("malformed {} entry, keeping defaults: {}", key, err);
                T::default()
            }
        },
        Ok(None) => T::default(),
        Err(err) => {
            log::warn!("failed to read {}, keeping defaults: {}", key, err);
            T::default()
        }
    }
}

async fn persist<S, T>(storage: &S, key: &str, value: &T) -> Result<(), StorageError>
where
    S: SettingsStorage,
    T: Serialize,
{
    let raw = serde_json::to_string(value)?;
    storage.set(key, &raw).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::settings::{HeaderUpdate, StockAlertUpdate, WatermarkUpdate};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct MemoryStorage {
        entries: Arc<Mutex<HashMap<String, String>>>,
        writes: Arc<AtomicUsize>,
    }

    impl MemoryStorage {
        fn raw(&self, key: &str) -> Option<String> {
            self.entries.lock().unwrap().get(key).cloned()
        }

        fn write_count(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }
    }

    impl SettingsStorage for MemoryStorage {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }
    }

    #[tokio::test]
    async fn empty_storage_hydrates_to_defaults() {
        let store = SettingsStore::load(MemoryStorage::default()).await;
        assert_eq!(store.pdf(), &PdfSettings::default());
        assert_eq!(store.product(), &ProductSettings::default());
    }

    #[tokio::test]
    async fn malformed_entry_falls_back_to_defaults() {
        let storage = MemoryStorage::default();
        storage.set(PDF_SETTINGS_KEY, "{not json").await.unwrap();
        storage.set(PRODUCT_SETTINGS_KEY, "42").await.unwrap();

        let store = SettingsStore::load(storage).await;
        assert_eq!(store.pdf(), &PdfSettings::default());
        assert_eq!(store.product(), &ProductSettings::default());
    }

    #[tokio::test]
    async fn empty_update_persists_exactly_once() {
        let storage = MemoryStorage::default();
        let mut store = SettingsStore::load(storage.clone()).await;

        store.update_pdf(PdfSettingsUpdate::default()).await;

        assert_eq!(store.pdf(), &PdfSettings::default());
        assert_eq!(storage.write_count(), 1);
        assert!(storage.raw(PDF_SETTINGS_KEY).is_some());
    }

    #[tokio::test]
    async fn update_merges_and_round_trips() {
        let storage = MemoryStorage::default();
        let mut store = SettingsStore::load(storage.clone()).await;

        store
            .update_pdf(PdfSettingsUpdate {
                watermark: Some(WatermarkUpdate {
                    opacity: Some(0.5),
                    ..Default::default()
                }),
                header: Some(HeaderUpdate {
                    height: Some(50.0),
                    ..Default::default()
                }),
                ..Default::default()
            })
            .await;

        assert_eq!(store.pdf().watermark.opacity, 0.5);
        assert_eq!(store.pdf().header.height, 50.0);
        assert_eq!(store.pdf().header.background_color, "#4682B4");
        assert_eq!(store.pdf().header.company_name.font_size, 18.0);

        // A fresh store over the same storage sees the persisted state.
        let reloaded = SettingsStore::load(storage).await;
        assert_eq!(reloaded.pdf(), store.pdf());
    }

    #[tokio::test]
    async fn bundles_persist_under_independent_keys() {
        let storage = MemoryStorage::default();
        let mut store = SettingsStore::load(storage.clone()).await;

        store
            .update_product(ProductSettingsUpdate {
                stock_alerts: Some(StockAlertUpdate {
                    enabled: Some(false),
                    ..Default::default()
                }),
                ..Default::default()
            })
            .await;

        assert!(storage.raw(PRODUCT_SETTINGS_KEY).is_some());
        assert!(storage.raw(PDF_SETTINGS_KEY).is_none());
    }

    #[tokio::test]
    async fn reset_clears_storage_and_restores_defaults() {
        let storage = MemoryStorage::default();
        let mut store = SettingsStore::load(storage.clone()).await;

        store
            .update_product(ProductSettingsUpdate {
                units: Some(vec!["UN".to_string()]),
                ..Default::default()
            })
            .await;
        store.reset_product().await;

        assert_eq!(store.product(), &ProductSettings::default());
        assert!(storage.raw(PRODUCT_SETTINGS_KEY).is_none());

        let reloaded = SettingsStore::load(storage).await;
        assert_eq!(reloaded.product(), &ProductSettings::default());
    }
}
