use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// PDF export styling + company identity. Persisted as JSON under the
// `pdfSettings` key, camelCase to match the blobs written by earlier releases.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatermarkSettings {
    pub enabled: bool,
    pub opacity: f64,
    pub size: f64,
    pub position: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyNameStyle {
    pub font_size: f64,
    pub font_weight: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderSettings {
    pub company_name: CompanyNameStyle,
    pub background_color: String,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    pub name: String,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub email: String,
    pub tax_id: String,
    pub state_registration: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PdfSettings {
    pub watermark: WatermarkSettings,
    pub header: HeaderSettings,
    pub company: CompanyInfo,
}

pub const WATERMARK_POSITIONS: [&str; 5] = [
    "center",
    "top-left",
    "top-right",
    "bottom-left",
    "bottom-right",
];

impl Default for PdfSettings {
    fn default() -> Self {
        Self {
            watermark: WatermarkSettings {
                enabled: true,
                opacity: 0.08,
                size: 80.0,
                position: "center".to_string(),
            },
            header: HeaderSettings {
                company_name: CompanyNameStyle {
                    font_size: 18.0,
                    font_weight: "bold".to_string(),
                    color: "#FFFFFF".to_string(),
                },
                background_color: "#4682B4".to_string(),
                height: 35.0,
            },
            company: CompanyInfo {
                name: "CARNEVALLI ESQUADRIAS LTDA".to_string(),
                address: "BUARQUE DE MACEDO, 2735 - PAVILHÃO - CENTRO".to_string(),
                city: "Nova Prata - RS - CEP: 95320-000".to_string(),
                phone: "(54) 3242-2072".to_string(),
                email: "carnevalli.esquadrias@gmail.com".to_string(),
                tax_id: "88.235.288/0001-24".to_string(),
                state_registration: "0850011930".to_string(),
            },
        }
    }
}

// Catalog options + stock alert / automation flags. Persisted under
// `productSettings`.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAlertSettings {
    pub enabled: bool,
    pub threshold: Decimal,
    pub show_in_dashboard: bool,
    pub highlight_low_stock: bool,
    pub expiration_alerts: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationSettings {
    pub auto_stock_movement: bool,
    pub auto_calculate_costs: bool,
    pub default_profit_margin: Decimal,
    pub suggest_reorder: bool,
    pub suggest_alternatives: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductSettings {
    pub categories: Vec<String>,
    pub units: Vec<String>,
    pub stock_alerts: StockAlertSettings,
    pub automation: AutomationSettings,
}

impl Default for ProductSettings {
    fn default() -> Self {
        Self {
            categories: [
                "Painéis",
                "Ferragens",
                "Madeiras",
                "Vernizes",
                "Colas",
                "Parafusos",
                "Portas",
                "Gavetas",
                "Prateleiras",
                "Estruturas",
                "Acessórios",
                "Outros",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            units: ["UN", "M", "M²", "M³", "KG", "L", "PC", "CX", "PCT", "ML"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            stock_alerts: StockAlertSettings {
                enabled: true,
                threshold: Decimal::ZERO,
                show_in_dashboard: true,
                highlight_low_stock: true,
                expiration_alerts: false,
            },
            automation: AutomationSettings {
                auto_stock_movement: true,
                auto_calculate_costs: true,
                default_profit_margin: Decimal::from(20),
                suggest_reorder: true,
                suggest_alternatives: false,
            },
        }
    }
}

impl ProductSettings {
    /// Alert when stock has fallen `threshold` units below the minimum.
    pub fn stock_alert_triggered(&self, current_stock: Decimal, min_stock: Decimal) -> bool {
        self.stock_alerts.enabled && current_stock <= min_stock - self.stock_alerts.threshold
    }
}

// Sparse updates: a `None` field means "keep the current value". Known
// sub-objects merge field-by-field, everything else replaces wholesale.

#[derive(Debug, Default, Clone, Deserialize)]
pub struct WatermarkUpdate {
    pub enabled: Option<bool>,
    pub opacity: Option<f64>,
    pub size: Option<f64>,
    pub position: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct CompanyNameStyleUpdate {
    pub font_size: Option<f64>,
    pub font_weight: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct HeaderUpdate {
    pub company_name: Option<CompanyNameStyleUpdate>,
    pub background_color: Option<String>,
    pub height: Option<f64>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct CompanyInfoUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub tax_id: Option<String>,
    pub state_registration: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct PdfSettingsUpdate {
    pub watermark: Option<WatermarkUpdate>,
    pub header: Option<HeaderUpdate>,
    pub company: Option<CompanyInfoUpdate>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct StockAlertUpdate {
    pub enabled: Option<bool>,
    pub threshold: Option<Decimal>,
    pub show_in_dashboard: Option<bool>,
    pub highlight_low_stock: Option<bool>,
    pub expiration_alerts: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct AutomationUpdate {
    pub auto_stock_movement: Option<bool>,
    pub auto_calculate_costs: Option<bool>,
    pub default_profit_margin: Option<Decimal>,
    pub suggest_reorder: Option<bool>,
    pub suggest_alternatives: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProductSettingsUpdate {
    pub categories: Option<Vec<String>>,
    pub units: Option<Vec<String>>,
    pub stock_alerts: Option<StockAlertUpdate>,
    pub automation: Option<AutomationUpdate>,
}

impl PdfSettings {
    pub fn apply(&mut self, update: PdfSettingsUpdate) {
        if let Some(watermark) = update.watermark {
            if let Some(enabled) = watermark.enabled {
                self.watermark.enabled = enabled;
            }
            if let Some(opacity) = watermark.opacity {
                self.watermark.opacity = opacity;
            }
            if let Some(size) = watermark.size {
                self.watermark.size = size;
            }
            if let Some(position) = watermark.position {
                self.watermark.position = position;
            }
        }
        if let Some(header) = update.header {
            if let Some(company_name) = header.company_name {
                if let Some(font_size) = company_name.font_size {
                    self.header.company_name.font_size = font_size;
                }
                if let Some(font_weight) = company_name.font_weight {
                    self.header.company_name.font_weight = font_weight;
                }
                if let Some(color) = company_name.color {
                    self.header.company_name.color = color;
                }
            }
            if let Some(background_color) = header.background_color {
                self.header.background_color = background_color;
            }
            if let Some(height) = header.height {
                self.header.height = height;
            }
        }
        if let Some(company) = update.company {
            if let Some(name) = company.name {
                self.company.name = name;
            }
            if let Some(address) = company.address {
                self.company.address = address;
            }
            if let Some(city) = company.city {
                self.company.city = city;
            }
            if let Some(phone) = company.phone {
                self.company.phone = phone;
            }
            if let Some(email) = company.email {
                self.company.email = email;
            }
            if let Some(tax_id) = company.tax_id {
                self.company.tax_id = tax_id;
            }
            if let Some(state_registration) = company.state_registration {
                self.company.state_registration = state_registration;
            }
        }
    }
}

impl ProductSettings {
    pub fn apply(&mut self, update: ProductSettingsUpdate) {
        if let Some(categories) = update.categories {
            self.categories = categories;
        }
        if let Some(units) = update.units {
            self.units = units;
        }
        if let Some(stock_alerts) = update.stock_alerts {
            if let Some(enabled) = stock_alerts.enabled {
                self.stock_alerts.enabled = enabled;
            }
            if let Some(threshold) = stock_alerts.threshold {
                self.stock_alerts.threshold = threshold;
            }
            if let Some(show_in_dashboard) = stock_alerts.show_in_dashboard {
                self.stock_alerts.show_in_dashboard = show_in_dashboard;
            }
            if let Some(highlight_low_stock) = stock_alerts.highlight_low_stock {
                self.stock_alerts.highlight_low_stock = highlight_low_stock;
            }
            if let Some(expiration_alerts) = stock_alerts.expiration_alerts {
                self.stock_alerts.expiration_alerts = expiration_alerts;
            }
        }
        if let Some(automation) = update.automation {
            if let Some(auto_stock_movement) = automation.auto_stock_movement {
                self.automation.auto_stock_movement = auto_stock_movement;
            }
            if let Some(auto_calculate_costs) = automation.auto_calculate_costs {
                self.automation.auto_calculate_costs = auto_calculate_costs;
            }
            if let Some(default_profit_margin) = automation.default_profit_margin {
                self.automation.default_profit_margin = default_profit_margin;
            }
            if let Some(suggest_reorder) = automation.suggest_reorder {
                self.automation.suggest_reorder = suggest_reorder;
            }
            if let Some(suggest_alternatives) = automation.suggest_alternatives {
                self.automation.suggest_alternatives = suggest_alternatives;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_update_changes_nothing() {
        let mut settings = PdfSettings::default();
        settings.apply(PdfSettingsUpdate::default());
        assert_eq!(settings, PdfSettings::default());

        let mut settings = ProductSettings::default();
        settings.apply(ProductSettingsUpdate::default());
        assert_eq!(settings, ProductSettings::default());
    }

    #[test]
    fn watermark_opacity_update_leaves_siblings_alone() {
        let mut settings = PdfSettings::default();
        settings.apply(PdfSettingsUpdate {
            watermark: Some(WatermarkUpdate {
                opacity: Some(0.5),
                ..Default::default()
            }),
            ..Default::default()
        });

        assert_eq!(settings.watermark.opacity, 0.5);
        assert!(settings.watermark.enabled);
        assert_eq!(settings.watermark.size, 80.0);
        assert_eq!(settings.watermark.position, "center");
        assert_eq!(settings.header, PdfSettings::default().header);
        assert_eq!(settings.company, PdfSettings::default().company);
    }

    #[test]
    fn header_height_update_keeps_nested_group() {
        let mut settings = PdfSettings::default();
        settings.apply(PdfSettingsUpdate {
            header: Some(HeaderUpdate {
                height: Some(50.0),
                ..Default::default()
            }),
            ..Default::default()
        });

        assert_eq!(settings.header.height, 50.0);
        assert_eq!(settings.header.background_color, "#4682B4");
        assert_eq!(settings.header.company_name.font_size, 18.0);
    }

    #[test]
    fn category_list_replaces_wholesale() {
        let mut settings = ProductSettings::default();
        settings.apply(ProductSettingsUpdate {
            categories: Some(vec!["Portas".to_string(), "Janelas".to_string()]),
            ..Default::default()
        });

        assert_eq!(settings.categories, vec!["Portas", "Janelas"]);
        assert_eq!(settings.units, ProductSettings::default().units);
        assert_eq!(
            settings.automation.default_profit_margin,
            Decimal::from(20)
        );
    }

    #[test]
    fn stock_alert_threshold_offsets_minimum() {
        let mut settings = ProductSettings::default();
        assert!(settings.stock_alert_triggered(Decimal::from(5), Decimal::from(5)));
        assert!(!settings.stock_alert_triggered(Decimal::from(6), Decimal::from(5)));

        settings.apply(ProductSettingsUpdate {
            stock_alerts: Some(StockAlertUpdate {
                threshold: Some(Decimal::from(2)),
                ..Default::default()
            }),
            ..Default::default()
        });
        assert!(!settings.stock_alert_triggered(Decimal::from(4), Decimal::from(5)));
        assert!(settings.stock_alert_triggered(Decimal::from(3), Decimal::from(5)));
    }

    #[test]
    fn disabled_alerts_never_trigger() {
        let mut settings = ProductSettings::default();
        settings.apply(ProductSettingsUpdate {
            stock_alerts: Some(StockAlertUpdate {
                enabled: Some(false),
                ..Default::default()
            }),
            ..Default::default()
        });
        assert!(!settings.stock_alert_triggered(Decimal::ZERO, Decimal::from(10)));
    }

    #[test]
    fn persisted_shape_uses_camel_case_keys() {
        let json = serde_json::to_string(&PdfSettings::default()).unwrap();
        assert!(json.contains("\"backgroundColor\""));
        assert!(json.contains("\"fontWeight\""));
        assert!(json.contains("\"stateRegistration\""));

        let json = serde_json::to_string(&ProductSettings::default()).unwrap();
        assert!(json.contains("\"stockAlerts\""));
        assert!(json.contains("\"defaultProfitMargin\""));
    }
}
