mod costing;
mod database;
mod filters;
mod handlers;
mod models;
mod settings;

use axum::{
    response::Redirect,
    routing::{get, post},
    Router,
};
use std::env;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use dotenvy::dotenv;

use database::{create_database_pool, run_migrations, Database};
use settings::{PgSettingsStorage, SettingsStore};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub settings: Arc<RwLock<SettingsStore<PgSettingsStorage>>>,
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    env_logger::init();

    // Initialize database
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let db = create_database_pool(&database_url)
        .await
        .expect("Failed to connect to database");

    run_migrations(&db)
        .await
        .expect("Failed to run database migrations");

    println!("Database connection successful!");

    // Settings are hydrated once per process and shared through the app state
    let settings = SettingsStore::load(PgSettingsStorage::new(db.clone())).await;
    let state = AppState {
        db,
        settings: Arc::new(RwLock::new(settings)),
    };

    // Build the application router
    let app = create_router(state);

    // Get port from environment or use default
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{}", port);

    println!("🚀 Bancada server starting on http://{}", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::permanent("/dashboard") }))
        .route("/dashboard", get(handlers::dashboard))

        // Product catalog
        .route("/products", get(handlers::products::products_list))
        .route("/products/new", get(handlers::products::product_form))
        .route("/products", post(handlers::products::create_product))
        .route("/products/:id/edit", get(handlers::products::product_edit_form))
        .route("/products/:id", post(handlers::products::update_product))
        .route("/products/:id/delete", get(handlers::products::delete_product))

        // Materials were folded into the product catalog
        .route("/materials", get(|| async { Redirect::permanent("/products") }))

        // Settings
        .route("/settings", get(handlers::settings::settings_page))
        .route("/settings/pdf", post(handlers::settings::update_pdf_settings))
        .route("/settings/pdf/reset", get(handlers::settings::reset_pdf_settings))
        .route("/settings/products", post(handlers::settings::update_product_settings))
        .route("/settings/products/reset", get(handlers::settings::reset_product_settings))

        // API routes for the component editor
        .route("/api/products/available", get(handlers::api::available_components))
        .route("/api/components/add", post(handlers::api::add_component))
        .route("/api/components/quantity", post(handlers::api::update_component_quantity))
        .route("/api/components/remove", post(handlers::api::remove_component))

        // Static files
        .nest_service("/static", ServeDir::new("static"))

        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
