pub mod api;
pub mod products;
pub mod settings;

use askama::Template;
use axum::{extract::State, http::StatusCode, response::Html};
use rust_decimal::Decimal;

use crate::{
    filters,
    models::{Product, ProductDisplay, ProductType},
    AppState,
};

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    product_count: usize,
    raw_material_count: usize,
    sub_part_count: usize,
    finished_product_count: usize,
    stock_value: Decimal,
    alerts_enabled: bool,
    low_stock: Vec<ProductDisplay>,
}

pub async fn dashboard(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY name")
        .fetch_all(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let product_settings = state.settings.read().await.product().clone();

    let count_of = |kind: ProductType| products.iter().filter(|p| p.kind() == kind).count();
    let stock_value: Decimal = products
        .iter()
        .map(|p| p.cost_price * p.current_stock)
        .sum();

    let alerts_enabled = product_settings.stock_alerts.enabled
        && product_settings.stock_alerts.show_in_dashboard;
    let low_stock: Vec<ProductDisplay> = if alerts_enabled {
        products
            .iter()
            .filter(|p| product_settings.stock_alert_triggered(p.current_stock, p.min_stock))
            .map(|p| ProductDisplay::new(p, true))
            .collect()
    } else {
        Vec::new()
    };

    let template = DashboardTemplate {
        product_count: products.len(),
        raw_material_count: count_of(ProductType::RawMaterial),
        sub_part_count: count_of(ProductType::SubPart),
        finished_product_count: count_of(ProductType::FinishedProduct),
        stock_value,
        alerts_enabled,
        low_stock,
    };

    Ok(Html(template.render().unwrap()))
}
