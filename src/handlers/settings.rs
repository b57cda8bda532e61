use askama::Template;
use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, Redirect},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

use crate::{
    models::settings::{
        AutomationUpdate, CompanyInfoUpdate, CompanyNameStyleUpdate, HeaderUpdate,
        StockAlertUpdate, WatermarkUpdate,
    },
    models::{PdfSettings, PdfSettingsUpdate, ProductSettings, ProductSettingsUpdate,
        WATERMARK_POSITIONS},
    AppState,
};

#[derive(Template)]
#[template(path = "settings/index.html")]
struct SettingsTemplate {
    pdf: PdfSettings,
    product: ProductSettings,
    categories_text: String,
    units_text: String,
    positions: Vec<String>,
}

pub async fn settings_page(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    let store = state.settings.read().await;
    let pdf = store.pdf().clone();
    let product = store.product().clone();
    drop(store);

    let template = SettingsTemplate {
        categories_text: product.categories.join("\n"),
        units_text: product.units.join("\n"),
        positions: WATERMARK_POSITIONS.iter().map(|s| s.to_string()).collect(),
        pdf,
        product,
    };
    Ok(Html(template.render().unwrap()))
}

#[derive(Deserialize)]
pub struct PdfSettingsForm {
    watermark_enabled: Option<String>, // HTML checkboxes send "on" or nothing
    watermark_opacity: Option<String>,
    watermark_size: Option<String>,
    watermark_position: Option<String>,
    header_font_size: Option<String>,
    header_font_weight: Option<String>,
    header_color: Option<String>,
    header_background_color: Option<String>,
    header_height: Option<String>,
    company_name: Option<String>,
    company_address: Option<String>,
    company_city: Option<String>,
    company_phone: Option<String>,
    company_email: Option<String>,
    company_tax_id: Option<String>,
    company_state_registration: Option<String>,
}

// Unparsable numeric fields stay None and therefore keep their current value.
fn parse_f64(s: &Option<String>) -> Option<f64> {
    s.as_deref().and_then(|v| v.trim().parse::<f64>().ok())
}

fn parse_decimal(s: &Option<String>) -> Option<Decimal> {
    s.as_deref().and_then(|v| Decimal::from_str(v.trim()).ok())
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub async fn update_pdf_settings(
    State(state): State<AppState>,
    Form(form): Form<PdfSettingsForm>,
) -> Result<Redirect, StatusCode> {
    let update = PdfSettingsUpdate {
        watermark: Some(WatermarkUpdate {
            enabled: Some(form.watermark_enabled.is_some()),
            opacity: parse_f64(&form.watermark_opacity),
            size: parse_f64(&form.watermark_size),
            position: non_empty(form.watermark_position)
                .filter(|p| WATERMARK_POSITIONS.contains(&p.as_str())),
        }),
        header: Some(HeaderUpdate {
            company_name: Some(CompanyNameStyleUpdate {
                font_size: parse_f64(&form.header_font_size),
                font_weight: non_empty(form.header_font_weight),
                color: non_empty(form.header_color),
            }),
            background_color: non_empty(form.header_background_color),
            height: parse_f64(&form.header_height),
        }),
        company: Some(CompanyInfoUpdate {
            name: non_empty(form.company_name),
            address: non_empty(form.company_address),
            city: non_empty(form.company_city),
            phone: non_empty(form.company_phone),
            email: non_empty(form.company_email),
            tax_id: non_empty(form.company_tax_id),
            state_registration: non_empty(form.company_state_registration),
        }),
    };

    state.settings.write().await.update_pdf(update).await;
    Ok(Redirect::to("/settings"))
}

#[derive(Deserialize)]
pub struct ProductSettingsForm {
    categories: Option<String>,
    units: Option<String>,
    alerts_enabled: Option<String>,
    alert_threshold: Option<String>,
    show_in_dashboard: Option<String>,
    highlight_low_stock: Option<String>,
    expiration_alerts: Option<String>,
    auto_stock_movement: Option<String>,
    auto_calculate_costs: Option<String>,
    default_profit_margin: Option<String>,
    suggest_reorder: Option<String>,
    suggest_alternatives: Option<String>,
}

// One entry per line (commas tolerated); an empty list keeps the current one.
fn parse_list(s: Option<String>) -> Option<Vec<String>> {
    let items: Vec<String> = s?
        .split(|c| c == '\n' || c == ',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

pub async fn update_product_settings(
    State(state): State<AppState>,
    Form(form): Form<ProductSettingsForm>,
) -> Result<Redirect, StatusCode> {
    let update = ProductSettingsUpdate {
        categories: parse_list(form.categories),
        units: parse_list(form.units),
        stock_alerts: Some(StockAlertUpdate {
            enabled: Some(form.alerts_enabled.is_some()),
            threshold: parse_decimal(&form.alert_threshold),
            show_in_dashboard: Some(form.show_in_dashboard.is_some()),
            highlight_low_stock: Some(form.highlight_low_stock.is_some()),
            expiration_alerts: Some(form.expiration_alerts.is_some()),
        }),
        automation: Some(AutomationUpdate {
            auto_stock_movement: Some(form.auto_stock_movement.is_some()),
            auto_calculate_costs: Some(form.auto_calculate_costs.is_some()),
            default_profit_margin: parse_decimal(&form.default_profit_margin),
            suggest_reorder: Some(form.suggest_reorder.is_some()),
            suggest_alternatives: Some(form.suggest_alternatives.is_some()),
        }),
    };

    state.settings.write().await.update_product(update).await;
    Ok(Redirect::to("/settings"))
}

pub async fn reset_pdf_settings(State(state): State<AppState>) -> Result<Redirect, StatusCode> {
    state.settings.write().await.reset_pdf().await;
    Ok(Redirect::to("/settings"))
}

pub async fn reset_product_settings(State(state): State<AppState>) -> Result<Redirect, StatusCode> {
    state.settings.write().await.reset_product().await;
    Ok(Redirect::to("/settings"))
}
