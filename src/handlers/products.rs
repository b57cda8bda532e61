use askama::Template;
use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{Html, Redirect},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::types::Json;
use std::str::FromStr;
use uuid::Uuid;

use crate::{
    costing,
    filters,
    models::{Product, ProductComponent, ProductDisplay, ProductTemplate, ProductType},
    AppState,
};

#[derive(Template)]
#[template(path = "products/list.html")]
struct ProductsTemplate {
    items: Vec<ProductDisplay>,
}

// Candidate entries for the component picker on the form page.
struct ComponentCandidate {
    id: Uuid,
    name: String,
    description: String,
    category: String,
    unit: String,
    type_label: String,
    current_stock: Decimal,
    unit_cost: Decimal,
}

#[derive(Template)]
#[template(path = "products/form.html")]
struct ProductFormTemplate {
    product: ProductTemplate,
    is_new: bool,
    form_action: String,
    categories: Vec<String>,
    units: Vec<String>,
    candidates: Vec<ComponentCandidate>,
    components_total: Decimal,
    default_profit_margin: Decimal,
}

#[derive(Deserialize)]
pub struct ProductForm {
    name: String,
    description: Option<String>,
    category: String,
    product_type: String,
    unit: String,
    cost_price: Option<String>,
    sale_price: Option<String>,
    current_stock: Option<String>,
    min_stock: Option<String>,
    supplier: Option<String>,
    // The component editor keeps the draft list in this hidden field.
    components_json: Option<String>,
}

pub async fn products_list(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY name")
        .fetch_all(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let product_settings = state.settings.read().await.product().clone();
    let highlight = product_settings.stock_alerts.highlight_low_stock;

    let items = products
        .iter()
        .map(|p| {
            let low = highlight
                && product_settings.stock_alert_triggered(p.current_stock, p.min_stock);
            ProductDisplay::new(p, low)
        })
        .collect();

    let template = ProductsTemplate { items };
    Ok(Html(template.render().unwrap()))
}

fn blank_draft(product_settings: &crate::models::ProductSettings) -> ProductTemplate {
    ProductTemplate {
        id: Uuid::nil(),
        name: String::new(),
        description: String::new(),
        category: String::new(),
        product_type: ProductType::RawMaterial.as_str().to_string(),
        unit: product_settings
            .units
            .first()
            .cloned()
            .unwrap_or_else(|| "UN".to_string()),
        cost_price: Decimal::ZERO,
        sale_price: String::new(),
        current_stock: Decimal::ZERO,
        min_stock: Decimal::ZERO,
        supplier: String::new(),
        components: Vec::new(),
        components_json: "[]".to_string(),
        is_raw_material: true,
    }
}

// Products the component picker may offer: everything except finished goods
// and the product currently being edited (a product must not contain itself).
fn component_candidates(products: &[Product], editing: Option<Uuid>) -> Vec<ComponentCandidate> {
    products
        .iter()
        .filter(|p| p.kind() != ProductType::FinishedProduct)
        .filter(|p| Some(p.id) != editing)
        .map(|p| ComponentCandidate {
            id: p.id,
            name: p.name.clone(),
            description: p.description.clone(),
            category: p.category.clone(),
            unit: p.unit.clone(),
            type_label: p.kind().label().to_string(),
            current_stock: p.current_stock,
            unit_cost: costing::resolve_unit_cost(products, p.id),
        })
        .collect()
}

pub async fn product_form(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY name")
        .fetch_all(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let product_settings = state.settings.read().await.product().clone();

    let template = ProductFormTemplate {
        product: blank_draft(&product_settings),
        is_new: true,
        form_action: "/products".to_string(),
        categories: product_settings.categories.clone(),
        units: product_settings.units.clone(),
        candidates: component_candidates(&products, None),
        components_total: Decimal::ZERO,
        default_profit_margin: product_settings.automation.default_profit_margin,
    };
    Ok(Html(template.render().unwrap()))
}

pub async fn product_edit_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, StatusCode> {
    let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY name")
        .fetch_all(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let product = products
        .iter()
        .find(|p| p.id == id)
        .cloned()
        .ok_or(StatusCode::NOT_FOUND)?;

    let product_settings = state.settings.read().await.product().clone();
    let candidates = component_candidates(&products, Some(id));
    let components_total = costing::total_cost(&product.components);

    let template = ProductFormTemplate {
        product: ProductTemplate::from(product),
        is_new: false,
        form_action: format!("/products/{}", id),
        categories: product_settings.categories.clone(),
        units: product_settings.units.clone(),
        candidates,
        components_total,
        default_profit_margin: product_settings.automation.default_profit_margin,
    };
    Ok(Html(template.render().unwrap()))
}

struct ParsedProductForm {
    kind: ProductType,
    description: String,
    cost_price: Decimal,
    sale_price: Option<Decimal>,
    current_stock: Decimal,
    min_stock: Decimal,
    supplier: Option<String>,
    components: Vec<ProductComponent>,
}

// All text-to-number conversion happens here, before anything reaches the
// costing logic: unparsable or negative values fall back to zero.
fn parse_product_form(form: &ProductForm, product_id: Uuid) -> Result<ParsedProductForm, StatusCode> {
    let kind = ProductType::parse(&form.product_type).ok_or(StatusCode::BAD_REQUEST)?;

    let parse_decimal = |s: &Option<String>| -> Decimal {
        s.as_deref()
            .and_then(|v| Decimal::from_str(v.trim()).ok())
            .filter(|d| !d.is_sign_negative())
            .unwrap_or(Decimal::ZERO)
    };

    let sale_price = form
        .sale_price
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| Decimal::from_str(v).ok());

    let mut components: Vec<ProductComponent> = match form.components_json.as_deref() {
        Some(raw) if !raw.trim().is_empty() => serde_json::from_str(raw).unwrap_or_else(|err| {
            log::warn!("discarding malformed component list: {}", err);
            Vec::new()
        }),
        _ => Vec::new(),
    };
    // A product never contains itself.
    components.retain(|c| c.product_id != product_id);

    if kind == ProductType::RawMaterial {
        components.clear();
    }

    let cost_price = costing::finalize_cost_price(kind, parse_decimal(&form.cost_price), &components);

    let supplier = if kind == ProductType::RawMaterial {
        form.supplier
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    } else {
        None
    };

    Ok(ParsedProductForm {
        kind,
        description: form.description.clone().unwrap_or_default(),
        cost_price,
        sale_price,
        current_stock: parse_decimal(&form.current_stock),
        min_stock: parse_decimal(&form.min_stock),
        supplier,
        components,
    })
}

pub async fn create_product(
    State(state): State<AppState>,
    Form(form): Form<ProductForm>,
) -> Result<Redirect, StatusCode> {
    let id = Uuid::new_v4();
    let parsed = parse_product_form(&form, id)?;

    sqlx::query(
        r#"
        INSERT INTO products (
            id, name, description, category, product_type, unit,
            cost_price, sale_price, current_stock, min_stock, supplier, components
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(id)
    .bind(&form.name)
    .bind(&parsed.description)
    .bind(&form.category)
    .bind(parsed.kind.as_str())
    .bind(&form.unit)
    .bind(parsed.cost_price)
    .bind(parsed.sale_price)
    .bind(parsed.current_stock)
    .bind(parsed.min_stock)
    .bind(&parsed.supplier)
    .bind(Json(&parsed.components))
    .execute(&state.db)
    .await
    .map_err(|e| {
        log::error!("failed to create product: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Redirect::to("/products"))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(form): Form<ProductForm>,
) -> Result<Redirect, StatusCode> {
    let parsed = parse_product_form(&form, id)?;

    let result = sqlx::query(
        r#"
        UPDATE products SET
            name = $2, description = $3, category = $4, product_type = $5, unit = $6,
            cost_price = $7, sale_price = $8, current_stock = $9, min_stock = $10,
            supplier = $11, components = $12, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(&form.name)
    .bind(&parsed.description)
    .bind(&form.category)
    .bind(parsed.kind.as_str())
    .bind(&form.unit)
    .bind(parsed.cost_price)
    .bind(parsed.sale_price)
    .bind(parsed.current_stock)
    .bind(parsed.min_stock)
    .bind(&parsed.supplier)
    .bind(Json(&parsed.components))
    .execute(&state.db)
    .await
    .map_err(|e| {
        log::error!("failed to update product {}: {}", id, e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    if result.rows_affected() == 0 {
        return Err(StatusCode::NOT_FOUND);
    }

    Ok(Redirect::to("/products"))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Redirect, StatusCode> {
    sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Redirect::to("/products"))
}
