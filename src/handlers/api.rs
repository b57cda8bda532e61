use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    costing,
    models::{Product, ProductComponent, ProductType},
    AppState,
};

#[derive(Serialize)]
pub struct ComponentListResponse {
    pub components: Vec<ProductComponent>,
    pub total_cost: Decimal,
}

impl From<Vec<ProductComponent>> for ComponentListResponse {
    fn from(components: Vec<ProductComponent>) -> Self {
        let total_cost = costing::total_cost(&components);
        Self {
            components,
            total_cost,
        }
    }
}

#[derive(Deserialize)]
pub struct AddComponentRequest {
    pub components: Vec<ProductComponent>,
    pub product_id: Uuid,
}

pub async fn add_component(
    State(state): State<AppState>,
    Json(request): Json<AddComponentRequest>,
) -> Result<Json<ComponentListResponse>, StatusCode> {
    let products = sqlx::query_as::<_, Product>("SELECT * FROM products")
        .fetch_all(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let mut components = request.components;
    costing::add_component(&mut components, &products, request.product_id);

    Ok(Json(components.into()))
}

#[derive(Deserialize)]
pub struct ComponentQuantityRequest {
    pub components: Vec<ProductComponent>,
    pub product_id: Uuid,
    pub quantity: Decimal,
}

pub async fn update_component_quantity(
    Json(request): Json<ComponentQuantityRequest>,
) -> Json<ComponentListResponse> {
    let mut components = request.components;
    costing::update_component_quantity(&mut components, request.product_id, request.quantity);
    Json(components.into())
}

#[derive(Deserialize)]
pub struct RemoveComponentRequest {
    pub components: Vec<ProductComponent>,
    pub product_id: Uuid,
}

pub async fn remove_component(
    Json(request): Json<RemoveComponentRequest>,
) -> Json<ComponentListResponse> {
    let mut components = request.components;
    costing::remove_component(&mut components, request.product_id);
    Json(components.into())
}

#[derive(Deserialize)]
pub struct AvailableQuery {
    pub exclude: Option<Uuid>,
}

#[derive(Serialize)]
pub struct AvailableComponentResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub unit: String,
    pub current_stock: Decimal,
    pub unit_cost: Decimal,
}

// Candidates for the component picker: raw materials and sub parts, minus the
// product being edited.
pub async fn available_components(
    State(state): State<AppState>,
    Query(query): Query<AvailableQuery>,
) -> Result<Json<Vec<AvailableComponentResponse>>, StatusCode> {
    let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY name")
        .fetch_all(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let available = products
        .iter()
        .filter(|p| p.kind() != ProductType::FinishedProduct)
        .filter(|p| Some(p.id) != query.exclude)
        .map(|p| AvailableComponentResponse {
            id: p.id,
            name: p.name.clone(),
            description: p.description.clone(),
            category: p.category.clone(),
            unit: p.unit.clone(),
            current_stock: p.current_stock,
            unit_cost: costing::resolve_unit_cost(&products, p.id),
        })
        .collect();

    Ok(Json(available))
}
