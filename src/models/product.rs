use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Product kinds stored in the `product_type` text column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductType {
    RawMaterial,
    SubPart,
    FinishedProduct,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::RawMaterial => "raw_material",
            ProductType::SubPart => "sub_part",
            ProductType::FinishedProduct => "finished_product",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProductType::RawMaterial => "Raw material",
            ProductType::SubPart => "Sub part",
            ProductType::FinishedProduct => "Finished product",
        }
    }

    pub fn parse(s: &str) -> Option<ProductType> {
        match s {
            "raw_material" => Some(ProductType::RawMaterial),
            "sub_part" => Some(ProductType::SubPart),
            "finished_product" => Some(ProductType::FinishedProduct),
            _ => None,
        }
    }
}

/// One line of a product's bill of materials. `unit_cost` is a snapshot taken
/// when the line was added; quantity edits recompute `total_cost` against that
/// snapshot, they do not re-resolve the referenced product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductComponent {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: Decimal,
    pub unit: String,
    pub unit_cost: Decimal,
    pub total_cost: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub product_type: String,
    pub unit: String,
    pub cost_price: Decimal,
    pub sale_price: Option<Decimal>,
    pub current_stock: Decimal,
    pub min_stock: Decimal,
    pub supplier: Option<String>,
    pub components: Json<Vec<ProductComponent>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn kind(&self) -> ProductType {
        ProductType::parse(&self.product_type).unwrap_or(ProductType::RawMaterial)
    }

    pub fn is_raw_material(&self) -> bool {
        self.kind() == ProductType::RawMaterial
    }
}

// Template-friendly product struct
#[derive(Debug, Serialize, Deserialize)]
pub struct ProductTemplate {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub product_type: String,
    pub unit: String,
    pub cost_price: Decimal,
    pub sale_price: String,
    pub current_stock: Decimal,
    pub min_stock: Decimal,
    pub supplier: String,
    pub components: Vec<ProductComponent>,
    pub components_json: String,
    pub is_raw_material: bool,
}

impl From<Product> for ProductTemplate {
    fn from(product: Product) -> Self {
        let is_raw_material = product.is_raw_material();
        let components = product.components.0;
        let components_json =
            serde_json::to_string(&components).unwrap_or_else(|_| "[]".to_string());
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            category: product.category,
            product_type: product.product_type,
            unit: product.unit,
            cost_price: product.cost_price,
            sale_price: product
                .sale_price
                .map(|p| p.to_string())
                .unwrap_or_default(),
            current_stock: product.current_stock,
            min_stock: product.min_stock,
            supplier: product.supplier.unwrap_or_default(),
            components,
            components_json,
            is_raw_material,
        }
    }
}

// Row struct for the product list page
#[derive(Debug, Serialize)]
pub struct ProductDisplay {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub type_label: String,
    pub unit: String,
    pub cost_price: Decimal,
    pub sale_price: String,
    pub current_stock: Decimal,
    pub min_stock: Decimal,
    pub component_count: usize,
    pub low_stock: bool,
}

impl ProductDisplay {
    pub fn new(product: &Product, low_stock: bool) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            category: product.category.clone(),
            type_label: product.kind().label().to_string(),
            unit: product.unit.clone(),
            cost_price: product.cost_price,
            sale_price: product
                .sale_price
                .map(|p| format!("{:.2}", p))
                .unwrap_or_default(),
            current_stock: product.current_stock,
            min_stock: product.min_stock,
            component_count: product.components.0.len(),
            low_stock,
        }
    }
}
