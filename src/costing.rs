//! Bill-of-materials cost aggregation for draft component lists.
//!
//! Component entries carry a snapshot `unit_cost` taken when the line was
//! added. Quantity edits recompute `total_cost` against that snapshot and
//! `resolve_unit_cost` for a composite product sums the cached line totals
//! rather than re-walking the component tree, so an upstream price change does
//! not ripple into existing drafts until the line is re-added. That staleness
//! is intentional and matches how the catalog has always behaved.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{Product, ProductComponent, ProductType};

/// Current unit cost of a product: the entered price for raw materials, the
/// cached component total for everything else. Unknown ids cost zero — the
/// catalog is edited concurrently and a referenced product may be gone.
pub fn resolve_unit_cost(products: &[Product], product_id: Uuid) -> Decimal {
    let Some(product) = products.iter().find(|p| p.id == product_id) else {
        log::warn!("cost resolution for unknown product {}", product_id);
        return Decimal::ZERO;
    };

    match product.kind() {
        ProductType::RawMaterial => product.cost_price,
        ProductType::SubPart | ProductType::FinishedProduct => total_cost(&product.components),
    }
}

/// Add one unit of `product_id` to the draft list. An existing line gains a
/// unit at its snapshot cost; a new line snapshots the product's current cost.
pub fn add_component(components: &mut Vec<ProductComponent>, products: &[Product], product_id: Uuid) {
    let Some(product) = products.iter().find(|p| p.id == product_id) else {
        log::warn!("ignoring component for unknown product {}", product_id);
        return;
    };

    if let Some(existing) = components.iter_mut().find(|c| c.product_id == product_id) {
        existing.quantity += Decimal::ONE;
        existing.total_cost = existing.quantity * existing.unit_cost;
        return;
    }

    let unit_cost = resolve_unit_cost(products, product_id);
    components.push(ProductComponent {
        product_id,
        product_name: product.name.clone(),
        quantity: Decimal::ONE,
        unit: product.unit.clone(),
        unit_cost,
        total_cost: unit_cost,
    });
}

/// Set a line's quantity; zero or negative removes the line. The snapshot
/// `unit_cost` never changes here.
pub fn update_component_quantity(
    components: &mut Vec<ProductComponent>,
    product_id: Uuid,
    quantity: Decimal,
) {
    if quantity <= Decimal::ZERO {
        remove_component(components, product_id);
        return;
    }

    if let Some(component) = components.iter_mut().find(|c| c.product_id == product_id) {
        component.quantity = quantity;
        component.total_cost = quantity * component.unit_cost;
    }
}

pub fn remove_component(components: &mut Vec<ProductComponent>, product_id: Uuid) {
    components.retain(|c| c.product_id != product_id);
}

pub fn total_cost(components: &[ProductComponent]) -> Decimal {
    components.iter().map(|c| c.total_cost).sum()
}

/// The cost price that actually gets persisted: raw materials keep the entered
/// price, composite products always derive it from their components.
pub fn finalize_cost_price(
    kind: ProductType,
    entered_cost: Decimal,
    components: &[ProductComponent],
) -> Decimal {
    match kind {
        ProductType::RawMaterial => entered_cost,
        ProductType::SubPart | ProductType::FinishedProduct => total_cost(components),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sqlx::types::Json;

    fn dec(value: i64) -> Decimal {
        Decimal::from(value)
    }

    fn product(id: Uuid, product_type: ProductType, cost_price: Decimal) -> Product {
        Product {
            id,
            name: format!("product-{}", id),
            description: String::new(),
            category: "Madeiras".to_string(),
            product_type: product_type.as_str().to_string(),
            unit: "UN".to_string(),
            cost_price,
            sale_price: None,
            current_stock: Decimal::ZERO,
            min_stock: Decimal::ZERO,
            supplier: None,
            components: Json(Vec::new()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn entry(product_id: Uuid, quantity: i64, unit_cost: i64) -> ProductComponent {
        ProductComponent {
            product_id,
            product_name: "part".to_string(),
            quantity: dec(quantity),
            unit: "UN".to_string(),
            unit_cost: dec(unit_cost),
            total_cost: dec(quantity * unit_cost),
        }
    }

    #[test]
    fn total_cost_is_sum_of_line_totals() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let components = vec![entry(a, 2, 10), entry(b, 3, 5)];
        assert_eq!(total_cost(&components), dec(35));
        assert_eq!(total_cost(&[]), Decimal::ZERO);
    }

    #[test]
    fn raw_material_resolves_to_its_entered_price() {
        let id = Uuid::new_v4();
        let products = vec![product(id, ProductType::RawMaterial, dec(12))];
        assert_eq!(resolve_unit_cost(&products, id), dec(12));
    }

    #[test]
    fn composite_resolves_to_cached_component_total() {
        let id = Uuid::new_v4();
        let mut sub_part = product(id, ProductType::SubPart, Decimal::ZERO);
        sub_part.components = Json(vec![entry(Uuid::new_v4(), 4, 3)]);
        // The entered cost_price on a composite is ignored.
        sub_part.cost_price = dec(999);
        let products = vec![sub_part];
        assert_eq!(resolve_unit_cost(&products, id), dec(12));
    }

    #[test]
    fn unknown_product_costs_zero() {
        assert_eq!(resolve_unit_cost(&[], Uuid::new_v4()), Decimal::ZERO);
    }

    #[test]
    fn adding_twice_increments_one_line() {
        let id = Uuid::new_v4();
        let products = vec![product(id, ProductType::RawMaterial, dec(10))];
        let mut components = Vec::new();

        add_component(&mut components, &products, id);
        add_component(&mut components, &products, id);

        assert_eq!(components.len(), 1);
        assert_eq!(components[0].quantity, dec(2));
        assert_eq!(components[0].total_cost, dec(20));
    }

    #[test]
    fn second_add_reuses_the_snapshot_cost() {
        let id = Uuid::new_v4();
        let mut products = vec![product(id, ProductType::RawMaterial, dec(10))];
        let mut components = Vec::new();

        add_component(&mut components, &products, id);
        // Upstream price change between edits.
        products[0].cost_price = dec(99);
        add_component(&mut components, &products, id);

        assert_eq!(components[0].unit_cost, dec(10));
        assert_eq!(components[0].total_cost, dec(20));
    }

    #[test]
    fn add_for_missing_product_is_a_no_op() {
        let mut components = vec![entry(Uuid::new_v4(), 1, 1)];
        add_component(&mut components, &[], Uuid::new_v4());
        assert_eq!(components.len(), 1);
    }

    #[test]
    fn quantity_update_recomputes_total_against_snapshot() {
        let id = Uuid::new_v4();
        let mut components = vec![entry(id, 2, 10)];
        update_component_quantity(&mut components, id, dec(5));
        assert_eq!(components[0].quantity, dec(5));
        assert_eq!(components[0].total_cost, dec(50));
    }

    #[test]
    fn zero_quantity_removes_the_line() {
        let id = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut components = vec![entry(id, 2, 10), entry(other, 1, 1)];

        update_component_quantity(&mut components, id, Decimal::ZERO);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].product_id, other);

        // Absent id leaves the list unchanged.
        update_component_quantity(&mut components, id, Decimal::ZERO);
        assert_eq!(components.len(), 1);
    }

    #[test]
    fn negative_quantity_also_removes() {
        let id = Uuid::new_v4();
        let mut components = vec![entry(id, 2, 10)];
        update_component_quantity(&mut components, id, dec(-3));
        assert!(components.is_empty());
    }

    #[test]
    fn remove_is_a_no_op_when_absent() {
        let id = Uuid::new_v4();
        let mut components = vec![entry(id, 2, 10)];
        remove_component(&mut components, Uuid::new_v4());
        assert_eq!(components.len(), 1);
        remove_component(&mut components, id);
        assert!(components.is_empty());
    }

    #[test]
    fn raw_material_cost_ignores_components() {
        let components = vec![entry(Uuid::new_v4(), 10, 10)];
        let with = finalize_cost_price(ProductType::RawMaterial, dec(7), &components);
        let without = finalize_cost_price(ProductType::RawMaterial, dec(7), &[]);
        assert_eq!(with, without);
        assert_eq!(with, dec(7));
    }

    #[test]
    fn composite_cost_ignores_entered_price() {
        let components = vec![entry(Uuid::new_v4(), 2, 10), entry(Uuid::new_v4(), 1, 5)];
        let cost = finalize_cost_price(ProductType::FinishedProduct, dec(1234), &components);
        assert_eq!(cost, total_cost(&components));
        assert_eq!(cost, dec(25));
    }
}
