use askama::Result;
use rust_decimal::Decimal;

// Custom filter to render a Decimal as a two-place money amount.
// This allows us to use `|money` in the templates.
#[allow(clippy::unnecessary_wraps)]
pub fn money(value: &Decimal) -> Result<String> {
    Ok(format!("{:.2}", value))
}
