use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rusty_money::{iso, Money};

/// Label rendered wherever a value cannot be computed.
pub const NO_DATA_LABEL: &str = "Sin datos";

/// Formats a €/m² price with euro separators, e.g. `€3.135,00`.
pub fn format_price_eur(price: Option<f64>) -> String {
    match price.and_then(Decimal::from_f64) {
        Some(amount) => format!("{}/m²", Money::from_decimal(amount.round_dp(2), iso::EUR)),
        None => NO_DATA_LABEL.to_string(),
    }
}

pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.2}%", v),
        _ => NO_DATA_LABEL.to_string(),
    }
}
