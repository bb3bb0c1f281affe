//! Renders an order into the plain-text summary delivered to the shop owner.

use crate::models::{order::text_of, OrderPayload};
use serde_json::Value;

pub const MESSAGE_TITLE: &str = "Nuevo pedido en Cyberduck";

/// Build the summary text. Never fails; missing fields render as defaults.
pub fn build_message(order: &OrderPayload) -> String {
    let mut lines = vec![
        MESSAGE_TITLE.to_string(),
        format!("Nombre: {}", order.customer_name()),
        format!("Correo: {}", order.email()),
        format!("Celular: {}", order.phone()),
        format!("Total: {}", format_total(order.total())),
        "Productos:".to_string(),
    ];

    // Prices are echoed verbatim, unlike the total.
    lines.extend(
        order
            .items()
            .iter()
            .map(|item| format!("- {} — {}", item.display_name(), item.display_price())),
    );

    lines.join("\n")
}

/// `$` plus the amount rounded to whole units and grouped by thousands.
/// Values that are not JSON numbers are printed as sent.
pub fn format_total(total: &Value) -> String {
    match total {
        Value::Null => "$0".to_string(),
        // Booleans count as 1 and 0, as numbers would.
        Value::Bool(b) => format!("${}", u8::from(*b)),
        Value::Number(n) => {
            let whole = if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                format!("{:.0}", n.as_f64().unwrap_or_default())
            };
            format!("${}", group_thousands(&whole))
        }
        other => format!("${}", text_of(other).unwrap_or_default()),
    }
}

fn group_thousands(whole: &str) -> String {
    let (sign, digits) = match whole.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", whole),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{}{}", sign, grouped)
}
