//! Checkout payloads as sent by the storefront.
//!
//! The storefront is not trusted to send well-typed JSON, so every field is
//! kept as a raw [`Value`] and read through accessors that fall back to
//! defaults. Decoding never fails.

use serde::Deserialize;
use serde_json::Value;

pub const DEFAULT_CUSTOMER_NAME: &str = "Cliente";
pub const DEFAULT_ITEM_NAME: &str = "Producto";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OrderPayload {
    #[serde(default)]
    pub name: Value,
    #[serde(default)]
    pub email: Value,
    #[serde(default)]
    pub phone: Value,
    #[serde(default)]
    pub total: Value,
    #[serde(default)]
    pub items: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub name: Value,
    #[serde(default)]
    pub price: Value,
}

impl OrderPayload {
    /// Decode a request body. Anything that is not a JSON object yields the
    /// empty payload.
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(value) => Self::from_value(value),
            Err(e) => {
                tracing::debug!(error = %e, "Body is not JSON, using empty payload");
                Self::default()
            }
        }
    }

    pub fn from_value(value: Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        serde_json::from_value(value).unwrap_or_default()
    }

    pub fn customer_name(&self) -> String {
        text_of(&self.name).unwrap_or_else(|| DEFAULT_CUSTOMER_NAME.to_string())
    }

    pub fn email(&self) -> String {
        text_of(&self.email).unwrap_or_default()
    }

    pub fn phone(&self) -> String {
        text_of(&self.phone).unwrap_or_default()
    }

    /// Raw order total; `null` when the storefront left it out.
    pub fn total(&self) -> &Value {
        &self.total
    }

    /// Line items in the order they were sent. A missing or non-array
    /// `items` is an empty order.
    pub fn items(&self) -> Vec<LineItem> {
        match &self.items {
            Value::Array(entries) => entries.iter().cloned().map(LineItem::from_value).collect(),
            _ => Vec::new(),
        }
    }
}

impl LineItem {
    pub fn from_value(value: Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        serde_json::from_value(value).unwrap_or_default()
    }

    pub fn display_name(&self) -> String {
        text_of(&self.name).unwrap_or_else(|| DEFAULT_ITEM_NAME.to_string())
    }

    /// Price exactly as the storefront sent it; strings are unquoted.
    pub fn display_price(&self) -> String {
        text_of(&self.price).unwrap_or_default()
    }
}

/// Textual form of a JSON value, `None` for `null`.
pub fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
