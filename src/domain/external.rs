//! Read-only views of entities owned by the user and product services.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A shipping address as served by the user service. The service returns
/// addresses ordered default-first, most-recently-created first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub id: Uuid,
    #[serde(default)]
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub phone: Option<String>,
    // The user service serialises this flag as 0/1.
    #[serde(default, deserialize_with = "bool_from_int_or_bool")]
    pub is_default: bool,
}

/// A product as served by the product service, with the stock level observed
/// at fetch time. The stock figure is advisory; only a reserve call debits it.
#[derive(Debug, Clone)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: BigDecimal,
    pub stock: i32,
    /// Raw upstream payload, passed through by the order-details aggregation.
    pub raw: Value,
}

/// Outcome of a stock reservation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveOutcome {
    Reserved,
    /// Conflict-class response: not enough stock at the moment of the call.
    Insufficient,
    NotFound,
}

/// Outcome of a stock release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    Released,
    NotFound,
}

/// Opaque bearer credential forwarded into every upstream call. This service
/// never inspects it; the upstream services enforce authorization.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    pub bearer: Option<String>,
}

impl AuthContext {
    pub fn bearer(token: impl Into<String>) -> Self {
        AuthContext {
            bearer: Some(token.into()),
        }
    }
}

fn bool_from_int_or_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_i64().unwrap_or(0) != 0,
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn address_accepts_integer_default_flag() {
        let addr: Address = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "line1": "1 Main St",
            "city": "Springfield",
            "country": "US",
            "is_default": 1
        }))
        .unwrap();
        assert!(addr.is_default);
    }

    #[test]
    fn address_accepts_boolean_default_flag() {
        let addr: Address = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "is_default": true
        }))
        .unwrap();
        assert!(addr.is_default);
    }

    #[test]
    fn missing_default_flag_is_false() {
        let addr: Address =
            serde_json::from_value(json!({ "id": Uuid::new_v4() })).unwrap();
        assert!(!addr.is_default);
    }
}
