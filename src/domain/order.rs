use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

/// Order lifecycle. `PENDING -> PAID` and `PENDING -> CANCELLED` are the only
/// legal transitions; both terminal states are idempotent targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Paid,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Paid => "PAID",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(OrderStatus::Pending),
            "PAID" => Ok(OrderStatus::Paid),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

/// One requested line of an order, price snapshotted at creation time.
#[derive(Debug, Clone)]
pub struct OrderLineInput {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

/// A fully priced order ready to be written to the ledger.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub total_amount: BigDecimal,
    pub idempotency_key: Option<String>,
    pub shipping_address_id: Option<Uuid>,
    pub lines: Vec<OrderLineInput>,
}

#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub total_amount: BigDecimal,
    pub shipping_address_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub lines: Vec<OrderLineView>,
}

/// Listing row (no lines attached).
#[derive(Debug, Clone)]
pub struct OrderSummary {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub total_amount: BigDecimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub user_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
    pub limit: i64,
}

/// Input to the creation saga, as received from the API layer.
#[derive(Debug, Clone)]
pub struct CreateOrderCommand {
    pub user_id: Uuid,
    pub items: Vec<RequestedItem>,
    pub shipping_address_id: Option<Uuid>,
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RequestedItem {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct CreatedOrder {
    pub id: Uuid,
    pub status: OrderStatus,
}

/// An order enriched with best-effort upstream reads. Upstream payloads are
/// passed through untyped; a failed fetch leaves the field absent.
#[derive(Debug, Clone)]
pub struct OrderDetails {
    pub order: OrderView,
    pub user: Option<Value>,
    pub shipping_address: Option<crate::domain::external::Address>,
    pub items: Vec<EnrichedItem>,
}

#[derive(Debug, Clone)]
pub struct EnrichedItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub product: Option<Value>,
}
