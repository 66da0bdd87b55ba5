//! Ports the orchestrator depends on. Each has one production adapter in
//! `infrastructure` and in-memory fakes in the orchestrator's tests.

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use super::errors::DomainError;
use super::external::{Address, AuthContext, Product, ReleaseOutcome, ReserveOutcome};
use super::order::{NewOrder, OrderFilter, OrderStatus, OrderSummary, OrderView};

/// The locally owned order store. `create` is the only multi-row transaction
/// in the system: order and lines commit together or not at all.
#[async_trait]
pub trait OrderLedger: Send + Sync + 'static {
    async fn create(&self, order: NewOrder) -> Result<Uuid, DomainError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError>;
    async fn list(&self, filter: OrderFilter) -> Result<Vec<OrderSummary>, DomainError>;
    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<(), DomainError>;
}

/// Reads against the user service.
#[async_trait]
pub trait IdentityClient: Send + Sync + 'static {
    /// `Ok(false)` means the user store answered and the user does not exist;
    /// an unreachable user store is a distinct `Unavailable` error.
    async fn validate_user(&self, user_id: Uuid, auth: &AuthContext)
        -> Result<bool, DomainError>;

    /// Best-effort raw user payload for detail aggregation.
    async fn get_user(&self, user_id: Uuid, auth: &AuthContext) -> Option<Value>;

    /// Addresses ordered default-first, most-recently-created first. A failed
    /// call degrades to an empty list rather than failing the workflow.
    async fn list_addresses(&self, user_id: Uuid, auth: &AuthContext) -> Vec<Address>;
}

/// Reads and stock mutations against the product service.
#[async_trait]
pub trait InventoryClient: Send + Sync + 'static {
    async fn get_product(
        &self,
        product_id: Uuid,
        auth: &AuthContext,
    ) -> Result<Option<Product>, DomainError>;

    /// Conditional decrement: succeeds only if the store holds at least
    /// `quantity` at the moment of the call.
    async fn reserve(
        &self,
        product_id: Uuid,
        quantity: i32,
        auth: &AuthContext,
    ) -> Result<ReserveOutcome, DomainError>;

    /// Unconditional increment, used for cancellation and for compensating a
    /// failed creation attempt.
    async fn release(
        &self,
        product_id: Uuid,
        quantity: i32,
        auth: &AuthContext,
    ) -> Result<ReleaseOutcome, DomainError>;
}

/// Fire-and-forget domain event publication. Implementations log failures and
/// never surface them to the caller.
pub trait EventEmitter: Send + Sync + 'static {
    fn emit(&self, event_type: &str, payload: Value);
}
