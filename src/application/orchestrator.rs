//! The order saga. Creation runs validate → price → reserve → persist → emit,
//! with stock release compensating a failed persist. Cancellation and payment
//! are single status transitions; cancellation additionally releases stock.

use bigdecimal::{BigDecimal, Zero};
use serde_json::json;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::external::{AuthContext, ReleaseOutcome, ReserveOutcome};
use crate::domain::order::{
    CreateOrderCommand, CreatedOrder, EnrichedItem, NewOrder, OrderDetails, OrderFilter,
    OrderLineInput, OrderStatus, OrderSummary, OrderView,
};
use crate::domain::ports::{EventEmitter, IdentityClient, InventoryClient, OrderLedger};

const MAX_LIST_LIMIT: i64 = 100;

pub struct OrderOrchestrator<L, I, P, E> {
    ledger: L,
    identity: I,
    inventory: P,
    events: E,
}

impl<L, I, P, E> OrderOrchestrator<L, I, P, E>
where
    L: OrderLedger,
    I: IdentityClient,
    P: InventoryClient,
    E: EventEmitter,
{
    pub fn new(ledger: L, identity: I, inventory: P, events: E) -> Self {
        Self {
            ledger,
            identity,
            inventory,
            events,
        }
    }

    /// Run the creation saga. No partial state escapes this call: every
    /// validation failure happens before the first reservation, and a failed
    /// ledger write releases whatever was reserved before surfacing.
    pub async fn create_order(
        &self,
        cmd: CreateOrderCommand,
        auth: &AuthContext,
    ) -> Result<CreatedOrder, DomainError> {
        if cmd.items.is_empty() {
            return Err(DomainError::Validation(
                "items must be a non-empty array".to_string(),
            ));
        }
        if cmd.items.iter().any(|i| i.quantity <= 0) {
            return Err(DomainError::Validation(
                "quantity must be > 0".to_string(),
            ));
        }

        if !self.identity.validate_user(cmd.user_id, auth).await? {
            return Err(DomainError::Validation("Invalid user ID".to_string()));
        }

        let shipping_address_id = self
            .resolve_shipping_address(cmd.user_id, cmd.shipping_address_id, auth)
            .await?;

        // Price each item and check stock. The stock figure here is advisory;
        // the authoritative check is the conditional decrement in the reserve
        // call below. Any failure aborts before a single reservation is made.
        let mut lines = Vec::with_capacity(cmd.items.len());
        let mut total = BigDecimal::zero();
        for item in &cmd.items {
            let product = self
                .inventory
                .get_product(item.product_id, auth)
                .await?
                .ok_or_else(|| {
                    DomainError::Validation(format!(
                        "Product with ID {} not found",
                        item.product_id
                    ))
                })?;
            if product.stock < item.quantity {
                return Err(DomainError::Validation(format!(
                    "Not enough stock for product {}",
                    product.name
                )));
            }
            total += &product.price * BigDecimal::from(item.quantity);
            lines.push(OrderLineInput {
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: product.price,
            });
        }

        // Reserve stock item by item, best-effort: a failed reservation does
        // not abort the remaining items, and the order below is persisted
        // with the full requested quantities either way. An order can thus
        // commit without being fully backed by reserved stock.
        let mut reserved: Vec<(Uuid, i32)> = Vec::new();
        for line in &lines {
            match self
                .inventory
                .reserve(line.product_id, line.quantity, auth)
                .await
            {
                Ok(ReserveOutcome::Reserved) => reserved.push((line.product_id, line.quantity)),
                Ok(outcome) => log::warn!(
                    "reservation for product {} ({} units) not granted: {:?}",
                    line.product_id,
                    line.quantity,
                    outcome
                ),
                Err(e) => log::warn!(
                    "reservation call for product {} failed: {}",
                    line.product_id,
                    e
                ),
            }
        }

        let new_order = NewOrder {
            user_id: cmd.user_id,
            total_amount: total.clone(),
            idempotency_key: cmd.idempotency_key,
            shipping_address_id,
            lines: lines.clone(),
        };
        let order_id = match self.ledger.create(new_order).await {
            Ok(id) => id,
            Err(e) => {
                self.release_reservations(&reserved, auth).await;
                return Err(e);
            }
        };

        self.events.emit(
            "order_created",
            json!({
                "orderId": order_id,
                "userId": cmd.user_id,
                "totalAmount": total.to_string(),
                "items": lines
                    .iter()
                    .map(|l| json!({
                        "productId": l.product_id,
                        "quantity": l.quantity,
                        "price": l.unit_price.to_string(),
                    }))
                    .collect::<Vec<_>>(),
            }),
        );

        Ok(CreatedOrder {
            id: order_id,
            status: OrderStatus::Pending,
        })
    }

    pub async fn get_order(&self, id: Uuid) -> Result<OrderView, DomainError> {
        self.ledger
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound)
    }

    pub async fn list_orders(
        &self,
        mut filter: OrderFilter,
    ) -> Result<Vec<OrderSummary>, DomainError> {
        filter.limit = filter.limit.clamp(1, MAX_LIST_LIMIT);
        self.ledger.list(filter).await
    }

    /// Aggregate an order with best-effort user, product, and address reads.
    /// Upstream failures leave the corresponding field absent.
    pub async fn order_details(
        &self,
        id: Uuid,
        auth: &AuthContext,
    ) -> Result<OrderDetails, DomainError> {
        let order = self.get_order(id).await?;

        let user = self.identity.get_user(order.user_id, auth).await;

        let mut items = Vec::with_capacity(order.lines.len());
        for line in &order.lines {
            let product = match self.inventory.get_product(line.product_id, auth).await {
                Ok(Some(p)) => Some(p.raw),
                _ => None,
            };
            items.push(EnrichedItem {
                product_id: line.product_id,
                quantity: line.quantity,
                product,
            });
        }

        let addresses = self.identity.list_addresses(order.user_id, auth).await;
        let shipping_address = match order.shipping_address_id {
            Some(addr_id) => addresses
                .iter()
                .find(|a| a.id == addr_id)
                .cloned()
                .or_else(|| addresses.first().cloned()),
            None => addresses.first().cloned(),
        };

        Ok(OrderDetails {
            order,
            user,
            shipping_address,
            items,
        })
    }

    /// `PENDING -> CANCELLED`, releasing stock for every line. Cancelling an
    /// already cancelled order is a no-op; a paid order cannot be cancelled.
    pub async fn cancel_order(
        &self,
        id: Uuid,
        auth: &AuthContext,
    ) -> Result<OrderStatus, DomainError> {
        let order = self.get_order(id).await?;
        match order.status {
            OrderStatus::Cancelled => return Ok(OrderStatus::Cancelled),
            OrderStatus::Paid => {
                return Err(DomainError::Conflict(
                    "Cannot cancel a paid order".to_string(),
                ))
            }
            OrderStatus::Pending => {}
        }

        let quantities: Vec<(Uuid, i32)> = order
            .lines
            .iter()
            .map(|l| (l.product_id, l.quantity))
            .collect();
        self.release_reservations(&quantities, auth).await;

        self.ledger
            .update_status(id, OrderStatus::Cancelled)
            .await?;

        self.events
            .emit("order_cancelled", json!({ "orderId": id }));

        Ok(OrderStatus::Cancelled)
    }

    /// `PENDING -> PAID`. Paying an already paid order is a no-op; a
    /// cancelled order cannot be paid. Stock is untouched here, it was
    /// committed at creation.
    pub async fn pay_order(&self, id: Uuid) -> Result<OrderStatus, DomainError> {
        let order = self.get_order(id).await?;
        match order.status {
            OrderStatus::Cancelled => {
                return Err(DomainError::Conflict(
                    "Cannot pay a cancelled order".to_string(),
                ))
            }
            OrderStatus::Paid => return Ok(OrderStatus::Paid),
            OrderStatus::Pending => {}
        }

        self.ledger.update_status(id, OrderStatus::Paid).await?;

        self.events.emit(
            "order_paid",
            json!({
                "orderId": id,
                "userId": order.user_id,
                "totalAmount": order.total_amount.to_string(),
            }),
        );

        Ok(OrderStatus::Paid)
    }

    /// An explicitly requested address must belong to the user; otherwise
    /// the effective default (first entry of the ordered list) is used, or
    /// none when the user has no addresses.
    async fn resolve_shipping_address(
        &self,
        user_id: Uuid,
        requested: Option<Uuid>,
        auth: &AuthContext,
    ) -> Result<Option<Uuid>, DomainError> {
        let addresses = self.identity.list_addresses(user_id, auth).await;
        match requested {
            Some(id) => {
                if addresses.iter().any(|a| a.id == id) {
                    Ok(Some(id))
                } else {
                    Err(DomainError::Validation(
                        "shippingAddressId does not belong to user".to_string(),
                    ))
                }
            }
            None => Ok(addresses.first().map(|a| a.id)),
        }
    }

    /// Best-effort release of a set of reservations. A failed release is
    /// logged and never blocks the remaining items.
    async fn release_reservations(&self, quantities: &[(Uuid, i32)], auth: &AuthContext) {
        for (product_id, quantity) in quantities {
            match self.inventory.release(*product_id, *quantity, auth).await {
                Ok(ReleaseOutcome::Released) => {}
                Ok(ReleaseOutcome::NotFound) => log::warn!(
                    "release for product {} ({} units): product not found",
                    product_id,
                    quantity
                ),
                Err(e) => log::warn!(
                    "release call for product {} ({} units) failed: {}",
                    product_id,
                    quantity,
                    e
                ),
            }
        }
    }
}
