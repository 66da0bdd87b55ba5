use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::external::AuthContext;
use crate::domain::order::{
    CreateOrderCommand, OrderDetails, OrderFilter, OrderStatus, OrderSummary, OrderView,
    RequestedItem,
};
use crate::errors::AppError;
use crate::AppOrchestrator;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    #[serde(rename = "productId")]
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub items: Vec<OrderItemRequest>,
    #[serde(rename = "shippingAddressId", default)]
    pub shipping_address_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateOrderResponse {
    pub id: Uuid,
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub product_id: Uuid,
    pub quantity: i32,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub total_amount: String,
    pub shipping_address_id: Option<Uuid>,
    pub created_at: String,
    pub updated_at: String,
    pub items: Vec<OrderItemResponse>,
}

impl From<OrderView> for OrderResponse {
    fn from(order: OrderView) -> Self {
        OrderResponse {
            id: order.id,
            user_id: order.user_id,
            status: order.status.to_string(),
            total_amount: order.total_amount.to_string(),
            shipping_address_id: order.shipping_address_id,
            created_at: order.created_at.to_rfc3339(),
            updated_at: order.updated_at.to_rfc3339(),
            items: order
                .lines
                .into_iter()
                .map(|l| OrderItemResponse {
                    product_id: l.product_id,
                    quantity: l.quantity,
                    price: l.unit_price.to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderSummaryResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub total_amount: String,
    pub created_at: String,
}

impl From<OrderSummary> for OrderSummaryResponse {
    fn from(order: OrderSummary) -> Self {
        OrderSummaryResponse {
            id: order.id,
            user_id: order.user_id,
            status: order.status.to_string(),
            total_amount: order.total_amount.to_string(),
            created_at: order.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListOrdersParams {
    #[serde(rename = "userId")]
    pub user_id: Option<Uuid>,
    pub status: Option<String>,
    /// Page size, clamped to 1..=100. Defaults to 20.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub orders: Vec<OrderSummaryResponse>,
    /// Reserved for cursor pagination; currently always null.
    #[serde(rename = "nextCursor")]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DetailItemResponse {
    #[serde(rename = "productId")]
    pub product_id: Uuid,
    pub quantity: i32,
    pub product: Option<Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDetailsResponse {
    pub id: Uuid,
    pub status: String,
    pub total_amount: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    #[serde(rename = "shippingAddressId")]
    pub shipping_address_id: Option<Uuid>,
    #[serde(rename = "shippingAddress")]
    pub shipping_address: Option<Value>,
    pub user: Option<Value>,
    pub items: Vec<DetailItemResponse>,
}

impl From<OrderDetails> for OrderDetailsResponse {
    fn from(details: OrderDetails) -> Self {
        OrderDetailsResponse {
            id: details.order.id,
            status: details.order.status.to_string(),
            total_amount: details.order.total_amount.to_string(),
            created_at: details.order.created_at.to_rfc3339(),
            updated_at: details.order.updated_at.to_rfc3339(),
            user_id: details.order.user_id,
            shipping_address_id: details.order.shipping_address_id,
            shipping_address: details
                .shipping_address
                .and_then(|a| serde_json::to_value(a).ok()),
            user: details.user,
            items: details
                .items
                .into_iter()
                .map(|i| DetailItemResponse {
                    product_id: i.product_id,
                    quantity: i.quantity,
                    product: i.product,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub id: Uuid,
    pub status: String,
}

// ── Header helpers ───────────────────────────────────────────────────────────

fn auth_context(req: &HttpRequest) -> AuthContext {
    AuthContext {
        bearer: req
            .headers()
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    }
}

fn idempotency_key(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("Idempotency-Key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Runs the order-creation saga: validate user and address, price items,
/// reserve stock, persist the order, emit `order_created`.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = CreateOrderResponse),
        (status = 400, description = "Invalid user, product, address, or quantity"),
        (status = 503, description = "User or product service unreachable"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    orchestrator: web::Data<AppOrchestrator>,
    req: HttpRequest,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let auth = auth_context(&req);
    let body = body.into_inner();
    let cmd = CreateOrderCommand {
        user_id: body.user_id,
        items: body
            .items
            .into_iter()
            .map(|i| RequestedItem {
                product_id: i.product_id,
                quantity: i.quantity,
            })
            .collect(),
        shipping_address_id: body.shipping_address_id,
        idempotency_key: idempotency_key(&req),
    };

    let created = orchestrator.create_order(cmd, &auth).await?;
    Ok(HttpResponse::Created().json(CreateOrderResponse {
        id: created.id,
        status: created.status.to_string(),
    }))
}

/// GET /orders
#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "Orders matching the filter", body = ListOrdersResponse),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    orchestrator: web::Data<AppOrchestrator>,
    params: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = params.into_inner();
    let status = params
        .status
        .map(|s| {
            OrderStatus::from_str(&s).map_err(AppError::Validation)
        })
        .transpose()?;

    let orders = orchestrator
        .list_orders(OrderFilter {
            user_id: params.user_id,
            status,
            limit: params.limit,
        })
        .await?;

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        orders: orders.into_iter().map(Into::into).collect(),
        next_cursor: None,
    }))
}

/// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/orders/{id}",
    responses(
        (status = 200, description = "Order with its items", body = OrderResponse),
        (status = 404, description = "Unknown order"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    orchestrator: web::Data<AppOrchestrator>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order = orchestrator.get_order(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// GET /orders/{id}/details
///
/// The order enriched with best-effort user, product, and address reads.
#[utoipa::path(
    get,
    path = "/orders/{id}/details",
    responses(
        (status = 200, description = "Enriched order", body = OrderDetailsResponse),
        (status = 404, description = "Unknown order"),
    ),
    tag = "orders"
)]
pub async fn get_order_details(
    orchestrator: web::Data<AppOrchestrator>,
    req: HttpRequest,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let auth = auth_context(&req);
    let details = orchestrator.order_details(id.into_inner(), &auth).await?;
    Ok(HttpResponse::Ok().json(OrderDetailsResponse::from(details)))
}

/// POST /orders/{id}/cancel
#[utoipa::path(
    post,
    path = "/orders/{id}/cancel",
    responses(
        (status = 200, description = "Order cancelled (idempotent)", body = StatusResponse),
        (status = 404, description = "Unknown order"),
        (status = 409, description = "Order already paid"),
    ),
    tag = "orders"
)]
pub async fn cancel_order(
    orchestrator: web::Data<AppOrchestrator>,
    req: HttpRequest,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let auth = auth_context(&req);
    let id = id.into_inner();
    let status = orchestrator.cancel_order(id, &auth).await?;
    Ok(HttpResponse::Ok().json(StatusResponse {
        id,
        status: status.to_string(),
    }))
}

/// POST /orders/{id}/pay
#[utoipa::path(
    post,
    path = "/orders/{id}/pay",
    responses(
        (status = 200, description = "Order paid (idempotent)", body = StatusResponse),
        (status = 404, description = "Unknown order"),
        (status = 409, description = "Order already cancelled"),
    ),
    tag = "orders"
)]
pub async fn pay_order(
    orchestrator: web::Data<AppOrchestrator>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let status = orchestrator.pay_order(id).await?;
    Ok(HttpResponse::Ok().json(StatusResponse {
        id,
        status: status.to_string(),
    }))
}
