use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::external::{AuthContext, Product, ReleaseOutcome, ReserveOutcome};
use crate::domain::ports::InventoryClient;

/// Product-service client. Reserve is the one authoritative stock check in
/// the system; everything read through `get_product` is advisory.
pub struct HttpInventoryClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpInventoryClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        auth: &AuthContext,
    ) -> reqwest::RequestBuilder {
        let mut req = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(bearer) = &auth.bearer {
            req = req.header(AUTHORIZATION, bearer);
        }
        req
    }

    fn unavailable(e: reqwest::Error) -> DomainError {
        DomainError::Unavailable(format!("Could not connect to Product Service: {e}"))
    }
}

/// Extract the typed fields this service needs from the raw product payload.
/// The upstream serialises price as a JSON number; going through its shortest
/// decimal representation keeps "9.99" exactly 9.99.
fn parse_product(product_id: Uuid, raw: Value) -> Option<Product> {
    let name = raw.get("name")?.as_str()?.to_string();
    let price = BigDecimal::from_str(&raw.get("price")?.as_f64()?.to_string()).ok()?;
    let stock = i32::try_from(raw.get("stock")?.as_i64()?).ok()?;
    Some(Product {
        id: product_id,
        name,
        price,
        stock,
        raw,
    })
}

#[async_trait]
impl InventoryClient for HttpInventoryClient {
    async fn get_product(
        &self,
        product_id: Uuid,
        auth: &AuthContext,
    ) -> Result<Option<Product>, DomainError> {
        let resp = self
            .request(reqwest::Method::GET, &format!("/products/{product_id}"), auth)
            .send()
            .await
            .map_err(Self::unavailable)?;
        if !resp.status().is_success() {
            return Ok(None);
        }
        let raw: Value = resp.json().await.map_err(Self::unavailable)?;
        parse_product(product_id, raw)
            .map(Some)
            .ok_or_else(|| {
                DomainError::Unavailable("malformed response from Product Service".to_string())
            })
    }

    async fn reserve(
        &self,
        product_id: Uuid,
        quantity: i32,
        auth: &AuthContext,
    ) -> Result<ReserveOutcome, DomainError> {
        let resp = self
            .request(
                reqwest::Method::POST,
                &format!("/products/{product_id}/reserve"),
                auth,
            )
            .json(&json!({ "quantity": quantity }))
            .send()
            .await
            .map_err(Self::unavailable)?;
        match resp.status() {
            s if s.is_success() => Ok(ReserveOutcome::Reserved),
            StatusCode::CONFLICT => Ok(ReserveOutcome::Insufficient),
            StatusCode::NOT_FOUND => Ok(ReserveOutcome::NotFound),
            s => Err(DomainError::Unavailable(format!(
                "reserve failed with status {s}"
            ))),
        }
    }

    async fn release(
        &self,
        product_id: Uuid,
        quantity: i32,
        auth: &AuthContext,
    ) -> Result<ReleaseOutcome, DomainError> {
        let resp = self
            .request(
                reqwest::Method::POST,
                &format!("/products/{product_id}/release"),
                auth,
            )
            .json(&json!({ "quantity": quantity }))
            .send()
            .await
            .map_err(Self::unavailable)?;
        match resp.status() {
            s if s.is_success() => Ok(ReleaseOutcome::Released),
            StatusCode::NOT_FOUND => Ok(ReleaseOutcome::NotFound),
            s => Err(DomainError::Unavailable(format!(
                "release failed with status {s}"
            ))),
        }
    }
}
