use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::external::{Address, AuthContext};
use crate::domain::ports::IdentityClient;

/// User-service client. The bearer credential from the inbound request is
/// forwarded verbatim and never interpreted here.
pub struct HttpIdentityClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpIdentityClient {
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

    fn get(&self, path: &str, auth: &AuthContext) -> reqwest::RequestBuilder {
        let mut req = self.http.get(format!("{}{}", self.base_url, path));
        if let Some(bearer) = &auth.bearer {
            req = req.header(AUTHORIZATION, bearer);
        }
        req
    }
}

#[async_trait]
impl IdentityClient for HttpIdentityClient {
    async fn validate_user(
        &self,
        user_id: Uuid,
        auth: &AuthContext,
    ) -> Result<bool, DomainError> {
        let resp = self
            .get(&format!("/users/{user_id}"), auth)
            .send()
            .await
            .map_err(|e| {
                DomainError::Unavailable(format!("Could not connect to User Service: {e}"))
            })?;
        // Any answered non-success means "does not exist" for this purpose.
        Ok(resp.status().is_success())
    }

    async fn get_user(&self, user_id: Uuid, auth: &AuthContext) -> Option<Value> {
        let resp = self
            .get(&format!("/users/{user_id}"), auth)
            .send()
            .await
            .ok()?;
        if !resp.status().is_success() {
            return None;
        }
        resp.json().await.ok()
    }

    async fn list_addresses(&self, user_id: Uuid, auth: &AuthContext) -> Vec<Address> {
        let resp = match self
            .get(&format!("/users/{user_id}/addresses"), auth)
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => resp,
            // Address resolution degrades gracefully on any failure.
            _ => return Vec::new(),
        };
        let mut addresses: Vec<Address> = resp.json().await.unwrap_or_default();
        // The service already orders default-first, most-recent first; the
        // stable sort re-asserts the default-first half without disturbing
        // recency order within each group.
        addresses.sort_by_key(|a| !a.is_default);
        addresses
    }
}
