//! REST client for the Great Indian Waffle ordering backend.
//!
//! # Architecture
//!
//! - Plain JSON-over-HTTP via `reqwest`, no local sync
//! - The backend is the source of truth for confirmed orders and points
//! - In-memory caching via `moka` for menu responses (5 minute TTL)
//! - Authenticated endpoints take the session's bearer token per call
//!
//! # Endpoints
//!
//! - `GET /menu`, `GET /menu/featured`, `GET /menu/{item_id}`
//! - `POST /orders/create`, `GET /orders/history/{user_id}`
//! - `GET /loyalty/points/{user_id}`, `POST /loyalty/redeem`

mod cache;
pub mod types;

pub use types::{
    CreateOrderResponse, LoyaltyBalance, RedeemRewardRequest, RedeemRewardResponse, Reward,
};

use std::sync::Arc;

use moka::future::Cache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use great_indian_waffle_core::{AuthToken, ItemId, MenuItem, OrderRequest, UserId};

use crate::config::AppConfig;
use cache::CacheValue;

/// Errors that can occur when talking to the ordering backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend rejected the request.
    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the ordering backend REST API.
///
/// Cheap to clone; clones share the HTTP connection pool and the menu cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    request_timeout: std::time::Duration,
    cache: Cache<String, CacheValue>,
}

impl ApiClient {
    /// Create a new API client from the application configuration.
    #[must_use]
    pub fn new(config: &AppConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(100)
            .time_to_live(config.menu_cache_ttl)
            .build();

        let base_url = config
            .api_base_url
            .as_str()
            .trim_end_matches('/')
            .to_string();

        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                base_url,
                request_timeout: config.request_timeout,
                cache,
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&AuthToken>,
    ) -> Result<T, ApiError> {
        let mut request = self
            .inner
            .client
            .get(self.url(path))
            .timeout(self.inner.request_timeout);
        if let Some(token) = token {
            request = request.bearer_auth(token.as_str());
        }

        let response = request.send().await?;
        Self::read_response(path, response).await
    }

    async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        token: Option<&AuthToken>,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self
            .inner
            .client
            .post(self.url(path))
            .timeout(self.inner.request_timeout)
            .json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token.as_str());
        }

        let response = request.send().await?;
        Self::read_response(path, response).await
    }

    async fn read_response<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(path.to_string()));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                path = %path,
                body = %body.chars().take(500).collect::<String>(),
                "Ordering API returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    path = %path,
                    body = %body.chars().take(500).collect::<String>(),
                    "Failed to parse ordering API response"
                );
                Err(ApiError::Parse(e))
            }
        }
    }

    // =========================================================================
    // Menu Methods
    // =========================================================================

    /// Get the full menu.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn get_menu(&self) -> Result<Vec<MenuItem>, ApiError> {
        let cache_key = "menu".to_string();

        if let Some(CacheValue::Menu(items)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for menu");
            return Ok(items);
        }

        let items: Vec<MenuItem> = self.get_json("/menu", None).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Menu(items.clone()))
            .await;

        Ok(items)
    }

    /// Get the featured menu items shown on the home screen.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn get_featured(&self) -> Result<Vec<MenuItem>, ApiError> {
        let cache_key = "menu:featured".to_string();

        if let Some(CacheValue::Featured(items)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for featured items");
            return Ok(items);
        }

        let items: Vec<MenuItem> = self.get_json("/menu/featured", None).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Featured(items.clone()))
            .await;

        Ok(items)
    }

    /// Get a single menu item by ID.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the item does not exist, or another
    /// error if the request fails.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn get_menu_item(&self, item_id: ItemId) -> Result<MenuItem, ApiError> {
        let cache_key = format!("menu:item:{item_id}");

        if let Some(CacheValue::Item(item)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for menu item");
            return Ok(*item);
        }

        let item: MenuItem = self
            .get_json(&format!("/menu/{}", item_id.as_i64()), None)
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Item(Box::new(item.clone())))
            .await;

        Ok(item)
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// Submit an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the order or the request fails.
    #[instrument(skip(self, order, token), fields(client_request_id = %order.client_request_id()))]
    pub async fn create_order(
        &self,
        order: &OrderRequest,
        token: Option<&AuthToken>,
    ) -> Result<CreateOrderResponse, ApiError> {
        self.post_json("/orders/create", order, token).await
    }

    /// Get a user's past orders, newest last.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self, token), fields(user_id = %user_id))]
    pub async fn get_order_history(
        &self,
        user_id: &UserId,
        token: Option<&AuthToken>,
    ) -> Result<Vec<OrderRequest>, ApiError> {
        self.get_json(&format!("/orders/history/{}", user_id.as_str()), token)
            .await
    }

    // =========================================================================
    // Loyalty Methods
    // =========================================================================

    /// Get a user's loyalty point balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self, token), fields(user_id = %user_id))]
    pub async fn get_loyalty_points(
        &self,
        user_id: &UserId,
        token: Option<&AuthToken>,
    ) -> Result<LoyaltyBalance, ApiError> {
        self.get_json(&format!("/loyalty/points/{}", user_id.as_str()), token)
            .await
    }

    /// Redeem a reward against the user's point balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the redemption or the request
    /// fails.
    #[instrument(skip(self, request, token), fields(reward_id = %request.reward_id))]
    pub async fn redeem_reward(
        &self,
        request: &RedeemRewardRequest,
        token: Option<&AuthToken>,
    ) -> Result<RedeemRewardResponse, ApiError> {
        self.post_json("/loyalty/redeem", request, token).await
    }
}
