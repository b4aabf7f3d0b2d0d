//! HTTP access to the warehouse backend

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, IntoUrl, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use shared::{
    ItemId, ItemStatusUpdate, Order, OrderId, OrderStatusUpdate, PickStatus, Product,
    ProductVariant, StockAdjustment, StockAdjustmentRequest, SyncRequest,
};

use crate::csrf::{self, CSRF_HEADER};
use crate::{ClientConfig, ClientError, ClientResult};

/// Backend operations the client relies on
///
/// Every mutation component talks to the backend only through this trait so
/// tests can substitute an in-memory implementation.
#[async_trait]
pub trait WarehouseApi: Send + Sync {
    async fn list_orders(&self) -> ClientResult<Vec<Order>>;
    async fn update_order_status(
        &self,
        order_id: OrderId,
        update: &OrderStatusUpdate,
    ) -> ClientResult<()>;
    async fn update_item_status(
        &self,
        order_id: OrderId,
        item_id: ItemId,
        status: PickStatus,
    ) -> ClientResult<()>;
    async fn trigger_sync(&self, request: &SyncRequest) -> ClientResult<()>;

    async fn list_products(&self) -> ClientResult<Vec<Product>>;
    async fn list_variants(&self) -> ClientResult<Vec<ProductVariant>>;
    async fn list_pending_adjustments(&self) -> ClientResult<Vec<StockAdjustment>>;
    async fn adjust_product_stock(&self, product_code: &str, quantity: i64) -> ClientResult<()>;
    async fn adjust_variant_stock(&self, variant_code: &str, quantity: i64) -> ClientResult<()>;
    async fn delete_adjustment(&self, adjustment_id: i64) -> ClientResult<()>;
    async fn sync_adjustments(&self) -> ClientResult<()>;
}

/// reqwest-backed implementation with a session cookie jar and CSRF header
#[derive(Debug, Clone)]
pub struct RestApi {
    client: Client,
    base_url: String,
    jar: Arc<Jar>,
    csrf_token: Option<String>,
}

impl RestApi {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let origin = Url::parse(&base_url)
            .map_err(|e| ClientError::Config(format!("invalid base url {base_url}: {e}")))?;

        let jar = Arc::new(Jar::default());
        if let Some(session_id) = &config.session_id {
            jar.add_cookie_str(&format!("sessionid={session_id}"), &origin);
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .cookie_provider(jar.clone())
            .build()?;

        Ok(Self {
            client,
            base_url,
            jar,
            csrf_token: config.csrf_token.clone(),
        })
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Base URL plus percent-encoded segments and a trailing slash
    fn segment_url(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::Config(format!("invalid base url {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Config(format!("base url {} has no path", self.base_url)))?
            .pop_if_empty()
            .extend(segments)
            .push("");
        Ok(url)
    }

    /// Configured token first, then whatever the backend put in the jar
    fn csrf_token(&self) -> Option<String> {
        if let Some(token) = &self.csrf_token {
            return Some(token.clone());
        }
        let origin = Url::parse(&self.base_url).ok()?;
        let cookies = self.jar.cookies(&origin)?;
        csrf::token_from_cookie_header(cookies.to_str().ok()?)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.request_url(method, self.url(path))
    }

    fn request_url(&self, method: Method, url: impl IntoUrl) -> RequestBuilder {
        let needs_csrf = method != Method::GET;
        let mut req = self.client.request(method, url);
        if needs_csrf && let Some(token) = self.csrf_token() {
            req = req.header(CSRF_HEADER, token);
        }
        req
    }

    async fn check_status(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let url = response.url().path().to_string();
        let text = response.text().await?;
        tracing::warn!(status = %status, path = %url, "Backend request failed");
        Err(match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::FORBIDDEN => ClientError::Forbidden(text),
            StatusCode::NOT_FOUND => ClientError::NotFound(text),
            StatusCode::BAD_REQUEST => ClientError::Validation(text),
            _ => ClientError::Internal(format!("{status}: {text}")),
        })
    }

    async fn fetch_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> ClientResult<T> {
        let response = Self::check_status(req.send().await?).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    /// Send and discard the body (202/204 and echo responses)
    async fn execute(&self, req: RequestBuilder) -> ClientResult<()> {
        Self::check_status(req.send().await?).await?;
        Ok(())
    }
}

#[async_trait]
impl WarehouseApi for RestApi {
    async fn list_orders(&self) -> ClientResult<Vec<Order>> {
        self.fetch_json(self.request(Method::GET, "orders/")).await
    }

    async fn update_order_status(
        &self,
        order_id: OrderId,
        update: &OrderStatusUpdate,
    ) -> ClientResult<()> {
        let req = self
            .request(Method::PATCH, &format!("orders/{order_id}/"))
            .json(update);
        self.execute(req).await
    }

    async fn update_item_status(
        &self,
        order_id: OrderId,
        item_id: ItemId,
        status: PickStatus,
    ) -> ClientResult<()> {
        let req = self
            .request(Method::PATCH, &format!("orders/{order_id}/items/{item_id}/status/"))
            .json(&ItemStatusUpdate { uma_picked: status });
        self.execute(req).await
    }

    async fn trigger_sync(&self, request: &SyncRequest) -> ClientResult<()> {
        self.execute(self.request(Method::POST, "sync/").json(request)).await
    }

    async fn list_products(&self) -> ClientResult<Vec<Product>> {
        self.fetch_json(self.request(Method::GET, "products/")).await
    }

    async fn list_variants(&self) -> ClientResult<Vec<ProductVariant>> {
        self.fetch_json(self.request(Method::GET, "variants/")).await
    }

    async fn list_pending_adjustments(&self) -> ClientResult<Vec<StockAdjustment>> {
        let req = self
            .request(Method::GET, "stock-adjustments/")
            .query(&[("status", "pending")]);
        self.fetch_json(req).await
    }

    async fn adjust_product_stock(&self, product_code: &str, quantity: i64) -> ClientResult<()> {
        let url = self.segment_url(&["products", product_code, "adjust_stock"])?;
        let req = self
            .request_url(Method::POST, url)
            .json(&StockAdjustmentRequest {
                adjustment_quantity: quantity,
            });
        self.execute(req).await
    }

    async fn adjust_variant_stock(&self, variant_code: &str, quantity: i64) -> ClientResult<()> {
        let url = self.segment_url(&["variants", variant_code, "adjust_stock"])?;
        let req = self
            .request_url(Method::POST, url)
            .json(&StockAdjustmentRequest {
                adjustment_quantity: quantity,
            });
        self.execute(req).await
    }

    async fn delete_adjustment(&self, adjustment_id: i64) -> ClientResult<()> {
        self.execute(self.request(Method::DELETE, &format!("stock-adjustments/{adjustment_id}/")))
            .await
    }

    async fn sync_adjustments(&self) -> ClientResult<()> {
        self.execute(self.request(Method::POST, "stock-adjustments/sync/")).await
    }
}
