//! Catalog and pending stock adjustments
//!
//! Stock corrections are queued on the backend as pending adjustments and
//! pushed upstream in one batch. The backend merges a new delta into an
//! existing pending adjustment for the same target, so every mutation here
//! is followed by a re-fetch of the pending list instead of a local edit.

use shared::{AdjustmentStatus, AdjustmentTarget, Product, ProductVariant, StockAdjustment};
use thiserror::Error;

use crate::ClientError;
use crate::http::WarehouseApi;

#[derive(Debug, Error)]
pub enum AdjustmentError {
    #[error("No product variant with EAN {0}")]
    VariantNotFound(String),

    #[error("No product or variant with code {0}")]
    CodeNotFound(String),

    #[error("Adjustment {0} not found")]
    UnknownAdjustment(i64),

    #[error("Adjustment {0} has neither product nor variant")]
    NoTarget(i64),

    #[error("Adjustment quantity cannot be zero")]
    ZeroQuantity,

    #[error("Adjustment {id} is {status}, only pending adjustments can be deleted")]
    NotPending { id: i64, status: AdjustmentStatus },

    #[error(transparent)]
    Backend(#[from] ClientError),
}

/// Pending adjustment with display fields resolved against the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedAdjustment {
    pub adjustment: StockAdjustment,
    pub title: String,
    pub product_code: Option<String>,
    pub variant_code: Option<String>,
    /// Variant image, else product image
    pub image_url: Option<String>,
}

impl EnrichedAdjustment {
    pub fn id(&self) -> i64 {
        self.adjustment.id
    }

    pub fn quantity(&self) -> i64 {
        self.adjustment.adjustment_quantity
    }
}

/// Resolve the owning product (through the variant when the record lacks
/// one) and the display fields.
pub fn enrich(mut adjustment: StockAdjustment, products: &[Product]) -> EnrichedAdjustment {
    if adjustment.product.is_none()
        && let Some(owner) = adjustment.variant.as_ref().and_then(|v| v.product)
    {
        adjustment.product = products.iter().find(|p| p.id == owner).cloned();
    }

    let variant = adjustment.variant.as_ref();
    let product = adjustment.product.as_ref();

    EnrichedAdjustment {
        title: product.and_then(|p| p.title.clone()).unwrap_or_default(),
        product_code: product.map(|p| p.code.clone()),
        variant_code: variant.map(|v| v.code.clone()),
        image_url: variant
            .and_then(|v| v.image_url.clone())
            .or_else(|| product.and_then(|p| p.image_url.clone())),
        adjustment,
    }
}

/// Products whose code ends with `term`, ignoring case. An empty term
/// matches nothing.
pub fn search_products<'a>(products: &'a [Product], term: &str) -> Vec<&'a Product> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return Vec::new();
    }
    products
        .iter()
        .filter(|p| p.code.to_lowercase().ends_with(&term))
        .collect()
}

#[derive(Debug, Default)]
pub struct AdjustmentStore {
    products: Vec<Product>,
    variants: Vec<ProductVariant>,
    pending: Vec<EnrichedAdjustment>,
    is_loading: bool,
    error: Option<String>,
}

impl AdjustmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn variants(&self) -> &[ProductVariant] {
        &self.variants
    }

    pub fn pending(&self) -> &[EnrichedAdjustment] {
        &self.pending
    }

    pub fn adjustment(&self, id: i64) -> Option<&EnrichedAdjustment> {
        self.pending.iter().find(|a| a.id() == id)
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn search_products(&self, term: &str) -> Vec<&Product> {
        search_products(&self.products, term)
    }

    fn record<T>(&mut self, result: Result<T, AdjustmentError>) -> Result<T, AdjustmentError> {
        if let Err(e) = &result {
            tracing::warn!(error = %e, "Stock adjustment failed");
            self.error = Some(e.to_string());
        }
        result
    }

    /// Products and variants concurrently, then the pending adjustments
    pub async fn fetch_all(&mut self, api: &dyn WarehouseApi) -> Result<(), AdjustmentError> {
        self.is_loading = true;
        self.error = None;

        let catalog = tokio::try_join!(api.list_products(), api.list_variants());
        let result = match catalog {
            Ok((products, variants)) => {
                tracing::debug!(
                    products = products.len(),
                    variants = variants.len(),
                    "Catalog loaded"
                );
                self.products = products;
                self.variants = variants;
                self.refresh_pending(api).await
            }
            Err(e) => Err(e.into()),
        };

        self.is_loading = false;
        self.record(result)
    }

    pub async fn fetch_pending(&mut self, api: &dyn WarehouseApi) -> Result<(), AdjustmentError> {
        let result = self.refresh_pending(api).await;
        self.record(result)
    }

    async fn refresh_pending(&mut self, api: &dyn WarehouseApi) -> Result<(), AdjustmentError> {
        let adjustments = api.list_pending_adjustments().await?;
        self.pending = adjustments
            .into_iter()
            .map(|a| enrich(a, &self.products))
            .collect();
        Ok(())
    }

    /// Queue `quantity` against the variant carrying `ean`
    pub async fn add_by_ean(
        &mut self,
        api: &dyn WarehouseApi,
        ean: &str,
        quantity: i64,
    ) -> Result<(), AdjustmentError> {
        let result = self.try_add_by_ean(api, ean, quantity).await;
        self.record(result)
    }

    async fn try_add_by_ean(
        &mut self,
        api: &dyn WarehouseApi,
        ean: &str,
        quantity: i64,
    ) -> Result<(), AdjustmentError> {
        if quantity == 0 {
            return Err(AdjustmentError::ZeroQuantity);
        }
        let code = self
            .variants
            .iter()
            .find(|v| v.ean.as_deref() == Some(ean))
            .map(|v| v.code.clone())
            .ok_or_else(|| AdjustmentError::VariantNotFound(ean.to_string()))?;

        api.adjust_variant_stock(&code, quantity).await?;
        tracing::info!(variant = %code, quantity, "Stock adjustment queued");
        self.refresh_pending(api).await
    }

    /// Queue `quantity` against a variant with `code`, else a product
    pub async fn add_by_code(
        &mut self,
        api: &dyn WarehouseApi,
        code: &str,
        quantity: i64,
    ) -> Result<(), AdjustmentError> {
        let result = self.try_add_by_code(api, code, quantity).await;
        self.record(result)
    }

    async fn try_add_by_code(
        &mut self,
        api: &dyn WarehouseApi,
        code: &str,
        quantity: i64,
    ) -> Result<(), AdjustmentError> {
        if quantity == 0 {
            return Err(AdjustmentError::ZeroQuantity);
        }
        if self.variants.iter().any(|v| v.code == code) {
            api.adjust_variant_stock(code, quantity).await?;
        } else if self.products.iter().any(|p| p.code == code) {
            api.adjust_product_stock(code, quantity).await?;
        } else {
            return Err(AdjustmentError::CodeNotFound(code.to_string()));
        }
        tracing::info!(code, quantity, "Stock adjustment queued");
        self.refresh_pending(api).await
    }

    /// Post `delta` against the adjustment's own target; the backend merges it
    pub async fn change(
        &mut self,
        api: &dyn WarehouseApi,
        id: i64,
        delta: i64,
    ) -> Result<(), AdjustmentError> {
        let result = self.try_change(api, id, delta).await;
        self.record(result)
    }

    async fn try_change(
        &mut self,
        api: &dyn WarehouseApi,
        id: i64,
        delta: i64,
    ) -> Result<(), AdjustmentError> {
        if delta == 0 {
            return Err(AdjustmentError::ZeroQuantity);
        }
        let adjustment = &self
            .adjustment(id)
            .ok_or(AdjustmentError::UnknownAdjustment(id))?
            .adjustment;
        match adjustment.target() {
            Some(AdjustmentTarget::Variant(variant)) => {
                let code = variant.code.clone();
                api.adjust_variant_stock(&code, delta).await?;
            }
            Some(AdjustmentTarget::Product(product)) => {
                let code = product.code.clone();
                api.adjust_product_stock(&code, delta).await?;
            }
            None => return Err(AdjustmentError::NoTarget(id)),
        }
        self.refresh_pending(api).await
    }

    pub async fn delete(&mut self, api: &dyn WarehouseApi, id: i64) -> Result<(), AdjustmentError> {
        let result = self.try_delete(api, id).await;
        self.record(result)
    }

    async fn try_delete(&mut self, api: &dyn WarehouseApi, id: i64) -> Result<(), AdjustmentError> {
        let adjustment = &self
            .adjustment(id)
            .ok_or(AdjustmentError::UnknownAdjustment(id))?
            .adjustment;
        if !adjustment.is_pending() {
            return Err(AdjustmentError::NotPending {
                id,
                status: adjustment.status,
            });
        }
        api.delete_adjustment(id).await?;
        tracing::info!(adjustment_id = id, "Stock adjustment deleted");
        self.refresh_pending(api).await
    }

    /// Push every pending adjustment upstream, then reload the list
    pub async fn sync(&mut self, api: &dyn WarehouseApi) -> Result<(), AdjustmentError> {
        let result = self.try_sync(api).await;
        self.record(result)
    }

    async fn try_sync(&mut self, api: &dyn WarehouseApi) -> Result<(), AdjustmentError> {
        api.sync_adjustments().await?;
        tracing::info!(count = self.pending.len(), "Stock adjustment sync triggered");
        self.refresh_pending(api).await
    }
}
