//! Stock Adjustment Model

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Product, ProductVariant};

/// Lifecycle of a queued stock adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl AdjustmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AdjustmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signed stock delta for one product or one variant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockAdjustment {
    pub id: i64,
    #[serde(default)]
    pub product: Option<Product>,
    #[serde(default)]
    pub variant: Option<ProductVariant>,
    pub adjustment_quantity: i64,
    #[serde(default)]
    pub status: AdjustmentStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// What an adjustment applies to. A variant reference wins over a product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdjustmentTarget<'a> {
    Variant(&'a ProductVariant),
    Product(&'a Product),
}

impl StockAdjustment {
    pub fn target(&self) -> Option<AdjustmentTarget<'_>> {
        match (&self.variant, &self.product) {
            (Some(variant), _) => Some(AdjustmentTarget::Variant(variant)),
            (None, Some(product)) => Some(AdjustmentTarget::Product(product)),
            (None, None) => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == AdjustmentStatus::Pending
    }
}
