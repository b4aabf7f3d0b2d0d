//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Catalog product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: i64,
    pub code: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub ean: Option<String>,
    #[serde(default)]
    pub stock: Option<Decimal>,
    #[serde(default)]
    pub stock_position: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
}

/// Product variant (size, colour, ...) with its own code and EAN
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductVariant {
    pub id: i64,
    pub code: String,
    #[serde(default)]
    pub ean: Option<String>,
    #[serde(default)]
    pub stock: Option<Decimal>,
    #[serde(default)]
    pub stock_position: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub parameters: Option<serde_json::Value>,
    /// Owning product (backend primary key)
    #[serde(default)]
    pub product: Option<i64>,
}
