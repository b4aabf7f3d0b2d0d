//! Shared types for Packdesk
//!
//! Wire and domain types exchanged with the warehouse backend: orders and
//! their items, the product catalog, stock adjustments and the request
//! payloads the client sends.

pub mod models;
pub mod request;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use models::{
    AdjustmentStatus, AdjustmentTarget, FulfillmentStatus, ItemId, Order, OrderId, OrderItem,
    ParseStatusError, PickStatus, Product, ProductVariant, StockAdjustment, clamp_picked,
};
pub use request::{
    ItemPickUpdate, ItemStatusUpdate, OrderStatusUpdate, StockAdjustmentRequest, SyncRequest,
};
