//! Request payloads sent to the warehouse backend

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{FulfillmentStatus, ItemId, OrderId, PickStatus};

/// Upstream status id the backend maps packed orders to
pub const PACKED_UPSTREAM_STATUS_ID: u32 = 21;

/// Final pick status for one item, sent along with an order status change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPickUpdate {
    pub id: ItemId,
    pub uma_picked: PickStatus,
}

/// `PATCH /orders/{id}/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub uma_status: FulfillmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<ItemPickUpdate>>,
}

impl OrderStatusUpdate {
    /// Order-level change only
    pub fn status(status: FulfillmentStatus) -> Self {
        Self {
            uma_status: status,
            items: None,
        }
    }

    pub fn with_items(status: FulfillmentStatus, items: Vec<ItemPickUpdate>) -> Self {
        Self {
            uma_status: status,
            items: Some(items),
        }
    }
}

/// `PATCH /orders/{id}/items/{item_id}/status/`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStatusUpdate {
    pub uma_picked: PickStatus,
}

/// `POST /sync/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncRequest {
    /// Ingest new orders created on or after the given date
    Orders { creation_time_from: NaiveDate },
    /// Push the given orders' status upstream
    OrdersStatus {
        orderids: Vec<OrderId>,
        statusid: u32,
    },
}

impl SyncRequest {
    pub fn packed_orders(order_ids: Vec<OrderId>) -> Self {
        Self::OrdersStatus {
            orderids: order_ids,
            statusid: PACKED_UPSTREAM_STATUS_ID,
        }
    }
}

/// `POST /products/{code}/adjust_stock/` and `POST /variants/{code}/adjust_stock/`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjustmentRequest {
    pub adjustment_quantity: i64,
}
