//! Pick-quantity engine
//!
//! [`PickLedger`] is the picked-quantity record for the selected order and
//! the only place quantities change, whether from manual entry or a scan.
//! It never talks to the backend; pushing pick status is the store's job.

use std::collections::HashMap;

use rust_decimal::Decimal;
use shared::{ItemId, ItemPickUpdate, Order, OrderId, PickStatus, clamp_picked};
use thiserror::Error;

/// Non-fatal outcomes of a scan that leave the ledger untouched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanRejection {
    #[error("Barcode {ean} not recognized in this order")]
    NotRecognized { ean: String },

    #[error("Item {item_id} already has {required} picked")]
    AlreadySatisfied { item_id: ItemId, required: Decimal },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PickError {
    #[error("No order selected")]
    NoOrderSelected,

    #[error("Item {item_id} is not part of order {order_id}")]
    UnknownItem { order_id: OrderId, item_id: ItemId },
}

/// Result of a quantity change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickUpdate {
    pub item_id: ItemId,
    pub picked: Decimal,
    pub status: PickStatus,
    /// False when the clamped value equalled the recorded one
    pub changed: bool,
    /// Every item of the order has reached its quantity (advisory)
    pub order_fully_picked: bool,
}

/// Picked quantities for one order
#[derive(Debug, Clone, Default)]
pub struct PickLedger {
    order_id: Option<OrderId>,
    picked: HashMap<ItemId, Decimal>,
}

impl PickLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_order(order_id: OrderId) -> Self {
        Self {
            order_id: Some(order_id),
            picked: HashMap::new(),
        }
    }

    pub fn order_id(&self) -> Option<OrderId> {
        self.order_id
    }

    /// Forget everything and scope the ledger to another order (or none)
    pub fn reset(&mut self, order_id: Option<OrderId>) {
        self.order_id = order_id;
        self.picked.clear();
    }

    pub fn picked(&self, item_id: ItemId) -> Decimal {
        self.picked.get(&item_id).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn status_of(&self, order: &Order, item_id: ItemId) -> Option<PickStatus> {
        order
            .item(item_id)
            .map(|item| PickStatus::derive(self.picked(item_id), item.quantity))
    }

    /// Set an item's picked quantity, clamped to `[0, quantity]`.
    pub fn set_quantity(
        &mut self,
        order: &Order,
        item_id: ItemId,
        requested: Decimal,
    ) -> Result<PickUpdate, PickError> {
        if self.order_id != Some(order.id) {
            tracing::debug!(order_id = order.id, "Pick ledger rescoped");
            self.reset(Some(order.id));
        }

        let item = order.item(item_id).ok_or(PickError::UnknownItem {
            order_id: order.id,
            item_id,
        })?;

        let picked = clamp_picked(requested, item.quantity);
        let changed = picked != self.picked(item_id);
        if changed {
            self.picked.insert(item_id, picked);
        }

        Ok(PickUpdate {
            item_id,
            picked,
            status: PickStatus::derive(picked, item.quantity),
            changed,
            order_fully_picked: changed && self.is_fully_picked(order),
        })
    }

    /// Count one unit for the item carrying `ean`
    pub fn record_scan(&mut self, order: &Order, ean: &str) -> Result<PickUpdate, ScanRejection> {
        let item = order.item_by_ean(ean).ok_or_else(|| ScanRejection::NotRecognized {
            ean: ean.to_string(),
        })?;

        if self.order_id == Some(order.id) && self.picked(item.id) >= item.quantity {
            return Err(ScanRejection::AlreadySatisfied {
                item_id: item.id,
                required: item.quantity,
            });
        }

        let current = if self.order_id == Some(order.id) {
            self.picked(item.id)
        } else {
            Decimal::ZERO
        };

        self.set_quantity(order, item.id, current + Decimal::ONE)
            .map_err(|_| ScanRejection::NotRecognized {
                ean: ean.to_string(),
            })
    }

    /// Completion gate: every item has `picked >= quantity`
    pub fn is_fully_picked(&self, order: &Order) -> bool {
        order
            .items
            .iter()
            .all(|item| self.picked(item.id) >= item.quantity)
    }

    /// Final per-item statuses to submit with an order status change
    pub fn final_statuses(&self, order: &Order) -> Vec<ItemPickUpdate> {
        order
            .items
            .iter()
            .map(|item| ItemPickUpdate {
                id: item.id,
                uma_picked: PickStatus::derive(self.picked(item.id), item.quantity),
            })
            .collect()
    }
}
