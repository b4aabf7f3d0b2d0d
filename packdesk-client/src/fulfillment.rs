//! Order fulfillment state machine
//!
//! `processing → packed → completed`, with `cancelled`/`error` set by hand.
//! Planning a transition is pure; the store applies it only after the
//! backend accepts it.

use shared::{FulfillmentStatus, Order, OrderId, OrderStatusUpdate};
use thiserror::Error;

use crate::ClientError;
use crate::pick::PickLedger;

/// Operator actions that change an order's status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    /// "Mark packed / load next"
    MarkPacked,
    /// Accepting the all-items-picked confirmation
    ConfirmCompleted,
    /// Free-form selector; bypasses item statuses
    Manual(FulfillmentStatus),
}

#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("No order selected")]
    NoOrderSelected,

    #[error("Order {0} not found")]
    OrderNotFound(OrderId),

    #[error("Cannot move order {order_id} from {from} to {to}")]
    NotAllowed {
        order_id: OrderId,
        from: FulfillmentStatus,
        to: FulfillmentStatus,
    },

    #[error("Confirmation is not pending")]
    NothingToConfirm,

    #[error("Status update failed: {0}")]
    Backend(#[from] ClientError),
}

/// A validated status change ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPlan {
    pub order_id: OrderId,
    pub from: FulfillmentStatus,
    pub update: OrderStatusUpdate,
    /// Select the next order in the list once applied
    pub load_next: bool,
}

impl TransitionPlan {
    pub fn target(&self) -> FulfillmentStatus {
        self.update.uma_status
    }
}

/// Validate `change` against the order's current status and build the request
pub fn plan(
    order: &Order,
    ledger: &PickLedger,
    change: StatusChange,
) -> Result<TransitionPlan, TransitionError> {
    let from = order.fulfillment_status;
    let not_allowed = |to| TransitionError::NotAllowed {
        order_id: order.id,
        from,
        to,
    };

    let (update, load_next) = match change {
        StatusChange::MarkPacked => {
            if from != FulfillmentStatus::Processing {
                return Err(not_allowed(FulfillmentStatus::Packed));
            }
            let items = ledger.final_statuses(order);
            (
                OrderStatusUpdate::with_items(FulfillmentStatus::Packed, items),
                true,
            )
        }
        StatusChange::ConfirmCompleted => {
            if !matches!(from, FulfillmentStatus::Processing | FulfillmentStatus::Packed) {
                return Err(not_allowed(FulfillmentStatus::Completed));
            }
            let items = ledger.final_statuses(order);
            (
                OrderStatusUpdate::with_items(FulfillmentStatus::Completed, items),
                false,
            )
        }
        StatusChange::Manual(status) => (OrderStatusUpdate::status(status), false),
    };

    Ok(TransitionPlan {
        order_id: order.id,
        from,
        update,
        load_next,
    })
}

/// The "all items picked" confirmation dialog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletionGate {
    open: bool,
}

impl CompletionGate {
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Offer completion; the order status is not touched
    pub fn offer(&mut self) {
        self.open = true;
    }

    /// Close the dialog. Returns whether it was open.
    pub fn close(&mut self) -> bool {
        std::mem::take(&mut self.open)
    }
}
