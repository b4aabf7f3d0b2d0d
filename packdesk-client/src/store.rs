//! Optimistic local order store
//!
//! Owns the in-memory order collection for the session. Two write patterns
//! live side by side on purpose:
//!
//! - item pick status: applied locally first, then pushed; a failed push is
//!   recorded but not reverted (the next full fetch reconciles);
//! - order status: pushed first, applied locally only once accepted.
//!
//! Derived views (`filtered_orders`, `selected_order`) are computed on every
//! call from the current collection.

use shared::{FulfillmentStatus, ItemId, Order, OrderId, OrderStatusUpdate, PickStatus};

use crate::ClientResult;
use crate::http::WarehouseApi;

#[derive(Debug)]
pub struct OrderStore {
    orders: Vec<Order>,
    selected_order_id: Option<OrderId>,
    /// `None` shows every order
    filter_status: Option<FulfillmentStatus>,
    is_loading: bool,
    error: Option<String>,
}

impl Default for OrderStore {
    fn default() -> Self {
        Self {
            orders: Vec::new(),
            selected_order_id: None,
            filter_status: Some(FulfillmentStatus::Processing),
            is_loading: false,
            error: None,
        }
    }
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Accessors ==========

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn order(&self, order_id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == order_id)
    }

    pub fn selected_order_id(&self) -> Option<OrderId> {
        self.selected_order_id
    }

    pub fn selected_order(&self) -> Option<&Order> {
        self.selected_order_id.and_then(|id| self.order(id))
    }

    pub fn filter_status(&self) -> Option<FulfillmentStatus> {
        self.filter_status
    }

    /// Orders matching the filter, ascending by order number suffix
    pub fn filtered_orders(&self) -> Vec<&Order> {
        let mut orders: Vec<&Order> = self
            .orders
            .iter()
            .filter(|o| self.filter_status.is_none_or(|status| o.fulfillment_status == status))
            .collect();
        orders.sort_by(|a, b| a.cmp_by_number(b));
        orders
    }

    pub fn order_ids_with_status(&self, status: FulfillmentStatus) -> Vec<OrderId> {
        self.orders
            .iter()
            .filter(|o| o.fulfillment_status == status)
            .map(|o| o.id)
            .collect()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    // ========== Local mutations ==========

    /// Replace the collection (sorted by order number)
    pub fn set_orders(&mut self, mut orders: Vec<Order>) {
        orders.sort_by(|a, b| a.cmp_by_number(b));
        self.orders = orders;
    }

    pub fn set_filter_status(&mut self, status: Option<FulfillmentStatus>) {
        self.filter_status = status;
    }

    /// Selection only; per-order picking state belongs to the session
    pub fn select(&mut self, order_id: Option<OrderId>) {
        self.selected_order_id = order_id;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(error = %message, "Order store error");
        self.error = Some(message);
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn apply_item_status(
        &mut self,
        order_id: OrderId,
        item_id: ItemId,
        status: PickStatus,
    ) -> bool {
        match self
            .orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .and_then(|o| o.item_mut(item_id))
        {
            Some(item) => {
                item.pick_status = status;
                true
            }
            None => false,
        }
    }

    /// Write an accepted status update into the local order
    pub fn apply_status_update(&mut self, order_id: OrderId, update: &OrderStatusUpdate) -> bool {
        let Some(order) = self.orders.iter_mut().find(|o| o.id == order_id) else {
            return false;
        };
        order.fulfillment_status = update.uma_status;
        for pick in update.items.iter().flatten() {
            if let Some(item) = order.item_mut(pick.id) {
                item.pick_status = pick.uma_picked;
            }
        }
        true
    }

    /// Order after `current` in the filtered list, else the first listed
    /// order other than `current`.
    pub fn next_in_filter(&self, current: OrderId) -> Option<OrderId> {
        let filtered = self.filtered_orders();
        match filtered.iter().position(|o| o.id == current) {
            Some(pos) => filtered.get(pos + 1).map(|o| o.id),
            None => filtered.first().map(|o| o.id),
        }
    }

    // ========== Backend-backed mutations ==========

    /// Reload every order. A failure keeps the current collection.
    pub async fn fetch_orders(&mut self, api: &dyn WarehouseApi) -> ClientResult<()> {
        self.is_loading = true;
        self.error = None;
        let result = api.list_orders().await;
        self.is_loading = false;

        match result {
            Ok(orders) => {
                tracing::debug!(count = orders.len(), "Orders fetched");
                self.set_orders(orders);
                Ok(())
            }
            Err(e) => {
                self.record_error(format!("Failed to fetch orders: {e}"));
                Err(e)
            }
        }
    }

    /// Optimistic item pick status: local first, then best-effort push
    pub async fn update_item_picked(
        &mut self,
        api: &dyn WarehouseApi,
        order_id: OrderId,
        item_id: ItemId,
        status: PickStatus,
    ) -> ClientResult<()> {
        if !self.apply_item_status(order_id, item_id, status) {
            tracing::debug!(order_id, item_id, "Pick status for unknown item ignored");
            return Ok(());
        }

        if let Err(e) = api.update_item_status(order_id, item_id, status).await {
            // local value stays; the next fetch reconciles
            self.record_error(format!("Failed to update item status: {e}"));
            return Err(e);
        }
        Ok(())
    }

    /// Confirm-then-apply order status change
    pub async fn update_order_status(
        &mut self,
        api: &dyn WarehouseApi,
        order_id: OrderId,
        update: &OrderStatusUpdate,
    ) -> ClientResult<()> {
        match api.update_order_status(order_id, update).await {
            Ok(()) => {
                self.apply_status_update(order_id, update);
                tracing::info!(order_id, status = %update.uma_status, "Order status updated");
                Ok(())
            }
            Err(e) => {
                self.record_error(format!("Failed to update order status: {e}"));
                Err(e)
            }
        }
    }
}
