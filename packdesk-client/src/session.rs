//! Operator sessions
//!
//! [`PickSession`] is the single owner of the packing station state: the
//! order store, the pick ledger for the selected order, the completion
//! dialog, notices and the barcode listener. Every mutation goes through a
//! `&mut self` method, so two handlers never interleave.
//!
//! [`StockSession`] is the stock-correction station: scans queue one-unit
//! adjustments instead of picking.

use std::sync::Arc;

use rust_decimal::Decimal;
use shared::{FulfillmentStatus, ItemId, OrderId};

use crate::adjustments::{AdjustmentError, AdjustmentStore};
use crate::fulfillment::{self, CompletionGate, StatusChange, TransitionError};
use crate::http::WarehouseApi;
use crate::notice::{NoticeBoard, Severity};
use crate::pick::{PickError, PickLedger, PickUpdate};
use crate::scan::{KeySender, ScanListener};
use crate::store::OrderStore;
use crate::sync::{PushOutcome, SyncCoordinator, SyncError};
use crate::{ClientConfig, ClientResult};

pub struct PickSession {
    api: Arc<dyn WarehouseApi>,
    config: ClientConfig,
    store: OrderStore,
    ledger: PickLedger,
    gate: CompletionGate,
    notices: NoticeBoard,
    scanner: Option<ScanListener>,
    sync: SyncCoordinator,
}

impl PickSession {
    pub fn new(api: Arc<dyn WarehouseApi>, config: ClientConfig) -> Self {
        Self {
            sync: SyncCoordinator::new(api.clone(), &config),
            notices: NoticeBoard::new(config.notice_ttl),
            api,
            config,
            store: OrderStore::new(),
            ledger: PickLedger::new(),
            gate: CompletionGate::default(),
            scanner: None,
        }
    }

    // ========== State ==========

    pub fn store(&self) -> &OrderStore {
        &self.store
    }

    pub fn ledger(&self) -> &PickLedger {
        &self.ledger
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    /// The "all items picked" dialog is showing
    pub fn is_confirmation_open(&self) -> bool {
        self.gate.is_open()
    }

    pub fn set_filter_status(&mut self, status: Option<FulfillmentStatus>) {
        self.store.set_filter_status(status);
    }

    /// Change the selected order; per-order state starts over
    pub fn select_order(&mut self, order_id: Option<OrderId>) {
        if self.store.selected_order_id() != order_id {
            tracing::debug!(order_id = ?order_id, "Order selected");
        }
        self.store.select(order_id);
        self.ledger.reset(order_id);
        self.gate.close();
        if let Some(scanner) = self.scanner.as_mut() {
            scanner.reset();
        }
    }

    pub async fn refresh(&mut self) -> ClientResult<()> {
        let result = self.store.fetch_orders(self.api.as_ref()).await;
        if let Err(e) = &result {
            self.notices.push(Severity::Error, format!("Failed to fetch orders: {e}"));
        }
        result
    }

    // ========== Scanning ==========

    /// Start the barcode listener (idempotent) and return its key input
    pub fn enable_scanner(&mut self) -> KeySender {
        let timeout = self.config.scan_timeout;
        self.scanner
            .get_or_insert_with(|| ScanListener::spawn(timeout))
            .keys()
    }

    /// Wait for the next barcode; `None` when the scanner is off
    pub async fn next_scan(&mut self) -> Option<String> {
        match self.scanner.as_mut() {
            Some(scanner) => scanner.next_scan().await,
            None => None,
        }
    }

    /// Count one unit of the item with this EAN on the selected order
    pub async fn handle_scan(&mut self, code: &str) -> Option<PickUpdate> {
        let Some(order) = self.store.selected_order() else {
            self.notices.push(Severity::Warning, "Select an order before scanning");
            return None;
        };

        match self.ledger.record_scan(order, code) {
            Ok(update) => {
                self.apply_pick(&update).await;
                Some(update)
            }
            Err(rejection) => {
                tracing::debug!(code, "Scan rejected: {rejection}");
                self.notices.push(Severity::Warning, rejection.to_string());
                None
            }
        }
    }

    // ========== Picking ==========

    /// Manual quantity entry for an item of the selected order
    pub async fn set_quantity(
        &mut self,
        item_id: ItemId,
        quantity: Decimal,
    ) -> Result<PickUpdate, PickError> {
        let order = self.store.selected_order().ok_or(PickError::NoOrderSelected)?;
        let update = self.ledger.set_quantity(order, item_id, quantity)?;
        self.apply_pick(&update).await;
        Ok(update)
    }

    async fn apply_pick(&mut self, update: &PickUpdate) {
        if !update.changed {
            return;
        }
        let Some(order_id) = self.ledger.order_id() else {
            return;
        };

        if let Err(e) = self
            .store
            .update_item_picked(self.api.as_ref(), order_id, update.item_id, update.status)
            .await
        {
            self.notices.push(Severity::Error, format!("Failed to update item status: {e}"));
        }

        if update.order_fully_picked {
            tracing::info!(order_id, "All items picked");
            self.gate.offer();
        }
    }

    // ========== Status transitions ==========

    async fn transition(
        &mut self,
        change: StatusChange,
    ) -> Result<fulfillment::TransitionPlan, TransitionError> {
        let order = self.store.selected_order().ok_or(TransitionError::NoOrderSelected)?;
        let plan = fulfillment::plan(order, &self.ledger, change)?;

        if let Err(e) = self
            .store
            .update_order_status(self.api.as_ref(), plan.order_id, &plan.update)
            .await
        {
            self.notices.push(Severity::Error, format!("Failed to update order status: {e}"));
            return Err(e.into());
        }
        Ok(plan)
    }

    /// `processing → packed`, then move on to the next order in the list
    pub async fn mark_packed_and_load_next(&mut self) -> Result<Option<OrderId>, TransitionError> {
        let plan = self.transition(StatusChange::MarkPacked).await?;
        self.notices
            .push(Severity::Success, format!("Order {} marked as packed", plan.order_id));

        let next = plan
            .load_next
            .then(|| self.store.next_in_filter(plan.order_id))
            .flatten();
        self.select_order(next);
        Ok(next)
    }

    /// Accept the completion dialog
    pub async fn confirm_completion(&mut self) -> Result<(), TransitionError> {
        if !self.gate.close() {
            return Err(TransitionError::NothingToConfirm);
        }
        let plan = self.transition(StatusChange::ConfirmCompleted).await?;
        self.notices
            .push(Severity::Success, format!("Order {} completed", plan.order_id));
        Ok(())
    }

    /// Dismiss the completion dialog and keep picking
    pub fn decline_completion(&mut self) -> bool {
        self.gate.close()
    }

    /// Free-form status change of the selected order
    pub async fn change_status(
        &mut self,
        status: FulfillmentStatus,
    ) -> Result<(), TransitionError> {
        let plan = self.transition(StatusChange::Manual(status)).await?;
        self.notices.push(
            Severity::Success,
            format!("Order {} set to {}", plan.order_id, plan.target()),
        );
        self.select_order(None);
        Ok(())
    }

    // ========== Sync ==========

    pub async fn pull_new_orders(&mut self) -> Result<(), SyncError> {
        let result = self.sync.pull_new_orders(&mut self.store).await;
        match &result {
            Ok(()) => self.notices.push(Severity::Success, "New orders pulled"),
            Err(e) => self.notices.push(Severity::Error, e.to_string()),
        }
        result
    }

    pub async fn push_packed_statuses(&mut self) -> Result<PushOutcome, SyncError> {
        let result = self.sync.push_packed_statuses(&mut self.store).await;
        match &result {
            Ok(PushOutcome::NothingToSync) => {
                self.notices.push(Severity::Info, "No packed orders to sync")
            }
            Ok(PushOutcome::Synced { order_ids }) => self
                .notices
                .push(Severity::Success, format!("{} orders synced", order_ids.len())),
            Err(e @ SyncError::Timeout { .. }) => {
                self.notices.push(Severity::Warning, e.to_string())
            }
            Err(SyncError::Cancelled) => {}
            Err(e) => self.notices.push(Severity::Error, e.to_string()),
        }
        result
    }

    /// Stop polling and the scanner
    pub async fn shutdown(mut self) {
        self.sync.cancel();
        if let Some(scanner) = self.scanner.take() {
            scanner.shutdown().await;
        }
    }
}

pub struct StockSession {
    api: Arc<dyn WarehouseApi>,
    store: AdjustmentStore,
    notices: NoticeBoard,
    scanner: Option<ScanListener>,
    scan_timeout: std::time::Duration,
}

impl StockSession {
    pub fn new(api: Arc<dyn WarehouseApi>, config: &ClientConfig) -> Self {
        Self {
            api,
            store: AdjustmentStore::new(),
            notices: NoticeBoard::new(config.notice_ttl),
            scanner: None,
            scan_timeout: config.scan_timeout,
        }
    }

    pub fn store(&self) -> &AdjustmentStore {
        &self.store
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    fn report(&mut self, result: &Result<(), AdjustmentError>, success: impl FnOnce() -> String) {
        match result {
            Ok(()) => self.notices.push(Severity::Success, success()),
            Err(e) => self.notices.push(Severity::Error, e.to_string()),
        }
    }

    pub async fn load(&mut self) -> Result<(), AdjustmentError> {
        let result = self.store.fetch_all(self.api.as_ref()).await;
        if let Err(e) = &result {
            self.notices.push(Severity::Error, e.to_string());
        }
        result
    }

    pub fn enable_scanner(&mut self) -> KeySender {
        let timeout = self.scan_timeout;
        self.scanner
            .get_or_insert_with(|| ScanListener::spawn(timeout))
            .keys()
    }

    pub async fn next_scan(&mut self) -> Option<String> {
        match self.scanner.as_mut() {
            Some(scanner) => scanner.next_scan().await,
            None => None,
        }
    }

    /// One unit in for the scanned variant
    pub async fn handle_scan(&mut self, ean: &str) -> Result<(), AdjustmentError> {
        self.add_by_ean(ean, 1).await
    }

    pub async fn add_by_ean(&mut self, ean: &str, quantity: i64) -> Result<(), AdjustmentError> {
        let result = self.store.add_by_ean(self.api.as_ref(), ean, quantity).await;
        self.report(&result, || format!("Stock adjusted for {ean}"));
        result
    }

    pub async fn add_by_code(&mut self, code: &str, quantity: i64) -> Result<(), AdjustmentError> {
        let result = self.store.add_by_code(self.api.as_ref(), code, quantity).await;
        self.report(&result, || format!("Stock adjusted for {code}"));
        result
    }

    pub async fn change(&mut self, id: i64, delta: i64) -> Result<(), AdjustmentError> {
        let result = self.store.change(self.api.as_ref(), id, delta).await;
        self.report(&result, || format!("Adjustment {id} changed"));
        result
    }

    pub async fn delete(&mut self, id: i64) -> Result<(), AdjustmentError> {
        let result = self.store.delete(self.api.as_ref(), id).await;
        self.report(&result, || format!("Adjustment {id} deleted"));
        result
    }

    pub async fn sync(&mut self) -> Result<(), AdjustmentError> {
        let result = self.store.sync(self.api.as_ref()).await;
        self.report(&result, || "Stock adjustments synced".to_string());
        result
    }

    pub async fn shutdown(mut self) {
        if let Some(scanner) = self.scanner.take() {
            scanner.shutdown().await;
        }
    }
}
