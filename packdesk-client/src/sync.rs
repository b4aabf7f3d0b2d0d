//! Remote sync coordinator
//!
//! Two backend-side jobs are triggered from here:
//!
//! - pulling new orders from the upstream shop (one trigger, one re-fetch);
//! - pushing packed orders' status upstream, then polling the order list
//!   until every submitted order has left `packed` or the ceiling is hit.

use std::sync::Arc;

use chrono::{Days, NaiveDate, Utc};
use shared::{FulfillmentStatus, OrderId, SyncRequest};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::config::PollSettings;
use crate::http::WarehouseApi;
use crate::store::OrderStore;
use crate::{ClientConfig, ClientError};

#[derive(Debug, Error)]
pub enum SyncError {
    /// Poll ceiling reached; distinct from a failure
    #[error("Status sync timed out after {attempts} attempts, still packed: {still_packed:?}")]
    Timeout {
        still_packed: Vec<OrderId>,
        attempts: u32,
    },

    #[error("Sync request failed: {0}")]
    Request(#[from] ClientError),

    #[error("Sync cancelled")]
    Cancelled,
}

/// Successful push results
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// No packed orders; nothing was sent
    NothingToSync,
    /// Every submitted order left `packed`
    Synced { order_ids: Vec<OrderId> },
}

/// First day of the ingestion window
pub fn lookback_start(today: NaiveDate, days: u32) -> NaiveDate {
    today.checked_sub_days(Days::new(u64::from(days))).unwrap_or(NaiveDate::MIN)
}

pub struct SyncCoordinator {
    api: Arc<dyn WarehouseApi>,
    poll: PollSettings,
    lookback_days: u32,
    cancel: CancellationToken,
}

impl SyncCoordinator {
    pub fn new(api: Arc<dyn WarehouseApi>, config: &ClientConfig) -> Self {
        Self {
            api,
            poll: config.poll,
            lookback_days: config.lookback_days,
            cancel: CancellationToken::new(),
        }
    }

    /// Share an external shutdown token
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Stop any running poll loop
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Ingest orders created within the lookback window, then reload
    pub async fn pull_new_orders(&self, store: &mut OrderStore) -> Result<(), SyncError> {
        let from = lookback_start(Utc::now().date_naive(), self.lookback_days);
        self.pull_new_orders_since(store, from).await
    }

    pub async fn pull_new_orders_since(
        &self,
        store: &mut OrderStore,
        from: NaiveDate,
    ) -> Result<(), SyncError> {
        tracing::info!(creation_time_from = %from, "Pulling new orders");
        store.set_loading(true);
        store.clear_error();

        let request = SyncRequest::Orders {
            creation_time_from: from,
        };
        if let Err(e) = self.api.trigger_sync(&request).await {
            store.set_loading(false);
            store.record_error(format!("Failed to sync orders: {e}"));
            return Err(e.into());
        }

        // no polling: the single re-fetch may predate the ingestion finishing
        store.fetch_orders(self.api.as_ref()).await?;
        Ok(())
    }

    /// Submit every locally packed order upstream and wait for them to move on
    pub async fn push_packed_statuses(
        &self,
        store: &mut OrderStore,
    ) -> Result<PushOutcome, SyncError> {
        let order_ids = store.order_ids_with_status(FulfillmentStatus::Packed);
        if order_ids.is_empty() {
            tracing::info!("No packed orders to sync");
            return Ok(PushOutcome::NothingToSync);
        }

        tracing::info!(count = order_ids.len(), "Pushing packed order statuses");
        store.set_loading(true);
        store.clear_error();

        let result = self.submit_and_poll(store, &order_ids).await;
        store.set_loading(false);

        match &result {
            Ok(_) => store.clear_error(),
            Err(SyncError::Cancelled) => {}
            Err(e) => store.record_error(e.to_string()),
        }
        result
    }

    async fn submit_and_poll(
        &self,
        store: &mut OrderStore,
        order_ids: &[OrderId],
    ) -> Result<PushOutcome, SyncError> {
        self.api
            .trigger_sync(&SyncRequest::packed_orders(order_ids.to_vec()))
            .await?;

        let max_attempts = self.poll.max_attempts;
        let mut still_packed = order_ids.to_vec();

        for attempt in 1..=max_attempts {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::debug!(attempt, "Status sync polling cancelled");
                    return Err(SyncError::Cancelled);
                }
                _ = tokio::time::sleep(self.poll.interval) => {}
            }

            match self.api.list_orders().await {
                Ok(orders) => {
                    store.set_orders(orders);
                    // an order missing from the list has left `packed` as well
                    still_packed = order_ids
                        .iter()
                        .copied()
                        .filter(|id| {
                            store
                                .order(*id)
                                .is_some_and(|o| o.fulfillment_status == FulfillmentStatus::Packed)
                        })
                        .collect();

                    if still_packed.is_empty() {
                        tracing::info!(attempt, "Packed orders synced");
                        return Ok(PushOutcome::Synced {
                            order_ids: order_ids.to_vec(),
                        });
                    }
                    tracing::debug!(attempt, remaining = still_packed.len(), "Orders still packed");
                }
                Err(e) if attempt == max_attempts => return Err(e.into()),
                Err(e) => {
                    tracing::warn!(
                        "Status poll failed (attempt {}/{}): {}",
                        attempt,
                        max_attempts,
                        e
                    );
                }
            }
        }

        tracing::warn!(still_packed = ?still_packed, "Status sync timed out");
        Err(SyncError::Timeout {
            still_packed,
            attempts: max_attempts,
        })
    }
}
