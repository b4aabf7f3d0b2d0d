//! In-memory warehouse backend for workflow tests
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use packdesk_client::{ClientConfig, ClientError, ClientResult, WarehouseApi};
use rust_decimal::Decimal;
use shared::{
    AdjustmentStatus, FulfillmentStatus, ItemId, Order, OrderId, OrderItem, OrderStatusUpdate,
    PickStatus, Product, ProductVariant, StockAdjustment, SyncRequest,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListOrders,
    UpdateOrderStatus(OrderId, OrderStatusUpdate),
    UpdateItemStatus(OrderId, ItemId, PickStatus),
    TriggerSync(SyncRequest),
    ListProducts,
    ListVariants,
    ListPendingAdjustments,
    AdjustProduct(String, i64),
    AdjustVariant(String, i64),
    DeleteAdjustment(i64),
    SyncAdjustments,
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub orders: Vec<Order>,
    /// Scripted `list_orders` responses; the live collection once drained
    pub order_responses: VecDeque<Result<Vec<Order>, String>>,
    pub products: Vec<Product>,
    pub variants: Vec<ProductVariant>,
    pub adjustments: Vec<StockAdjustment>,
    pub next_adjustment_id: i64,
    pub fail_order_status: bool,
    pub fail_item_status: bool,
    pub fail_sync: bool,
    /// Serve every adjustment regardless of status
    pub ignore_status_filter: bool,
    pub calls: Vec<Call>,
}

#[derive(Debug, Default)]
pub struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn with_orders(orders: Vec<Order>) -> Arc<Self> {
        let api = Self::default();
        api.state().orders = orders;
        Arc::new(api)
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    fn record(&self, call: Call) -> MutexGuard<'_, FakeState> {
        let mut state = self.state();
        state.calls.push(call);
        state
    }

    fn adjust(&self, call: Call, code: &str, quantity: i64, variant: bool) -> ClientResult<()> {
        let mut state = self.record(call);
        let existing = state.adjustments.iter_mut().find(|a| {
            a.status == AdjustmentStatus::Pending
                && if variant {
                    a.variant.as_ref().is_some_and(|v| v.code == code)
                } else {
                    a.variant.is_none() && a.product.as_ref().is_some_and(|p| p.code == code)
                }
        });
        if let Some(existing) = existing {
            existing.adjustment_quantity += quantity;
            return Ok(());
        }

        let (product, variant) = if variant {
            let v = state.variants.iter().find(|v| v.code == code).cloned();
            (None, Some(v.ok_or_else(|| ClientError::NotFound(code.to_string()))?))
        } else {
            let p = state.products.iter().find(|p| p.code == code).cloned();
            (Some(p.ok_or_else(|| ClientError::NotFound(code.to_string()))?), None)
        };
        state.next_adjustment_id += 1;
        let id = state.next_adjustment_id;
        state.adjustments.push(StockAdjustment {
            id,
            product,
            variant,
            adjustment_quantity: quantity,
            status: AdjustmentStatus::Pending,
            created_at: None,
            processed_at: None,
            error_message: None,
        });
        Ok(())
    }
}

#[async_trait]
impl WarehouseApi for FakeApi {
    async fn list_orders(&self) -> ClientResult<Vec<Order>> {
        let mut state = self.record(Call::ListOrders);
        match state.order_responses.pop_front() {
            Some(Ok(orders)) => Ok(orders),
            Some(Err(message)) => Err(ClientError::Internal(message)),
            None => Ok(state.orders.clone()),
        }
    }

    async fn update_order_status(
        &self,
        order_id: OrderId,
        update: &OrderStatusUpdate,
    ) -> ClientResult<()> {
        let mut state = self.record(Call::UpdateOrderStatus(order_id, update.clone()));
        if state.fail_order_status {
            return Err(ClientError::Internal("status update rejected".into()));
        }
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or_else(|| ClientError::NotFound(format!("order {order_id}")))?;
        order.fulfillment_status = update.uma_status;
        Ok(())
    }

    async fn update_item_status(
        &self,
        order_id: OrderId,
        item_id: ItemId,
        status: PickStatus,
    ) -> ClientResult<()> {
        let state = self.record(Call::UpdateItemStatus(order_id, item_id, status));
        if state.fail_item_status {
            return Err(ClientError::Internal("item update rejected".into()));
        }
        Ok(())
    }

    async fn trigger_sync(&self, request: &SyncRequest) -> ClientResult<()> {
        let state = self.record(Call::TriggerSync(request.clone()));
        if state.fail_sync {
            return Err(ClientError::Internal("sync rejected".into()));
        }
        Ok(())
    }

    async fn list_products(&self) -> ClientResult<Vec<Product>> {
        Ok(self.record(Call::ListProducts).products.clone())
    }

    async fn list_variants(&self) -> ClientResult<Vec<ProductVariant>> {
        Ok(self.record(Call::ListVariants).variants.clone())
    }

    async fn list_pending_adjustments(&self) -> ClientResult<Vec<StockAdjustment>> {
        let state = self.record(Call::ListPendingAdjustments);
        Ok(state
            .adjustments
            .iter()
            .filter(|a| state.ignore_status_filter || a.is_pending())
            .cloned()
            .collect())
    }

    async fn adjust_product_stock(&self, product_code: &str, quantity: i64) -> ClientResult<()> {
        let call = Call::AdjustProduct(product_code.into(), quantity);
        self.adjust(call, product_code, quantity, false)
    }

    async fn adjust_variant_stock(&self, variant_code: &str, quantity: i64) -> ClientResult<()> {
        let call = Call::AdjustVariant(variant_code.into(), quantity);
        self.adjust(call, variant_code, quantity, true)
    }

    async fn delete_adjustment(&self, adjustment_id: i64) -> ClientResult<()> {
        let mut state = self.record(Call::DeleteAdjustment(adjustment_id));
        state.adjustments.retain(|a| a.id != adjustment_id);
        Ok(())
    }

    async fn sync_adjustments(&self) -> ClientResult<()> {
        let mut state = self.record(Call::SyncAdjustments);
        if state.fail_sync {
            return Err(ClientError::Internal("sync rejected".into()));
        }
        for adjustment in state.adjustments.iter_mut() {
            adjustment.status = AdjustmentStatus::Processing;
        }
        Ok(())
    }
}

// ========== Fixtures ==========

pub fn item(id: ItemId, code: &str, ean: &str, quantity: i64) -> OrderItem {
    OrderItem {
        id,
        order: None,
        code: Some(code.into()),
        ean: Some(ean.into()),
        title: Some(format!("Item {code}")),
        quantity: Decimal::from(quantity),
        pick_status: PickStatus::NotPicked,
        unit: Some("pcs".into()),
        stock_position: None,
        parameters: None,
        image_url: None,
    }
}

pub fn order(id: OrderId, number: &str, status: FulfillmentStatus, items: Vec<OrderItem>) -> Order {
    Order {
        id,
        order_number: number.into(),
        fulfillment_status: status,
        display_status: None,
        internal_note: None,
        order_total: None,
        customer: None,
        shipment: None,
        items,
        created_at: None,
        updated_at: None,
    }
}

pub fn packed(id: OrderId) -> Order {
    order(id, &format!("O{id}"), FulfillmentStatus::Packed, vec![])
}

pub fn with_status(id: OrderId, status: FulfillmentStatus) -> Order {
    order(id, &format!("O{id}"), status, vec![])
}

/// Default schedule: 5 s interval, 12 attempts
pub fn test_config() -> ClientConfig {
    ClientConfig::default()
}
