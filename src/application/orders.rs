use crate::application::items;
use crate::domain::order::{
    NewOrderItem, Order, OrderDetails, OrderId, OrderPatch, OrderStatus, UserId,
};
use crate::domain::ports::{Page, Tables, TransactionalStore};
use crate::error::{EngineError, Result};
use crate::infrastructure::in_memory::InMemoryStore;
use std::sync::Arc;
use tracing::info;

/// Order lifecycle: creation, status transitions, deletion, and reads.
pub struct OrderService<S: TransactionalStore = InMemoryStore> {
    store: Arc<S>,
}

impl<S: TransactionalStore> OrderService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Creates a pending order for `user_id`, optionally with initial items.
    /// The caller supplies the user explicitly; order ownership is stamped
    /// here, not pulled from ambient auth context.
    pub fn create(&self, user_id: UserId, items: Vec<NewOrderItem>) -> Result<OrderDetails> {
        let details = self.store.run_in_transaction(|tables| {
            let order = tables.insert_order(Order::new(0, user_id));
            if !items.is_empty() {
                items::insert_items(tables, order.id, &items)?;
                items::recalculate_total(tables, order.id)?;
            }
            load_details(tables, order.id)
        })?;
        info!(
            order_id = details.order.id,
            user_id,
            items = details.items.len(),
            "order created"
        );
        Ok(details)
    }

    /// Applies a status transition. Cancelling an order that already has a
    /// payment is rejected regardless of its current status.
    pub fn update(&self, order_id: OrderId, patch: OrderPatch) -> Result<Order> {
        let updated = self.store.run_in_transaction(|tables| {
            let mut order = items::find_order(tables, order_id)?;

            if let Some(status) = patch.status {
                if status == OrderStatus::Cancelled && tables.order_has_payments(order_id) {
                    return Err(EngineError::InvalidState(
                        "cannot cancel an order with payments".to_string(),
                    ));
                }
                if !order.status.can_transition_to(status) {
                    return Err(EngineError::InvalidState(format!(
                        "order cannot move from {:?} to {:?}",
                        order.status, status
                    )));
                }
                order.status = status;
            }

            tables.orders.insert(order.id, order.clone());
            Ok(order)
        })?;
        info!(order_id, status = ?updated.status, "order updated");
        Ok(updated)
    }

    /// Deletes an order and its items. Orders with payment history are
    /// immutable records and cannot be deleted.
    pub fn delete(&self, order_id: OrderId) -> Result<()> {
        self.store.run_in_transaction(|tables| {
            items::find_order(tables, order_id)?;
            if tables.order_has_payments(order_id) {
                return Err(EngineError::InvalidState(
                    "cannot delete an order with payments".to_string(),
                ));
            }
            tables.order_items.retain(|_, item| item.order_id != order_id);
            tables.orders.remove(&order_id);
            Ok(())
        })?;
        info!(order_id, "order deleted");
        Ok(())
    }

    /// The order with items (joined with products) and payment history.
    pub fn get_with_details(&self, order_id: OrderId) -> Result<OrderDetails> {
        self.store.read(|tables| load_details(tables, order_id))
    }

    /// Paginated listing, newest first, optionally filtered by status.
    /// Deliberately loads orders only; details stay with `get_with_details`.
    pub fn list(
        &self,
        page: u32,
        per_page: u32,
        status: Option<OrderStatus>,
    ) -> Page<Order> {
        self.store.read(|tables| {
            let rows: Vec<Order> = tables
                .orders
                .values()
                .rev()
                .filter(|order| status.is_none_or(|wanted| order.status == wanted))
                .cloned()
                .collect();
            Page::slice(rows, page, per_page)
        })
    }
}

fn load_details(tables: &Tables, order_id: OrderId) -> Result<OrderDetails> {
    let order = items::find_order(tables, order_id)?;
    let item_rows = items::with_products(tables, tables.items_of_order(order_id))?;
    Ok(OrderDetails {
        order,
        items: item_rows,
        payments: tables.payments_of_order(order_id),
    })
}
