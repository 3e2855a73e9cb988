use crate::domain::money;
use crate::domain::order::{
    NewOrderItem, Order, OrderId, OrderItem, OrderItemDetails, OrderItemId, OrderItemPatch,
    OrderStatus,
};
use crate::domain::ports::{Tables, TransactionalStore};
use crate::error::{EngineError, Result};
use crate::infrastructure::in_memory::InMemoryStore;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

/// Line-item CRUD for orders.
///
/// Every mutation runs inside a single transaction that also rewrites the
/// owning order's total, so a committed total always matches the committed
/// items. Recalculation is an explicit step here, not a persistence hook.
pub struct OrderItemService<S: TransactionalStore = InMemoryStore> {
    store: Arc<S>,
}

impl<S: TransactionalStore> OrderItemService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Adds a batch of items to an order. Each line snapshots the product's
    /// current price; the order total is recalculated once per batch.
    pub fn add_items(&self, order_id: OrderId, items: Vec<NewOrderItem>) -> Result<Vec<OrderItem>> {
        let created = self.store.run_in_transaction(|tables| {
            let order = find_order(tables, order_id)?;
            ensure_items_mutable(tables, &order)?;
            let created = insert_items(tables, order_id, &items)?;
            recalculate_total(tables, order_id)?;
            Ok(created)
        })?;
        info!(order_id, count = created.len(), "items added to order");
        Ok(created)
    }

    /// Merges the patch over an existing item, re-derives its subtotal, and
    /// recalculates the owning order's total.
    pub fn update_item(&self, item_id: OrderItemId, patch: OrderItemPatch) -> Result<OrderItem> {
        let updated = self.store.run_in_transaction(|tables| {
            let mut item = find_item(tables, item_id)?;
            let order = find_order(tables, item.order_id)?;
            ensure_items_mutable(tables, &order)?;

            if let Some(quantity) = patch.quantity {
                if quantity == 0 {
                    return Err(EngineError::Validation(
                        "item quantity must be positive".to_string(),
                    ));
                }
                item.quantity = quantity;
            }
            if let Some(unit_price) = patch.unit_price {
                if unit_price < Decimal::ZERO {
                    return Err(EngineError::Validation(
                        "item unit price cannot be negative".to_string(),
                    ));
                }
                item.unit_price = money::to_money(unit_price);
            }
            item.recompute_subtotal();

            tables.order_items.insert(item.id, item.clone());
            recalculate_total(tables, item.order_id)?;
            Ok(item)
        })?;
        info!(item_id, order_id = updated.order_id, "order item updated");
        Ok(updated)
    }

    /// Removes an item and recalculates the owning order's total.
    pub fn delete_item(&self, item_id: OrderItemId) -> Result<()> {
        let order_id = self.store.run_in_transaction(|tables| {
            let item = find_item(tables, item_id)?;
            let order = find_order(tables, item.order_id)?;
            ensure_items_mutable(tables, &order)?;

            tables.order_items.remove(&item_id);
            recalculate_total(tables, item.order_id)?;
            Ok(item.order_id)
        })?;
        info!(item_id, order_id, "order item deleted");
        Ok(())
    }

    /// Items of an order in insertion order, with product details.
    pub fn items_of_order(&self, order_id: OrderId) -> Result<Vec<OrderItemDetails>> {
        self.store.read(|tables| {
            find_order(tables, order_id)?;
            with_products(tables, tables.items_of_order(order_id))
        })
    }
}

pub(crate) fn find_order(tables: &Tables, order_id: OrderId) -> Result<Order> {
    tables
        .orders
        .get(&order_id)
        .cloned()
        .ok_or_else(|| EngineError::not_found("order", order_id))
}

fn find_item(tables: &Tables, item_id: OrderItemId) -> Result<OrderItem> {
    tables
        .order_items
        .get(&item_id)
        .cloned()
        .ok_or_else(|| EngineError::not_found("order item", item_id))
}

/// Items of cancelled orders are frozen, as are items of confirmed orders
/// that already carry a payment: mutating either would silently invalidate
/// a total a customer was (or will never be) charged against.
pub(crate) fn ensure_items_mutable(tables: &Tables, order: &Order) -> Result<()> {
    match order.status {
        OrderStatus::Cancelled => Err(EngineError::InvalidState(
            "items of a cancelled order cannot be modified".to_string(),
        )),
        OrderStatus::Confirmed if tables.order_has_payments(order.id) => {
            Err(EngineError::InvalidState(
                "items of a paid order cannot be modified".to_string(),
            ))
        }
        _ => Ok(()),
    }
}

/// Inserts the requested lines, snapshotting each product's current price.
/// Does not touch the order total; callers recalculate after the batch.
pub(crate) fn insert_items(
    tables: &mut Tables,
    order_id: OrderId,
    items: &[NewOrderItem],
) -> Result<Vec<OrderItem>> {
    let mut created = Vec::with_capacity(items.len());
    for line in items {
        let product = tables
            .products
            .get(&line.product_id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("product", line.product_id))?;
        let item = OrderItem::new(0, order_id, product.id, line.quantity, product.price)?;
        created.push(tables.insert_item(item));
    }
    Ok(created)
}

/// Re-derives the order total from its current items and writes it back.
pub(crate) fn recalculate_total(tables: &mut Tables, order_id: OrderId) -> Result<Decimal> {
    let total = money::order_total(&tables.items_of_order(order_id));
    let order = tables
        .orders
        .get_mut(&order_id)
        .ok_or_else(|| EngineError::not_found("order", order_id))?;
    order.total_amount = total;
    Ok(total)
}

/// Joins items with their products for detail reads.
pub(crate) fn with_products(
    tables: &Tables,
    items: Vec<OrderItem>,
) -> Result<Vec<OrderItemDetails>> {
    items
        .into_iter()
        .map(|item| {
            let product = tables
                .products
                .get(&item.product_id)
                .cloned()
                .ok_or_else(|| EngineError::not_found("product", item.product_id))?;
            Ok(OrderItemDetails { item, product })
        })
        .collect()
}
