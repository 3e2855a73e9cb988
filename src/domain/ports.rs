use crate::domain::order::{Order, OrderId, OrderItem, OrderItemId};
use crate::domain::payment::{GatewayConfig, GatewayId, Payment, PaymentId};
use crate::domain::product::{Product, ProductId};
use crate::error::Result;
use serde::Serialize;
use std::collections::BTreeMap;

/// One page of a paginated listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl<T> Page<T> {
    /// Slices a newest-first row set into the requested page. Pages are
    /// 1-based; page 0 is treated as page 1.
    pub fn slice(rows: Vec<T>, page: u32, per_page: u32) -> Self {
        let total = rows.len() as u64;
        let page = page.max(1);
        let per_page = per_page.max(1);
        let start = ((page - 1) as usize).saturating_mul(per_page as usize);
        let items = rows
            .into_iter()
            .skip(start)
            .take(per_page as usize)
            .collect();
        Self {
            items,
            page,
            per_page,
            total,
        }
    }
}

/// The relational state the engine runs against: one map per table plus the
/// auto-increment counters. Concrete stores decide how this state is kept;
/// the engine only ever touches it through [`TransactionalStore`].
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub products: BTreeMap<ProductId, Product>,
    pub orders: BTreeMap<OrderId, Order>,
    pub order_items: BTreeMap<OrderItemId, OrderItem>,
    pub payments: BTreeMap<PaymentId, Payment>,
    pub gateways: BTreeMap<GatewayId, GatewayConfig>,
    next_product_id: ProductId,
    next_order_id: OrderId,
    next_item_id: OrderItemId,
    next_payment_id: PaymentId,
    next_gateway_id: GatewayId,
}

impl Tables {
    pub fn insert_product(&mut self, mut product: Product) -> Product {
        self.next_product_id += 1;
        product.id = self.next_product_id;
        self.products.insert(product.id, product.clone());
        product
    }

    pub fn insert_order(&mut self, mut order: Order) -> Order {
        self.next_order_id += 1;
        order.id = self.next_order_id;
        self.orders.insert(order.id, order.clone());
        order
    }

    pub fn insert_item(&mut self, mut item: OrderItem) -> OrderItem {
        self.next_item_id += 1;
        item.id = self.next_item_id;
        self.order_items.insert(item.id, item.clone());
        item
    }

    pub fn insert_payment(&mut self, mut payment: Payment) -> Payment {
        self.next_payment_id += 1;
        payment.id = self.next_payment_id;
        self.payments.insert(payment.id, payment.clone());
        payment
    }

    pub fn insert_gateway(&mut self, mut gateway: GatewayConfig) -> GatewayConfig {
        self.next_gateway_id += 1;
        gateway.id = self.next_gateway_id;
        self.gateways.insert(gateway.id, gateway.clone());
        gateway
    }

    /// Items belonging to an order, in insertion order.
    pub fn items_of_order(&self, order_id: OrderId) -> Vec<OrderItem> {
        self.order_items
            .values()
            .filter(|item| item.order_id == order_id)
            .cloned()
            .collect()
    }

    /// Payment history of an order, oldest first.
    pub fn payments_of_order(&self, order_id: OrderId) -> Vec<Payment> {
        self.payments
            .values()
            .filter(|payment| payment.order_id == order_id)
            .cloned()
            .collect()
    }

    pub fn order_has_payments(&self, order_id: OrderId) -> bool {
        self.payments
            .values()
            .any(|payment| payment.order_id == order_id)
    }

    pub fn product_is_ordered(&self, product_id: ProductId) -> bool {
        self.order_items
            .values()
            .any(|item| item.product_id == product_id)
    }

    pub fn find_active_gateway(&self, name: &str) -> Option<GatewayConfig> {
        self.gateways
            .values()
            .find(|gateway| gateway.name == name && gateway.is_active)
            .cloned()
    }
}

/// Transactional access to the relational store.
///
/// `run_in_transaction` guarantees atomicity: either every write the closure
/// performs commits, or (on `Err`) none do. All cross-entity invariants --
/// order total vs. items, cancellation vs. payment existence -- are enforced
/// through this boundary rather than in-process locks, because concurrent
/// requests may race on the same order.
pub trait TransactionalStore: Send + Sync {
    fn run_in_transaction<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&mut Tables) -> Result<T>;

    /// Read-only view of the last committed state.
    fn read<T, F>(&self, work: F) -> T
    where
        F: FnOnce(&Tables) -> T;
}
