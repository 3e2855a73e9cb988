use crate::domain::money;
use crate::domain::payment::Payment;
use crate::domain::product::{Product, ProductId};
use crate::error::{EngineError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type OrderId = u64;
pub type OrderItemId = u64;
pub type UserId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl OrderStatus {
    /// Legal lifecycle moves: Pending -> Confirmed, Pending|Confirmed ->
    /// Cancelled, nothing leaves Cancelled. Same-status writes are no-ops.
    /// Cancellation is additionally blocked once a payment exists; that
    /// check needs payment state and lives with the order store.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        match (self, next) {
            (current, next) if current == next => true,
            (OrderStatus::Pending, OrderStatus::Confirmed) => true,
            (OrderStatus::Pending, OrderStatus::Cancelled) => true,
            (OrderStatus::Confirmed, OrderStatus::Cancelled) => true,
            _ => false,
        }
    }
}

/// A purchase grouping of items owned by one user.
///
/// The committed `total_amount` always equals the sum of the order's item
/// subtotals; every item mutation rewrites it in the same transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub total_amount: Decimal,
}

impl Order {
    pub fn new(id: OrderId, user_id: UserId) -> Self {
        Self {
            id,
            user_id,
            status: OrderStatus::Pending,
            total_amount: Decimal::ZERO,
        }
    }

    pub fn can_process_payment(&self) -> bool {
        self.status == OrderStatus::Confirmed
    }
}

/// A quantity of one product at its price at order time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

impl OrderItem {
    pub fn new(
        id: OrderItemId,
        order_id: OrderId,
        product_id: ProductId,
        quantity: u32,
        unit_price: Decimal,
    ) -> Result<Self> {
        if quantity == 0 {
            return Err(EngineError::Validation(
                "item quantity must be positive".to_string(),
            ));
        }
        Ok(Self {
            id,
            order_id,
            product_id,
            quantity,
            unit_price,
            subtotal: money::line_subtotal(quantity, unit_price),
        })
    }

    /// Re-derives the subtotal from the current quantity and unit price.
    /// Must run after any field change so a stale subtotal is never stored.
    pub fn recompute_subtotal(&mut self) {
        self.subtotal = money::line_subtotal(self.quantity, self.unit_price);
    }
}

/// Requested line when creating an order or adding items to one.
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Partial item update; absent fields keep their current values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderItemPatch {
    pub quantity: Option<u32>,
    pub unit_price: Option<Decimal>,
}

/// Partial order update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
}

/// An order item joined with its product, for detail reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItemDetails {
    pub item: OrderItem,
    pub product: Product,
}

/// An order eagerly loaded with its items and payment history.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetails {
    pub order: Order,
    pub items: Vec<OrderItemDetails>,
    pub payments: Vec<Payment>,
}
