//! Application services orchestrating the domain over the store port.
//!
//! Each service takes the shared store (and, for payments, the gateway
//! registry) and exposes the operations the presentation layer calls. All
//! multi-step mutations run inside a single transaction.

pub mod catalog;
pub mod items;
pub mod orders;
pub mod payments;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::domain::order::{Order, OrderId, OrderStatus};
    use crate::domain::payment::{GatewayConfig, Payment};
    use crate::domain::ports::TransactionalStore;
    use crate::domain::product::Product;
    use crate::infrastructure::in_memory::InMemoryStore;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    pub fn seeded_store() -> Arc<InMemoryStore> {
        Arc::new(InMemoryStore::new())
    }

    pub fn seed_product(store: &Arc<InMemoryStore>, name: &str, price: Decimal) -> Product {
        store
            .run_in_transaction(|tables| {
                Ok(tables.insert_product(Product {
                    id: 0,
                    name: name.to_string(),
                    description: String::new(),
                    price,
                    stock: 100,
                }))
            })
            .unwrap()
    }

    pub fn confirmed_order(store: &Arc<InMemoryStore>, user_id: u64) -> Order {
        store
            .run_in_transaction(|tables| {
                let mut order = Order::new(0, user_id);
                order.status = OrderStatus::Confirmed;
                Ok(tables.insert_order(order))
            })
            .unwrap()
    }

    pub fn seed_payment(store: &Arc<InMemoryStore>, order_id: OrderId) -> Payment {
        store
            .run_in_transaction(|tables| {
                Ok(tables.insert_payment(Payment {
                    id: 0,
                    order_id,
                    gateway_id: 1,
                    amount: dec!(10.00),
                    status: "successful".to_string(),
                    transaction_id: Some("txn_test".to_string()),
                    gateway_response: serde_json::Value::Null,
                }))
            })
            .unwrap()
    }

    pub fn seed_gateway(store: &Arc<InMemoryStore>, name: &str, is_active: bool) -> GatewayConfig {
        store
            .run_in_transaction(|tables| {
                Ok(tables.insert_gateway(GatewayConfig {
                    id: 0,
                    name: name.to_string(),
                    strategy: "card".to_string(),
                    is_active,
                    config: BTreeMap::from([
                        ("secret_key".to_string(), "sk_test".to_string()),
                        ("public_key".to_string(), "pk_test".to_string()),
                    ]),
                }))
            })
            .unwrap()
    }
}
