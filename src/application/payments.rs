use crate::application::items;
use crate::domain::order::OrderId;
use crate::domain::payment::{Payment, PaymentData, PaymentId};
use crate::domain::ports::{Page, TransactionalStore};
use crate::error::{EngineError, Result};
use crate::gateway::GatewayRegistry;
use crate::infrastructure::in_memory::InMemoryStore;
use std::sync::Arc;
use tracing::{info, warn};

/// Payment orchestration and payment history reads.
pub struct PaymentService<S: TransactionalStore = InMemoryStore> {
    store: Arc<S>,
    registry: Arc<GatewayRegistry>,
}

impl<S: TransactionalStore> PaymentService<S> {
    pub fn new(store: Arc<S>, registry: Arc<GatewayRegistry>) -> Self {
        Self { store, registry }
    }

    /// Charges a confirmed order's total through the named gateway.
    ///
    /// The gateway call happens between transactions; the payment row is
    /// committed afterwards regardless of the charge outcome, so failed
    /// attempts leave history too. Nothing is retried and the order itself
    /// is never altered here.
    pub async fn process_payment(
        &self,
        order_id: OrderId,
        gateway_name: &str,
        payment_data: PaymentData,
    ) -> Result<Payment> {
        let (order, gateway) = self.store.read(|tables| {
            let order = items::find_order(tables, order_id)?;
            if !order.can_process_payment() {
                return Err(EngineError::OrderNotConfirmed);
            }
            let gateway = tables
                .find_active_gateway(gateway_name)
                .ok_or_else(|| EngineError::GatewayNotFound(gateway_name.to_string()))?;
            Ok((order, gateway))
        })?;

        let strategy = self.registry.build(&gateway)?;

        let result = strategy
            .process_payment(order.total_amount, &payment_data)
            .await
            .map_err(|err| EngineError::PaymentFailed(err.to_string()))?;
        if !result.success {
            warn!(order_id, gateway = gateway_name, "gateway declined payment");
        }

        let response = serde_json::to_value(&result)
            .map_err(|err| EngineError::PaymentFailed(err.to_string()))?;

        let payment = self.store.run_in_transaction(|tables| {
            // The order must still exist, but the row stamps the amount that
            // was actually sent to the gateway; items may have moved the
            // total while the call was in flight.
            items::find_order(tables, order_id)?;
            Ok(tables.insert_payment(Payment {
                id: 0,
                order_id,
                gateway_id: gateway.id,
                amount: order.total_amount,
                status: result.status.clone(),
                transaction_id: result.transaction_id.clone(),
                gateway_response: response,
            }))
        })?;

        info!(
            payment_id = payment.id,
            order_id,
            gateway = gateway_name,
            status = %payment.status,
            "payment recorded"
        );
        Ok(payment)
    }

    /// Payment history of one order, newest first.
    pub fn order_payments(
        &self,
        order_id: OrderId,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Payment>> {
        self.store.read(|tables| {
            items::find_order(tables, order_id)?;
            let mut rows = tables.payments_of_order(order_id);
            rows.reverse();
            Ok(Page::slice(rows, page, per_page))
        })
    }

    pub fn find_payment(&self, payment_id: PaymentId) -> Result<Payment> {
        self.store.read(|tables| {
            tables
                .payments
                .get(&payment_id)
                .cloned()
                .ok_or_else(|| EngineError::not_found("payment", payment_id))
        })
    }

    /// All payments across orders, newest first.
    pub fn list_payments(&self, page: u32, per_page: u32) -> Page<Payment> {
        self.store.read(|tables| {
            let rows: Vec<Payment> = tables.payments.values().rev().cloned().collect();
            Page::slice(rows, page, per_page)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{
        confirmed_order, seed_gateway, seed_product, seeded_store,
    };
    use crate::application::items::OrderItemService;
    use crate::domain::order::{NewOrderItem, Order, OrderItemPatch};
    use crate::domain::payment::GatewayResult;
    use crate::error::ErrorCode;
    use crate::gateway::{FixedOutcome, PaymentStrategy};
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn service(store: &Arc<InMemoryStore>, approve: bool) -> PaymentService {
        let registry = GatewayRegistry::with_builtins(Arc::new(FixedOutcome(approve)));
        PaymentService::new(store.clone(), Arc::new(registry))
    }

    fn paid_total_setup(store: &Arc<InMemoryStore>) -> Order {
        let product = seed_product(store, "widget", dec!(100.00));
        let order = confirmed_order(store, 1);
        OrderItemService::new(store.clone())
            .add_items(
                order.id,
                vec![NewOrderItem {
                    product_id: product.id,
                    quantity: 1,
                }],
            )
            .unwrap();
        store.read(|tables| tables.orders[&order.id].clone())
    }

    #[tokio::test]
    async fn test_successful_payment_creates_record() {
        let store = seeded_store();
        seed_gateway(&store, "card", true);
        let order = paid_total_setup(&store);

        let payment = service(&store, true)
            .process_payment(order.id, "card", PaymentData::default())
            .await
            .unwrap();

        assert_eq!(payment.amount, dec!(100.00));
        assert_eq!(payment.status, "successful");
        assert!(payment.transaction_id.is_some());
        assert!(payment.is_successful());
        assert_eq!(payment.gateway_response["success"], true);
    }

    #[tokio::test]
    async fn test_declined_payment_still_creates_record() {
        let store = seeded_store();
        seed_gateway(&store, "card", true);
        let order = paid_total_setup(&store);

        let payment = service(&store, false)
            .process_payment(order.id, "card", PaymentData::default())
            .await
            .unwrap();

        assert_eq!(payment.status, "failed");
        assert!(payment.transaction_id.is_none());
        assert!(!payment.is_successful());
        // The failed attempt is history; the order is untouched.
        store.read(|tables| {
            assert_eq!(tables.payments.len(), 1);
            assert_eq!(tables.orders[&order.id].total_amount, dec!(100.00));
        });
    }

    #[tokio::test]
    async fn test_pending_order_is_rejected_without_payment_row() {
        let store = seeded_store();
        seed_gateway(&store, "card", true);
        let order = store
            .run_in_transaction(|tables| Ok(tables.insert_order(Order::new(0, 1))))
            .unwrap();

        let err = service(&store, true)
            .process_payment(order.id, "card", PaymentData::default())
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::OrderNotConfirmed);
        assert!(store.read(|tables| tables.payments.is_empty()));
    }

    #[tokio::test]
    async fn test_unknown_gateway_is_rejected_without_payment_row() {
        let store = seeded_store();
        let order = confirmed_order(&store, 1);

        let err = service(&store, true)
            .process_payment(order.id, "card", PaymentData::default())
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::GatewayNotFound);
        assert!(store.read(|tables| tables.payments.is_empty()));
    }

    #[tokio::test]
    async fn test_inactive_gateway_is_not_resolved() {
        let store = seeded_store();
        seed_gateway(&store, "card", false);
        let order = confirmed_order(&store, 1);

        let err = service(&store, true)
            .process_payment(order.id, "card", PaymentData::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::GatewayNotFound);
    }

    #[tokio::test]
    async fn test_bad_gateway_config_is_a_config_error() {
        let store = seeded_store();
        store
            .run_in_transaction(|tables| {
                tables.insert_gateway(crate::domain::payment::GatewayConfig {
                    id: 0,
                    name: "card".to_string(),
                    strategy: "card".to_string(),
                    is_active: true,
                    config: Default::default(),
                });
                Ok(())
            })
            .unwrap();
        let order = confirmed_order(&store, 1);

        let err = service(&store, true)
            .process_payment(order.id, "card", PaymentData::default())
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::GatewayConfig);
        assert!(store.read(|tables| tables.payments.is_empty()));
    }

    #[tokio::test]
    async fn test_missing_order_is_not_found() {
        let store = seeded_store();
        seed_gateway(&store, "card", true);

        let err = service(&store, true)
            .process_payment(404, "card", PaymentData::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_payment_queries() {
        let store = seeded_store();
        seed_gateway(&store, "card", true);
        let order = paid_total_setup(&store);
        let svc = service(&store, true);

        let first = svc
            .process_payment(order.id, "card", PaymentData::default())
            .await
            .unwrap();
        let second = svc
            .process_payment(order.id, "card", PaymentData::default())
            .await
            .unwrap();

        let page = svc.order_payments(order.id, 1, 10).unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].id, second.id); // newest first

        assert_eq!(svc.find_payment(first.id).unwrap().id, first.id);
        assert_eq!(
            svc.find_payment(999).unwrap_err().code(),
            ErrorCode::NotFound
        );

        let all = svc.list_payments(1, 1);
        assert_eq!(all.total, 2);
        assert_eq!(all.items.len(), 1);
    }

    /// Bumps an item quantity on the shared store mid-call, standing in for
    /// another request landing while the charge is in flight.
    struct ItemBumpingGateway {
        store: Arc<InMemoryStore>,
        item_id: u64,
    }

    #[async_trait]
    impl PaymentStrategy for ItemBumpingGateway {
        fn name(&self) -> &str {
            "card"
        }

        async fn process_payment(
            &self,
            amount: Decimal,
            _payment_data: &PaymentData,
        ) -> Result<GatewayResult> {
            OrderItemService::new(self.store.clone())
                .update_item(
                    self.item_id,
                    OrderItemPatch {
                        quantity: Some(2),
                        unit_price: None,
                    },
                )
                .unwrap();
            Ok(GatewayResult {
                success: true,
                transaction_id: Some("txn_race".to_string()),
                status: "successful".to_string(),
                message: String::new(),
                amount,
                currency: "USD".to_string(),
                gateway_response: serde_json::Value::Null,
            })
        }
    }

    #[tokio::test]
    async fn test_payment_stamps_amount_sent_to_gateway() {
        let store = seeded_store();
        seed_gateway(&store, "card", true);
        let product = seed_product(&store, "widget", dec!(100.00));
        let order = confirmed_order(&store, 1);
        let item = OrderItemService::new(store.clone())
            .add_items(
                order.id,
                vec![NewOrderItem {
                    product_id: product.id,
                    quantity: 1,
                }],
            )
            .unwrap()
            .remove(0);

        let mut registry = GatewayRegistry::new();
        let mutator = store.clone();
        let item_id = item.id;
        registry.register("card", move |_| {
            Ok(Box::new(ItemBumpingGateway {
                store: mutator.clone(),
                item_id,
            }) as Box<dyn PaymentStrategy>)
        });
        let payment = PaymentService::new(store.clone(), Arc::new(registry))
            .process_payment(order.id, "card", PaymentData::default())
            .await
            .unwrap();

        // The row records what was charged, not the total the concurrent
        // edit produced afterwards.
        assert_eq!(payment.amount, dec!(100.00));
        store.read(|tables| {
            assert_eq!(tables.orders[&order.id].total_amount, dec!(200.00));
        });
    }
}
