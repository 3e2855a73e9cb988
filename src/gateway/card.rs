use crate::domain::payment::{GatewayResult, PaymentData};
use crate::error::{EngineError, Result};
use crate::gateway::{OutcomePolicy, PaymentStrategy};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Card-style gateway. Stands in for a real processor integration: it
/// validates credentials the way the real one would and produces the same
/// response shape, but the charge itself is decided by the injected
/// [`OutcomePolicy`] instead of a network call.
pub struct CardGateway {
    outcome: Arc<dyn OutcomePolicy>,
}

impl CardGateway {
    pub fn new(config: &BTreeMap<String, String>, outcome: Arc<dyn OutcomePolicy>) -> Result<Self> {
        if !Self::validate_config(config) {
            return Err(EngineError::GatewayConfig(
                "card gateway requires non-empty 'secret_key' and 'public_key'".to_string(),
            ));
        }
        Ok(Self { outcome })
    }

    pub fn validate_config(config: &BTreeMap<String, String>) -> bool {
        ["secret_key", "public_key"]
            .iter()
            .all(|key| config.get(*key).is_some_and(|value| !value.is_empty()))
    }

    fn transaction_id() -> String {
        format!("txn_{:016x}", rand::random::<u64>())
    }
}

#[async_trait]
impl PaymentStrategy for CardGateway {
    fn name(&self) -> &str {
        "card"
    }

    async fn process_payment(
        &self,
        amount: Decimal,
        payment_data: &PaymentData,
    ) -> Result<GatewayResult> {
        if self.outcome.approve() {
            let method = payment_data
                .payment_method
                .clone()
                .unwrap_or_else(|| "card".to_string());
            Ok(GatewayResult {
                success: true,
                transaction_id: Some(Self::transaction_id()),
                status: "successful".to_string(),
                message: "Payment processed successfully".to_string(),
                amount,
                currency: "USD".to_string(),
                gateway_response: json!({
                    "charge_id": format!("ch_{:016x}", rand::random::<u64>()),
                    "payment_method": method,
                    "paid": true,
                }),
            })
        } else {
            Ok(GatewayResult {
                success: false,
                transaction_id: None,
                status: "failed".to_string(),
                message: "Payment processing failed".to_string(),
                amount,
                currency: "USD".to_string(),
                gateway_response: json!({
                    "error": {
                        "code": "payment_failed",
                        "message": "The payment could not be processed",
                    }
                }),
            })
        }
    }
}
