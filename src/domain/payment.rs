use crate::domain::order::OrderId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type PaymentId = u64;
pub type GatewayId = u64;

/// One attempt (successful or failed) to charge an order's total through a
/// gateway. Immutable once created; there is no update or delete surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub order_id: OrderId,
    pub gateway_id: GatewayId,
    /// Snapshot of the order total at the time of the attempt.
    pub amount: Decimal,
    /// Status string as reported by the gateway, e.g. "successful"/"failed".
    pub status: String,
    /// Gateway-assigned id; absent on failed attempts.
    pub transaction_id: Option<String>,
    /// Opaque payload echoed back from the gateway.
    pub gateway_response: serde_json::Value,
}

impl Payment {
    pub fn is_successful(&self) -> bool {
        self.status == "successful"
    }
}

/// A named, configured payment processor. Resolved by name where
/// `is_active` is true; an inactive or missing gateway is an error, never a
/// record the orchestrator may fall back to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub id: GatewayId,
    pub name: String,
    /// Registry identifier of the strategy implementation, resolved through
    /// a static factory table at startup rather than by runtime reflection.
    pub strategy: String,
    pub is_active: bool,
    /// Opaque key-value bag, typically credentials.
    pub config: BTreeMap<String, String>,
}

/// Method-specific data forwarded verbatim to the selected strategy.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentData {
    pub payment_method: Option<String>,
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

/// Outcome of a single gateway call.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayResult {
    pub success: bool,
    pub transaction_id: Option<String>,
    pub status: String,
    pub message: String,
    pub amount: Decimal,
    pub currency: String,
    pub gateway_response: serde_json::Value,
}
