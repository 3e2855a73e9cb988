//! Payment gateway strategies and their registry.
//!
//! A [`GatewayConfig`] row names a strategy by identifier; the registry maps
//! identifiers to factories resolved at startup, so adding a gateway means
//! registering one more factory rather than loading classes by name.

pub mod card;

use crate::domain::payment::{GatewayConfig, GatewayResult, PaymentData};
use crate::error::{EngineError, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

/// The polymorphic payment-processing capability implemented per gateway.
///
/// Construction validates credentials; by the time a strategy exists its
/// configuration is known good. `process_payment` is the one place genuine
/// external I/O occurs and may fail like any network call.
#[async_trait]
pub trait PaymentStrategy: Send + Sync {
    fn name(&self) -> &str;

    async fn process_payment(
        &self,
        amount: Decimal,
        payment_data: &PaymentData,
    ) -> Result<GatewayResult>;
}

/// Decides whether a simulated gateway call succeeds. The original
/// implementation hardcoded a random 80% success rate; making the outcome
/// injectable keeps tests deterministic while the demo binary can still
/// opt into randomness.
pub trait OutcomePolicy: Send + Sync {
    fn approve(&self) -> bool;
}

/// Always returns the configured outcome.
pub struct FixedOutcome(pub bool);

impl OutcomePolicy for FixedOutcome {
    fn approve(&self) -> bool {
        self.0
    }
}

/// Approves with the given probability, matching the original simulation.
pub struct RandomOutcome {
    pub success_rate: f64,
}

impl OutcomePolicy for RandomOutcome {
    fn approve(&self) -> bool {
        rand::random::<f64>() < self.success_rate
    }
}

type StrategyFactory =
    Box<dyn Fn(&GatewayConfig) -> Result<Box<dyn PaymentStrategy>> + Send + Sync>;

/// Static map from strategy identifier to factory, built at startup.
#[derive(Default)]
pub struct GatewayRegistry {
    factories: HashMap<String, StrategyFactory>,
}

impl GatewayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in strategy, using the given outcome
    /// policy for simulated gateways.
    pub fn with_builtins(outcome: Arc<dyn OutcomePolicy>) -> Self {
        let mut registry = Self::new();
        registry.register("card", move |config| {
            let gateway = card::CardGateway::new(&config.config, outcome.clone())?;
            Ok(Box::new(gateway) as Box<dyn PaymentStrategy>)
        });
        registry
    }

    pub fn register<F>(&mut self, strategy_id: &str, factory: F)
    where
        F: Fn(&GatewayConfig) -> Result<Box<dyn PaymentStrategy>> + Send + Sync + 'static,
    {
        self.factories
            .insert(strategy_id.to_string(), Box::new(factory));
    }

    /// Builds the strategy a gateway row points at. Unknown identifiers and
    /// rejected credentials both surface as configuration errors.
    pub fn build(&self, gateway: &GatewayConfig) -> Result<Box<dyn PaymentStrategy>> {
        let factory = self.factories.get(&gateway.strategy).ok_or_else(|| {
            EngineError::GatewayConfig(format!(
                "no strategy registered for '{}'",
                gateway.strategy
            ))
        })?;
        factory(gateway)
    }
}
