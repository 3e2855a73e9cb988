//! Domain entities, money rules, and the ports the engine depends on.

pub mod money;
pub mod order;
pub mod payment;
pub mod ports;
pub mod product;
