//! Order/payment consistency engine for an e-commerce order-management API.
//!
//! The crate owns the rules tying orders, their line items, and payments
//! together: totals derived from items inside the same transaction, status
//! transitions guarded by payment existence, and gateway selection through a
//! pluggable strategy registry. HTTP routing, request validation, JSON
//! shaping, and concrete persistence are collaborators behind ports.

pub mod application;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod infrastructure;
pub mod interfaces;
