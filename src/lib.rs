//! Periodic removal of stored recurring payment tokens from the payment gateway.
//!
//! A sweep walks completed orders that still carry a gateway token, asks the
//! gateway to disable the stored recurring contract, and marks each order as
//! processed so it is never sent again.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
pub mod observability;
