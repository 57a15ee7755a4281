//! Domain model: orders, gateway messages and the ports the sweep depends on.

pub mod order;
pub mod ports;
pub mod recurring;
