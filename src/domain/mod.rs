//! Domain layer: checkout types, pure rules and the ports to the outside world.

pub mod amount;
pub mod contributor;
pub mod order;
pub mod payment;
pub mod ports;
pub mod state;
