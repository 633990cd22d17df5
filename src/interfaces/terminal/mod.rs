//! Terminal front end: a stdin-driven payment gateway and plain-text rendering.

pub mod gateway;
pub mod render;
