//! Transport layer
//!
//! This module provides:
//! - The `Transport` trait and the `TransportEvent` vocabulary
//! - The MQTT implementation used in production
//!
//! The collector interacts exclusively through the trait, so tests
//! can drive it with scripted events instead of a broker.

pub mod adapter;
pub mod mqtt;

pub use adapter::{Transport, TransportEvent};
