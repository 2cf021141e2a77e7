//! Configuration and dependency initialization for the search gateway.

mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::{ConnectionMode, GatewaySettings};
