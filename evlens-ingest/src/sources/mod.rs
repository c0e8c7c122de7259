//! Built-in message sources.
//!
//! - [`ReplaySource`] - recorded traces from YAML, JSON or JSON Lines files
//! - [`SyntheticCanSource`] - seeded, endless CAN-bus-like traffic

mod replay;
pub mod synthetic;

pub use replay::ReplaySource;
pub use synthetic::SyntheticCanSource;
