//! Deterministic test support.
//!
//! Production code takes its time source as a [`ClockProvider`]; tests swap
//! in a [`MockClock`] to make time slicing reproducible.
//!
//! # Example
//!
//! ```
//! use evlens_core::testing::{ClockProvider, MockClock};
//! use std::time::Duration;
//!
//! let clock = MockClock::new();
//! let start = clock.now();
//! clock.advance(Duration::from_millis(60));
//! assert_eq!(clock.elapsed_since(start), Duration::from_millis(60));
//! ```

pub mod providers;

pub use providers::{ClockProvider, MockClock, RealClock};
