//! Middleware components for request processing
//!
//! Currently holds the call throttle shared by every request a client issues.

pub mod throttle;

pub use throttle::{Throttle, ThrottlePermit};
