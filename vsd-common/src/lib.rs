//! # VSD Common Library
//!
//! Shared code for the VSD detection services including:
//! - Error types
//! - Alert types and wire formats
//! - Alert hub (publish/subscribe fan-out)
//! - Configuration loading
//! - Timestamp utilities

pub mod config;
pub mod error;
pub mod events;
pub mod hub;
pub mod time;

pub use error::{Error, Result};
pub use events::{Alert, AlertMessage};
pub use hub::{AlertHub, AlertSubscription};
