//! Monitoring sessions
//!
//! A session periodically captures frames from whichever monitored target is
//! visible, classifies them, deduplicates positives through a cooldown gate,
//! keeps bounded evidence, and fans alerts out through the hub.

pub mod dedup;
pub mod registry;
pub mod worker;

pub use dedup::{CooldownGate, GateDecision};
pub use registry::MonitorRegistry;
pub use worker::SessionWorker;
