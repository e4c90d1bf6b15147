//! HTTP API handlers for vsd-engine

pub mod alerts;
pub mod detect;
pub mod health;
pub mod jobs;
pub mod monitor;

pub use alerts::alert_routes;
pub use detect::detect_routes;
pub use health::health_routes;
pub use jobs::job_routes;
pub use monitor::monitor_routes;
