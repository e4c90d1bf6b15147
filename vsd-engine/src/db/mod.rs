//! SQLite persistence

pub mod detections;
pub mod init;
pub mod jobs;

pub use init::init_database;
