//! Batch analysis jobs
//!
//! A job consumes a fixed list of image files in its own task, records a
//! result row per successfully classified item, and tracks progress in the
//! database after every item. Item failures are tolerated; engine failures
//! terminate the job as failed.

pub mod engine;
pub mod scan;
pub mod worker;

pub use engine::JobEngine;
