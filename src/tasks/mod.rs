//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Stats Reporter: Logs aggregated cache statistics at configured intervals

mod reporter;

pub use reporter::spawn_stats_reporter;
