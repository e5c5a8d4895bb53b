//! Background supervision
//!
//! Concurrent loops that watch a live session: process liveness, disk and
//! memory headroom, and encoder log streams. All of them are stopped via
//! cooperative flags and report outward through the session's event
//! channel, never by touching the record collection.

pub mod health;
pub mod logs;
pub mod resources;

pub use health::ProcessHealthMonitor;
pub use logs::LogAggregator;
pub use resources::ResourceGuard;
