//! Word-game score tracker service.
//!
//! Catches up configured channels through paged history, records scores
//! from live gateway messages and resyncs each channel periodically.

pub mod app;
pub mod background;
pub mod bootstrap;
pub mod config;
pub mod export;
pub mod guard;
pub mod live;
pub mod sync;

pub use bootstrap::init_foundation;
