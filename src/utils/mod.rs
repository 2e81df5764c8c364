//! Utility functions and helpers
//!
//! This module contains timestamp utilities shared by the scheduler and the
//! HTTP layer.

pub mod time;

pub use time::{next_firing, now_iso8601, uptime_seconds};
