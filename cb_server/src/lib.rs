//! HTTP surface for the cue bracket tournament library.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
