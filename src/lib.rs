//! pitwatch library
//!
//! Fetches smoker telemetry for a cook, caches it on disk, converts the raw
//! sensor encodings and projects when the meat reaches its target. The binary
//! draws the result in the terminal; the modules are public for integration
//! tests.

pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod refresh;
pub mod ui;
