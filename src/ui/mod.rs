//! UI rendering module for pitwatch
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components.

pub mod chart;
pub mod help_overlay;
pub mod widgets;

pub use chart::render;
