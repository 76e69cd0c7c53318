//! Presentation layer for channel insights.
//!
//! Renders aggregate views as SVG charts ([`charts`], built on `plotters`)
//! and as bordered plain-text tables ([`table_view`], laid out with
//! `ratatui`).

pub mod charts;
pub mod table_view;

pub use insights_core as core;
