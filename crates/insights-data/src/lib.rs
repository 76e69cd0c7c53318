//! Data layer for channel insights.
//!
//! Reads channel exports, derives per-message time buckets and computes the
//! aggregate views (histograms, weekday/hour matrix, member ranking and
//! summary statistics).

pub mod aggregator;
pub mod analysis;
pub mod enricher;
pub mod reader;

pub use insights_core as core;
