//! Shared building blocks for channel insights.
//!
//! Holds the typed message model, the derived aggregate views, the error
//! taxonomy, timestamp parsing, number formatting and CLI settings used by
//! the data, ui and binary crates.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{ErrorKind, InsightsError, Result};
