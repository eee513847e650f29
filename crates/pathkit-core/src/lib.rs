//! # PathKit Core
//!
//! Core types shared by the PathKit crates.
//! Provides the error taxonomy, the per-program diagnostics list,
//! and feed rate / length unit helpers.

pub mod diagnostics;
pub mod error;
pub mod units;

pub use diagnostics::Diagnostics;
pub use error::{Error, PlanningError, Result};
pub use units::{FeedRateUnits, MeasurementSystem};
