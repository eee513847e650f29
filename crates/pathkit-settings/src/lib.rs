//! PathKit Settings Crate
//!
//! Handles planner configuration: machine limits, interpreter strictness,
//! discretization granularity and output conventions.

pub mod config;
pub mod error;

pub use config::{
    AxisConvention, DiscretizationSettings, DisplaySettings, InterpreterSettings,
    MachineSettings, PlannerConfig, Strictness, WORK_OFFSET_COUNT,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
