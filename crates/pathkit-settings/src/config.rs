//! Planner configuration for PathKit
//!
//! Provides configuration file handling and validation.
//! Supports JSON and TOML file formats; the default location is a
//! platform-specific config directory.
//!
//! Configuration is organized into logical sections:
//! - Machine settings (acceleration limit, feed rates, work offsets)
//! - Interpreter settings (strict or lenient handling of odd commands)
//! - Discretization settings (tessellation, run batching, dwell markers)
//! - Display settings (renderer axis convention, units)

use pathkit_core::units::{FeedRateUnits, MeasurementSystem};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};

/// Number of coordinate origins (index 0 is the machine origin, 1..=9 are G54..G59.3)
pub const WORK_OFFSET_COUNT: usize = 10;

const CONFIG_DIR_NAME: &str = "pathkit";
const CONFIG_FILE_NAME: &str = "planner.toml";

/// How the interpreter reports commands it cannot honour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Unsupported and unknown G-codes are ignored without a diagnostic
    #[default]
    Lenient,
    /// Unsupported and unknown G-codes are reported as diagnostics
    Strict,
}

impl std::fmt::Display for Strictness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lenient => write!(f, "lenient"),
            Self::Strict => write!(f, "strict"),
        }
    }
}

/// Coordinate convention of the consuming renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AxisConvention {
    /// Machine coordinates as-is
    #[default]
    ZUp,
    /// `(x, y, z) -> (x, z, -y)` for Y-up renderers
    YUp,
}

/// Machine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineSettings {
    /// Acceleration limit in units/s²
    pub max_acceleration: f32,
    /// Feed rate in units/min used until the program sets one
    pub default_feed_rate: f32,
    /// Rapid (G0) feed rate in units/min
    pub travel_feed_rate: f32,
    /// Machine position before the first command
    pub initial_position: [f32; 3],
    /// Origin offsets, indexed by origin number
    pub work_offsets: Vec<[f32; 3]>,
}

impl Default for MachineSettings {
    fn default() -> Self {
        Self {
            max_acceleration: 1000.0,
            default_feed_rate: 15.0 * 60.0,
            travel_feed_rate: 15.0 * 60.0,
            initial_position: [0.0; 3],
            work_offsets: vec![[0.0; 3]; WORK_OFFSET_COUNT],
        }
    }
}

/// Interpreter settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterSettings {
    pub strictness: Strictness,
}

/// Discretization settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscretizationSettings {
    /// Samples per straight fragment
    pub line_sim_steps: u32,
    /// Chordal tolerance for arc tessellation, in units
    pub arc_tolerance: f32,
    /// Upper bound on samples per arc fragment
    pub max_arc_steps: u32,
    /// Points per renderer run before a new run is started
    pub max_run_points: usize,
    /// Stationary samples appended after each group
    pub dwell_samples: u32,
    /// Time between dwell samples, in seconds
    pub dwell_interval: f32,
}

impl Default for DiscretizationSettings {
    fn default() -> Self {
        Self {
            line_sim_steps: 40,
            arc_tolerance: 1e-4,
            max_arc_steps: 4096,
            max_run_points: 10_000,
            dwell_samples: 10,
            dwell_interval: 0.001,
        }
    }
}

/// Display settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub axis_convention: AxisConvention,
    pub measurement_system: MeasurementSystem,
    pub feed_rate_units: FeedRateUnits,
}

/// Complete planner configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub machine: MachineSettings,
    pub interpreter: InterpreterSettings,
    pub discretization: DiscretizationSettings,
    pub display: DisplaySettings,
}

enum FileFormat {
    Json,
    Toml,
}

fn file_format(path: &Path) -> ConfigResult<FileFormat> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(FileFormat::Json),
        Some("toml") => Ok(FileFormat::Toml),
        other => Err(ConfigError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}

fn require_positive(key: &str, value: f32) -> ConfigResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::ValueOutOfRange {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

fn require_nonzero(key: &str, value: u64) -> ConfigResult<()> {
    if value > 0 {
        Ok(())
    } else {
        Err(ConfigError::ValueOutOfRange {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

impl PlannerConfig {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config file location (`<config dir>/pathkit/planner.toml`)
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no config directory on this platform".to_string())
            })
    }

    /// Load the config at the default location, falling back to defaults when absent
    pub fn load_or_default() -> SettingsResult<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = file_format(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::LoadError(format!("{}: {}", path.display(), e)))?;

        let config: Self = match format {
            FileFormat::Json => serde_json::from_str(&content)?,
            FileFormat::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        debug!("Loaded planner config from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match file_format(path)? {
            FileFormat::Json => serde_json::to_string_pretty(self)?,
            FileFormat::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| SettingsError::ConfigDirectory(e.to_string()))?;
            }
        }
        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        let machine = &self.machine;
        require_positive("machine.max_acceleration", machine.max_acceleration)?;
        require_positive("machine.default_feed_rate", machine.default_feed_rate)?;
        require_positive("machine.travel_feed_rate", machine.travel_feed_rate)?;
        if machine.work_offsets.len() != WORK_OFFSET_COUNT {
            return Err(ConfigError::WrongLength {
                key: "machine.work_offsets".to_string(),
                expected: WORK_OFFSET_COUNT,
                found: machine.work_offsets.len(),
            });
        }

        let disc = &self.discretization;
        require_nonzero("discretization.line_sim_steps", disc.line_sim_steps as u64)?;
        require_positive("discretization.arc_tolerance", disc.arc_tolerance)?;
        require_nonzero("discretization.max_arc_steps", disc.max_arc_steps as u64)?;
        // A run needs room for the seed vertex plus at least one new point
        if disc.max_run_points < 2 {
            return Err(ConfigError::ValueOutOfRange {
                key: "discretization.max_run_points".to_string(),
                value: disc.max_run_points.to_string(),
            });
        }
        if !(disc.dwell_interval.is_finite() && disc.dwell_interval >= 0.0) {
            return Err(ConfigError::ValueOutOfRange {
                key: "discretization.dwell_interval".to_string(),
                value: disc.dwell_interval.to_string(),
            });
        }

        Ok(())
    }
}
