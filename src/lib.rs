//! # PathKit
//!
//! Toolpath trajectory planner for CNC programs. Reads a tokenized G-Code
//! program, plans a time-parameterized trajectory under an acceleration
//! limit and produces a flat vertex buffer for 3D rendering.
//!
//! ## Architecture
//!
//! PathKit is organized as a workspace with multiple crates:
//!
//! 1. **pathkit-core** - Error taxonomy, diagnostics, unit helpers
//! 2. **pathkit-settings** - Planner configuration and file I/O
//! 3. **pathkit-planner** - Interpreter, velocity planner, discretizer, vertex buffer
//! 4. **pathkit** - Command line front end that ties the crates together

use std::fs;
use std::path::Path;

use glam::Vec3;
use pathkit_core::units::{format_duration, format_feed_rate, format_length};
use pathkit_core::MeasurementSystem;
use pathkit_planner::{CommandLine, SimulationSummary, VertexData};
use pathkit_settings::DisplaySettings;

pub use pathkit_core::{Diagnostics, Error, PlanningError, Result};
pub use pathkit_planner::{program_from_json, SimulationResult, Simulator};
pub use pathkit_settings::{AxisConvention, PlannerConfig, Strictness};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Pretty formatting on stderr, keeping stdout free for results
/// - RUST_LOG environment variable support
///
/// With `enabled` false nothing is installed and all events are dropped.
pub fn init_logging(enabled: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    if !enabled {
        return Ok(());
    }

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing::Level::INFO.to_string()));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {}", e))?;

    Ok(())
}

/// Read a tokenized program (JSON array of command lines)
pub fn load_program(path: &Path) -> Result<Vec<CommandLine>> {
    let content = fs::read_to_string(path)?;
    let program = program_from_json(&content)?;
    tracing::debug!("Loaded {} command lines from {}", program.len(), path.display());
    Ok(program)
}

/// Write a vertex buffer; `.bin` gets raw little-endian floats, anything else JSON
pub fn write_vertex_data(path: &Path, data: &VertexData) -> Result<()> {
    let is_binary = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("bin"));

    if is_binary {
        fs::write(path, data.as_bytes())?;
    } else {
        let json = serde_json::json!({
            "vertices": data.as_floats(),
            "bounds": data.bounds,
        });
        fs::write(path, serde_json::to_string(&json)?)?;
    }
    Ok(())
}

/// Human-readable run report
pub fn format_summary(summary: &SimulationSummary, display: &DisplaySettings) -> String {
    let system = display.measurement_system;
    let unit = match system {
        MeasurementSystem::Metric => "mm",
        MeasurementSystem::Imperial => "in",
    };
    let point = |p: Vec3| {
        format!(
            "({}, {}, {})",
            format_length(p.x, system),
            format_length(p.y, system),
            format_length(p.z, system)
        )
    };

    let mut lines = vec![
        format!(
            "fragments: {} in {} groups",
            summary.fragments, summary.groups
        ),
        format!("vertices:  {} in {} runs", summary.vertices, summary.runs),
        format!(
            "length:    {} {}",
            format_length(summary.path_length, system),
            unit
        ),
        format!("time:      {}", format_duration(summary.total_time)),
    ];
    if summary.max_feed_rate > 0.0 {
        lines.push(format!(
            "max feed:  {} {}",
            format_feed_rate(summary.max_feed_rate, display.feed_rate_units),
            display.feed_rate_units
        ));
    }
    if summary.bounds.is_valid() {
        lines.push(format!(
            "bounds:    {} to {} {}",
            point(summary.bounds.min()),
            point(summary.bounds.max()),
            unit
        ));
    }
    if summary.diagnostics > 0 {
        lines.push(format!(
            "problems:  {} ({} motions dropped)",
            summary.diagnostics, summary.dropped_motions
        ));
    }
    lines.join("\n")
}
