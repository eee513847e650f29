//! Unit conversion utilities
//!
//! Programs express feed rates per minute while the planner works per
//! second. Also formats lengths, feed rates and durations for display.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Seconds per minute, the feed rate conversion factor
pub const SECONDS_PER_MINUTE: f32 = 60.0;

const MM_PER_INCH: f32 = 25.4;

/// Measurement system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementSystem {
    /// Metric system (mm)
    #[default]
    Metric,
    /// Imperial system (inches)
    Imperial,
}

impl fmt::Display for MeasurementSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metric => write!(f, "Metric"),
            Self::Imperial => write!(f, "Imperial"),
        }
    }
}

impl FromStr for MeasurementSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "metric" | "mm" => Ok(Self::Metric),
            "imperial" | "inch" | "in" => Ok(Self::Imperial),
            _ => Err(format!("Unknown measurement system: {}", s)),
        }
    }
}

/// Feed rate units selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeedRateUnits {
    /// Millimeters per minute
    #[default]
    MmPerMin,
    /// Millimeters per second
    MmPerSec,
    /// Inches per minute
    InPerMin,
    /// Inches per second
    InPerSec,
}

impl fmt::Display for FeedRateUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MmPerMin => write!(f, "mm/min"),
            Self::MmPerSec => write!(f, "mm/sec"),
            Self::InPerMin => write!(f, "in/min"),
            Self::InPerSec => write!(f, "in/sec"),
        }
    }
}

/// Convert a programmed feed rate (units/minute) into units/second
#[inline]
pub fn feed_per_second(feed_per_minute: f32) -> f32 {
    feed_per_minute / SECONDS_PER_MINUTE
}

/// Format length value for display
///
/// * `value_mm` - Value in millimeters
/// * `system` - Target measurement system
pub fn format_length(value_mm: f32, system: MeasurementSystem) -> String {
    match system {
        MeasurementSystem::Metric => format!("{:.3}", value_mm),
        MeasurementSystem::Imperial => format!("{:.3}", value_mm / MM_PER_INCH),
    }
}

/// Format feed rate value for display
///
/// * `value_mm_per_min` - Feed rate in mm/min
/// * `units` - Target feed rate units
pub fn format_feed_rate(value_mm_per_min: f32, units: FeedRateUnits) -> String {
    let value = match units {
        FeedRateUnits::MmPerMin => value_mm_per_min,
        FeedRateUnits::MmPerSec => feed_per_second(value_mm_per_min),
        FeedRateUnits::InPerMin => value_mm_per_min / MM_PER_INCH,
        FeedRateUnits::InPerSec => feed_per_second(value_mm_per_min / MM_PER_INCH),
    };
    format!("{:.3}", value)
}

/// Format an estimated run time as `h:mm:ss.s` (hours omitted when zero)
pub fn format_duration(seconds: f32) -> String {
    let seconds = seconds.max(0.0);
    let hours = (seconds / 3600.0).floor() as u32;
    let minutes = ((seconds % 3600.0) / 60.0).floor() as u32;
    let rest = seconds % 60.0;
    if hours > 0 {
        format!("{}:{:02}:{:04.1}", hours, minutes, rest)
    } else {
        format!("{}:{:04.1}", minutes, rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_per_second() {
        assert_eq!(feed_per_second(600.0), 10.0);
        assert_eq!(feed_per_second(0.0), 0.0);
    }

    #[test]
    fn test_format_feed_rate() {
        assert_eq!(format_feed_rate(600.0, FeedRateUnits::MmPerMin), "600.000");
        assert_eq!(format_feed_rate(600.0, FeedRateUnits::MmPerSec), "10.000");
        assert_eq!(format_feed_rate(254.0, FeedRateUnits::InPerMin), "10.000");
    }

    #[test]
    fn test_format_length() {
        assert_eq!(format_length(25.4, MeasurementSystem::Imperial), "1.000");
        assert_eq!(format_length(1.5, MeasurementSystem::Metric), "1.500");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(5.5), "0:05.5");
        assert_eq!(format_duration(125.0), "2:05.0");
        assert_eq!(format_duration(3725.0), "1:02:05.0");
    }

    #[test]
    fn test_measurement_system_from_str() {
        assert_eq!("mm".parse::<MeasurementSystem>(), Ok(MeasurementSystem::Metric));
        assert_eq!("IN".parse::<MeasurementSystem>(), Ok(MeasurementSystem::Imperial));
        assert!("furlong".parse::<MeasurementSystem>().is_err());
    }
}
