//! Modal G-Code table
//!
//! Maps canonical G-Code numbers to their effect on the interpreter state.
//! Codes missing from the table are unknown; codes present but without an
//! implemented effect are unsupported.

use serde::{Deserialize, Serialize};

use crate::planner::Plane;

/// Motion mode - Group 1 (G0, G1, G2, G3, G80)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MotionMode {
    #[default]
    Rapid,
    Linear,
    ArcCw,
    ArcCcw,
    /// G80: axis words no longer produce motion
    Cancel,
}

/// Distance mode - Group 3 (G90, G91)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceMode {
    #[default]
    Absolute,
    Incremental,
}

impl DistanceMode {
    /// Resolve a programmed coordinate against the current one
    #[inline]
    pub fn apply(self, current: f32, programmed: f32) -> f32 {
        match self {
            Self::Absolute => programmed,
            Self::Incremental => current + programmed,
        }
    }
}

/// Path control - Group 13 (G61, G61.1, G64)
///
/// Tracked for completeness; the planner always blends continuous fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PathControl {
    #[default]
    ExactPath,
    ExactStop,
    Continuous,
}

/// What a G-Code does to the interpreter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModalEffect {
    /// Recognised and intentionally ignored (G4, G49, G94)
    NoOp,
    /// Recognised but not implemented (G20, G21, G40, G41, G42)
    Unsupported,
    SetMotionMode(MotionMode),
    SetPlane(Plane),
    /// Select a coordinate origin by index (G54 is 1, G59.3 is 9)
    SetOrigin(usize),
    SetPathControl(PathControl),
    SetDistanceMode(DistanceMode),
}

/// Look up a canonical code number (`"1"`, `"59.1"`, ...)
pub fn lookup(code: &str) -> Option<ModalEffect> {
    let effect = match code {
        "0" => ModalEffect::SetMotionMode(MotionMode::Rapid),
        "1" => ModalEffect::SetMotionMode(MotionMode::Linear),
        "2" => ModalEffect::SetMotionMode(MotionMode::ArcCw),
        "3" => ModalEffect::SetMotionMode(MotionMode::ArcCcw),
        "80" => ModalEffect::SetMotionMode(MotionMode::Cancel),
        "4" | "49" | "94" => ModalEffect::NoOp,
        "20" | "21" | "40" | "41" | "42" => ModalEffect::Unsupported,
        "17" => ModalEffect::SetPlane(Plane::XY),
        "18" => ModalEffect::SetPlane(Plane::XZ),
        "19" => ModalEffect::SetPlane(Plane::YZ),
        "54" => ModalEffect::SetOrigin(1),
        "55" => ModalEffect::SetOrigin(2),
        "56" => ModalEffect::SetOrigin(3),
        "57" => ModalEffect::SetOrigin(4),
        "58" => ModalEffect::SetOrigin(5),
        "59" => ModalEffect::SetOrigin(6),
        "59.1" => ModalEffect::SetOrigin(7),
        "59.2" => ModalEffect::SetOrigin(8),
        "59.3" => ModalEffect::SetOrigin(9),
        "61" => ModalEffect::SetPathControl(PathControl::ExactPath),
        "61.1" => ModalEffect::SetPathControl(PathControl::ExactStop),
        "64" => ModalEffect::SetPathControl(PathControl::Continuous),
        "90" => ModalEffect::SetDistanceMode(DistanceMode::Absolute),
        "91" => ModalEffect::SetDistanceMode(DistanceMode::Incremental),
        _ => return None,
    };
    Some(effect)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motion_codes() {
        assert_eq!(
            lookup("2"),
            Some(ModalEffect::SetMotionMode(MotionMode::ArcCw))
        );
        assert_eq!(
            lookup("80"),
            Some(ModalEffect::SetMotionMode(MotionMode::Cancel))
        );
    }

    #[test]
    fn test_origin_indices() {
        assert_eq!(lookup("54"), Some(ModalEffect::SetOrigin(1)));
        assert_eq!(lookup("59"), Some(ModalEffect::SetOrigin(6)));
        assert_eq!(lookup("59.3"), Some(ModalEffect::SetOrigin(9)));
    }

    #[test]
    fn test_unsupported_and_unknown() {
        assert_eq!(lookup("21"), Some(ModalEffect::Unsupported));
        assert_eq!(lookup("4"), Some(ModalEffect::NoOp));
        assert_eq!(lookup("33"), None);
        assert_eq!(lookup("01"), None);
    }

    #[test]
    fn test_distance_mode_apply() {
        assert_eq!(DistanceMode::Absolute.apply(5.0, 2.0), 2.0);
        assert_eq!(DistanceMode::Incremental.apply(5.0, 2.0), 7.0);
    }
}
