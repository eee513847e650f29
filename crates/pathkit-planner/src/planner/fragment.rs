//! Motion fragments
//!
//! A fragment is one straight or circular move produced by the interpreter.
//! The planner later attaches a speed profile to it as a list of
//! [`RunFragment`]s.

use std::f64::consts::PI;

use glam::{Vec2, Vec3};
use pathkit_core::units::feed_per_second;
use pathkit_settings::DiscretizationSettings;
use serde::{Deserialize, Serialize};

use super::Plane;

/// Share of the acceleration budget an arc may spend on centripetal acceleration
const MAX_RADIAL_ACCEL_SHARE: f32 = 0.8;

/// Rendering/planning tag of a fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SpeedTag {
    /// G0 travel
    Rapid,
    /// Programmed-feed motion
    #[default]
    Normal,
}

impl SpeedTag {
    /// Value written into the vertex buffer (rapid is 0, normal is 1)
    pub fn ordinal(self) -> u32 {
        match self {
            Self::Rapid => 0,
            Self::Normal => 1,
        }
    }
}

/// Phase of a speed profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeedType {
    Accel,
    Const,
    Decel,
}

/// One phase of a fragment's speed profile
///
/// Positions are distances along the fragment; speeds are squared, in
/// (units/s)².
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunFragment {
    pub speed_type: SpeedType,
    pub start_x: f32,
    pub stop_x: f32,
    pub from_sq_speed: f32,
    pub to_sq_speed: f32,
    /// Cruise speed for [`SpeedType::Const`], peak otherwise
    pub squared_speed: f32,
    /// Seconds
    pub duration: f32,
}

impl RunFragment {
    #[inline]
    pub fn length(&self) -> f32 {
        self.stop_x - self.start_x
    }
}

/// Circular geometry of an arc fragment, in plane coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcGeometry {
    pub plane: Plane,
    pub center: Vec2,
    /// Start angle in radians
    pub from_angle: f32,
    /// Signed sweep in radians, negative for clockwise
    pub angular_distance: f32,
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FragmentKind {
    Line,
    Arc(ArcGeometry),
}

/// A single straight or circular move
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    /// Position in the program's fragment sequence
    pub index: usize,
    pub kind: FragmentKind,
    pub from: Vec3,
    pub to: Vec3,
    /// Programmed feed rate, units/min
    pub feed_rate: f32,
    pub line_no: u32,
    pub speed_tag: SpeedTag,
    pub length: f32,
    /// Peak squared speed; set by grouping, lowered by planning
    pub squared_speed: f32,
    /// Tangential acceleration budget, units/s²
    pub max_accel: f32,
    /// Seconds
    pub duration: f32,
    /// Virtual distance needed to reach the entry speed from rest
    pub accel_len: f32,
    /// Virtual distance needed to stop from the exit speed
    pub decel_len: f32,
    pub run_fragments: Vec<RunFragment>,
}

impl Fragment {
    fn with_kind(
        kind: FragmentKind,
        from: Vec3,
        to: Vec3,
        feed_rate: f32,
        line_no: u32,
        speed_tag: SpeedTag,
    ) -> Self {
        let mut fragment = Self {
            index: 0,
            kind,
            from,
            to,
            feed_rate,
            line_no,
            speed_tag,
            length: 0.0,
            squared_speed: 0.0,
            max_accel: 0.0,
            duration: 0.0,
            accel_len: 0.0,
            decel_len: 0.0,
            run_fragments: Vec::new(),
        };
        fragment.length = fragment.compute_length();
        fragment
    }

    pub fn line(from: Vec3, to: Vec3, feed_rate: f32, line_no: u32, speed_tag: SpeedTag) -> Self {
        Self::with_kind(FragmentKind::Line, from, to, feed_rate, line_no, speed_tag)
    }

    pub fn arc(
        geometry: ArcGeometry,
        from: Vec3,
        to: Vec3,
        feed_rate: f32,
        line_no: u32,
        speed_tag: SpeedTag,
    ) -> Self {
        Self::with_kind(
            FragmentKind::Arc(geometry),
            from,
            to,
            feed_rate,
            line_no,
            speed_tag,
        )
    }

    pub fn is_arc(&self) -> bool {
        matches!(self.kind, FragmentKind::Arc(_))
    }

    /// Path length; arcs include the helical rise along the plane normal
    pub fn compute_length(&self) -> f32 {
        match &self.kind {
            FragmentKind::Line => self.from.distance(self.to),
            FragmentKind::Arc(arc) => {
                let planar = arc.radius * arc.angular_distance.abs();
                let rise = arc.plane.normal(self.to) - arc.plane.normal(self.from);
                planar.hypot(rise)
            }
        }
    }

    /// Unit tangent at the start
    pub fn entry_dir(&self) -> Vec3 {
        match &self.kind {
            FragmentKind::Line => (self.to - self.from).normalize_or_zero(),
            FragmentKind::Arc(arc) => self.arc_tangent(arc, arc.from_angle),
        }
    }

    /// Unit tangent at the end
    pub fn exit_dir(&self) -> Vec3 {
        match &self.kind {
            FragmentKind::Line => (self.to - self.from).normalize_or_zero(),
            FragmentKind::Arc(arc) => {
                self.arc_tangent(arc, arc.from_angle + arc.angular_distance)
            }
        }
    }

    fn arc_tangent(&self, arc: &ArcGeometry, angle: f32) -> Vec3 {
        let sweep = arc.angular_distance;
        let sign = if sweep < 0.0 { -1.0 } else { 1.0 };
        let (sin, cos) = angle.sin_cos();
        let planar_len = arc.radius * sweep.abs();
        let rise = arc.plane.normal(self.to) - arc.plane.normal(self.from);
        let slope = if planar_len > 0.0 { rise / planar_len } else { 0.0 };
        arc.plane
            .compose(Vec2::new(-sign * sin, sign * cos), slope)
            .normalize_or_zero()
    }

    /// Point at `ratio` of the way along the fragment, `ratio` in `[0, 1]`
    pub fn point_at_ratio(&self, ratio: f32) -> Vec3 {
        match &self.kind {
            FragmentKind::Line => self.from + (self.to - self.from) * ratio,
            FragmentKind::Arc(arc) => {
                let angle = arc.from_angle + arc.angular_distance * ratio;
                let (sin, cos) = angle.sin_cos();
                let in_plane = arc.center + Vec2::new(cos, sin) * arc.radius;
                let from_normal = arc.plane.normal(self.from);
                let rise = arc.plane.normal(self.to) - from_normal;
                arc.plane.compose(in_plane, from_normal + rise * ratio)
            }
        }
    }

    /// Peak squared speed and tangential acceleration for this fragment
    ///
    /// Arcs cap the speed so that centripetal acceleration stays within
    /// [`MAX_RADIAL_ACCEL_SHARE`] of `max_accel`, and give the remainder of
    /// the budget to tangential acceleration.
    pub fn speed_limits(&self, max_accel: f32) -> (f32, f32) {
        let speed = feed_per_second(self.feed_rate);
        let mut squared_speed = speed * speed;
        match &self.kind {
            FragmentKind::Line => (squared_speed, max_accel),
            FragmentKind::Arc(arc) => {
                let mut radial_accel = squared_speed / arc.radius;
                let radial_cap = MAX_RADIAL_ACCEL_SHARE * max_accel;
                if radial_accel > radial_cap {
                    squared_speed = radial_cap * arc.radius;
                    radial_accel = radial_cap;
                }
                let tangential = (max_accel * max_accel - radial_accel * radial_accel)
                    .max(0.0)
                    .sqrt();
                (squared_speed, tangential)
            }
        }
    }

    /// Number of samples to emit for this fragment
    pub fn sim_steps(&self, settings: &DiscretizationSettings) -> u32 {
        match &self.kind {
            FragmentKind::Line => settings.line_sim_steps.max(1),
            FragmentKind::Arc(arc) => arc_steps(
                arc.radius,
                arc.angular_distance,
                settings.arc_tolerance,
                settings.max_arc_steps,
            ),
        }
    }

    /// Geometric polyline with `steps` segments, both end points included
    pub fn polyline(&self, steps: u32) -> Vec<Vec3> {
        let steps = steps.max(1);
        (0..=steps)
            .map(|j| self.point_at_ratio(j as f32 / steps as f32))
            .collect()
    }
}

/// Chord count keeping the sagitta of each chord within `tolerance`
fn arc_steps(radius: f32, angular_distance: f32, tolerance: f32, max_steps: u32) -> u32 {
    let max_steps = max_steps.max(1);
    let ratio = f64::from(tolerance) / f64::from(radius);
    if !(ratio < 2.0) {
        return 1;
    }
    let per_circle = PI / (1.0 - ratio).acos();
    let steps = (per_circle * f64::from(angular_distance.abs()) / (2.0 * PI)).ceil();
    if !steps.is_finite() || steps >= f64::from(max_steps) {
        max_steps
    } else {
        (steps as u32).max(1)
    }
}
