//! G-Code interpreter
//!
//! Walks tokenized command lines, tracks the modal state and emits one
//! [`Fragment`] per straight or circular move. Every fragment is also
//! handed to a [`FragmentSink`] as soon as it is created.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use pathkit_core::{Diagnostics, PlanningError};
use pathkit_settings::{PlannerConfig, Strictness, WORK_OFFSET_COUNT};
use tracing::{debug, trace};

use super::command::{AxisWords, CommandLine};
use super::modal::{self, DistanceMode, ModalEffect, MotionMode, PathControl};
use crate::planner::{ArcGeometry, Fragment, Plane, SpeedTag};

/// Minimum per-axis displacement for a straight move to produce a fragment
const MIN_MOVE: f32 = 1e-5;

/// Centre offsets at or below this length describe no circle
const MIN_ARC_RADIUS: f32 = 1e-6;

/// Relative slack on `4R² - d²` before an R-form arc is rejected
const ARC_RADIUS_SLACK: f32 = 1e-6;

/// Receives fragments in creation order
pub trait FragmentSink {
    fn on_fragment(&mut self, fragment: &Fragment);
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl FragmentSink for NullSink {
    fn on_fragment(&mut self, _fragment: &Fragment) {}
}

impl<F: FnMut(&Fragment)> FragmentSink for F {
    fn on_fragment(&mut self, fragment: &Fragment) {
        self(fragment)
    }
}

/// Interpreter state
///
/// Tracks the modal groups that influence geometry:
/// - Motion mode (G0, G1, G2, G3, G80)
/// - Plane selection (G17, G18, G19)
/// - Distance mode (G90, G91)
/// - Coordinate system (G54..G59.3)
/// - Path control (G61, G61.1, G64)
pub struct MachineState<S: FragmentSink> {
    position: Vec3,
    line_no: u32,
    motion_mode: MotionMode,
    distance_mode: DistanceMode,
    plane: Plane,
    path_control: PathControl,
    /// units/min
    feed_rate: f32,
    /// units/min
    travel_feed_rate: f32,
    origins: [Vec3; WORK_OFFSET_COUNT],
    current_origin: usize,
    strictness: Strictness,
    path: Vec<Fragment>,
    diagnostics: Diagnostics,
    sink: S,
}

impl<S: FragmentSink> MachineState<S> {
    pub fn new(config: &PlannerConfig, sink: S) -> Self {
        let mut origins = [Vec3::ZERO; WORK_OFFSET_COUNT];
        for (origin, offset) in origins.iter_mut().zip(&config.machine.work_offsets) {
            *origin = Vec3::from_array(*offset);
        }

        Self {
            position: Vec3::from_array(config.machine.initial_position),
            line_no: 0,
            motion_mode: MotionMode::default(),
            distance_mode: DistanceMode::default(),
            plane: Plane::default(),
            path_control: PathControl::default(),
            feed_rate: config.machine.default_feed_rate,
            travel_feed_rate: config.machine.travel_feed_rate,
            origins,
            current_origin: 1,
            strictness: config.interpreter.strictness,
            path: Vec::new(),
            diagnostics: Diagnostics::new(),
            sink,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn motion_mode(&self) -> MotionMode {
        self.motion_mode
    }

    pub fn distance_mode(&self) -> DistanceMode {
        self.distance_mode
    }

    pub fn plane(&self) -> Plane {
        self.plane
    }

    pub fn path_control(&self) -> PathControl {
        self.path_control
    }

    pub fn feed_rate(&self) -> f32 {
        self.feed_rate
    }

    pub fn current_origin(&self) -> usize {
        self.current_origin
    }

    pub fn path(&self) -> &[Fragment] {
        &self.path
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consume the interpreter, returning the path, the sink and the diagnostics
    pub fn into_parts(self) -> (Vec<Fragment>, S, Diagnostics) {
        (self.path, self.sink, self.diagnostics)
    }

    /// Interpret a whole program
    pub fn execute_all<'a>(&mut self, program: impl IntoIterator<Item = &'a CommandLine>) {
        for line in program {
            self.execute(line);
        }
        debug!(
            "Interpreted program: {} fragments, {} diagnostics",
            self.path.len(),
            self.diagnostics.len()
        );
    }

    /// Interpret one line
    ///
    /// The F word is applied first, then the G words in source order, then
    /// any motion the axis words request in the resulting motion mode.
    pub fn execute(&mut self, line: &CommandLine) {
        self.line_no = line.line_no;

        if let Some(feed_rate) = line.value('F') {
            if feed_rate > 0.0 {
                self.feed_rate = feed_rate;
            } else {
                self.diagnostics.push(PlanningError::NonPositiveFeedRate {
                    line_number: self.line_no,
                    feed_rate,
                });
            }
        }

        for word in line.g_words() {
            let code = word.canonical_code();
            match modal::lookup(&code) {
                Some(effect) => self.apply_effect(effect, code),
                None => self.report_ignored(PlanningError::UnknownCode {
                    line_number: self.line_no,
                    code,
                }),
            }
        }

        let axes = line.axis_words();
        if axes.is_empty() {
            return;
        }

        match self.motion_mode {
            MotionMode::Rapid => self.move_straight(axes, SpeedTag::Rapid),
            MotionMode::Linear => self.move_straight(axes, SpeedTag::Normal),
            MotionMode::ArcCw => self.move_arc(line, axes, true),
            MotionMode::ArcCcw => self.move_arc(line, axes, false),
            MotionMode::Cancel => {
                trace!("Line {}: axis words ignored after G80", self.line_no);
            }
        }
    }

    fn apply_effect(&mut self, effect: ModalEffect, code: String) {
        match effect {
            ModalEffect::NoOp => {}
            ModalEffect::Unsupported => self.report_ignored(PlanningError::UnsupportedCode {
                line_number: self.line_no,
                code,
            }),
            ModalEffect::SetMotionMode(mode) => self.motion_mode = mode,
            ModalEffect::SetPlane(plane) => self.plane = plane,
            ModalEffect::SetOrigin(index) => self.current_origin = index,
            ModalEffect::SetPathControl(control) => self.path_control = control,
            ModalEffect::SetDistanceMode(mode) => self.distance_mode = mode,
        }
    }

    fn report_ignored(&mut self, error: PlanningError) {
        match self.strictness {
            Strictness::Strict => self.diagnostics.push(error),
            Strictness::Lenient => trace!("Ignored: {}", error),
        }
    }

    /// Resolve axis words into a machine position
    ///
    /// The active origin offset applies only to the axes present on the line.
    fn absolute_point(&self, axes: AxisWords) -> Vec3 {
        let origin = self.origins[self.current_origin];
        let mut point = self.position;
        for axis in 0..3 {
            if let Some(value) = axes.get(axis) {
                point[axis] = self
                    .distance_mode
                    .apply(self.position[axis], value + origin[axis]);
            }
        }
        point
    }

    fn add_fragment(&mut self, mut fragment: Fragment) {
        fragment.index = self.path.len();
        trace!(
            "Fragment {} (line {}): {:?} -> {:?}",
            fragment.index,
            fragment.line_no,
            fragment.from,
            fragment.to
        );
        self.sink.on_fragment(&fragment);
        self.position = fragment.to;
        self.path.push(fragment);
    }

    fn move_straight(&mut self, axes: AxisWords, speed_tag: SpeedTag) {
        let target = self.absolute_point(axes);
        let moved = (target - self.position).abs().max_element() > MIN_MOVE;
        if !moved {
            return;
        }

        let feed_rate = match speed_tag {
            SpeedTag::Rapid => self.travel_feed_rate,
            SpeedTag::Normal => self.feed_rate,
        };
        let fragment = Fragment::line(self.position, target, feed_rate, self.line_no, speed_tag);
        self.add_fragment(fragment);
    }

    fn move_arc(&mut self, line: &CommandLine, axes: AxisWords, clockwise: bool) {
        let target = self.absolute_point(axes);
        let plane = self.plane;

        let circle = match self.find_circle(line, target, clockwise) {
            Ok(circle) => circle,
            Err(error) => {
                self.diagnostics.push(error);
                return;
            }
        };

        let start = plane.project(self.position);
        let to_target = plane.project(target) - start - circle.to_center;
        let to_center = circle.to_center;
        let mut angular_distance = (-to_center.x * to_target.y + to_center.y * to_target.x)
            .atan2(-to_center.x * to_target.x - to_center.y * to_target.y);
        if clockwise && angular_distance >= 0.0 {
            angular_distance -= TAU;
        } else if !clockwise && angular_distance <= 0.0 {
            angular_distance += TAU;
        }

        let geometry = ArcGeometry {
            plane,
            center: start + to_center,
            from_angle: (-to_center.y).atan2(-to_center.x),
            angular_distance,
            radius: circle.radius,
        };
        let fragment = Fragment::arc(
            geometry,
            self.position,
            target,
            self.feed_rate,
            self.line_no,
            SpeedTag::Normal,
        );
        self.add_fragment(fragment);
    }

    /// Centre (relative to the current position) and radius of an arc move
    fn find_circle(
        &self,
        line: &CommandLine,
        target: Vec3,
        clockwise: bool,
    ) -> Result<Circle, PlanningError> {
        let plane = self.plane;
        let line_number = self.line_no;

        if let Some(programmed_radius) = line.value('R') {
            let chord = plane.project(target) - plane.project(self.position);
            let chord_sq = chord.length_squared();
            let diameter_sq = 4.0 * programmed_radius * programmed_radius;
            let invalid = |reason: &str| PlanningError::InvalidArcRadius {
                line_number,
                radius: programmed_radius,
                reason: reason.to_string(),
            };

            if chord_sq <= MIN_ARC_RADIUS * MIN_ARC_RADIUS {
                return Err(invalid("start and end point coincide"));
            }
            let mut discriminant = diameter_sq - chord_sq;
            if discriminant < 0.0 {
                if discriminant < -ARC_RADIUS_SLACK * diameter_sq.max(chord_sq) {
                    return Err(invalid("radius too small for the chord"));
                }
                discriminant = 0.0;
            }

            let mut height = -discriminant.sqrt() / chord_sq.sqrt();
            if !clockwise {
                height = -height;
            }
            // Negative R selects the arc longer than a half circle
            let mut radius = programmed_radius;
            if radius < 0.0 {
                height = -height;
                radius = -radius;
            }

            let to_center = Vec2::new(
                0.5 * (chord.x - chord.y * height),
                0.5 * (chord.y + chord.x * height),
            );
            return Ok(Circle { to_center, radius });
        }

        let first = line.value(plane.first_center_letter);
        let second = line.value(plane.second_center_letter);
        if first.is_none() && second.is_none() {
            return Err(PlanningError::AmbiguousArc { line_number });
        }

        let to_center = Vec2::new(first.unwrap_or(0.0), second.unwrap_or(0.0));
        let radius = to_center.length();
        if radius <= MIN_ARC_RADIUS {
            return Err(PlanningError::DegenerateArc { line_number });
        }
        Ok(Circle { to_center, radius })
    }
}

struct Circle {
    to_center: Vec2,
    radius: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::FragmentKind;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn state() -> MachineState<NullSink> {
        MachineState::new(&PlannerConfig::default(), NullSink)
    }

    fn arc_of(fragment: &Fragment) -> ArcGeometry {
        match fragment.kind {
            FragmentKind::Arc(arc) => arc,
            FragmentKind::Line => panic!("expected an arc"),
        }
    }

    #[test]
    fn test_defaults() {
        let state = state();
        assert_eq!(state.position(), Vec3::ZERO);
        assert_eq!(state.motion_mode(), MotionMode::Rapid);
        assert_eq!(state.distance_mode(), DistanceMode::Absolute);
        assert_eq!(state.plane(), Plane::XY);
        assert_eq!(state.path_control(), PathControl::ExactPath);
        assert_eq!(state.current_origin(), 1);
        assert_eq!(state.feed_rate(), 900.0);
    }

    #[test]
    fn test_rapid_then_linear() {
        let mut state = state();
        state.execute(&CommandLine::from_pairs(1, &[('X', 5.0)]));
        state.execute(&CommandLine::from_pairs(
            2,
            &[('G', 1.0), ('Y', 3.0), ('F', 600.0)],
        ));

        let path = state.path();
        assert_eq!(path.len(), 2);
        assert_eq!(path[0].speed_tag, SpeedTag::Rapid);
        assert_eq!(path[0].feed_rate, 900.0);
        assert_eq!(path[1].speed_tag, SpeedTag::Normal);
        assert_eq!(path[1].feed_rate, 600.0);
        assert_eq!(path[1].from, Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(path[1].to, Vec3::new(5.0, 3.0, 0.0));
        assert_eq!(path[1].index, 1);
        assert_eq!(path[1].line_no, 2);
    }

    #[test]
    fn test_no_motion_for_tiny_move() {
        let mut state = state();
        state.execute(&CommandLine::from_pairs(1, &[('G', 1.0), ('X', 0.000001)]));
        assert!(state.path().is_empty());
        assert_eq!(state.position(), Vec3::ZERO);
    }

    #[test]
    fn test_tiny_incremental_moves_do_not_drift() {
        let mut state = state();
        state.execute(&CommandLine::from_pairs(1, &[('G', 1.0), ('X', 10.0)]));
        state.execute(&CommandLine::from_pairs(2, &[('G', 91.0)]));
        for line_no in 3..203 {
            state.execute(&CommandLine::from_pairs(line_no, &[('Y', 0.000009)]));
        }
        state.execute(&CommandLine::from_pairs(203, &[('X', 5.0)]));

        let path = state.path();
        assert_eq!(path.len(), 2);
        assert_eq!(path[0].to, path[1].from);
        assert_eq!(path[1].to, Vec3::new(15.0, 0.0, 0.0));
    }

    #[test]
    fn test_incremental_mode() {
        let mut state = state();
        state.execute(&CommandLine::from_pairs(1, &[('G', 91.0), ('G', 1.0), ('X', 2.0)]));
        state.execute(&CommandLine::from_pairs(2, &[('X', 2.0), ('Y', 1.0)]));
        assert_eq!(state.position(), Vec3::new(4.0, 1.0, 0.0));
    }

    #[test]
    fn test_origin_offset_applies_to_given_axes_only() {
        let mut config = PlannerConfig::default();
        config.machine.work_offsets[2] = [10.0, 20.0, 30.0];
        let mut state = MachineState::new(&config, NullSink);

        state.execute(&CommandLine::from_pairs(1, &[('G', 55.0), ('G', 1.0), ('X', 1.0)]));
        assert_eq!(state.position(), Vec3::new(11.0, 0.0, 0.0));
    }

    #[test]
    fn test_arc_with_offsets() {
        let mut state = state();
        state.execute(&CommandLine::from_pairs(
            1,
            &[('G', 2.0), ('X', 10.0), ('Y', 0.0), ('I', 5.0), ('J', 0.0)],
        ));

        let arc = arc_of(&state.path()[0]);
        assert_eq!(arc.radius, 5.0);
        assert_eq!(arc.center, Vec2::new(5.0, 0.0));
        assert!((arc.angular_distance + PI).abs() < 1e-5);
        assert!((arc.from_angle.abs() - PI).abs() < 1e-5);
    }

    #[test]
    fn test_full_circle() {
        let mut state = state();
        state.execute(&CommandLine::from_pairs(
            1,
            &[('G', 2.0), ('X', 0.0), ('Y', 0.0), ('I', 10.0), ('J', 0.0)],
        ));

        let fragment = &state.path()[0];
        let arc = arc_of(fragment);
        assert_eq!(arc.radius, 10.0);
        assert!((arc.angular_distance.abs() - TAU).abs() < 1e-5);
        assert!((fragment.length - 20.0 * PI).abs() < 1e-3);
    }

    #[test]
    fn test_radius_form_minor_and_major_arc() {
        let mut minor = state();
        minor.execute(&CommandLine::from_pairs(
            1,
            &[('G', 2.0), ('X', 10.0), ('R', 10.0)],
        ));
        let arc = arc_of(&minor.path()[0]);
        assert!(arc.center.y < 0.0);
        assert!(arc.angular_distance < 0.0 && arc.angular_distance > -PI);

        let mut major = state();
        major.execute(&CommandLine::from_pairs(
            1,
            &[('G', 2.0), ('X', 10.0), ('R', -10.0)],
        ));
        let arc = arc_of(&major.path()[0]);
        assert_eq!(arc.radius, 10.0);
        assert!(arc.angular_distance < -PI);
    }

    #[test]
    fn test_radius_form_half_circle() {
        let mut state = state();
        state.execute(&CommandLine::from_pairs(
            1,
            &[('G', 3.0), ('X', 10.0), ('R', 5.0)],
        ));
        let arc = arc_of(&state.path()[0]);
        assert!(arc.center.distance(Vec2::new(5.0, 0.0)) < 1e-4);
        assert!((arc.angular_distance - PI).abs() < 1e-4);
    }

    #[test]
    fn test_arc_in_xz_plane() {
        let mut state = state();
        state.execute(&CommandLine::from_pairs(
            1,
            &[('G', 18.0), ('G', 2.0), ('X', 5.0), ('Z', 5.0), ('I', 0.0), ('K', 5.0)],
        ));
        let fragment = &state.path()[0];
        let arc = arc_of(fragment);
        assert_eq!(arc.plane, Plane::XZ);
        assert_eq!(arc.radius, 5.0);
        assert!((arc.angular_distance + FRAC_PI_2).abs() < 1e-5);
        assert!(fragment.point_at_ratio(1.0).distance(fragment.to) < 1e-4);
    }

    #[test]
    fn test_arc_errors_are_recorded() {
        let mut state = state();
        state.execute(&CommandLine::from_pairs(1, &[('G', 2.0), ('X', 10.0)]));
        state.execute(&CommandLine::from_pairs(2, &[('X', 20.0), ('I', 0.0), ('J', 0.0)]));
        state.execute(&CommandLine::from_pairs(3, &[('X', 30.0), ('R', 1.0)]));
        state.execute(&CommandLine::from_pairs(4, &[('X', 0.0), ('Y', 0.0), ('R', 1.0)]));

        assert!(state.path().is_empty());
        let errors: Vec<_> = state.diagnostics().iter().cloned().collect();
        assert_eq!(errors[0], PlanningError::AmbiguousArc { line_number: 1 });
        assert_eq!(errors[1], PlanningError::DegenerateArc { line_number: 2 });
        assert!(matches!(
            errors[2],
            PlanningError::InvalidArcRadius { line_number: 3, .. }
        ));
        assert!(matches!(
            errors[3],
            PlanningError::InvalidArcRadius { line_number: 4, .. }
        ));
        assert_eq!(state.position(), Vec3::ZERO);
    }

    #[test]
    fn test_arc_without_axis_words_is_noop() {
        let mut state = state();
        state.execute(&CommandLine::from_pairs(1, &[('G', 2.0), ('I', 5.0)]));
        assert!(state.path().is_empty());
        assert!(state.diagnostics().is_empty());
    }

    #[test]
    fn test_non_positive_feed_rate_keeps_previous() {
        let mut state = state();
        state.execute(&CommandLine::from_pairs(1, &[('F', 300.0)]));
        state.execute(&CommandLine::from_pairs(2, &[('F', 0.0)]));
        assert_eq!(state.feed_rate(), 300.0);
        assert_eq!(
            state.diagnostics().iter().next(),
            Some(&PlanningError::NonPositiveFeedRate {
                line_number: 2,
                feed_rate: 0.0
            })
        );
    }

    #[test]
    fn test_strictness() {
        let program = [
            CommandLine::from_pairs(1, &[('G', 21.0)]),
            CommandLine::from_pairs(2, &[('G', 33.0)]),
            CommandLine::from_pairs(3, &[('G', 94.0)]),
        ];

        let mut lenient = state();
        lenient.execute_all(&program);
        assert!(lenient.diagnostics().is_empty());

        let mut config = PlannerConfig::default();
        config.interpreter.strictness = Strictness::Strict;
        let mut strict = MachineState::new(&config, NullSink);
        strict.execute_all(&program);
        let errors: Vec<_> = strict.diagnostics().iter().cloned().collect();
        assert_eq!(
            errors,
            vec![
                PlanningError::UnsupportedCode {
                    line_number: 1,
                    code: "21".to_string()
                },
                PlanningError::UnknownCode {
                    line_number: 2,
                    code: "33".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_cancel_mode_ignores_axes() {
        let mut state = state();
        state.execute(&CommandLine::from_pairs(1, &[('G', 80.0), ('X', 5.0)]));
        assert!(state.path().is_empty());
        assert_eq!(state.position(), Vec3::ZERO);
    }

    #[test]
    fn test_sink_sees_every_fragment() {
        let mut seen = Vec::new();
        let mut state = MachineState::new(&PlannerConfig::default(), |f: &Fragment| {
            seen.push(f.index)
        });
        state.execute(&CommandLine::from_pairs(1, &[('X', 1.0)]));
        state.execute(&CommandLine::from_pairs(2, &[('X', 2.0)]));
        drop(state);
        assert_eq!(seen, vec![0, 1]);
    }
}
