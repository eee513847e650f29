//! End-to-end runs of the simulator on small programs

mod common;

use glam::Vec3;
use pathkit_core::PlanningError;
use pathkit_planner::planner::{sample_at_ratio, FragmentKind, SpeedType, VERTEX_STRIDE};
use pathkit_planner::{program_from_json, SpeedTag, Simulator};
use pathkit_settings::{AxisConvention, PlannerConfig, Strictness};

use common::program;

#[test]
fn test_straight_line() {
    let result = Simulator::default().simulate(&program("G1 X10 F600"));
    assert!(result.diagnostics.is_empty());
    assert_eq!(result.groups.len(), 1);

    let fragment = &result.groups[0].fragments[0];
    assert_eq!(fragment.length, 10.0);
    assert_eq!(fragment.squared_speed, 100.0);
    let kinds: Vec<_> = fragment.run_fragments.iter().map(|r| r.speed_type).collect();
    assert_eq!(kinds, vec![SpeedType::Accel, SpeedType::Const, SpeedType::Decel]);

    let (peak_speed, _) = sample_at_ratio(fragment, 0.5);
    assert!((peak_speed - 10.0).abs() < 1e-3);

    // Start point, 40 samples along the line, 10 dwell markers
    let runs = result.accumulator.runs();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].len(), 51);
    assert_eq!(runs[0].vertices[0], Vec3::ZERO);
    assert_eq!(runs[0].times[0], 0.0);
    assert_eq!(runs[0].vertices[50], Vec3::new(10.0, 0.0, 0.0));
    assert!((result.total_time() - 1.02).abs() < 1e-4);

    let data = result.vertex_data(AxisConvention::ZUp);
    assert_eq!(data.as_floats().len(), 51 * VERTEX_STRIDE);
    assert!(data.vertices.iter().all(|v| v.speed_tag == 1.0));
    assert_eq!(data.bounds.max(), Vec3::new(10.0, 0.0, 0.0));
}

#[test]
fn test_full_circle() {
    let result = Simulator::default().simulate(&program("G2 X0 Y0 I10 J0"));
    assert_eq!(result.fragment_count(), 1);

    let fragment = &result.groups[0].fragments[0];
    let FragmentKind::Arc(arc) = fragment.kind else {
        panic!("expected an arc, got {:?}", fragment.kind);
    };
    assert_eq!(arc.radius, 10.0);
    assert!((arc.angular_distance.abs() - std::f32::consts::TAU).abs() < 1e-5);

    let vertices = &result.accumulator.runs()[0].vertices;
    let last_motion = vertices[vertices.len() - 1];
    assert!(last_motion.distance(Vec3::ZERO) < 1e-3);
    assert!(vertices
        .iter()
        .all(|v| (v.distance(Vec3::new(10.0, 0.0, 0.0)) - 10.0).abs() < 1e-3));

    let bounds = result.stats.bounds;
    assert!((bounds.max_x - 20.0).abs() < 1e-3);
    assert!((bounds.min_y + 10.0).abs() < 1e-3);
    assert!((bounds.max_y - 10.0).abs() < 1e-3);
}

#[test]
fn test_rapid_and_feed_runs() {
    let result = Simulator::default().simulate(&program("G0 X5\nG1 Y5 F600\nG0 X0"));
    let runs = result.accumulator.runs();
    let tags: Vec<_> = runs.iter().map(|r| r.speed_tag).collect();
    assert_eq!(tags, vec![SpeedTag::Rapid, SpeedTag::Normal, SpeedTag::Rapid]);
    for pair in runs.windows(2) {
        assert_eq!(pair[0].vertices.last(), pair[1].vertices.first());
    }

    let data = result.vertex_data(AxisConvention::ZUp);
    assert_eq!(data.vertices[0].speed_tag, 0.0);
    assert_eq!(data.len(), result.accumulator.vertex_count());
}

#[test]
fn test_small_run_budget() {
    let mut config = PlannerConfig::default();
    config.discretization.max_run_points = 8;
    let result = Simulator::new(config).simulate(&program("G1 X10 F600\nG1 X20"));

    let runs = result.accumulator.runs();
    assert!(runs.len() > 1);
    assert!(runs.iter().all(|r| r.len() <= 8 && r.len() >= 2));
    for pair in runs.windows(2) {
        assert_eq!(pair[0].vertices.last(), pair[1].vertices.first());
        assert_eq!(pair[0].times.last(), pair[1].times.first());
    }
}

#[test]
fn test_y_up_convention() {
    let result = Simulator::default().simulate(&program("G1 X1 Y2 Z3 F600"));
    let data = result.vertex_data(AxisConvention::YUp);
    let last = data.vertices[data.len() - 1];
    assert!(Vec3::from_array(last.position).distance(Vec3::new(1.0, 3.0, -2.0)) < 1e-5);
    assert!((data.bounds.min_z + 2.0).abs() < 1e-5);
    assert_eq!(data.bounds.max_z, 0.0);
}

#[test]
fn test_line_and_position_at_time() {
    let result = Simulator::default().simulate(&program("G1 X10 F600\nG1 Y10"));
    assert_eq!(result.groups.len(), 2);

    assert_eq!(result.line_at_time(0.1), Some(1));
    assert_eq!(result.line_at_time(result.total_time()), Some(2));

    let first_end = result.accumulator.segment_map()[0].end_time;
    // Dwell between the two groups belongs to the move that just finished
    assert_eq!(result.line_at_time(first_end + 0.005), Some(1));
    let position = result.position_at_time(first_end);
    assert!(position.is_some_and(|p| p.distance(Vec3::new(10.0, 0.0, 0.0)) < 1e-3));

    let end = result.position_at_time(result.total_time() + 1.0);
    assert!(end.is_some_and(|p| p.distance(Vec3::new(10.0, 10.0, 0.0)) < 1e-4));
}

#[test]
fn test_tiny_incremental_moves_keep_path_connected() {
    let mut source = String::from("G1 X10 F600\nG91\n");
    for _ in 0..200 {
        source.push_str("Y0.000009\n");
    }
    source.push_str("X5");

    let result = Simulator::default().simulate(&program(&source));
    let fragments: Vec<_> = result.fragments().collect();
    assert_eq!(fragments.len(), 2);
    assert_eq!(fragments[0].to, fragments[1].from);
    assert_eq!(fragments[1].to, Vec3::new(15.0, 0.0, 0.0));
}

#[test]
fn test_segment_map_vertex_ranges() {
    let result = Simulator::default().simulate(&program("G1 X10 F600\nG1 X20"));
    let map = result.accumulator.segment_map();
    assert_eq!(map.len(), 2);
    // Collinear moves share a group, so the second fragment starts where the first ended
    assert_eq!(map[0].vertex_range, 0..41);
    assert_eq!(map[1].vertex_range, 40..81);
    assert_eq!(map[0].end_time, map[1].start_time);

    let vertices: Vec<_> = result.accumulator.vertices().map(|(v, _)| v).collect();
    assert_eq!(vertices[40], Vec3::new(10.0, 0.0, 0.0));
}

#[test]
fn test_errors_do_not_abort() {
    let result = Simulator::default().simulate(&program("G2 X10\nG1 X5 F600\nF-1\nG1 X0"));
    assert_eq!(result.fragment_count(), 2);
    let errors: Vec<_> = result.diagnostics.iter().cloned().collect();
    assert_eq!(errors[0], PlanningError::AmbiguousArc { line_number: 1 });
    assert_eq!(
        errors[1],
        PlanningError::NonPositiveFeedRate {
            line_number: 3,
            feed_rate: -1.0
        }
    );
    assert_eq!(result.fragments().last().map(|f| f.feed_rate), Some(600.0));
}

#[test]
fn test_strict_and_lenient() {
    let source = "G21\nG1 X5 F100\nG33 X6";

    let lenient = Simulator::default().simulate(&program(source));
    assert!(lenient.diagnostics.is_empty());
    assert_eq!(lenient.fragment_count(), 2);

    let mut config = PlannerConfig::default();
    config.interpreter.strictness = Strictness::Strict;
    let strict = Simulator::new(config).simulate(&program(source));
    assert_eq!(strict.diagnostics.len(), 2);
    assert_eq!(strict.fragment_count(), 2);
}

#[test]
fn test_zero_padded_codes() {
    let result = Simulator::default().simulate(&program("G01 X10 F600\nG00 X0"));
    let tags: Vec<_> = result.fragments().map(|f| f.speed_tag).collect();
    assert_eq!(tags, vec![SpeedTag::Normal, SpeedTag::Rapid]);
}

#[test]
fn test_work_offsets() {
    let mut config = PlannerConfig::default();
    config.machine.work_offsets[7] = [100.0, 0.0, 0.0];
    let result = Simulator::new(config).simulate(&program("G59.1 G1 X1 F600"));
    assert_eq!(
        result.fragments().next().map(|f| f.to),
        Some(Vec3::new(101.0, 0.0, 0.0))
    );
}

#[test]
fn test_json_program() {
    let json = r#"[
        {"line_no": 1, "words": [{"letter": "G", "value": 0, "raw": "0"},
                                 {"letter": "X", "value": 3, "raw": "3"},
                                 {"letter": "Y", "value": 4, "raw": "4"}]}
    ]"#;
    let program = program_from_json(json).expect("valid json");
    let result = Simulator::default().simulate(&program);
    assert_eq!(result.fragment_count(), 1);
    assert_eq!(result.fragments().next().map(|f| f.length), Some(5.0));
}
