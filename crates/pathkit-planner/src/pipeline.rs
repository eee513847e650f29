//! End-to-end simulation: command lines in, timed and renderable path out

use std::time::Instant;

use glam::Vec3;
use pathkit_core::Diagnostics;
use pathkit_settings::{AxisConvention, PlannerConfig};
use serde::Serialize;
use tracing::{debug, info};

use crate::gcode::{CommandLine, MachineState};
use crate::planner::{
    build_vertex_data, group_connected, plan_group, Accumulator, Bounds, Discretizer, Fragment,
    Group, SimulationStats, SpeedTag, VertexData,
};

/// Interpret a program, feeding every fragment into a fresh [`Accumulator`]
pub fn evaluate(
    program: &[CommandLine],
    config: &PlannerConfig,
) -> (Vec<Fragment>, Accumulator, Diagnostics) {
    let accumulator = Accumulator::new(&config.discretization);
    let mut state = MachineState::new(config, accumulator);
    state.execute_all(program);
    state.into_parts()
}

/// Everything produced by one simulation run
#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub groups: Vec<Group>,
    pub accumulator: Accumulator,
    pub stats: SimulationStats,
    pub diagnostics: Diagnostics,
}

impl SimulationResult {
    pub fn fragments(&self) -> impl Iterator<Item = &Fragment> {
        self.groups.iter().flat_map(|g| g.fragments.iter())
    }

    pub fn fragment_count(&self) -> usize {
        self.groups.iter().map(Group::len).sum()
    }

    pub fn total_time(&self) -> f32 {
        self.stats.total_time
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn vertex_data(&self, convention: AxisConvention) -> VertexData {
        build_vertex_data(&self.accumulator, convention)
    }

    /// Source line executing at `time` seconds into the program
    pub fn line_at_time(&self, time: f32) -> Option<u32> {
        self.accumulator.line_at_time(time)
    }

    /// Tool position at `time` seconds into the program
    pub fn position_at_time(&self, time: f32) -> Option<Vec3> {
        self.accumulator.position_at_time(time)
    }

    pub fn summary(&self) -> SimulationSummary {
        SimulationSummary {
            fragments: self.fragment_count(),
            groups: self.groups.len(),
            vertices: self.accumulator.vertex_count(),
            runs: self.accumulator.runs().len(),
            total_time: self.stats.total_time,
            path_length: self.groups.iter().map(Group::length).sum(),
            max_feed_rate: self
                .fragments()
                .filter(|f| f.speed_tag == SpeedTag::Normal)
                .map(|f| f.feed_rate)
                .fold(0.0, f32::max),
            diagnostics: self.diagnostics.len(),
            dropped_motions: self.diagnostics.dropped_motions(),
            bounds: self.stats.bounds,
        }
    }
}

/// Counters reported after a simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub fragments: usize,
    pub groups: usize,
    pub vertices: usize,
    pub runs: usize,
    pub total_time: f32,
    pub path_length: f32,
    /// Highest programmed cutting feed, units/min
    pub max_feed_rate: f32,
    pub diagnostics: usize,
    pub dropped_motions: usize,
    pub bounds: Bounds,
}

/// Runs interpretation, grouping, planning and discretization
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    config: PlannerConfig,
}

impl Simulator {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn simulate(&self, program: &[CommandLine]) -> SimulationResult {
        let started = Instant::now();
        debug!("Simulating {} command lines", program.len());

        let (path, mut accumulator, diagnostics) = evaluate(program, &self.config);
        let mut groups = group_connected(path, self.config.machine.max_acceleration);

        let mut discretizer = Discretizer::new(&self.config.discretization);
        for group in &mut groups {
            plan_group(group);
            discretizer.discretize_group(group, &mut accumulator);
        }
        let stats = discretizer.finish(&mut accumulator);

        info!(
            "Simulated {} lines: {} groups, {} vertices, {:.3}s of motion in {:?}",
            program.len(),
            groups.len(),
            accumulator.vertex_count(),
            stats.total_time,
            started.elapsed()
        );

        SimulationResult {
            groups,
            accumulator,
            stats,
            diagnostics,
        }
    }
}
