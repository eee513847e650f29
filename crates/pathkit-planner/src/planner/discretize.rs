//! Turns planned fragments into timed samples
//!
//! Each fragment is sampled at `sim_steps` evenly spaced ratios along its
//! length. The timestamp of a sample comes from inverting the fragment's
//! speed profile at that distance.

use glam::Vec3;
use pathkit_settings::DiscretizationSettings;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Accumulator, Bounds, Fragment, Group, RunFragment, SpeedTag, SpeedType};

/// Summary of a discretized program
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationStats {
    /// Seconds, including dwell markers
    pub total_time: f32,
    pub bounds: Bounds,
    pub sample_count: usize,
}

/// Speed (units/s) and time (s, relative to the fragment start) at `ratio` of the fragment
pub fn sample_at_ratio(fragment: &Fragment, ratio: f32) -> (f32, f32) {
    let position = fragment.length * ratio;
    let last = fragment.run_fragments.len().saturating_sub(1);
    let mut offset = 0.0;

    for (i, run) in fragment.run_fragments.iter().enumerate() {
        if run.stop_x >= position || i == last {
            let run_len = run.length();
            let local_ratio = if run_len > 0.0 {
                ((position - run.start_x) / run_len).clamp(0.0, 1.0)
            } else {
                1.0
            };
            let (speed, time) = sample_run(fragment, run, local_ratio);
            return (speed, offset + time.clamp(0.0, run.duration));
        }
        offset += run.duration;
    }

    (0.0, 0.0)
}

fn sample_run(fragment: &Fragment, run: &RunFragment, local_ratio: f32) -> (f32, f32) {
    let accel = fragment.max_accel;
    let x = run.length() * local_ratio;
    match run.speed_type {
        SpeedType::Accel => {
            let x2 = (2.0 * (fragment.accel_len + x)).max(0.0);
            let time = (x2 / accel).sqrt() - run.from_sq_speed.sqrt() / accel;
            ((accel * x2).sqrt(), time)
        }
        SpeedType::Decel => {
            let x2 = (2.0 * (fragment.decel_len + run.length() - x)).max(0.0);
            let time = run.to_sq_speed.sqrt() / accel + run.duration - (x2 / accel).sqrt();
            ((accel * x2).sqrt(), time)
        }
        SpeedType::Const => (run.squared_speed.sqrt(), run.duration * local_ratio),
    }
}

/// Sampling state carried across groups
pub struct Discretizer<'a> {
    settings: &'a DiscretizationSettings,
    current_time: f32,
    stats: SimulationStats,
}

impl<'a> Discretizer<'a> {
    pub fn new(settings: &'a DiscretizationSettings) -> Self {
        Self {
            settings,
            current_time: 0.0,
            stats: SimulationStats::default(),
        }
    }

    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    /// Sample every fragment of a planned group, then append the dwell markers
    pub fn discretize_group(&mut self, group: &Group, accumulator: &mut Accumulator) {
        for fragment in &group.fragments {
            self.discretize_fragment(fragment, accumulator);
        }
        if let Some(last) = group.fragments.last() {
            self.dwell(last.to, last.speed_tag, accumulator);
        }
    }

    fn discretize_fragment(&mut self, fragment: &Fragment, accumulator: &mut Accumulator) {
        if accumulator.is_empty() {
            self.push(fragment.from, self.current_time, fragment.speed_tag, accumulator);
        }

        let start_time = self.current_time;
        let first_vertex = accumulator.vertex_count().saturating_sub(1);
        let mut last_vertex = first_vertex;
        let steps = fragment.sim_steps(self.settings);

        for j in 1..=steps {
            let ratio = j as f32 / steps as f32;
            let (_speed, time) = sample_at_ratio(fragment, ratio);
            let point = fragment.point_at_ratio(ratio);
            last_vertex = self.push(point, start_time + time, fragment.speed_tag, accumulator);
        }

        self.current_time = start_time + fragment.duration;
        accumulator.mark_fragment(
            fragment.index,
            first_vertex..last_vertex + 1,
            start_time,
            self.current_time,
        );
    }

    /// Stationary samples that mark the stop between groups
    fn dwell(&mut self, point: Vec3, speed_tag: SpeedTag, accumulator: &mut Accumulator) {
        for _ in 0..self.settings.dwell_samples {
            self.current_time += self.settings.dwell_interval;
            self.push(point, self.current_time, speed_tag, accumulator);
        }
    }

    fn push(
        &mut self,
        point: Vec3,
        time: f32,
        speed_tag: SpeedTag,
        accumulator: &mut Accumulator,
    ) -> usize {
        self.stats.bounds.update_point(point);
        self.stats.sample_count += 1;
        accumulator.accumulate(point, time, speed_tag)
    }

    /// Close the last run and return the statistics
    pub fn finish(mut self, accumulator: &mut Accumulator) -> SimulationStats {
        accumulator.close();
        self.stats.total_time = self.current_time;
        debug!(
            "Discretized {} samples over {:.3}s",
            self.stats.sample_count, self.stats.total_time
        );
        self.stats
    }
}
