//! Batches timed samples into renderer-sized runs
//!
//! Samples are appended one at a time. A run is closed when the speed tag
//! changes or when it reaches the configured point budget; the next run
//! starts with a copy of the previous run's last point so the polyline
//! stays connected across the split.
//!
//! The accumulator also keeps one [`SimMapEntry`] per fragment, linking the
//! source line to its geometry, its vertex range and its time span.

use std::mem;
use std::ops::Range;

use glam::Vec3;
use pathkit_settings::DiscretizationSettings;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{Fragment, SpeedTag};
use crate::gcode::FragmentSink;

/// One renderer batch: a connected polyline with a single speed tag
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimFragment {
    pub vertices: Vec<Vec3>,
    /// Seconds since program start, one per vertex
    pub times: Vec<f32>,
    pub speed_tag: SpeedTag,
}

impl SimFragment {
    fn seeded(point: Vec3, time: f32, speed_tag: SpeedTag) -> Self {
        Self {
            vertices: vec![point],
            times: vec![time],
            speed_tag,
        }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    fn position_at_time(&self, time: f32) -> Vec3 {
        let next = self.times.partition_point(|&t| t < time);
        if next == 0 {
            return self.vertices[0];
        }
        if next >= self.vertices.len() {
            return self.vertices[self.vertices.len() - 1];
        }
        let (t0, t1) = (self.times[next - 1], self.times[next]);
        let ratio = if t1 > t0 { (time - t0) / (t1 - t0) } else { 1.0 };
        self.vertices[next - 1].lerp(self.vertices[next], ratio)
    }
}

/// Per-fragment record linking source line, geometry, vertices and time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimMapEntry {
    pub line_no: u32,
    pub fragment_index: usize,
    /// Geometric polyline of the fragment
    pub segments: Vec<Vec3>,
    /// Vertex range in the flat buffer, starting at the fragment's start point
    pub vertex_range: Range<usize>,
    pub start_time: f32,
    pub end_time: f32,
}

/// Run batcher and per-fragment map
#[derive(Debug, Clone)]
pub struct Accumulator {
    runs: Vec<SimFragment>,
    current: SimFragment,
    /// Vertices held by closed runs
    closed_vertices: usize,
    /// Points appended to `current` since the last close, excluding the seed
    fresh_points: usize,
    segment_map: Vec<SimMapEntry>,
    settings: DiscretizationSettings,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::new(&DiscretizationSettings::default())
    }
}

impl Accumulator {
    pub fn new(settings: &DiscretizationSettings) -> Self {
        Self {
            runs: Vec::new(),
            current: SimFragment::default(),
            closed_vertices: 0,
            fresh_points: 0,
            segment_map: Vec::new(),
            settings: settings.clone(),
        }
    }

    /// Append a sample; returns its index in the flat vertex buffer
    pub fn accumulate(&mut self, point: Vec3, time: f32, speed_tag: SpeedTag) -> usize {
        if !self.current.is_empty()
            && (speed_tag != self.current.speed_tag
                || self.current.len() >= self.settings.max_run_points)
        {
            self.close();
        }

        self.current.speed_tag = speed_tag;
        self.current.vertices.push(point);
        self.current.times.push(time);
        self.fresh_points += 1;
        self.closed_vertices + self.current.len() - 1
    }

    /// Close the open run if it has received points since the last close
    pub fn close(&mut self) {
        if self.fresh_points == 0 {
            return;
        }
        let (Some(&last), Some(&time)) = (self.current.vertices.last(), self.current.times.last())
        else {
            return;
        };

        let seed = SimFragment::seeded(last, time, self.current.speed_tag);
        let run = mem::replace(&mut self.current, seed);
        trace!("Closed run of {} vertices ({:?})", run.len(), run.speed_tag);
        self.closed_vertices += run.len();
        self.runs.push(run);
        self.fresh_points = 0;
    }

    /// Closed runs
    pub fn runs(&self) -> &[SimFragment] {
        &self.runs
    }

    /// True when no sample has been accumulated yet
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty() && self.current.is_empty()
    }

    /// Number of vertices the flat buffer holds once the open run is closed
    pub fn vertex_count(&self) -> usize {
        if self.fresh_points > 0 {
            self.closed_vertices + self.current.len()
        } else {
            self.closed_vertices
        }
    }

    /// Vertices of the closed runs, in buffer order
    pub fn vertices(&self) -> impl Iterator<Item = (Vec3, SpeedTag)> + '_ {
        self.runs
            .iter()
            .flat_map(|run| run.vertices.iter().map(move |v| (*v, run.speed_tag)))
    }

    pub fn segment_map(&self) -> &[SimMapEntry] {
        &self.segment_map
    }

    /// Record where a fragment landed in the vertex buffer and timeline
    pub fn mark_fragment(
        &mut self,
        fragment_index: usize,
        vertex_range: Range<usize>,
        start_time: f32,
        end_time: f32,
    ) {
        let entry = self
            .segment_map
            .get_mut(fragment_index)
            .filter(|e| e.fragment_index == fragment_index);
        if let Some(entry) = entry {
            entry.vertex_range = vertex_range;
            entry.start_time = start_time;
            entry.end_time = end_time;
        }
    }

    /// Source line executing at `time`
    ///
    /// Times between fragments map to the fragment that just finished.
    pub fn line_at_time(&self, time: f32) -> Option<u32> {
        let started = self.segment_map.partition_point(|e| e.start_time <= time);
        self.segment_map
            .get(started.saturating_sub(1))
            .map(|e| e.line_no)
    }

    /// Interpolated tool position at `time`
    pub fn position_at_time(&self, time: f32) -> Option<Vec3> {
        let run = self
            .runs
            .iter()
            .find(|run| run.times.last().is_some_and(|&t| t >= time))
            .or_else(|| self.runs.last())?;
        Some(run.position_at_time(time))
    }
}

impl FragmentSink for Accumulator {
    fn on_fragment(&mut self, fragment: &Fragment) {
        let steps = if fragment.is_arc() {
            fragment.sim_steps(&self.settings)
        } else {
            1
        };
        self.segment_map.push(SimMapEntry {
            line_no: fragment.line_no,
            fragment_index: fragment.index,
            segments: fragment.polyline(steps),
            ..SimMapEntry::default()
        });
    }
}
