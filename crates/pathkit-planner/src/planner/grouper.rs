//! Splits a path into groups of tangent-continuous fragments
//!
//! The machine comes to a full stop between groups; inside a group the
//! junctions are smooth enough to carry speed across.

use glam::Vec3;
use serde::Serialize;
use tracing::debug;

use super::Fragment;

/// `|exit + entry|²` at or above this value counts as a smooth junction
///
/// Two unit vectors sum to length 2 when parallel; 1.95 tolerates roughly
/// 25 degrees of deviation.
const CONTINUITY_THRESHOLD_SQ: f32 = 1.95 * 1.95;

/// Consecutive fragments the machine runs through without stopping
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Group {
    pub fragments: Vec<Fragment>,
}

impl Group {
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Seconds, valid once the group has been planned
    pub fn duration(&self) -> f32 {
        self.fragments.iter().map(|f| f.duration).sum()
    }

    pub fn length(&self) -> f32 {
        self.fragments.iter().map(|f| f.length).sum()
    }

    pub fn start_point(&self) -> Option<Vec3> {
        self.fragments.first().map(|f| f.from)
    }

    pub fn end_point(&self) -> Option<Vec3> {
        self.fragments.last().map(|f| f.to)
    }
}

/// True when the path may flow from `exit_dir` into `entry_dir` without stopping
#[inline]
pub fn is_continuous(exit_dir: Vec3, entry_dir: Vec3) -> bool {
    (exit_dir + entry_dir).length_squared() >= CONTINUITY_THRESHOLD_SQ
}

/// Partition `path` into groups and compute each fragment's speed limits
pub fn group_connected(path: Vec<Fragment>, max_accel: f32) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    let mut last_exit_dir = Vec3::ZERO;

    for mut fragment in path {
        fragment.length = fragment.compute_length();
        let (squared_speed, accel) = fragment.speed_limits(max_accel);
        fragment.squared_speed = squared_speed;
        fragment.max_accel = accel;

        let entry_dir = fragment.entry_dir();
        let exit_dir = fragment.exit_dir();
        match groups.last_mut() {
            Some(group) if is_continuous(last_exit_dir, entry_dir) => {
                group.fragments.push(fragment)
            }
            _ => groups.push(Group {
                fragments: vec![fragment],
            }),
        }
        last_exit_dir = exit_dir;
    }

    debug!("Grouped path into {} groups", groups.len());
    groups
}
