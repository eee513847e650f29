//! Per-program diagnostics list
//!
//! Collects the recoverable [`PlanningError`]s produced while a program is
//! interpreted, in source order.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::PlanningError;

/// Ordered list of planning problems found in one program
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    entries: Vec<PlanningError>,
}

impl Diagnostics {
    /// Create an empty diagnostics list
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a problem
    pub fn push(&mut self, error: PlanningError) {
        if error.drops_motion() {
            warn!("{}", error);
        } else {
            debug!("{}", error);
        }
        self.entries.push(error);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlanningError> {
        self.entries.iter()
    }

    /// Problems reported for a given source line
    pub fn for_line(&self, line_number: u32) -> impl Iterator<Item = &PlanningError> {
        self.entries
            .iter()
            .filter(move |e| e.line_number() == line_number)
    }

    /// Number of motion commands that were dropped
    pub fn dropped_motions(&self) -> usize {
        self.entries.iter().filter(|e| e.drops_motion()).count()
    }

    pub fn into_vec(self) -> Vec<PlanningError> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a PlanningError;
    type IntoIter = std::slice::Iter<'a, PlanningError>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
