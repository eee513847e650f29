//! # PathKit Planner
//!
//! Turns a tokenized G-Code program into a timed 3D trajectory.
//!
//! The pipeline has four stages:
//! - [`gcode`]: interpret command lines into straight and circular fragments
//! - [`planner::grouper`]: split the path wherever the machine must stop
//! - [`planner::velocity`]: plan trapezoidal speed profiles per group
//! - [`planner::discretize`]: sample the profiles into timed points, batched
//!   into renderer runs by the [`planner::Accumulator`]
//!
//! [`Simulator`] runs all of them; [`planner::build_vertex_data`] flattens the
//! result for GPU upload.

pub mod gcode;
pub mod pipeline;
pub mod planner;

pub use gcode::{program_from_json, CommandLine, FragmentSink, MachineState, NullSink, Word};
pub use pipeline::{evaluate, SimulationResult, SimulationSummary, Simulator};
pub use planner::{
    build_vertex_data, Accumulator, Bounds, Fragment, Group, SimulationStats, SpeedTag,
    VertexData,
};
