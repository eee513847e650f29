//! Trajectory planning
//!
//! Groups fragments into stop-to-stop sequences, plans trapezoidal speed
//! profiles over them, samples the result in time and batches the samples
//! for rendering.

pub mod accumulator;
pub mod bounds;
pub mod discretize;
pub mod fragment;
pub mod grouper;
pub mod plane;
pub mod velocity;
pub mod vertex;

pub use accumulator::{Accumulator, SimFragment, SimMapEntry};
pub use bounds::Bounds;
pub use discretize::{sample_at_ratio, Discretizer, SimulationStats};
pub use fragment::{ArcGeometry, Fragment, FragmentKind, RunFragment, SpeedTag, SpeedType};
pub use grouper::{group_connected, is_continuous, Group};
pub use plane::Plane;
pub use velocity::plan_group;
pub use vertex::{build_vertex_data, remap, Vertex, VertexData, VERTEX_STRIDE};
