//! G-Code input model and interpreter

pub mod command;
pub mod interpreter;
pub mod modal;

pub use command::{canonical_code, program_from_json, AxisWords, CommandLine, Word};
pub use interpreter::{FragmentSink, MachineState, NullSink};
pub use modal::{DistanceMode, ModalEffect, MotionMode, PathControl};
