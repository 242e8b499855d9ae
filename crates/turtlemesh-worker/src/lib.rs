//! Worker (region renderer): owns one sub-grid, executes the turtle's
//! drawing loop, and hands back cursor control when it crosses a
//! region boundary.

mod draw;
mod error;
mod grid;
mod service;

pub use draw::{draw_slice, DrawOutcome};
pub use error::WorkerError;
pub use grid::Grid;
pub use service::run;
