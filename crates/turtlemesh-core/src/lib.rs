//! Shared identifiers and process bootstrap used by every TurtleMesh crate.

pub mod ids;
pub mod logging;

pub use ids::NodeId;
