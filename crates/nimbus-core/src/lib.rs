pub mod constants;
pub mod error;
pub mod grid;
pub mod math;
pub mod types;

pub use error::NimbusError;
pub use grid::ScalarGrid;
pub use types::{GridDims, Rgba, SpatialExtent};
