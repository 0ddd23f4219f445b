//! Raw scalar field handed over by a loader.

use glam::UVec3;

use crate::math::{cell_count, flatten_index};
use crate::types::{GridDims, SpatialExtent};

/// A regular 3D lattice of scalar samples.
///
/// `samples[x + y * dims.x + z * dims.x * dims.y]` holds the value of cell
/// `(x, y, z)`; `None` marks a cell with no data. The grid is not validated
/// on construction: the volume builder rejects empty or inconsistent shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarGrid {
    dims: GridDims,
    extent: SpatialExtent,
    samples: Vec<Option<f32>>,
}

impl ScalarGrid {
    pub fn new(dims: GridDims, extent: SpatialExtent, samples: Vec<Option<f32>>) -> Self {
        Self {
            dims,
            extent,
            samples,
        }
    }

    /// Build a grid by evaluating `f` at every cell coordinate.
    pub fn from_fn(
        dims: GridDims,
        extent: SpatialExtent,
        mut f: impl FnMut(UVec3) -> Option<f32>,
    ) -> Self {
        let mut samples = Vec::with_capacity(cell_count(dims));
        for z in 0..dims.z {
            for y in 0..dims.y {
                for x in 0..dims.x {
                    samples.push(f(UVec3::new(x, y, z)));
                }
            }
        }
        Self::new(dims, extent, samples)
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    pub fn extent(&self) -> SpatialExtent {
        self.extent
    }

    pub fn samples(&self) -> &[Option<f32>] {
        &self.samples
    }

    /// Number of cells the dimensions declare (may differ from `samples().len()`).
    pub fn declared_cells(&self) -> usize {
        cell_count(self.dims)
    }

    /// Number of samples that carry a value.
    pub fn present_count(&self) -> usize {
        self.samples.iter().filter(|s| s.is_some()).count()
    }

    /// Value at a cell, or `None` if absent or out of range.
    pub fn get(&self, x: u32, y: u32, z: u32) -> Option<f32> {
        if x >= self.dims.x || y >= self.dims.y || z >= self.dims.z {
            return None;
        }
        self.samples
            .get(flatten_index(self.dims, x, y, z))
            .copied()
            .flatten()
    }
}
