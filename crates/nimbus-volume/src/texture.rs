use glam::{IVec3, UVec3, Vec3};
use nimbus_core::math::{cell_count, flatten_index};
use nimbus_core::{GridDims, Rgba};

use crate::error::BuildError;

/// Dense RGBA volume in upload layout: texel `(x, y, z)` lives at
/// `x + y * dims.x + z * dims.x * dims.y`, one `Rgba32Float` texel each.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedVolume {
    dims: GridDims,
    texels: Vec<Rgba>,
}

impl PackedVolume {
    /// Wrap already-classified texels. Shape rules match the builder.
    pub fn from_texels(dims: GridDims, texels: Vec<Rgba>) -> Result<Self, BuildError> {
        check_dims(dims)?;
        let expected = cell_count(dims);
        if texels.len() != expected {
            return Err(BuildError::ShapeMismatch {
                expected,
                actual: texels.len(),
            });
        }
        Ok(Self { dims, texels })
    }

    /// Every texel set to `color`.
    pub fn filled(dims: GridDims, color: Rgba) -> Result<Self, BuildError> {
        check_dims(dims)?;
        Ok(Self {
            dims,
            texels: vec![color; cell_count(dims)],
        })
    }

    pub(crate) fn zeroed(dims: GridDims) -> Self {
        Self {
            dims,
            texels: vec![Rgba::TRANSPARENT; cell_count(dims)],
        }
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    pub fn texels(&self) -> &[Rgba] {
        &self.texels
    }

    pub(crate) fn texels_mut(&mut self) -> &mut [Rgba] {
        &mut self.texels
    }

    /// Raw bytes for `queue.write_texture`.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texels)
    }

    /// Bytes per texel row, as required by the texture upload layout.
    pub fn bytes_per_row(&self) -> u32 {
        self.dims.x * std::mem::size_of::<Rgba>() as u32
    }

    pub fn texel(&self, x: u32, y: u32, z: u32) -> Rgba {
        self.texels[flatten_index(self.dims, x, y, z)]
    }

    /// Nearest-texel lookup at a normalized texture coordinate.
    ///
    /// Coordinates outside `[0, 1]` clamp to the edge texel, like a sampler
    /// with `ClampToEdge` addressing and nearest filtering.
    pub fn sample_nearest(&self, coord: Vec3) -> Rgba {
        let max = self.dims.as_ivec3() - IVec3::ONE;
        let cell = (coord * self.dims.as_vec3())
            .floor()
            .as_ivec3()
            .clamp(IVec3::ZERO, max);
        let cell: UVec3 = cell.as_uvec3();
        self.texel(cell.x, cell.y, cell.z)
    }
}

pub(crate) fn check_dims(dims: GridDims) -> Result<(), BuildError> {
    if dims.cmpeq(UVec3::ZERO).any() {
        return Err(BuildError::EmptyVolume { dims });
    }
    Ok(())
}
