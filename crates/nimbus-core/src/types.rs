use glam::{UVec3, Vec3};

/// Number of cells along each grid axis.
pub type GridDims = UVec3;

/// Normalized color + opacity. Every channel is in `[0, 1]`.
///
/// Layout matches one texel of an `Rgba32Float` texture and `vec4<f32>` in WGSL.
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    /// Fully transparent black. Also the value of an empty texel.
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// World-space bounds a grid represents. Carried with the grid, not read by the march.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpatialExtent {
    pub min: Vec3,
    pub max: Vec3,
}

impl SpatialExtent {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_size_matches_texel() {
        assert_eq!(std::mem::size_of::<Rgba>(), 16);
    }

    #[test]
    fn test_transparent_is_zeroed() {
        let zero: Rgba = bytemuck::Zeroable::zeroed();
        assert_eq!(zero, Rgba::TRANSPARENT);
        assert_eq!(Rgba::default(), Rgba::TRANSPARENT);
    }

    #[test]
    fn test_extent_size() {
        let extent = SpatialExtent::new(Vec3::new(-2.0, 0.0, 1.0), Vec3::new(2.0, 3.0, 1.5));
        assert_eq!(extent.size(), Vec3::new(4.0, 3.0, 0.5));
    }
}
