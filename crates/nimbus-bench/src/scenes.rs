use glam::{UVec3, Vec3};
use nimbus_core::{ScalarGrid, SpatialExtent};
use nimbus_render::Camera;

/// Eye used by the bench scenes: far enough back to frame the whole
/// 10x10 presentation slab.
pub const BENCH_EYE: Vec3 = Vec3::new(6.0, 4.0, 14.0);

/// Synthetic fields, all deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneField {
    /// One Gaussian core, strongest at the center.
    Plume,
    /// Horizontal reflectivity bands with a gentle ripple.
    Storm,
    /// Scattered cells; most samples are absent.
    SparseCells,
}

/// A named grid plus the camera to view it from.
pub struct Scene {
    pub name: String,
    pub grid: ScalarGrid,
    pub camera: Camera,
}

/// The standard suite: each field at a small and a large resolution.
pub fn standard_scenes() -> Vec<Scene> {
    let fields = [
        ("plume", SceneField::Plume),
        ("storm", SceneField::Storm),
        ("sparse", SceneField::SparseCells),
    ];
    let sizes = [UVec3::new(32, 32, 16), UVec3::new(96, 96, 32)];

    let mut scenes = Vec::with_capacity(fields.len() * sizes.len());
    for size in sizes {
        for (label, field) in fields {
            scenes.push(Scene {
                name: format!("{label}-{}x{}x{}", size.x, size.y, size.z),
                grid: generate_field(field, size),
                camera: Camera::looking_at(BENCH_EYE, Vec3::ZERO),
            });
        }
    }
    scenes
}

/// Wrap a loaded grid. Uses the default close-up camera.
pub fn user_scene(name: &str, grid: ScalarGrid) -> Scene {
    Scene {
        name: name.to_string(),
        grid,
        camera: Camera::default(),
    }
}

/// Sample a synthetic field. Values are in reflectivity units, roughly -10..70.
pub fn generate_field(field: SceneField, dims: UVec3) -> ScalarGrid {
    let extent = SpatialExtent::new(
        Vec3::new(-50.0, -50.0, 0.0),
        Vec3::new(50.0, 50.0, 15.0),
    );
    let size = dims.as_vec3().max(Vec3::ONE);
    ScalarGrid::from_fn(dims, extent, |c| {
        // Cell center in [0, 1]^3.
        let p = (c.as_vec3() + 0.5) / size;
        match field {
            SceneField::Plume => {
                let d = p - Vec3::new(0.5, 0.5, 0.35);
                let r2 = d.x * d.x + d.y * d.y + 2.0 * d.z * d.z;
                Some(75.0 * (-r2 / 0.04).exp() - 10.0)
            }
            SceneField::Storm => {
                let band = 1.0 - (p.z - 0.4).abs() * 2.0;
                let ripple = (p.x * 12.0).sin() * (p.y * 9.0).cos();
                Some(10.0 + 45.0 * band + 8.0 * ripple)
            }
            SceneField::SparseCells => {
                let h = cell_hash(c);
                if h % 7 != 0 {
                    None
                } else {
                    Some((h >> 8) as f32 % 75.0 - 5.0)
                }
            }
        }
    })
}

/// Integer hash of a cell coordinate (xorshift-multiply mix).
fn cell_hash(c: UVec3) -> u32 {
    let mut h = c.x.wrapping_mul(0x8da6_b343) ^ c.y.wrapping_mul(0xd816_3841) ^ c.z.wrapping_mul(0xcb1a_b31f);
    h ^= h >> 16;
    h = h.wrapping_mul(0x7feb_352d);
    h ^= h >> 15;
    h = h.wrapping_mul(0x846c_a68b);
    h ^= h >> 16;
    h
}
