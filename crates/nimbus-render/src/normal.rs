use glam::Vec3;
use nimbus_core::constants::{NORMAL_FACE_EPSILON, NORMAL_SAMPLE_STEP};
use nimbus_volume::PackedVolume;

/// Surface normal at a normalized texture coordinate, for shading hooks.
///
/// Within `NORMAL_FACE_EPSILON` of a texture face the outward face normal
/// is returned directly. Elsewhere it is the negated central-difference
/// gradient of the red channel. A flat neighbourhood yields `Vec3::ZERO`.
pub fn estimate_normal(volume: &PackedVolume, coord: Vec3) -> Vec3 {
    let hi = 1.0 - NORMAL_FACE_EPSILON;
    if coord.x < NORMAL_FACE_EPSILON {
        return Vec3::X;
    }
    if coord.y < NORMAL_FACE_EPSILON {
        return Vec3::Y;
    }
    if coord.z < NORMAL_FACE_EPSILON {
        return Vec3::Z;
    }
    if coord.x > hi {
        return -Vec3::X;
    }
    if coord.y > hi {
        return -Vec3::Y;
    }
    if coord.z > hi {
        return -Vec3::Z;
    }

    let density = |p: Vec3| volume.sample_nearest(p).r;
    let h = NORMAL_SAMPLE_STEP;
    let gradient = Vec3::new(
        density(coord - Vec3::X * h) - density(coord + Vec3::X * h),
        density(coord - Vec3::Y * h) - density(coord + Vec3::Y * h),
        density(coord - Vec3::Z * h) - density(coord + Vec3::Z * h),
    );
    gradient.normalize_or_zero()
}
