//! CPU reference of the per-pixel ray march. volume_march.wgsl mirrors
//! every function here; keep them in step.

use glam::Vec3;
use nimbus_core::constants::{BOX_HALF_EXTENT, MIN_STEP_COUNT};
use nimbus_core::Rgba;
use nimbus_volume::PackedVolume;

use crate::params::RayMarchParams;

/// Entry/exit parameters of a ray against the box `[-0.5, 0.5]^3`.
///
/// A miss is reported as `t0 > t1`. Axes where the direction is zero
/// constrain nothing if the origin lies inside that slab and force a miss
/// otherwise, so no division by zero ever happens.
pub fn hit_box(origin: Vec3, dir: Vec3) -> (f32, f32) {
    let mut t0 = f32::NEG_INFINITY;
    let mut t1 = f32::INFINITY;
    for (o, d) in origin.to_array().into_iter().zip(dir.to_array()) {
        if d == 0.0 {
            if !(-BOX_HALF_EXTENT..=BOX_HALF_EXTENT).contains(&o) {
                return (f32::INFINITY, f32::NEG_INFINITY);
            }
            continue;
        }
        let inv = 1.0 / d;
        let a = (-BOX_HALF_EXTENT - o) * inv;
        let b = (BOX_HALF_EXTENT - o) * inv;
        t0 = t0.max(a.min(b));
        t1 = t1.min(a.max(b));
    }
    (t0, t1)
}

/// Distance between samples: the smallest per-axis distance that crosses
/// one unit, divided by the step count. Zero components are skipped.
/// `None` only when every component is zero.
pub fn step_delta(dir: Vec3, step_count: u32) -> Option<f32> {
    let inc = dir
        .to_array()
        .into_iter()
        .filter(|c| *c != 0.0)
        .map(|c| 1.0 / c.abs())
        .fold(f32::INFINITY, f32::min);
    if !inc.is_finite() {
        return None;
    }
    Some(inc / step_count.max(MIN_STEP_COUNT) as f32)
}

/// Front-to-back "under" compositing of one sample beneath the accumulator.
/// Accumulated color is premultiplied by coverage.
pub fn blend_under(acc: Rgba, sample: Rgba) -> Rgba {
    let w = (1.0 - acc.a) * sample.a;
    Rgba::new(
        acc.r + w * sample.r,
        acc.g + w * sample.g,
        acc.b + w * sample.b,
        acc.a + w,
    )
}

/// March one ray through the volume. `origin` is in box space, `direction`
/// need not be normalized. Returns `None` when the ray misses the box, has
/// zero length, or accumulates no opacity.
pub fn trace(
    origin: Vec3,
    direction: Vec3,
    volume: &PackedVolume,
    params: &RayMarchParams,
) -> Option<Rgba> {
    let dir = direction.try_normalize()?;
    let (t0, t1) = hit_box(origin, dir);
    if t0 > t1 {
        return None;
    }
    let t0 = t0.max(0.0);
    let delta = step_delta(dir, params.step_count())?;

    // Hard bound so accumulated float error can never add extra iterations.
    let max_steps = ((t1 - t0) / delta).ceil().max(0.0) as usize + 1;

    let mut acc = Rgba::TRANSPARENT;
    let mut p = origin + t0 * dir;
    let mut t = t0;
    let mut taken = 0;
    while t < t1 && taken < max_steps {
        let mut sample = volume.sample_nearest(p + Vec3::splat(BOX_HALF_EXTENT));
        sample.a *= params.opacity_per_sample;
        acc = blend_under(acc, sample);
        p += dir * delta;
        t += delta;
        taken += 1;
    }

    if acc.a == 0.0 {
        None
    } else {
        Some(acc)
    }
}
