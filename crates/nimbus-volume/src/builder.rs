use nimbus_classify::TransferFunction;
use nimbus_core::ScalarGrid;

use crate::error::BuildError;
use crate::texture::{check_dims, PackedVolume};

/// Classify every present sample of `grid` into a packed RGBA volume.
///
/// Absent samples keep the zeroed (transparent) texel. The output buffer is
/// allocated once; nothing is allocated per cell.
pub fn build(grid: &ScalarGrid, classifier: &TransferFunction) -> Result<PackedVolume, BuildError> {
    let dims = grid.dims();
    check_dims(dims)?;

    let expected = grid.declared_cells();
    let samples = grid.samples();
    if samples.len() != expected {
        return Err(BuildError::ShapeMismatch {
            expected,
            actual: samples.len(),
        });
    }

    let mut volume = PackedVolume::zeroed(dims);
    let texels = volume.texels_mut();

    let nx = dims.x as usize;
    let ny = dims.y as usize;
    let mut present = 0usize;

    for z in 0..dims.z as usize {
        let z_offset = z * nx * ny;
        for y in 0..ny {
            let y_offset = y * nx;
            for x in 0..nx {
                let index = x + y_offset + z_offset;
                if let Some(value) = samples[index] {
                    texels[index] = classifier.classify(Some(value));
                    present += 1;
                }
            }
        }
    }

    log::debug!(
        "Packed {}x{}x{} volume: {} of {} cells present",
        dims.x,
        dims.y,
        dims.z,
        present,
        expected
    );

    Ok(volume)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{UVec3, Vec3};
    use nimbus_classify::defaults::reference_table;
    use nimbus_core::{Rgba, SpatialExtent};

    fn extent() -> SpatialExtent {
        SpatialExtent::new(Vec3::splat(-1.0), Vec3::splat(1.0))
    }

    #[test]
    fn test_single_present_sample_lands_at_linear_index() {
        let tf = reference_table();
        let mut samples = vec![None; 8];
        samples[7] = Some(42.0);
        let grid = ScalarGrid::new(UVec3::new(2, 2, 2), extent(), samples);

        let volume = build(&grid, &tf).expect("build should succeed");
        let expected = tf.classify(Some(42.0));
        assert_eq!(volume.texels()[1 + 2 + 4], expected);
        assert_eq!(volume.texel(1, 1, 1), expected);
        for (i, t) in volume.texels().iter().enumerate().take(7) {
            assert_eq!(*t, Rgba::TRANSPARENT, "texel {i} should be empty");
        }
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let tf = reference_table();
        let short = ScalarGrid::new(UVec3::new(2, 2, 2), extent(), vec![Some(1.0); 7]);
        assert_eq!(
            build(&short, &tf),
            Err(BuildError::ShapeMismatch {
                expected: 8,
                actual: 7
            })
        );

        let long = ScalarGrid::new(UVec3::new(2, 2, 2), extent(), vec![None; 9]);
        assert!(matches!(
            build(&long, &tf),
            Err(BuildError::ShapeMismatch { actual: 9, .. })
        ));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let tf = reference_table();
        let grid = ScalarGrid::new(UVec3::new(4, 0, 4), extent(), Vec::new());
        assert_eq!(
            build(&grid, &tf),
            Err(BuildError::EmptyVolume {
                dims: UVec3::new(4, 0, 4)
            })
        );
    }

    #[test]
    fn test_all_absent_grid_is_transparent() {
        let tf = reference_table();
        let grid = ScalarGrid::new(UVec3::new(3, 3, 3), extent(), vec![None; 27]);
        let volume = build(&grid, &tf).expect("absent samples are not an error");
        assert!(volume.texels().iter().all(|t| *t == Rgba::TRANSPARENT));
    }

    #[test]
    fn test_build_is_bit_identical_on_repeat() {
        let tf = reference_table();
        let grid = ScalarGrid::from_fn(UVec3::new(7, 5, 3), extent(), |c| {
            if (c.x + c.y) % 4 == 0 {
                None
            } else {
                Some((c.x * 9 + c.y * 3 + c.z * 5) as f32 - 4.0)
            }
        });
        let a = build(&grid, &tf).expect("first build");
        let b = build(&grid, &tf).expect("second build");
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_every_texel_matches_classifier() {
        let tf = reference_table();
        let grid = ScalarGrid::from_fn(UVec3::new(4, 3, 2), extent(), |c| {
            Some((c.x as f32 - 1.0) * 20.0 + c.y as f32 + c.z as f32 * 0.5)
        });
        let volume = build(&grid, &tf).expect("build");
        for (texel, sample) in volume.texels().iter().zip(grid.samples()) {
            assert_eq!(*texel, tf.classify(*sample));
        }
    }
}
