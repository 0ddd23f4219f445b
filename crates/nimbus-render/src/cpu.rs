use nimbus_core::Rgba;
use nimbus_volume::PackedVolume;
use rayon::prelude::*;

use crate::frame::{blend_over, FrameParams};
use crate::march::trace;
use crate::params::RayMarchParams;

/// Ray march a whole frame on the CPU, one rayon task per row.
///
/// Pixels whose ray contributes nothing stay `Rgba::TRANSPARENT`, which
/// leaves the background untouched when composited. Rays start at
/// `params.camera_position_object_space`.
pub fn render_frame(
    volume: &PackedVolume,
    frame: &FrameParams,
    params: &RayMarchParams,
) -> Vec<Rgba> {
    let width = frame.width as usize;
    let height = frame.height as usize;
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let origin = params.camera_position_object_space;
    let mut pixels = vec![Rgba::TRANSPARENT; width * height];
    pixels
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, px) in row.iter_mut().enumerate() {
                let dir = frame.pixel_direction(x as u32, y as u32);
                if let Some(color) = trace(origin, dir, volume, params) {
                    *px = color;
                }
            }
        });
    pixels
}

/// Composite a rendered frame over a solid background.
pub fn composite(pixels: &[Rgba], background: Rgba) -> Vec<Rgba> {
    pixels.iter().map(|p| blend_over(background, *p)).collect()
}

/// Quantize to 8-bit RGBA rows, ready for an image encoder.
pub fn to_rgba8(pixels: &[Rgba]) -> Vec<u8> {
    pixels
        .iter()
        .flat_map(|p| p.to_array())
        .map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::frame::Presentation;
    use glam::UVec3;

    fn frame(w: u32, h: u32) -> FrameParams {
        FrameParams::new(&Camera::default(), &Presentation::default(), w, h)
    }

    #[test]
    fn test_zero_sized_frame() {
        let v = PackedVolume::filled(UVec3::ONE, Rgba::new(1.0, 1.0, 1.0, 1.0)).unwrap();
        let f = frame(0, 10);
        assert!(render_frame(&v, &f, &f.march_params(&RayMarchParams::default())).is_empty());
    }

    #[test]
    fn test_empty_volume_renders_transparent() {
        let v = PackedVolume::filled(UVec3::new(4, 4, 4), Rgba::TRANSPARENT).unwrap();
        let f = frame(16, 12);
        let params = f.march_params(&RayMarchParams::default().with_step_count(50));
        let pixels = render_frame(&v, &f, &params);
        assert_eq!(pixels.len(), 16 * 12);
        assert!(pixels.iter().all(|p| *p == Rgba::TRANSPARENT));
    }

    #[test]
    fn test_solid_volume_covers_center() {
        let v = PackedVolume::filled(UVec3::new(4, 4, 4), Rgba::new(1.0, 0.0, 0.0, 1.0)).unwrap();
        let f = frame(33, 33);
        let params = f.march_params(&RayMarchParams::default().with_step_count(100));
        let pixels = render_frame(&v, &f, &params);
        let center = pixels[16 * 33 + 16];
        assert!(center.a > 0.0);
        assert!(center.r > 0.0 && center.g == 0.0);
    }

    #[test]
    fn test_matches_per_pixel_trace() {
        let v = PackedVolume::filled(UVec3::new(2, 2, 2), Rgba::new(0.2, 0.4, 0.6, 0.8)).unwrap();
        let f = frame(9, 7);
        let params = f.march_params(&RayMarchParams::default().with_step_count(40));
        let pixels = render_frame(&v, &f, &params);
        for y in 0..7u32 {
            for x in 0..9u32 {
                let expected = trace(params.camera_position_object_space, f.pixel_direction(x, y), &v, &params)
                    .unwrap_or(Rgba::TRANSPARENT);
                assert_eq!(pixels[(y * 9 + x) as usize], expected);
            }
        }
    }

    #[test]
    fn test_composite_and_quantize() {
        let bg = Rgba::new(0.0, 0.0, 0.0, 1.0);
        let out = composite(&[Rgba::TRANSPARENT, Rgba::new(1.0, 1.0, 1.0, 1.0)], bg);
        assert_eq!(to_rgba8(&out), vec![0, 0, 0, 255, 255, 255, 255, 255]);
    }
}
