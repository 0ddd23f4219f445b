use std::path::Path;

use nimbus_core::Rgba;
use nimbus_render::cpu::{composite, to_rgba8};

/// Composite a frame over `background` and write it as a PNG.
pub fn save_png(
    path: &Path,
    pixels: &[Rgba],
    width: u32,
    height: u32,
    background: Rgba,
) -> Result<(), image::ImageError> {
    let bytes = to_rgba8(&composite(pixels, background));
    image::save_buffer(path, &bytes, width, height, image::ExtendedColorType::Rgba8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_png() {
        let path = std::env::temp_dir().join(format!("nimbus-snapshot-{}.png", std::process::id()));
        let pixels = vec![Rgba::TRANSPARENT, Rgba::new(1.0, 0.0, 0.0, 1.0)];
        save_png(&path, &pixels, 2, 1, Rgba::new(0.0, 0.0, 0.0, 1.0)).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (2, 1));
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(1, 0).0, [255, 0, 0, 255]);
        let _ = std::fs::remove_file(&path);
    }
}
