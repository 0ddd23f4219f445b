//! Blocking readback of the march output for snapshots and parity tests.

use nimbus_core::{NimbusError, Rgba};

use crate::renderer::VolumeRenderer;

const TEXEL_BYTES: u32 = std::mem::size_of::<Rgba>() as u32;

/// Row pitch of a copy of `width` texels, padded to the copy alignment.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * TEXEL_BYTES;
    unpadded.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT) * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT
}

/// Staging buffer sized for one output frame.
pub struct FrameReadback {
    staging_buffer: wgpu::Buffer,
    width: u32,
    height: u32,
    padded_row: u32,
}

impl FrameReadback {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let padded_row = padded_bytes_per_row(width);
        let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame-readback-staging"),
            size: padded_row as u64 * height as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            staging_buffer,
            width,
            height,
            padded_row,
        }
    }

    /// Record a copy of the renderer's output into the staging buffer.
    /// Must be encoded after `VolumeRenderer::dispatch`.
    pub fn copy_from(&self, encoder: &mut wgpu::CommandEncoder, renderer: &VolumeRenderer) {
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: renderer.output_texture(),
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.staging_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(self.padded_row),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Map the staging buffer and return tightly packed pixels, row 0 first.
    /// Blocks until the GPU has finished the submitted copy.
    pub fn read(&self, device: &wgpu::Device) -> Result<Vec<Rgba>, NimbusError> {
        let slice = self.staging_buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        device.poll(wgpu::Maintain::Wait);

        match rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(NimbusError::ReadbackFailed(e.to_string())),
            Err(e) => return Err(NimbusError::ReadbackFailed(e.to_string())),
        }

        let data = slice.get_mapped_range();
        let row_bytes = (self.width * TEXEL_BYTES) as usize;
        let mut pixels = Vec::with_capacity((self.width * self.height) as usize);
        for row in data.chunks_exact(self.padded_row as usize) {
            pixels.extend_from_slice(bytemuck::cast_slice::<u8, Rgba>(&row[..row_bytes]));
        }
        drop(data);
        self.staging_buffer.unmap();
        Ok(pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_bytes_per_row() {
        assert_eq!(padded_bytes_per_row(1), 256);
        assert_eq!(padded_bytes_per_row(16), 256);
        assert_eq!(padded_bytes_per_row(17), 512);
        assert_eq!(padded_bytes_per_row(64), 1024);
    }
}
