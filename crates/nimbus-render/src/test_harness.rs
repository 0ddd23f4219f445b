/// GPU parity tests: the compute march against the CPU reference.
///
/// Gated behind `#[cfg(feature = "gpu_tests")]` since they need a GPU
/// adapter. Without one they log and return early.

#[cfg(all(test, feature = "gpu_tests"))]
mod tests {
    use glam::UVec3;
    use nimbus_classify::defaults::reference_table;
    use nimbus_core::{Rgba, ScalarGrid, SpatialExtent};

    use crate::{render_frame, Camera, FrameParams, FrameReadback, Presentation, RayMarchParams, VolumeRenderer};

    fn device() -> Option<(wgpu::Device, wgpu::Queue)> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default()))?;
        pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor::default(), None)).ok()
    }

    fn plume(dims: UVec3, peak: f32) -> nimbus_volume::PackedVolume {
        let grid = ScalarGrid::from_fn(dims, SpatialExtent::default(), |c| {
            let d = (c.as_vec3() - dims.as_vec3() * 0.5).length();
            Some((peak - d * 6.0).max(-1.0))
        });
        nimbus_volume::build(&grid, &reference_table()).unwrap()
    }

    /// Dispatch one frame and read it back.
    fn gpu_frame(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        renderer: &VolumeRenderer,
        frame: &FrameParams,
        params: &RayMarchParams,
    ) -> Vec<Rgba> {
        let (w, h) = renderer.size();
        let readback = FrameReadback::new(device, w, h);
        renderer.update_frame(queue, frame, params);
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor::default());
        renderer.dispatch(&mut encoder);
        readback.copy_from(&mut encoder, renderer);
        queue.submit(Some(encoder.finish()));
        readback.read(device).unwrap()
    }

    fn mean_alpha_error(gpu: &[Rgba], cpu: &[Rgba]) -> f32 {
        assert_eq!(gpu.len(), cpu.len());
        gpu.iter()
            .zip(cpu)
            .map(|(a, b): (&Rgba, &Rgba)| (a.a - b.a).abs())
            .sum::<f32>()
            / cpu.len() as f32
    }

    fn frame_and_params(w: u32, h: u32) -> (FrameParams, RayMarchParams) {
        let frame = FrameParams::new(&Camera::default(), &Presentation::with_height(4.0), w, h);
        let params = frame.march_params(&RayMarchParams::default().with_step_count(200));
        (frame, params)
    }

    #[test]
    fn test_gpu_matches_cpu() {
        let Some((device, queue)) = device() else {
            log::warn!("no GPU adapter, skipping");
            return;
        };
        let volume = plume(UVec3::new(16, 16, 8), 60.0);
        let (w, h) = (48, 32);
        let (frame, params) = frame_and_params(w, h);

        let renderer =
            VolumeRenderer::new(&device, &queue, wgpu::TextureFormat::Rgba8UnormSrgb, w, h, &volume).unwrap();
        let gpu = gpu_frame(&device, &queue, &renderer, &frame, &params);
        let cpu = render_frame(&volume, &frame, &params);
        let err = mean_alpha_error(&gpu, &cpu);
        assert!(err < 0.02, "mean alpha error {err}");
    }

    #[test]
    fn test_upload_volume_rebuilds_and_matches_cpu() {
        let Some((device, queue)) = device() else {
            log::warn!("no GPU adapter, skipping");
            return;
        };
        let (w, h) = (48, 32);
        let (frame, params) = frame_and_params(w, h);
        let first = plume(UVec3::new(16, 16, 8), 60.0);
        let mut renderer =
            VolumeRenderer::new(&device, &queue, wgpu::TextureFormat::Rgba8UnormSrgb, w, h, &first).unwrap();

        // Same dims: texture reused, contents replaced.
        let same_dims = plume(UVec3::new(16, 16, 8), 40.0);
        renderer.upload_volume(&device, &queue, &same_dims).unwrap();
        let gpu = gpu_frame(&device, &queue, &renderer, &frame, &params);
        let err = mean_alpha_error(&gpu, &render_frame(&same_dims, &frame, &params));
        assert!(err < 0.02, "same-dims mean alpha error {err}");

        // New dims: texture and scene bind group recreated.
        let resized = plume(UVec3::new(24, 12, 20), 70.0);
        renderer.upload_volume(&device, &queue, &resized).unwrap();
        let gpu = gpu_frame(&device, &queue, &renderer, &frame, &params);
        let cpu = render_frame(&resized, &frame, &params);
        let err = mean_alpha_error(&gpu, &cpu);
        assert!(err < 0.02, "resized mean alpha error {err}");
    }
}
