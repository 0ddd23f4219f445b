use std::time::Instant;

use nimbus_classify::TransferFunction;
use nimbus_core::{NimbusError, Rgba};
use nimbus_render::{
    render_frame, FrameParams, FrameReadback, Presentation, RayMarchParams, VolumeRenderer,
};
use nimbus_volume::{BuildError, PackedVolume};

use crate::scenes::Scene;

/// Orbit applied between frames, in the camera's drag units.
const ORBIT_PER_FRAME: f32 = 4.0;

/// Dark backdrop the frames are composited over, on both paths.
pub const BACKGROUND: Rgba = Rgba::new(0.05, 0.05, 0.08, 1.0);

/// Timing data for a single benchmark run.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TimingSeries {
    pub mean_ms: f64,
    pub median_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

/// Result of a single scene benchmark.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BenchmarkResult {
    pub scene_name: String,
    pub dims: [u32; 3],
    pub present_samples: u32,
    pub frame_count: u32,
    pub width: u32,
    pub height: u32,
    pub step_count: u32,
    pub cpu: TimingSeries,
    #[serde(default)]
    pub gpu: Option<TimingSeries>,
}

/// Errors that abort a scene.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("volume build failed: {0}")]
    Build(#[from] BuildError),

    #[error(transparent)]
    Gpu(#[from] NimbusError),
}

/// Everything that stays fixed across scenes.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub frames: u32,
    pub width: u32,
    pub height: u32,
    pub params: RayMarchParams,
    pub presentation: Presentation,
    pub transfer: TransferFunction,
}

/// Native wgpu device used for the optional GPU path.
pub struct GpuContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl GpuContext {
    /// Initialize wgpu natively. Blocks on async adapter request.
    pub fn new() -> Result<Self, NimbusError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| NimbusError::AdapterNotFound("no suitable GPU adapter found".into()))?;

        log::info!("Benchmark adapter: {}", adapter.get_info().name);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("bench-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
            },
            None,
        ))
        .map_err(|e| NimbusError::DeviceRequestFailed(e.to_string()))?;

        Ok(Self { device, queue })
    }
}

/// A rendered frame kept for snapshots.
pub struct FrameImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Rgba>,
}

/// Runs every scene on the CPU and, when a device is present, on the GPU.
pub struct BenchmarkRunner {
    config: RunConfig,
    gpu: Option<GpuContext>,
}

impl BenchmarkRunner {
    pub fn new(config: RunConfig, gpu: Option<GpuContext>) -> Self {
        Self { config, gpu }
    }

    /// Run a single scene. Returns timings plus the first CPU frame.
    pub fn run_scene(&self, scene: &Scene) -> Result<(BenchmarkResult, FrameImage), RunError> {
        let cfg = &self.config;
        let dims = scene.grid.dims();
        log::info!(
            "Running scene '{}' ({}x{}x{}, {} present samples)...",
            scene.name,
            dims.x,
            dims.y,
            dims.z,
            scene.grid.present_count()
        );

        let build_start = Instant::now();
        let volume = nimbus_volume::build(&scene.grid, &cfg.transfer)?;
        log::info!(
            "  Built volume texture in {:.2}ms",
            build_start.elapsed().as_secs_f64() * 1000.0
        );

        let frames = self.frame_sequence(scene);
        let mut frame_times = Vec::with_capacity(frames.len());
        let mut first_frame = None;
        for frame in &frames {
            // Camera moves every frame, so its object-space position does too.
            let params = frame.march_params(&cfg.params);
            let frame_start = Instant::now();
            let pixels = render_frame(&volume, frame, &params);
            frame_times.push(frame_start.elapsed().as_secs_f64() * 1000.0);
            if first_frame.is_none() {
                first_frame = Some(pixels);
            }
        }
        let cpu = compute_timings(&frame_times);
        log::info!(
            "  CPU: mean={:.2}ms, p95={:.2}ms, p99={:.2}ms",
            cpu.mean_ms,
            cpu.p95_ms,
            cpu.p99_ms
        );

        let gpu = match &self.gpu {
            Some(ctx) => Some(self.run_gpu(ctx, &volume, &frames, first_frame.as_deref())?),
            None => None,
        };

        let result = BenchmarkResult {
            scene_name: scene.name.clone(),
            dims: dims.to_array(),
            present_samples: scene.grid.present_count() as u32,
            frame_count: frames.len() as u32,
            width: cfg.width,
            height: cfg.height,
            step_count: cfg.params.step_count(),
            cpu,
            gpu,
        };
        let image = FrameImage {
            width: cfg.width,
            height: cfg.height,
            pixels: first_frame.unwrap_or_default(),
        };
        Ok((result, image))
    }

    /// One frame per tick, orbiting the scene camera a little each time.
    fn frame_sequence(&self, scene: &Scene) -> Vec<FrameParams> {
        let cfg = &self.config;
        let mut camera = scene.camera;
        (0..cfg.frames.max(1))
            .map(|_| {
                let frame = FrameParams::new(&camera, &cfg.presentation, cfg.width, cfg.height);
                camera.orbit(ORBIT_PER_FRAME, 0.0);
                frame
            })
            .collect()
    }

    fn run_gpu(
        &self,
        ctx: &GpuContext,
        volume: &PackedVolume,
        frames: &[FrameParams],
        cpu_reference: Option<&[Rgba]>,
    ) -> Result<TimingSeries, RunError> {
        let cfg = &self.config;
        let renderer = VolumeRenderer::new(
            &ctx.device,
            &ctx.queue,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            cfg.width,
            cfg.height,
            volume,
        )?;
        let target = offscreen_target(&ctx.device, cfg.width, cfg.height);
        let background = wgpu::Color {
            r: BACKGROUND.r as f64,
            g: BACKGROUND.g as f64,
            b: BACKGROUND.b as f64,
            a: BACKGROUND.a as f64,
        };

        let mut frame_times = Vec::with_capacity(frames.len());
        for frame in frames {
            let params = frame.march_params(&cfg.params);
            let frame_start = Instant::now();

            renderer.update_frame(&ctx.queue, frame, &params);
            let mut encoder = ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("bench-encoder"),
                });
            renderer.render(&mut encoder, &target, background);
            ctx.queue.submit(std::iter::once(encoder.finish()));
            ctx.device.poll(wgpu::Maintain::Wait);

            frame_times.push(frame_start.elapsed().as_secs_f64() * 1000.0);
        }

        let timings = compute_timings(&frame_times);
        log::info!(
            "  GPU: mean={:.2}ms, p95={:.2}ms, p99={:.2}ms",
            timings.mean_ms,
            timings.p95_ms,
            timings.p99_ms
        );

        if let (Some(first), Some(reference)) = (frames.first(), cpu_reference) {
            let gpu_pixels = read_frame(ctx, &renderer, first, &cfg.params)?;
            let err = mean_alpha_error(&gpu_pixels, reference);
            log::info!("  GPU/CPU mean alpha difference: {err:.4}");
        }

        Ok(timings)
    }
}

/// Re-render one frame on the GPU and copy the raw march output back.
fn read_frame(
    ctx: &GpuContext,
    renderer: &VolumeRenderer,
    frame: &FrameParams,
    base: &RayMarchParams,
) -> Result<Vec<Rgba>, NimbusError> {
    let (width, height) = renderer.size();
    let readback = FrameReadback::new(&ctx.device, width, height);
    renderer.update_frame(&ctx.queue, frame, &frame.march_params(base));
    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("bench-readback-encoder"),
        });
    renderer.dispatch(&mut encoder);
    readback.copy_from(&mut encoder, renderer);
    ctx.queue.submit(std::iter::once(encoder.finish()));
    readback.read(&ctx.device)
}

/// Mean absolute alpha difference; 0 for empty or mismatched inputs.
pub fn mean_alpha_error(a: &[Rgba], b: &[Rgba]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let sum: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| (x.a as f64 - y.a as f64).abs())
        .sum();
    sum / a.len() as f64
}

/// Render target for the blit (bench doesn't present to screen).
fn offscreen_target(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("bench-offscreen-target"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// Compute timing statistics from a list of frame times in milliseconds.
pub fn compute_timings(times: &[f64]) -> TimingSeries {
    if times.is_empty() {
        return TimingSeries {
            mean_ms: 0.0,
            median_ms: 0.0,
            p95_ms: 0.0,
            p99_ms: 0.0,
            min_ms: 0.0,
            max_ms: 0.0,
        };
    }

    let mut sorted = times.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let median = if n.is_multiple_of(2) {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };
    let p95_idx = ((n as f64) * 0.95).ceil() as usize;
    let p99_idx = ((n as f64) * 0.99).ceil() as usize;

    TimingSeries {
        mean_ms: mean,
        median_ms: median,
        p95_ms: sorted[p95_idx.min(n - 1)],
        p99_ms: sorted[p99_idx.min(n - 1)],
        min_ms: sorted[0],
        max_ms: sorted[n - 1],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenes::{generate_field, user_scene, SceneField};
    use glam::UVec3;
    use nimbus_classify::defaults::reference_table;

    fn config(frames: u32) -> RunConfig {
        RunConfig {
            frames,
            width: 24,
            height: 16,
            params: RayMarchParams::default().with_step_count(64),
            presentation: Presentation::default(),
            transfer: reference_table(),
        }
    }

    #[test]
    fn test_compute_timings() {
        let t = compute_timings(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(t.mean_ms, 2.5);
        assert_eq!(t.median_ms, 2.5);
        assert_eq!(t.min_ms, 1.0);
        assert_eq!(t.max_ms, 4.0);
        assert_eq!(t.p95_ms, 4.0);
    }

    #[test]
    fn test_compute_timings_empty() {
        assert_eq!(compute_timings(&[]).max_ms, 0.0);
    }

    #[test]
    fn test_cpu_run_reports_frames() {
        let runner = BenchmarkRunner::new(config(3), None);
        let scene = user_scene("tiny", generate_field(SceneField::Plume, UVec3::new(8, 8, 4)));
        let (result, image) = runner.run_scene(&scene).unwrap();
        assert_eq!(result.frame_count, 3);
        assert_eq!(result.dims, [8, 8, 4]);
        assert!(result.gpu.is_none());
        assert_eq!(image.pixels.len(), 24 * 16);
    }

    #[test]
    fn test_shape_mismatch_aborts_scene() {
        let runner = BenchmarkRunner::new(config(1), None);
        let grid = nimbus_core::ScalarGrid::new(
            UVec3::new(2, 2, 2),
            Default::default(),
            vec![Some(1.0); 3],
        );
        let err = runner.run_scene(&user_scene("bad", grid));
        assert!(matches!(err, Err(RunError::Build(BuildError::ShapeMismatch { .. }))));
    }

    #[test]
    fn test_frames_orbit_the_camera() {
        let runner = BenchmarkRunner::new(config(2), None);
        let scene = user_scene("tiny", generate_field(SceneField::Storm, UVec3::new(4, 4, 4)));
        let frames = runner.frame_sequence(&scene);
        assert_eq!(frames.len(), 2);
        assert_ne!(frames[0].camera_object(), frames[1].camera_object());
    }

    #[test]
    fn test_mean_alpha_error() {
        let a = [Rgba::new(0.0, 0.0, 0.0, 0.5), Rgba::TRANSPARENT];
        let b = [Rgba::TRANSPARENT, Rgba::TRANSPARENT];
        assert_eq!(mean_alpha_error(&a, &b), 0.25);
        assert_eq!(mean_alpha_error(&a, &b[..1]), 0.0);
    }
}
