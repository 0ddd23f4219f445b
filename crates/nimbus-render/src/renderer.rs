use nimbus_core::constants::{BOX_HALF_EXTENT, MARCH_WORKGROUP_SIZE};
use nimbus_core::NimbusError;
use nimbus_volume::PackedVolume;

use crate::frame::FrameParams;
use crate::params::{FrameUniforms, MarchUniforms, RayMarchParams};

/// Format of both the volume texture and the march output.
pub const VOLUME_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;
pub const OUTPUT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

const VOLUME_MARCH_WGSL: &str = include_str!("../../../shaders/render/volume_march.wgsl");
const BLIT_WGSL: &str = include_str!("../../../shaders/render/blit.wgsl");

/// Constants shared with the march shader, prepended to its source.
pub fn constants_preamble() -> String {
    format!("const BOX_HALF_EXTENT: f32 = {BOX_HALF_EXTENT:?};\n")
}

/// Owns every GPU resource of the volume renderer. All of it is created up
/// front; per frame only the two uniform buffers are rewritten.
pub struct VolumeRenderer {
    // Compute ray march
    march_pipeline: wgpu::ComputePipeline,
    uniform_bind_group: wgpu::BindGroup,
    scene_bind_group: wgpu::BindGroup,
    scene_bgl: wgpu::BindGroupLayout,
    // Volume (3D, nearest via textureLoad)
    volume_texture: wgpu::Texture,
    volume_view: wgpu::TextureView,
    // Storage texture (compute -> blit, compute -> readback)
    output_texture: wgpu::Texture,
    output_view: wgpu::TextureView,
    // Blit
    blit_pipeline: wgpu::RenderPipeline,
    blit_bind_group: wgpu::BindGroup,
    // Uniform buffers
    frame_uniform_buffer: wgpu::Buffer,
    march_uniform_buffer: wgpu::Buffer,
    width: u32,
    height: u32,
}

impl VolumeRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        volume: &PackedVolume,
    ) -> Result<Self, NimbusError> {
        check_volume_limits(device, volume)?;

        let march_source = format!("{}\n{VOLUME_MARCH_WGSL}", constants_preamble());
        let march_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("volume-march-shader"),
            source: wgpu::ShaderSource::Wgsl(march_source.into()),
        });
        let blit_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("blit-shader"),
            source: wgpu::ShaderSource::Wgsl(BLIT_WGSL.into()),
        });

        // -- Uniform buffers --
        let frame_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame-uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let march_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("march-uniforms"),
            size: std::mem::size_of::<MarchUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let (volume_texture, volume_view) = Self::create_volume_texture(device, queue, volume);
        let (output_texture, output_view) = Self::create_output_texture(device, width, height);

        // -- Bind group layouts --
        let uniform_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let uniform_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform-bgl"),
            entries: &[uniform_entry(0), uniform_entry(1)],
        });

        let scene_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene-bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D3,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: OUTPUT_FORMAT,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
            ],
        });

        // -- Bind groups --
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform-bg"),
            layout: &uniform_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame_uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: march_uniform_buffer.as_entire_binding(),
                },
            ],
        });
        let scene_bind_group =
            Self::create_scene_bind_group(device, &scene_bgl, &volume_view, &output_view);

        // -- Compute pipeline --
        let march_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("volume-march-pipeline-layout"),
            bind_group_layouts: &[&uniform_bgl, &scene_bgl],
            push_constant_ranges: &[],
        });
        let march_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("volume-march-pipeline"),
            layout: Some(&march_pipeline_layout),
            module: &march_module,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        // -- Blit pipeline --
        let blit_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("blit-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: false },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            }],
        });
        let blit_bind_group = Self::create_blit_bind_group(device, &blit_bgl, &output_texture);

        let blit_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("blit-pipeline-layout"),
            bind_group_layouts: &[&blit_bgl],
            push_constant_ranges: &[],
        });
        let blit_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("blit-pipeline"),
            layout: Some(&blit_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &blit_module,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &blit_module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    // Straight alpha over the cleared background.
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            multiview: None,
            cache: None,
        });

        log::info!(
            "volume renderer ready: volume {}x{}x{}, output {width}x{height}",
            volume.dims().x,
            volume.dims().y,
            volume.dims().z,
        );

        Ok(Self {
            march_pipeline,
            uniform_bind_group,
            scene_bind_group,
            scene_bgl,
            volume_texture,
            volume_view,
            output_texture,
            output_view,
            blit_pipeline,
            blit_bind_group,
            frame_uniform_buffer,
            march_uniform_buffer,
            width,
            height,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The march output. Source for `FrameReadback`.
    pub fn output_texture(&self) -> &wgpu::Texture {
        &self.output_texture
    }

    /// Replace the volume. Reuses the texture when the dimensions match,
    /// otherwise recreates it and the scene bind group.
    pub fn upload_volume(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        volume: &PackedVolume,
    ) -> Result<(), NimbusError> {
        check_volume_limits(device, volume)?;
        let size = self.volume_texture.size();
        let dims = volume.dims();
        if (size.width, size.height, size.depth_or_array_layers) == (dims.x, dims.y, dims.z) {
            write_volume(queue, &self.volume_texture, volume);
            return Ok(());
        }

        log::debug!("volume texture resized to {}x{}x{}", dims.x, dims.y, dims.z);
        let (texture, view) = Self::create_volume_texture(device, queue, volume);
        self.volume_texture = texture;
        self.volume_view = view;
        self.scene_bind_group = Self::create_scene_bind_group(
            device,
            &self.scene_bgl,
            &self.volume_view,
            &self.output_view,
        );
        Ok(())
    }

    /// Upload this frame's camera and march parameters.
    pub fn update_frame(&self, queue: &wgpu::Queue, frame: &FrameParams, params: &RayMarchParams) {
        queue.write_buffer(
            &self.frame_uniform_buffer,
            0,
            bytemuck::bytes_of(&frame.to_uniforms()),
        );
        queue.write_buffer(
            &self.march_uniform_buffer,
            0,
            bytemuck::bytes_of(&params.to_uniforms()),
        );
    }

    /// Encode the compute pass only. The output texture then holds the
    /// un-composited frame.
    pub fn dispatch(&self, encoder: &mut wgpu::CommandEncoder) {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("volume-march-pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.march_pipeline);
        pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        pass.set_bind_group(1, &self.scene_bind_group, &[]);
        pass.dispatch_workgroups(
            self.width.div_ceil(MARCH_WORKGROUP_SIZE),
            self.height.div_ceil(MARCH_WORKGROUP_SIZE),
            1,
        );
    }

    /// Encode compute + blit. The target is cleared to `background` and
    /// the march output is blended over it.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target_view: &wgpu::TextureView,
        background: wgpu::Color,
    ) {
        self.dispatch(encoder);

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("blit-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(background),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.blit_pipeline);
        pass.set_bind_group(0, &self.blit_bind_group, &[]);
        pass.draw(0..3, 0..1);
    }

    // -- Private helpers --

    fn create_volume_texture(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        volume: &PackedVolume,
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let dims = volume.dims();
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("volume-texture"),
            size: wgpu::Extent3d {
                width: dims.x,
                height: dims.y,
                depth_or_array_layers: dims.z,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D3,
            format: VOLUME_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        write_volume(queue, &texture, volume);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    fn create_output_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("march-output-texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: OUTPUT_FORMAT,
            usage: wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    fn create_scene_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        volume_view: &wgpu::TextureView,
        output_view: &wgpu::TextureView,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene-bg"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(volume_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(output_view),
                },
            ],
        })
    }

    fn create_blit_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        output_texture: &wgpu::Texture,
    ) -> wgpu::BindGroup {
        let view = output_texture.create_view(&wgpu::TextureViewDescriptor::default());
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("blit-bg"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            }],
        })
    }
}

fn write_volume(queue: &wgpu::Queue, texture: &wgpu::Texture, volume: &PackedVolume) {
    let dims = volume.dims();
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        volume.as_bytes(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(volume.bytes_per_row()),
            rows_per_image: Some(dims.y),
        },
        wgpu::Extent3d {
            width: dims.x,
            height: dims.y,
            depth_or_array_layers: dims.z,
        },
    );
}

fn check_volume_limits(device: &wgpu::Device, volume: &PackedVolume) -> Result<(), NimbusError> {
    let max = device.limits().max_texture_dimension_3d;
    let dims = volume.dims();
    if dims.max_element() > max {
        return Err(NimbusError::VolumeTooLarge(dims.x, dims.y, dims.z, max));
    }
    Ok(())
}
