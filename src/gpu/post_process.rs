//! Bloom post-processing.
//!
//! The scene is rendered into an HDR offscreen texture. A bright pass copies
//! everything above the threshold into a half-resolution target, two
//! separable blur passes spread it out, and the composite pass adds the glow
//! back onto the scene and tone-maps into the surface.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::shaders::BLOOM_SHADER;
use super::DEPTH_FORMAT;
use crate::visuals::BloomSettings;

/// Format of the scene and bloom targets.
pub(crate) const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct BloomUniforms {
    direction: [f32; 2],
    strength: f32,
    radius: f32,
    threshold: f32,
    _pad: [f32; 3],
}

impl BloomUniforms {
    fn new(settings: &BloomSettings, direction: [f32; 2]) -> Self {
        Self {
            direction,
            strength: settings.strength,
            radius: settings.radius,
            threshold: settings.threshold,
            _pad: [0.0; 3],
        }
    }
}

/// Size-dependent textures and the bind groups that read them.
struct Targets {
    scene_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
    /// Bright pass output, then vertical blur output.
    bloom_a: wgpu::TextureView,
    /// Horizontal blur output.
    bloom_b: wgpu::TextureView,
    bright_group: wgpu::BindGroup,
    blur_h_group: wgpu::BindGroup,
    blur_v_group: wgpu::BindGroup,
    composite_group: wgpu::BindGroup,
    half_size: (u32, u32),
}

/// GPU resources for the bloom chain.
pub struct BloomChain {
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    bright_pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,
    /// Uniforms for the bright and composite passes.
    base_uniforms: wgpu::Buffer,
    blur_h_uniforms: wgpu::Buffer,
    blur_v_uniforms: wgpu::Buffer,
    targets: Targets,
}

impl BloomChain {
    pub fn new(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Bloom Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bloom Bind Group Layout"),
            entries: &[
                texture_entry(0),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                texture_entry(3),
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Bloom Shader"),
            source: wgpu::ShaderSource::Wgsl(BLOOM_SHADER.into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Bloom Pipeline Layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let bright_pipeline =
            fullscreen_pipeline(device, &pipeline_layout, &shader, "fs_bright", HDR_FORMAT);
        let blur_pipeline =
            fullscreen_pipeline(device, &pipeline_layout, &shader, "fs_blur", HDR_FORMAT);
        let composite_pipeline = fullscreen_pipeline(
            device,
            &pipeline_layout,
            &shader,
            "fs_composite",
            surface_format,
        );

        let defaults = BloomSettings::default();
        let uniform_buffer = |label| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(&[BloomUniforms::new(&defaults, [0.0, 0.0])]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            })
        };
        let base_uniforms = uniform_buffer("Bloom Uniforms");
        let blur_h_uniforms = uniform_buffer("Bloom Blur H Uniforms");
        let blur_v_uniforms = uniform_buffer("Bloom Blur V Uniforms");

        let targets = create_targets(
            device,
            &layout,
            &sampler,
            [&base_uniforms, &blur_h_uniforms, &blur_v_uniforms],
            width,
            height,
        );

        Self {
            layout,
            sampler,
            bright_pipeline,
            blur_pipeline,
            composite_pipeline,
            base_uniforms,
            blur_h_uniforms,
            blur_v_uniforms,
            targets,
        }
    }

    /// HDR colour target the scene pass draws into.
    pub fn scene_view(&self) -> &wgpu::TextureView {
        &self.targets.scene_view
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.targets.depth_view
    }

    /// Recreate textures and bind groups after window resize.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.targets = create_targets(
            device,
            &self.layout,
            &self.sampler,
            [&self.base_uniforms, &self.blur_h_uniforms, &self.blur_v_uniforms],
            width,
            height,
        );
    }

    /// Upload this frame's bloom parameters.
    pub fn write_uniforms(&self, queue: &wgpu::Queue, settings: &BloomSettings) {
        let (w, h) = self.targets.half_size;
        let texel = [1.0 / w as f32, 1.0 / h as f32];
        queue.write_buffer(
            &self.base_uniforms,
            0,
            bytemuck::cast_slice(&[BloomUniforms::new(settings, [0.0, 0.0])]),
        );
        queue.write_buffer(
            &self.blur_h_uniforms,
            0,
            bytemuck::cast_slice(&[BloomUniforms::new(settings, [texel[0], 0.0])]),
        );
        queue.write_buffer(
            &self.blur_v_uniforms,
            0,
            bytemuck::cast_slice(&[BloomUniforms::new(settings, [0.0, texel[1]])]),
        );
    }

    /// Record the bright, blur and composite passes. The composite lands in `output`.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, output: &wgpu::TextureView) {
        let t = &self.targets;
        fullscreen_pass(encoder, "Bloom Bright Pass", &t.bloom_a, &self.bright_pipeline, &t.bright_group);
        fullscreen_pass(encoder, "Bloom Blur H Pass", &t.bloom_b, &self.blur_pipeline, &t.blur_h_group);
        fullscreen_pass(encoder, "Bloom Blur V Pass", &t.bloom_a, &self.blur_pipeline, &t.blur_v_group);
        fullscreen_pass(encoder, "Bloom Composite Pass", output, &self.composite_pipeline, &t.composite_group);
    }
}

fn fullscreen_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    fragment_entry: &str,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(fragment_entry),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_fullscreen"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fragment_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn fullscreen_pass(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    target: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });
    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, bind_group, &[]);
    pass.draw(0..3, 0..1);
}

fn color_target(
    device: &wgpu::Device,
    label: &str,
    width: u32,
    height: u32,
) -> wgpu::TextureView {
    device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: HDR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        })
        .create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_targets(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    [base, blur_h, blur_v]: [&wgpu::Buffer; 3],
    width: u32,
    height: u32,
) -> Targets {
    let width = width.max(1);
    let height = height.max(1);
    let half_size = ((width / 2).max(1), (height / 2).max(1));

    let scene_view = color_target(device, "Scene HDR Texture", width, height);
    let bloom_a = color_target(device, "Bloom Texture A", half_size.0, half_size.1);
    let bloom_b = color_target(device, "Bloom Texture B", half_size.0, half_size.1);

    let depth_view = device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some("Scene Depth Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
        .create_view(&wgpu::TextureViewDescriptor::default());

    let group = |label, source: &wgpu::TextureView, uniforms: &wgpu::Buffer| {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(source),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&scene_view),
                },
            ],
        })
    };

    let bright_group = group("Bloom Bright Bind Group", &scene_view, base);
    let blur_h_group = group("Bloom Blur H Bind Group", &bloom_a, blur_h);
    let blur_v_group = group("Bloom Blur V Bind Group", &bloom_b, blur_v);
    let composite_group = group("Bloom Composite Bind Group", &bloom_a, base);

    Targets {
        scene_view,
        depth_view,
        bloom_a,
        bloom_b,
        bright_group,
        blur_h_group,
        blur_v_group,
        composite_group,
        half_size,
    }
}
