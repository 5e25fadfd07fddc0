use std::collections::HashMap;
use std::sync::Arc;

use glam::Mat4;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::core::frame::{AccumulationStep, Technique};
use crate::core::gpu_context::{GpuContext, WindowGpu};
use crate::core::params::{ParamKind, ParameterTable};
use crate::core::sphere::SphereMesh;
use crate::error::{Error, Result};
use crate::scene::{FieldKind, ScenePool, MAX_SPHERES};
use crate::traits::renderer::{RenderBackend, Surface};
use crate::types::{
    AccumulateUniform, MeshVertex, PathTraceUniform, RasterUniform, ScreenRect, SphereInstance,
};

const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const LIGHT_DIR: [f32; 3] = [0.3, 0.8, 0.5];
const RASTER_CLEAR: wgpu::Color = wgpu::Color {
    r: 0.08,
    g: 0.08,
    b: 0.1,
    a: 1.0,
};

const MESH_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
const INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![2 => Float32x4, 3 => Float32x4];

const ALL_SURFACES: [Surface; 4] = [
    Surface::Raster,
    Surface::PathTrace,
    Surface::Accumulated,
    Surface::Previous,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Slot {
    Full,
    Inset,
}

struct Target {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl Target {
    fn new(device: &wgpu::Device, label: &str, width: u32, height: u32, format: wgpu::TextureFormat) -> Self {
        let usage = if format == DEPTH_FORMAT {
            wgpu::TextureUsages::RENDER_ATTACHMENT
        } else {
            wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// Screen-sized surfaces, recreated on resize
struct RenderTargets {
    raster: Target,
    depth: Target,
    path_trace: Target,
    accumulated: Target,
    previous: Target,
    width: u32,
    height: u32,
}

impl RenderTargets {
    fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        Self {
            raster: Target::new(device, "Raster Surface", width, height, HDR_FORMAT),
            depth: Target::new(device, "Raster Depth", width, height, DEPTH_FORMAT),
            path_trace: Target::new(device, "Path Trace Surface", width, height, HDR_FORMAT),
            accumulated: Target::new(device, "Accumulated Surface", width, height, HDR_FORMAT),
            previous: Target::new(device, "Previous Surface", width, height, HDR_FORMAT),
            width,
            height,
        }
    }

    fn get(&self, surface: Surface) -> &Target {
        match surface {
            Surface::Raster => &self.raster,
            Surface::PathTrace => &self.path_trace,
            Surface::Accumulated => &self.accumulated,
            Surface::Previous => &self.previous,
        }
    }

    fn extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }
}

struct RasterStage {
    pipeline: wgpu::RenderPipeline,
    uniform: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
    instances: wgpu::Buffer,
}

struct PathTraceStage {
    pipeline: wgpu::RenderPipeline,
    uniform: wgpu::Buffer,
    /// One storage buffer per field, in `FieldKind::ALL` order
    arrays: Vec<wgpu::Buffer>,
    bind_group: wgpu::BindGroup,
}

struct AccumulateStage {
    constant: wgpu::RenderPipeline,
    weighted: wgpu::RenderPipeline,
    uniform: wgpu::Buffer,
    layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

struct CompositeStage {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    full_rect: wgpu::Buffer,
    inset_rect: wgpu::Buffer,
    bind_groups: HashMap<(Surface, Slot), wgpu::BindGroup>,
}

struct FrameInFlight {
    output: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
}

/// wgpu realisation of the raster, path-trace, accumulate and composite stages
pub struct WgpuBackend {
    gpu: GpuContext,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    targets: RenderTargets,
    raster: RasterStage,
    path_trace: PathTraceStage,
    accumulate: AccumulateStage,
    composite: CompositeStage,
    frame: Option<FrameInFlight>,
}

fn no_frame() -> Error {
    Error::Gpu("no frame in flight; call begin_frame first".to_string())
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn storage_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only: true },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn texture_entry(binding: u32, filterable: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn fullscreen_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    module: &wgpu::ShaderModule,
    fragment_entry: &str,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some(fragment_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn color_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    label: &str,
    view: &wgpu::TextureView,
    load: wgpu::LoadOp<wgpu::Color>,
    depth: Option<&wgpu::TextureView>,
) -> wgpu::RenderPass<'e> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load,
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: depth.map(|view| wgpu::RenderPassDepthStencilAttachment {
            view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        occlusion_query_set: None,
        timestamp_writes: None,
    })
}

impl WgpuBackend {
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let WindowGpu {
            context: gpu,
            surface,
            config,
        } = GpuContext::for_window(window).await?;
        let device = gpu.device();

        let targets = RenderTargets::new(device, config.width, config.height);
        let raster = Self::create_raster_stage(device);
        let path_trace = Self::create_path_trace_stage(device);
        let accumulate = Self::create_accumulate_stage(device, &targets);
        let composite = Self::create_composite_stage(device, &targets, config.format);

        log::info!("wgpu backend ready, sphere capacity {}", MAX_SPHERES);

        Ok(Self {
            gpu,
            surface,
            config,
            targets,
            raster,
            path_trace,
            accumulate,
            composite,
            frame: None,
        })
    }

    fn create_raster_stage(device: &wgpu::Device) -> RasterStage {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Raster Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("raster.wgsl").into()),
        });

        let uniform = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Raster Uniform"),
            size: std::mem::size_of::<RasterUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("raster_bind_group_layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT)],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("raster_bind_group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform.as_entire_binding(),
            }],
        });

        let mesh = SphereMesh::default();
        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sphere Mesh Vertices"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sphere Mesh Indices"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let instances = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sphere Instances"),
            size: (MAX_SPHERES * std::mem::size_of::<SphereInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Raster Pipeline Layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Raster Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<MeshVertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &MESH_ATTRIBUTES,
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<SphereInstance>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &INSTANCE_ATTRIBUTES,
                    },
                ],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: HDR_FORMAT,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        RasterStage {
            pipeline,
            uniform,
            bind_group,
            vertices,
            indices,
            index_count: mesh.indices.len() as u32,
            instances,
        }
    }

    fn create_path_trace_stage(device: &wgpu::Device) -> PathTraceStage {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Path Trace Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("path_trace.wgsl").into()),
        });

        let uniform = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Path Trace Uniform"),
            size: std::mem::size_of::<PathTraceUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let arrays: Vec<wgpu::Buffer> = FieldKind::ALL
            .iter()
            .map(|kind| {
                let stride = match kind.param_kind() {
                    ParamKind::FloatArray => 4,
                    _ => 16,
                };
                device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(kind.binding()),
                    size: (MAX_SPHERES * stride) as u64,
                    usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                })
            })
            .collect();

        let mut layout_entries = vec![uniform_entry(0, wgpu::ShaderStages::FRAGMENT)];
        layout_entries.extend((1..=arrays.len() as u32).map(storage_entry));
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("path_trace_bind_group_layout"),
            entries: &layout_entries,
        });

        let mut entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: uniform.as_entire_binding(),
        }];
        entries.extend(arrays.iter().enumerate().map(|(i, buffer)| wgpu::BindGroupEntry {
            binding: i as u32 + 1,
            resource: buffer.as_entire_binding(),
        }));
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("path_trace_bind_group"),
            layout: &layout,
            entries: &entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Path Trace Pipeline Layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });
        let pipeline = fullscreen_pipeline(
            device,
            "Path Trace Pipeline",
            &pipeline_layout,
            &shader,
            "fs_main",
            HDR_FORMAT,
        );

        PathTraceStage {
            pipeline,
            uniform,
            arrays,
            bind_group,
        }
    }

    fn create_accumulate_stage(device: &wgpu::Device, targets: &RenderTargets) -> AccumulateStage {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Accumulate Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("accumulate.wgsl").into()),
        });

        let uniform = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Accumulate Uniform"),
            size: std::mem::size_of::<AccumulateUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("accumulate_bind_group_layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::FRAGMENT),
                texture_entry(1, false),
                texture_entry(2, false),
            ],
        });
        let bind_group = Self::accumulate_bind_group(device, &layout, &uniform, targets);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Accumulate Pipeline Layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });
        let constant = fullscreen_pipeline(
            device,
            "Accumulate Constant Pipeline",
            &pipeline_layout,
            &shader,
            "fs_constant",
            HDR_FORMAT,
        );
        let weighted = fullscreen_pipeline(
            device,
            "Accumulate Weighted Pipeline",
            &pipeline_layout,
            &shader,
            "fs_weighted",
            HDR_FORMAT,
        );

        AccumulateStage {
            constant,
            weighted,
            uniform,
            layout,
            bind_group,
        }
    }

    fn accumulate_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        uniform: &wgpu::Buffer,
        targets: &RenderTargets,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("accumulate_bind_group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&targets.path_trace.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&targets.previous.view),
                },
            ],
        })
    }

    fn create_composite_stage(
        device: &wgpu::Device,
        targets: &RenderTargets,
        surface_format: wgpu::TextureFormat,
    ) -> CompositeStage {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Composite Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("composite.wgsl").into()),
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("composite_bind_group_layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX),
                texture_entry(1, true),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let full_rect = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Composite Full Rect"),
            contents: bytemuck::bytes_of(&ScreenRect::FULL),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let inset_rect = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Composite Inset Rect"),
            contents: bytemuck::bytes_of(&ScreenRect::inset(targets.width, targets.height)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Composite Pipeline Layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });
        let pipeline = fullscreen_pipeline(
            device,
            "Composite Pipeline",
            &pipeline_layout,
            &shader,
            "fs_main",
            surface_format,
        );

        let mut stage = CompositeStage {
            pipeline,
            layout,
            sampler,
            full_rect,
            inset_rect,
            bind_groups: HashMap::new(),
        };
        stage.rebuild_bind_groups(device, targets);
        stage
    }

    pub fn context(&self) -> &GpuContext {
        &self.gpu
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Reconfigure the window surface and recreate every screen-sized surface
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        let device = self.gpu.device();
        self.surface.configure(device, &self.config);

        self.targets = RenderTargets::new(device, width, height);
        self.accumulate.bind_group = Self::accumulate_bind_group(
            device,
            &self.accumulate.layout,
            &self.accumulate.uniform,
            &self.targets,
        );
        self.composite.rebuild_bind_groups(device, &self.targets);
        self.gpu.queue().write_buffer(
            &self.composite.inset_rect,
            0,
            bytemuck::bytes_of(&ScreenRect::inset(width, height)),
        );
        log::info!("surface resized to {}x{}", width, height);
    }

    /// Record extra work (the inspector overlay) into the current frame after composite
    pub fn overlay<F>(&mut self, paint: F) -> Result<()>
    where
        F: FnOnce(&GpuContext, &mut wgpu::CommandEncoder, &wgpu::TextureView, [u32; 2]),
    {
        let frame = self.frame.as_mut().ok_or_else(no_frame)?;
        paint(
            &self.gpu,
            &mut frame.encoder,
            &frame.view,
            [self.config.width, self.config.height],
        );
        Ok(())
    }

    fn acquire(&mut self) -> Result<wgpu::SurfaceTexture> {
        match self.surface.get_current_texture() {
            Ok(output) => Ok(output),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost or outdated, reconfiguring");
                self.surface.configure(self.gpu.device(), &self.config);
                Ok(self.surface.get_current_texture()?)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl CompositeStage {
    fn rebuild_bind_groups(&mut self, device: &wgpu::Device, targets: &RenderTargets) {
        self.bind_groups.clear();
        for surface in ALL_SURFACES {
            for (slot, rect) in [(Slot::Full, &self.full_rect), (Slot::Inset, &self.inset_rect)] {
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("composite_bind_group"),
                    layout: &self.layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: rect.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(&targets.get(surface).view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::Sampler(&self.sampler),
                        },
                    ],
                });
                self.bind_groups.insert((surface, slot), bind_group);
            }
        }
    }

    fn bind_group(&self, surface: Surface, slot: Slot) -> Result<&wgpu::BindGroup> {
        self.bind_groups
            .get(&(surface, slot))
            .ok_or_else(|| Error::Gpu(format!("no composite binding for {surface:?}")))
    }
}

impl RenderBackend for WgpuBackend {
    fn screen_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn sphere_capacity(&self) -> usize {
        MAX_SPHERES
    }

    fn begin_frame(&mut self) -> Result<()> {
        if self.frame.is_some() {
            return Err(Error::Gpu("previous frame was never presented".to_string()));
        }
        let output = self.acquire()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });
        self.frame = Some(FrameInFlight {
            output,
            view,
            encoder,
        });
        Ok(())
    }

    fn capture_previous(&mut self, source: Surface) -> Result<()> {
        let frame = self.frame.as_mut().ok_or_else(no_frame)?;
        frame.encoder.copy_texture_to_texture(
            self.targets.get(source).texture.as_image_copy(),
            self.targets.previous.texture.as_image_copy(),
            self.targets.extent(),
        );
        Ok(())
    }

    fn raster_pass(&mut self, scene: &ScenePool, view: Mat4, projection: Mat4) -> Result<()> {
        let instances: Vec<SphereInstance> = scene
            .objects()
            .iter()
            .take(MAX_SPHERES)
            .map(SphereInstance::from)
            .collect();

        let queue = self.gpu.queue();
        queue.write_buffer(
            &self.raster.uniform,
            0,
            bytemuck::bytes_of(&RasterUniform {
                view_proj: (projection * view).to_cols_array_2d(),
                light_dir: LIGHT_DIR,
                _pad: 0.0,
            }),
        );
        queue.write_buffer(&self.raster.instances, 0, bytemuck::cast_slice(&instances));

        let frame = self.frame.as_mut().ok_or_else(no_frame)?;
        let mut pass = color_pass(
            &mut frame.encoder,
            "Raster Pass",
            &self.targets.raster.view,
            wgpu::LoadOp::Clear(RASTER_CLEAR),
            Some(&self.targets.depth.view),
        );
        pass.set_pipeline(&self.raster.pipeline);
        pass.set_bind_group(0, &self.raster.bind_group, &[]);
        pass.set_vertex_buffer(0, self.raster.vertices.slice(..));
        pass.set_vertex_buffer(1, self.raster.instances.slice(..));
        pass.set_index_buffer(self.raster.indices.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.raster.index_count, 0, 0..instances.len() as u32);
        Ok(())
    }

    fn path_trace_pass(&mut self, params: &ParameterTable) -> Result<()> {
        let sphere_count = params
            .layout()
            .find(FieldKind::Position.binding())
            .map(|(_, decl)| decl.len)
            .unwrap_or(0);
        let uniform = PathTraceUniform::from_params(params, sphere_count)?;

        let queue = self.gpu.queue();
        queue.write_buffer(&self.path_trace.uniform, 0, bytemuck::bytes_of(&uniform));
        for (name, value) in params.dirty_arrays() {
            let kind: FieldKind = name.parse()?;
            queue.write_buffer(&self.path_trace.arrays[kind as usize], 0, &value.as_gpu_bytes());
        }

        let frame = self.frame.as_mut().ok_or_else(no_frame)?;
        let mut pass = color_pass(
            &mut frame.encoder,
            "Path Trace Pass",
            &self.targets.path_trace.view,
            wgpu::LoadOp::Clear(wgpu::Color::BLACK),
            None,
        );
        pass.set_pipeline(&self.path_trace.pipeline);
        pass.set_bind_group(0, &self.path_trace.bind_group, &[]);
        pass.draw(0..3, 0..1);
        Ok(())
    }

    fn accumulate_pass(&mut self, step: &AccumulationStep) -> Result<()> {
        self.gpu.queue().write_buffer(
            &self.accumulate.uniform,
            0,
            bytemuck::bytes_of(&AccumulateUniform {
                frames: step.frames,
                constant_weight: step.weight,
                _pad: [0; 2],
            }),
        );

        let pipeline = match step.technique {
            Technique::Constant => &self.accumulate.constant,
            Technique::Weighted => &self.accumulate.weighted,
        };
        let frame = self.frame.as_mut().ok_or_else(no_frame)?;
        let mut pass = color_pass(
            &mut frame.encoder,
            "Accumulate Pass",
            &self.targets.accumulated.view,
            wgpu::LoadOp::Clear(wgpu::Color::BLACK),
            None,
        );
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &self.accumulate.bind_group, &[]);
        pass.draw(0..3, 0..1);
        Ok(())
    }

    fn composite_pass(&mut self, primary: Surface, inset: Surface) -> Result<()> {
        let full = self.composite.bind_group(primary, Slot::Full)?;
        let small = self.composite.bind_group(inset, Slot::Inset)?;

        let frame = self.frame.as_mut().ok_or_else(no_frame)?;
        let mut pass = color_pass(
            &mut frame.encoder,
            "Composite Pass",
            &frame.view,
            wgpu::LoadOp::Clear(wgpu::Color::BLACK),
            None,
        );
        pass.set_pipeline(&self.composite.pipeline);
        pass.set_bind_group(0, full, &[]);
        pass.draw(0..6, 0..1);
        pass.set_bind_group(0, small, &[]);
        pass.draw(0..6, 0..1);
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        let frame = self.frame.take().ok_or_else(no_frame)?;
        self.gpu.queue().submit(std::iter::once(frame.encoder.finish()));
        frame.output.present();
        Ok(())
    }
}
