use foundation::math::Mat4;

/// Remaps GL clip depth `[-w, w]` (what the map's matrix produces) to the
/// `[0, w]` range wgpu rasterizes.
pub fn gl_to_wgpu_clip() -> Mat4 {
    let mut m = Mat4::IDENTITY;
    m.cols[10] = 0.5;
    m.cols[14] = 0.5;
    m
}

/// Normalized directions and intensities of the two scene lights.
pub fn scene_lights() -> [([f32; 3], f32); 2] {
    let dir = |x: f64, y: f64, z: f64| {
        foundation::math::Vec3::new(x, y, z)
            .normalize()
            .map(|v| v.as_f32())
            .unwrap_or([0.0, 0.0, 1.0])
    };
    [(dir(0.0, -70.0, 100.0), 0.9), (dir(0.0, 70.0, 100.0), 0.6)]
}

#[cfg(target_arch = "wasm32")]
mod imp {
    use ::wgpu::util::DeviceExt;
    use foundation::math::Mat4;
    use scene::DrawItem;
    use scene::components::Part;
    use std::borrow::Cow;

    use super::{gl_to_wgpu_clip, scene_lights};
    use crate::error::ViewerError;

    const MODEL_SHADER: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    light0: vec4<f32>,
    light1: vec4<f32>,
};

struct PartUniform {
    model: mat4x4<f32>,
    base_color: vec4<f32>,
    emissive: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

@group(1) @binding(0)
var<uniform> part: PartUniform;

struct VsOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) normal: vec3<f32>,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) normal: vec3<f32>) -> VsOut {
    let world = part.model * vec4<f32>(position, 1.0);
    let n = (part.model * vec4<f32>(normal, 0.0)).xyz;
    return VsOut(globals.view_proj * world, n);
}

@fragment
fn fs_main(fs_in: VsOut) -> @location(0) vec4<f32> {
    let n = normalize(fs_in.normal);
    let d0 = max(dot(n, globals.light0.xyz), 0.0) * globals.light0.w;
    let d1 = max(dot(n, globals.light1.xyz), 0.0) * globals.light1.w;
    let rgb = part.base_color.rgb * (d0 + d1) + part.emissive.rgb;
    let a = part.base_color.a;
    return vec4<f32>(rgb * a, a);
}
"#;

    #[repr(C)]
    #[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
    struct Vertex {
        position: [f32; 3],
        normal: [f32; 3],
    }

    #[repr(C)]
    #[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
    struct Globals {
        view_proj: [[f32; 4]; 4],
        light0: [f32; 4],
        light1: [f32; 4],
    }

    #[repr(C)]
    #[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
    struct PartUniform {
        model: [[f32; 4]; 4],
        base_color: [f32; 4],
        emissive: [f32; 4],
    }

    #[derive(Debug)]
    struct GpuPart {
        vertex_buffer: ::wgpu::Buffer,
        index_buffer: ::wgpu::Buffer,
        index_count: u32,
        uniform_buffer: ::wgpu::Buffer,
        bind_group: ::wgpu::BindGroup,
    }

    #[derive(Debug)]
    pub struct ModelRenderer {
        _instance: &'static ::wgpu::Instance,
        surface: ::wgpu::Surface<'static>,
        device: ::wgpu::Device,
        queue: ::wgpu::Queue,
        config: ::wgpu::SurfaceConfiguration,
        _canvas: web_sys::HtmlCanvasElement,
        pipeline: ::wgpu::RenderPipeline,
        globals_buffer: ::wgpu::Buffer,
        globals_bind_group: ::wgpu::BindGroup,
        part_layout: ::wgpu::BindGroupLayout,
        depth_view: ::wgpu::TextureView,
        parts: Vec<GpuPart>,
    }

    fn create_depth_view(
        device: &::wgpu::Device,
        config: &::wgpu::SurfaceConfiguration,
    ) -> ::wgpu::TextureView {
        let tex = device.create_texture(&::wgpu::TextureDescriptor {
            label: Some("model-depth"),
            size: ::wgpu::Extent3d {
                width: config.width.max(1),
                height: config.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: ::wgpu::TextureDimension::D2,
            format: ::wgpu::TextureFormat::Depth24Plus,
            usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        tex.create_view(&::wgpu::TextureViewDescriptor::default())
    }

    fn uniform_layout_entry() -> ::wgpu::BindGroupLayoutEntry {
        ::wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: ::wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: ::wgpu::BindingType::Buffer {
                ty: ::wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }
    }

    pub async fn init_renderer(
        canvas: web_sys::HtmlCanvasElement,
    ) -> Result<ModelRenderer, ViewerError> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        // The surface must not outlive its instance; the instance lives for the page.
        let instance: &'static ::wgpu::Instance = Box::leak(Box::new(::wgpu::Instance::new(
            &::wgpu::InstanceDescriptor {
                backends: ::wgpu::Backends::BROWSER_WEBGPU | ::wgpu::Backends::GL,
                ..Default::default()
            },
        )));

        let surface = instance
            .create_surface(::wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| ViewerError::Gpu(format!("surface error: {e}")))?;

        let adapter = instance
            .request_adapter(&::wgpu::RequestAdapterOptions {
                power_preference: ::wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| ViewerError::Gpu(format!("adapter error: {e}")))?;

        let (device, queue) = adapter
            .request_device(&::wgpu::DeviceDescriptor {
                label: Some("model-overlay-device"),
                required_features: ::wgpu::Features::empty(),
                required_limits: ::wgpu::Limits::downlevel_webgl2_defaults(),
                ..Default::default()
            })
            .await
            .map_err(|e| ViewerError::Gpu(format!("device error: {e}")))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| ViewerError::Gpu("surface has no formats".into()))?;
        let alpha_mode = if caps
            .alpha_modes
            .contains(&::wgpu::CompositeAlphaMode::PreMultiplied)
        {
            ::wgpu::CompositeAlphaMode::PreMultiplied
        } else {
            caps.alpha_modes
                .first()
                .copied()
                .unwrap_or(::wgpu::CompositeAlphaMode::Auto)
        };

        let config = ::wgpu::SurfaceConfiguration {
            usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            desired_maximum_frame_latency: 2,
            present_mode: ::wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&device, &config);
        let depth_view = create_depth_view(&device, &config);

        let shader = device.create_shader_module(::wgpu::ShaderModuleDescriptor {
            label: Some("model-shader"),
            source: ::wgpu::ShaderSource::Wgsl(Cow::Borrowed(MODEL_SHADER)),
        });

        let globals_layout = device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
            label: Some("model-globals-bgl"),
            entries: &[uniform_layout_entry()],
        });
        let part_layout = device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
            label: Some("model-part-bgl"),
            entries: &[uniform_layout_entry()],
        });

        let globals_buffer = device.create_buffer(&::wgpu::BufferDescriptor {
            label: Some("model-globals"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: ::wgpu::BufferUsages::UNIFORM | ::wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_bind_group = device.create_bind_group(&::wgpu::BindGroupDescriptor {
            label: Some("model-globals-bg"),
            layout: &globals_layout,
            entries: &[::wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&::wgpu::PipelineLayoutDescriptor {
            label: Some("model-pipeline-layout"),
            bind_group_layouts: &[&globals_layout, &part_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&::wgpu::RenderPipelineDescriptor {
            label: Some("model-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: ::wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[::wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as ::wgpu::BufferAddress,
                    step_mode: ::wgpu::VertexStepMode::Vertex,
                    attributes: &[
                        ::wgpu::VertexAttribute {
                            format: ::wgpu::VertexFormat::Float32x3,
                            offset: 0,
                            shader_location: 0,
                        },
                        ::wgpu::VertexAttribute {
                            format: ::wgpu::VertexFormat::Float32x3,
                            offset: 12,
                            shader_location: 1,
                        },
                    ],
                }],
            },
            fragment: Some(::wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(::wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(::wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: ::wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: ::wgpu::PrimitiveState {
                topology: ::wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: ::wgpu::FrontFace::Ccw,
                // Placement rotations can flip handedness; draw both faces.
                cull_mode: None,
                polygon_mode: ::wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(::wgpu::DepthStencilState {
                format: ::wgpu::TextureFormat::Depth24Plus,
                depth_write_enabled: true,
                depth_compare: ::wgpu::CompareFunction::LessEqual,
                stencil: ::wgpu::StencilState::default(),
                bias: ::wgpu::DepthBiasState::default(),
            }),
            multisample: ::wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Ok(ModelRenderer {
            _instance: instance,
            surface,
            device,
            queue,
            config,
            _canvas: canvas,
            pipeline,
            globals_buffer,
            globals_bind_group,
            part_layout,
            depth_view,
            parts: Vec::new(),
        })
    }

    impl ModelRenderer {
        /// Replaces all GPU meshes with `parts`, in the same order.
        pub fn upload_parts(&mut self, parts: &[Part]) {
            self.parts = parts
                .iter()
                .map(|part| {
                    let normals = part.geometry.vertex_normals();
                    let vertices: Vec<Vertex> = part
                        .geometry
                        .positions
                        .iter()
                        .zip(normals)
                        .map(|(p, n)| Vertex {
                            position: *p,
                            normal: n,
                        })
                        .collect();
                    let vertex_buffer =
                        self.device
                            .create_buffer_init(&::wgpu::util::BufferInitDescriptor {
                                label: Some("model-part-vertices"),
                                contents: bytemuck::cast_slice(&vertices),
                                usage: ::wgpu::BufferUsages::VERTEX,
                            });
                    let index_buffer =
                        self.device
                            .create_buffer_init(&::wgpu::util::BufferInitDescriptor {
                                label: Some("model-part-indices"),
                                contents: bytemuck::cast_slice(&part.geometry.indices),
                                usage: ::wgpu::BufferUsages::INDEX,
                            });
                    let uniform_buffer = self.device.create_buffer(&::wgpu::BufferDescriptor {
                        label: Some("model-part-uniform"),
                        size: std::mem::size_of::<PartUniform>() as u64,
                        usage: ::wgpu::BufferUsages::UNIFORM | ::wgpu::BufferUsages::COPY_DST,
                        mapped_at_creation: false,
                    });
                    let bind_group = self.device.create_bind_group(&::wgpu::BindGroupDescriptor {
                        label: Some("model-part-bg"),
                        layout: &self.part_layout,
                        entries: &[::wgpu::BindGroupEntry {
                            binding: 0,
                            resource: uniform_buffer.as_entire_binding(),
                        }],
                    });
                    GpuPart {
                        vertex_buffer,
                        index_buffer,
                        index_count: part.geometry.indices.len() as u32,
                        uniform_buffer,
                        bind_group,
                    }
                })
                .collect();
            tracing::debug!(parts = self.parts.len(), "uploaded model meshes");
        }

        pub fn resize(&mut self, width: u32, height: u32) {
            self.config.width = width.max(1);
            self.config.height = height.max(1);
            self.surface.configure(&self.device, &self.config);
            self.depth_view = create_depth_view(&self.device, &self.config);
        }

        /// Clears the overlay and draws `items` with the frame's view matrix.
        pub fn render(&self, view_proj: &Mat4, items: &[DrawItem]) -> Result<(), ViewerError> {
            let frame = self
                .surface
                .get_current_texture()
                .map_err(|e| ViewerError::Gpu(format!("surface acquire failed: {e}")))?;
            let view = frame
                .texture
                .create_view(&::wgpu::TextureViewDescriptor::default());

            let [(l0, i0), (l1, i1)] = scene_lights();
            let globals = Globals {
                view_proj: (gl_to_wgpu_clip() * *view_proj).to_f32_cols(),
                light0: [l0[0], l0[1], l0[2], i0],
                light1: [l1[0], l1[1], l1[2], i1],
            };
            self.queue
                .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

            for item in items {
                let Some(gpu) = self.parts.get(item.part.index()) else {
                    continue;
                };
                let e = item.emissive.to_array();
                let uniform = PartUniform {
                    model: item.world.to_f32_cols(),
                    base_color: item.base_color,
                    emissive: [e[0], e[1], e[2], 0.0],
                };
                self.queue
                    .write_buffer(&gpu.uniform_buffer, 0, bytemuck::bytes_of(&uniform));
            }

            let mut encoder = self
                .device
                .create_command_encoder(&::wgpu::CommandEncoderDescriptor {
                    label: Some("model-encoder"),
                });
            {
                let mut rpass = encoder.begin_render_pass(&::wgpu::RenderPassDescriptor {
                    label: Some("model-pass"),
                    color_attachments: &[Some(::wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        depth_slice: None,
                        ops: ::wgpu::Operations {
                            load: ::wgpu::LoadOp::Clear(::wgpu::Color::TRANSPARENT),
                            store: ::wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: Some(::wgpu::RenderPassDepthStencilAttachment {
                        view: &self.depth_view,
                        depth_ops: Some(::wgpu::Operations {
                            load: ::wgpu::LoadOp::Clear(1.0),
                            store: ::wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                    multiview_mask: None,
                });

                rpass.set_pipeline(&self.pipeline);
                rpass.set_bind_group(0, &self.globals_bind_group, &[]);
                for item in items {
                    let Some(gpu) = self.parts.get(item.part.index()) else {
                        continue;
                    };
                    rpass.set_bind_group(1, &gpu.bind_group, &[]);
                    rpass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
                    rpass.set_index_buffer(gpu.index_buffer.slice(..), ::wgpu::IndexFormat::Uint32);
                    rpass.draw_indexed(0..gpu.index_count, 0, 0..1);
                }
            }

            self.queue.submit(std::iter::once(encoder.finish()));
            frame.present();
            Ok(())
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    use foundation::math::Mat4;
    use scene::DrawItem;
    use scene::components::Part;

    use crate::error::ViewerError;

    #[derive(Debug, Default)]
    pub struct ModelRenderer;

    pub async fn init_renderer(
        _canvas: web_sys::HtmlCanvasElement,
    ) -> Result<ModelRenderer, ViewerError> {
        Err(ViewerError::Gpu(
            "wgpu initialization is only available on wasm32 targets".into(),
        ))
    }

    impl ModelRenderer {
        pub fn upload_parts(&mut self, _parts: &[Part]) {}

        pub fn resize(&mut self, _width: u32, _height: u32) {}

        pub fn render(&self, _view_proj: &Mat4, _items: &[DrawItem]) -> Result<(), ViewerError> {
            Err(ViewerError::Gpu(
                "wgpu rendering is only available on wasm32 targets".into(),
            ))
        }
    }
}

pub use imp::{ModelRenderer, init_renderer};
