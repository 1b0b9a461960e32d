//! Offscreen wgpu backend
//!
//! Executes resolved draw calls on a wgpu device rendering into an offscreen
//! color/depth pair, with pixel readback for tooling and golden-image tests.
//!
//! Shader convention: an effect pass's vertex and fragment sources are
//! concatenated into one WGSL module with `vs_main`/`fs_main` entry points.
//! Macro defines are prepended as `const NAME: i32 = value;`. Geometry is
//! expected in the standard layout (position 3, normal 3, uv 2) and uniform
//! values are packed, one vec4-aligned slot each (a mat4 taking four), in
//! binding-name order into a single uniform buffer at group 0 binding 0.
//! Texture uniforms bind as texture/sampler pairs at group 1 in name order.

use crate::{Blending, CompareMode, RenderContext, ResolvedDrawCall, TriangleCulling};
use glam::Vec4;
use lantern_core::{LanternError, Result};
use lantern_data::Value;
use std::collections::HashMap;
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

struct Program {
    module: wgpu::ShaderModule,
}

struct TextureEntry {
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

struct PreparedDraw {
    pipeline_key: (u32, u64, usize),
    uniform_bind_group: wgpu::BindGroup,
    texture_bind_group: Option<wgpu::BindGroup>,
    vertex_buffer: u32,
    index_buffer: u32,
    index_count: u32,
    scissor: Option<[u32; 4]>,
}

/// A [`RenderContext`] backed by a wgpu device and an offscreen target.
pub struct WgpuContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub width: u32,
    pub height: u32,
    color_texture: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,

    buffers: HashMap<u32, wgpu::Buffer>,
    textures: HashMap<u32, TextureEntry>,
    programs: HashMap<u32, Program>,
    program_cache: HashMap<String, u32>,
    pipelines: HashMap<(u32, u64, usize), wgpu::RenderPipeline>,
    uniform_layout: wgpu::BindGroupLayout,
    texture_layouts: HashMap<usize, wgpu::BindGroupLayout>,

    next_id: u32,
    clear_color: Vec4,
    pending: Vec<PreparedDraw>,
}

impl WgpuContext {
    /// Create an offscreen context of the given size.
    pub async fn new(width: u32, height: u32) -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| LanternError::RenderError("no compatible adapter".to_string()))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Lantern Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(|e| LanternError::RenderError(e.to_string()))?;

        let color_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Lantern Color Target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let color_view = color_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Lantern Depth Target"),
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
        });
        let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("Lantern Uniform Layout"),
        });

        Ok(Self {
            device,
            queue,
            width,
            height,
            color_texture,
            color_view,
            depth_view,
            buffers: HashMap::new(),
            textures: HashMap::new(),
            programs: HashMap::new(),
            program_cache: HashMap::new(),
            pipelines: HashMap::new(),
            uniform_layout,
            texture_layouts: HashMap::new(),
            next_id: 0,
            clear_color: Vec4::ZERO,
            pending: Vec::new(),
        })
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn texture_layout(&mut self, num_textures: usize) -> &wgpu::BindGroupLayout {
        let device = &self.device;
        self.texture_layouts.entry(num_textures).or_insert_with(|| {
            let mut entries = Vec::with_capacity(num_textures * 2);
            for i in 0..num_textures as u32 {
                entries.push(wgpu::BindGroupLayoutEntry {
                    binding: i * 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                });
                entries.push(wgpu::BindGroupLayoutEntry {
                    binding: i * 2 + 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                });
            }
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &entries,
                label: Some("Lantern Texture Layout"),
            })
        })
    }

    fn ensure_pipeline(&mut self, program: u32, states: &crate::States, num_textures: usize) {
        let key = (program, states.cache_key(), num_textures);
        if self.pipelines.contains_key(&key) {
            return;
        }

        // Make sure the texture layout exists before borrowing for layout refs.
        self.texture_layout(num_textures);

        let module = &self.programs[&program].module;
        let mut layouts: Vec<&wgpu::BindGroupLayout> = vec![&self.uniform_layout];
        if num_textures > 0 {
            layouts.push(&self.texture_layouts[&num_textures]);
        }
        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Lantern Pipeline Layout"),
                bind_group_layouts: &layouts,
                push_constant_ranges: &[],
            });

        let blend = match states.blending {
            Blending::Opaque => None,
            Blending::Alpha => Some(wgpu::BlendState::ALPHA_BLENDING),
            Blending::Additive => Some(wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::SrcAlpha,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent::OVER,
            }),
        };

        let cull_mode = match states.triangle_culling {
            TriangleCulling::None => None,
            TriangleCulling::Front => Some(wgpu::Face::Front),
            TriangleCulling::Back => Some(wgpu::Face::Back),
        };

        let depth_compare = match states.depth_function {
            CompareMode::Always => wgpu::CompareFunction::Always,
            CompareMode::Equal => wgpu::CompareFunction::Equal,
            CompareMode::Greater => wgpu::CompareFunction::Greater,
            CompareMode::GreaterEqual => wgpu::CompareFunction::GreaterEqual,
            CompareMode::Less => wgpu::CompareFunction::Less,
            CompareMode::LessEqual => wgpu::CompareFunction::LessEqual,
            CompareMode::Never => wgpu::CompareFunction::Never,
            CompareMode::NotEqual => wgpu::CompareFunction::NotEqual,
        };

        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: (8 * std::mem::size_of::<f32>()) as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![
                0 => Float32x3,
                1 => Float32x3,
                2 => Float32x2,
            ],
        };

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Lantern Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module,
                    entry_point: Some("vs_main"),
                    buffers: &[vertex_layout],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: wgpu::TextureFormat::Rgba8UnormSrgb,
                        blend,
                        write_mask: if states.color_mask {
                            wgpu::ColorWrites::ALL
                        } else {
                            wgpu::ColorWrites::empty()
                        },
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: states.depth_mask,
                    depth_compare,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

        self.pipelines.insert(key, pipeline);
    }

    /// Read the color target back as tightly packed RGBA bytes.
    pub async fn read_pixels(&self) -> Result<Vec<u8>> {
        let bytes_per_pixel = 4u32;
        let unpadded_bytes_per_row = self.width * bytes_per_pixel;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_bytes_per_row = unpadded_bytes_per_row.div_ceil(align) * align;

        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Lantern Readback"),
            size: (padded_bytes_per_row * self.height) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Lantern Readback Encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &self.color_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &staging,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|e| LanternError::RenderError(e.to_string()))?
            .map_err(|e| LanternError::RenderError(e.to_string()))?;

        let data = slice.get_mapped_range();
        let mut pixels =
            Vec::with_capacity((self.width * self.height * bytes_per_pixel) as usize);
        for row in 0..self.height {
            let start = (row * padded_bytes_per_row) as usize;
            pixels.extend_from_slice(&data[start..start + unpadded_bytes_per_row as usize]);
        }
        drop(data);
        staging.unmap();

        Ok(pixels)
    }
}

/// Pack a uniform value into vec4-aligned slots.
fn pack_uniform(value: &Value, out: &mut Vec<f32>) {
    match value {
        Value::Bool(v) => out.extend_from_slice(&[*v as i32 as f32, 0.0, 0.0, 0.0]),
        Value::Int(v) => out.extend_from_slice(&[*v as f32, 0.0, 0.0, 0.0]),
        Value::UInt(v) => out.extend_from_slice(&[*v as f32, 0.0, 0.0, 0.0]),
        Value::Float(v) => out.extend_from_slice(&[*v, 0.0, 0.0, 0.0]),
        Value::Vec2(v) => out.extend_from_slice(&[v.x, v.y, 0.0, 0.0]),
        Value::Vec3(v) => out.extend_from_slice(&[v.x, v.y, v.z, 0.0]),
        Value::Vec4(v) => out.extend_from_slice(&v.to_array()),
        Value::Mat4(v) => out.extend_from_slice(&v.to_cols_array()),
        Value::FloatArray(values) => {
            for chunk in values.chunks(4) {
                let mut slot = [0.0f32; 4];
                slot[..chunk.len()].copy_from_slice(chunk);
                out.extend_from_slice(&slot);
            }
        }
        // Strings and textures do not land in the uniform block.
        Value::String(_) | Value::Texture(_) => {}
    }
}

impl RenderContext for WgpuContext {
    fn create_vertex_buffer(&mut self, data: &[f32]) -> u32 {
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Lantern Vertex Buffer"),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let id = self.next_id();
        self.buffers.insert(id, buffer);
        id
    }

    fn create_index_buffer(&mut self, data: &[u32]) -> u32 {
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Lantern Index Buffer"),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::INDEX,
            });
        let id = self.next_id();
        self.buffers.insert(id, buffer);
        id
    }

    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> u32 {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Lantern Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Lantern Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let id = self.next_id();
        self.textures.insert(id, TextureEntry { view, sampler });
        id
    }

    fn create_program(
        &mut self,
        label: &str,
        vertex_shader: &str,
        fragment_shader: &str,
        defines: &[(String, i32)],
    ) -> Result<u32> {
        let mut source = String::new();
        for (name, value) in defines {
            source.push_str(&format!("const {}: i32 = {};\n", name, value));
        }
        source.push_str(vertex_shader);
        source.push('\n');
        source.push_str(fragment_shader);

        if let Some(id) = self.program_cache.get(&source) {
            return Ok(*id);
        }

        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(source.clone().into()),
            });

        let id = self.next_id();
        self.programs.insert(id, Program { module });
        self.program_cache.insert(source, id);
        Ok(id)
    }

    fn begin_frame(&mut self, clear_color: Vec4) {
        self.clear_color = clear_color;
        self.pending.clear();
    }

    fn draw(&mut self, call: &ResolvedDrawCall<'_>) {
        let mut packed: Vec<f32> = Vec::new();
        let mut texture_ids = Vec::new();
        for (_, value) in call.uniforms {
            if let Value::Texture(id) = value {
                texture_ids.push(*id);
            } else {
                pack_uniform(value, &mut packed);
            }
        }
        if packed.is_empty() {
            packed.extend_from_slice(&[0.0; 4]);
        }

        let uniform_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Lantern Uniforms"),
                contents: bytemuck::cast_slice(&packed),
                usage: wgpu::BufferUsages::UNIFORM,
            });
        let uniform_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Lantern Uniform Bind Group"),
            layout: &self.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let num_textures = texture_ids.len();
        self.ensure_pipeline(call.program, call.states, num_textures);

        let texture_bind_group = if num_textures > 0 {
            let mut entries = Vec::with_capacity(num_textures * 2);
            for (i, id) in texture_ids.iter().enumerate() {
                let Some(entry) = self.textures.get(id) else {
                    log::warn!("draw references unknown texture {}", id);
                    return;
                };
                entries.push(wgpu::BindGroupEntry {
                    binding: (i * 2) as u32,
                    resource: wgpu::BindingResource::TextureView(&entry.view),
                });
                entries.push(wgpu::BindGroupEntry {
                    binding: (i * 2 + 1) as u32,
                    resource: wgpu::BindingResource::Sampler(&entry.sampler),
                });
            }
            Some(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Lantern Texture Bind Group"),
                layout: &self.texture_layouts[&num_textures],
                entries: &entries,
            }))
        } else {
            None
        };

        self.pending.push(PreparedDraw {
            pipeline_key: (call.program, call.states.cache_key(), num_textures),
            uniform_bind_group,
            texture_bind_group,
            vertex_buffer: call.vertex_buffer,
            index_buffer: call.index_buffer,
            index_count: call.index_count,
            scissor: call.states.scissor,
        });
    }

    fn end_frame(&mut self) {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Lantern Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Lantern Frame Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: self.clear_color.x as f64,
                            g: self.clear_color.y as f64,
                            b: self.clear_color.z as f64,
                            a: self.clear_color.w as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for prepared in &self.pending {
                let (Some(pipeline), Some(vertices), Some(indices)) = (
                    self.pipelines.get(&prepared.pipeline_key),
                    self.buffers.get(&prepared.vertex_buffer),
                    self.buffers.get(&prepared.index_buffer),
                ) else {
                    continue;
                };
                pass.set_pipeline(pipeline);
                match prepared.scissor {
                    Some([x, y, w, h]) => {
                        // Clamp to the target so validation never trips.
                        let x = x.min(self.width);
                        let y = y.min(self.height);
                        pass.set_scissor_rect(
                            x,
                            y,
                            w.min(self.width - x),
                            h.min(self.height - y),
                        );
                    }
                    None => pass.set_scissor_rect(0, 0, self.width, self.height),
                }
                pass.set_bind_group(0, &prepared.uniform_bind_group, &[]);
                if let Some(textures) = &prepared.texture_bind_group {
                    pass.set_bind_group(1, textures, &[]);
                }
                pass.set_vertex_buffer(0, vertices.slice(..));
                pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..prepared.index_count, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        self.pending.clear();
    }
}
