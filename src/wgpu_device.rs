use std::borrow::Cow;

use pollster::block_on;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::device::{
    AttributeBinding, GraphicsDevice, ShaderSources, TextureHandle, UniformBinding,
};
use crate::error::{Error, Result};
use crate::utils::Vertex;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Globals {
    resolution: [f32; 2],
    _pad: [f32; 2],
}

// One batched draw: a texture and a vertex range within the frame's upload.
struct DrawCommand {
    texture: u32,
    first_vertex: u32,
    vertex_count: u32,
}

/// Production [`GraphicsDevice`] over a wgpu surface.
///
/// Draws are recorded as commands during the frame and replayed in a single
/// render pass on `present`, so each texture bind happens exactly where the
/// batching core asked for it.
pub struct WgpuDevice<'a> {
    surface: wgpu::Surface<'a>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    shader: Option<wgpu::ShaderModule>,
    pipeline: Option<wgpu::RenderPipeline>,
    attributes: Vec<AttributeBinding>,

    texture_bind_group_layout: wgpu::BindGroupLayout,
    globals_bind_group_layout: wgpu::BindGroupLayout,
    globals: Globals,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    sampler: wgpu::Sampler,

    // Bind groups indexed by TextureHandle.
    textures: Vec<wgpu::BindGroup>,
    bound_texture: Option<u32>,

    vertex_buffer: wgpu::Buffer,
    vertex_buffer_size: u64,
    frame_vertices: Vec<f32>,
    commands: Vec<DrawCommand>,
}

const INITIAL_VERTEX_BUFFER_SIZE: u64 = (crate::DEFAULT_BUFFER_CAPACITY * 4) as u64;

impl<'a> WgpuDevice<'a> {
    pub fn new(
        surface: wgpu::Surface<'a>,
        instance: wgpu::Instance,
        size: PhysicalSize<u32>,
    ) -> Result<Self> {
        let adapter = block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            force_fallback_adapter: false,
            compatible_surface: Some(&surface),
        }))
        .ok_or_else(|| Error::DeviceInit {
            reason: "no compatible graphics adapter".to_string(),
        })?;

        let (device, queue) = block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::default(),
            },
            None,
        ))
        .map_err(|e| Error::DeviceInit {
            reason: format!("device request failed: {e}"),
        })?;

        let config = wgpu::SurfaceConfiguration {
            desired_maximum_frame_latency: 2,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![wgpu::TextureFormat::Bgra8UnormSrgb],
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: wgpu::TextureFormat::Bgra8UnormSrgb,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
        };
        surface.configure(&device, &config);

        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("texture_bind_group_layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let globals_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("globals_bind_group_layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<Globals>() as _
                        ),
                    },
                    count: None,
                }],
            });

        let globals = Globals {
            resolution: [size.width as f32, size.height as f32],
            _pad: [0.0, 0.0],
        };
        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Globals Buffer"),
            contents: bytemuck::bytes_of(&globals),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &globals_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &globals_buffer,
                    offset: 0,
                    size: None,
                }),
            }],
            label: Some("Globals Bind Group"),
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Batch Vertex Buffer"),
            size: INITIAL_VERTEX_BUFFER_SIZE,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            shader: None,
            pipeline: None,
            attributes: Vec::new(),
            texture_bind_group_layout,
            globals_bind_group_layout,
            globals,
            globals_buffer,
            globals_bind_group,
            sampler,
            textures: Vec::new(),
            bound_texture: None,
            vertex_buffer,
            vertex_buffer_size: INITIAL_VERTEX_BUFFER_SIZE,
            frame_vertices: Vec::new(),
            commands: Vec::new(),
        })
    }

    fn vertex_format(components: u32) -> wgpu::VertexFormat {
        match components {
            1 => wgpu::VertexFormat::Float32,
            2 => wgpu::VertexFormat::Float32x2,
            3 => wgpu::VertexFormat::Float32x3,
            _ => wgpu::VertexFormat::Float32x4,
        }
    }

    // The pipeline is built lazily so attributes registered after program
    // compilation still land in the vertex layout.
    fn ensure_pipeline(&mut self) -> Result<()> {
        if self.pipeline.is_some() {
            return Ok(());
        }

        let shader = self.shader.as_ref().ok_or_else(|| Error::DeviceInit {
            reason: "no shader program compiled".to_string(),
        })?;

        let vertex_attributes: Vec<wgpu::VertexAttribute> = if self.attributes.is_empty() {
            // Fall back to the packed sprite-vertex layout.
            log::debug!("no attributes registered, using the default vertex layout");
            vec![
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: Vertex::POSITION_OFFSET,
                    shader_location: 0,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: Vertex::COLOR_OFFSET,
                    shader_location: 1,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: Vertex::UV_OFFSET,
                    shader_location: 2,
                },
            ]
        } else {
            self.attributes
                .iter()
                .enumerate()
                .map(|(location, binding)| wgpu::VertexAttribute {
                    format: Self::vertex_format(binding.components),
                    offset: binding.offset,
                    shader_location: location as u32,
                })
                .collect()
        };
        let array_stride = self
            .attributes
            .first()
            .map(|binding| binding.stride)
            .unwrap_or(Vertex::STRIDE);

        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Sprite Pipeline Layout"),
                bind_group_layouts: &[
                    &self.texture_bind_group_layout,
                    &self.globals_bind_group_layout,
                ],
                push_constant_ranges: &[],
            });

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Sprite Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: shader,
                    entry_point: Some("vs_main"),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &vertex_attributes,
                    }],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: wgpu::TextureFormat::Bgra8UnormSrgb,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

        self.pipeline = Some(pipeline);
        Ok(())
    }

    fn write_frame_vertices(&mut self) {
        let needed = (self.frame_vertices.len() * std::mem::size_of::<f32>()) as u64;
        if needed > self.vertex_buffer_size {
            let new_size = needed.next_power_of_two();
            log::debug!("growing vertex buffer to {new_size} bytes");
            self.vertex_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Batch Vertex Buffer"),
                size: new_size,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            self.vertex_buffer_size = new_size;
        }
        if !self.frame_vertices.is_empty() {
            self.queue.write_buffer(
                &self.vertex_buffer,
                0,
                bytemuck::cast_slice(&self.frame_vertices),
            );
        }
    }
}

impl GraphicsDevice for WgpuDevice<'_> {
    fn compile_program(&mut self, shaders: &ShaderSources<'_>) -> Result<()> {
        // The two stages are opaque text blobs; one module carries both
        // entry points.
        let source = format!("{}\n{}", shaders.vertex, shaders.fragment);

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("sprite shader"),
                source: wgpu::ShaderSource::Wgsl(Cow::Owned(source)),
            });
        if let Some(error) = block_on(self.device.pop_error_scope()) {
            // Mirrors permissive graphics-API behavior: diagnostics are
            // surfaced but a non-fatal link can still yield a usable program.
            log::error!("shader compilation diagnostics: {error}");
        }

        self.shader = Some(module);
        self.pipeline = None;
        Ok(())
    }

    fn register_attribute(&mut self, attribute: &AttributeBinding) -> Result<()> {
        self.attributes.push(attribute.clone());
        self.pipeline = None;
        Ok(())
    }

    fn set_uniform(&mut self, uniform: &UniformBinding) -> Result<()> {
        match uniform.name.as_str() {
            "u_resolution" if uniform.values.len() >= 2 => {
                self.globals.resolution = [uniform.values[0], uniform.values[1]];
                self.queue
                    .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&self.globals));
            }
            name => {
                // Sampler-unit style uniforms (e.g. u_texture) have no slot
                // here; binding happens through bind groups.
                log::debug!("uniform {name:?} has no backing slot in the sprite pipeline");
            }
        }
        Ok(())
    }

    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> Result<TextureHandle> {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Sprite Texture"),
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
            view_formats: &[wgpu::TextureFormat::Rgba8UnormSrgb],
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
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
            label: Some("Sprite Texture Bind Group"),
        });

        self.textures.push(bind_group);
        Ok(TextureHandle(self.textures.len() as u32 - 1))
    }

    fn bind_texture(&mut self, handle: TextureHandle) -> Result<()> {
        if handle.0 as usize >= self.textures.len() {
            return Err(Error::DeviceInit {
                reason: format!("texture handle {} out of range", handle.0),
            });
        }
        self.bound_texture = Some(handle.0);
        Ok(())
    }

    fn upload_vertices(&mut self, data: &[f32]) -> Result<()> {
        // Frame uploads are packed back to back; each draw remembers its
        // range and the whole frame is written once at present time.
        self.commands.push(DrawCommand {
            texture: self.bound_texture.ok_or_else(|| Error::DeviceInit {
                reason: "vertex upload with no bound texture".to_string(),
            })?,
            first_vertex: (self.frame_vertices.len() / Vertex::COMPONENTS) as u32,
            vertex_count: 0,
        });
        self.frame_vertices.extend_from_slice(data);
        Ok(())
    }

    fn draw(&mut self, vertex_count: u32) -> Result<()> {
        let command = self.commands.last_mut().ok_or_else(|| Error::DeviceInit {
            reason: "draw issued before any vertex upload".to_string(),
        })?;
        command.vertex_count = vertex_count;
        command.texture = self.bound_texture.unwrap_or(command.texture);
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.ensure_pipeline()?;
        self.write_frame_vertices();

        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.1,
                            g: 0.2,
                            b: 0.3,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(pipeline) = self.pipeline.as_ref() {
                rpass.set_pipeline(pipeline);
                rpass.set_bind_group(1, &self.globals_bind_group, &[]);
                rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));

                for command in &self.commands {
                    if command.vertex_count == 0 {
                        continue;
                    }
                    rpass.set_bind_group(0, &self.textures[command.texture as usize], &[]);
                    rpass.draw(
                        command.first_vertex..command.first_vertex + command.vertex_count,
                        0..1,
                    );
                }
            }
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();

        self.frame_vertices.clear();
        self.commands.clear();
        Ok(())
    }

    fn set_viewport(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.globals.resolution = [width as f32, height as f32];
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&self.globals));
        Ok(())
    }
}
