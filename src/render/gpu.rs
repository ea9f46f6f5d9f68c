//! Headless wgpu backend: the warp kernel as a WGSL fragment program.
//!
//! The WGSL below is a line-for-line port of `warp::kernel`; the two backends
//! must agree pixel-for-pixel up to filtering differences. Program compile or
//! link failure is fatal to this component and must surface the full
//! diagnostic text: the effect fails loudly, never by silently rendering
//! nothing.

use crate::{
    foundation::core::{FrameRgba, SurfaceSize},
    foundation::error::{DockwarpError, DockwarpResult},
    warp::params::{TargetRect, WarpParams},
};

const UNIFORM_SIZE: u64 = 64;

const WARP_SHADER: &str = r#"
struct Params {
  target: vec4<f32>,             // x, y, width, height
  resolution: vec2<f32>,
  source_resolution: vec2<f32>,
  progress: f32,
  squeeze_intensity: f32,
  wave_intensity: f32,
  wave_frequency: f32,
  wave_speed: f32,
  corner_radius: f32,
  _pad: vec2<f32>,
};

const PI: f32 = 3.14159265358979;
const MASK_EDGE: f32 = 0.007;

@group(0) @binding(0) var t_src: texture_2d<f32>;
@group(0) @binding(1) var s_src: sampler;
@group(0) @binding(2) var<uniform> params: Params;

@vertex
fn vs(@builtin(vertex_index) vi: u32) -> @builtin(position) vec4<f32> {
  var p = array<vec2<f32>, 3>(
    vec2<f32>(-1.0, -1.0),
    vec2<f32>( 3.0, -1.0),
    vec2<f32>(-1.0,  3.0),
  );
  return vec4<f32>(p[vi], 0.0, 1.0);
}

fn sd_rounded_box(p: vec2<f32>, b: vec2<f32>, r: f32) -> f32 {
  let q = abs(p) - b + vec2<f32>(r, r);
  return length(max(q, vec2<f32>(0.0, 0.0))) + min(max(q.x, q.y), 0.0) - r;
}

@fragment
fn fs(@builtin(position) pos: vec4<f32>) -> @location(0) vec4<f32> {
  // Framebuffer coordinates are top-left origin, matching the source rows.
  let uv = pos.xy / params.resolution;
  let p = sin((1.0 - params.progress) * PI);

  let curvature = sin(uv.x * PI) * params.squeeze_intensity * p;
  let wave = sin(uv.y * params.wave_frequency + (1.0 - params.progress) * params.wave_speed)
    * params.wave_intensity * p * (1.0 - uv.x);

  let min_x = mix(params.target.x, 0.0, params.progress);
  let max_x = mix(params.target.x + params.target.z, 1.0, params.progress);
  let base_min_y = mix(params.target.y, 0.0, params.progress);
  let base_max_y = mix(params.target.y + params.target.w, 1.0, params.progress);

  let final_min_y = base_min_y + curvature + wave;
  let final_max_y = base_max_y - curvature - wave;

  let lo = vec2<f32>(min_x, final_min_y);
  let hi = vec2<f32>(max_x, final_max_y);
  let mod_uv = (uv - lo) / (hi - lo);

  let dist = sd_rounded_box(mod_uv - vec2<f32>(0.5, 0.5), vec2<f32>(0.5, 0.5), params.corner_radius);
  let mask = 1.0 - smoothstep(0.0, MASK_EDGE, dist);

  if (mod_uv.x > 1.0 || mod_uv.x < 0.0 || mod_uv.y > 1.0 || mod_uv.y < 0.0 || mask <= 0.0) {
    return vec4<f32>(0.0, 0.0, 0.0, 0.0);
  }

  let container_aspect = params.resolution.x / params.resolution.y;
  let image_aspect = params.source_resolution.x / params.source_resolution.y;
  var scale = vec2<f32>(1.0, 1.0);
  if (container_aspect > image_aspect) {
    scale.y = container_aspect / image_aspect;
  } else {
    scale.x = image_aspect / container_aspect;
  }
  let corrected = (mod_uv - vec2<f32>(0.5, 0.5)) / scale + vec2<f32>(0.5, 0.5);

  let tex = textureSampleLevel(t_src, s_src, corrected, 0.0);
  return vec4<f32>(tex.rgb, tex.a * mask);
}
"#;

struct SourceTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: SurfaceSize,
}

pub struct GpuWarpRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    uniforms: wgpu::Buffer,

    source: Option<SourceTexture>,
    target_texture: wgpu::Texture,
    target_view: wgpu::TextureView,
    readback: wgpu::Buffer,
    readback_bytes_per_row: u32,

    viewport: SurfaceSize,
    target: TargetRect,
    params: WarpParams,
}

impl GpuWarpRenderer {
    pub fn new(
        viewport: SurfaceSize,
        target: TargetRect,
        params: WarpParams,
    ) -> DockwarpResult<Self> {
        target.validate()?;
        params.validate()?;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|e| match e {
            wgpu::RequestAdapterError::NotFound { .. } => {
                DockwarpError::gpu("no gpu adapter available")
            }
            other => DockwarpError::gpu(format!("wgpu request_adapter failed: {other:?}")),
        })?;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            experimental_features: wgpu::ExperimentalFeatures::default(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        }))
        .map_err(|e| DockwarpError::gpu(format!("wgpu request_device failed: {e:?}")))?;

        // Compile and link under an error scope so a broken program surfaces
        // its diagnostics instead of becoming an uncaptured error later.
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("dockwarp_warp_shader"),
            source: wgpu::ShaderSource::Wgsl(WARP_SHADER.into()),
        });

        let info = pollster::block_on(shader.get_compilation_info());
        let diagnostics: Vec<String> = info
            .messages
            .iter()
            .filter(|m| m.message_type == wgpu::CompilationMessageType::Error)
            .map(|m| m.message.clone())
            .collect();
        if !diagnostics.is_empty() {
            let text = diagnostics.join("\n");
            tracing::error!(%text, "warp shader failed to compile");
            return Err(DockwarpError::gpu(format!(
                "warp shader failed to compile: {text}"
            )));
        }

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("dockwarp_source_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("dockwarp_params"),
            size: UNIFORM_SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("dockwarp_bgl"),
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
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: Some(
                            std::num::NonZeroU64::new(UNIFORM_SIZE)
                                .ok_or_else(|| DockwarpError::gpu("uniform size must be > 0"))?,
                        ),
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("dockwarp_pl"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("dockwarp_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: wgpu::TextureFormat::Rgba8Unorm,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            let text = err.to_string();
            tracing::error!(%text, "warp program failed to link");
            return Err(DockwarpError::gpu(format!(
                "warp program failed to link: {text}"
            )));
        }

        let (target_texture, target_view, readback, readback_bytes_per_row) =
            create_target(&device, viewport)?;

        Ok(Self {
            device,
            queue,
            pipeline,
            bind_group_layout,
            sampler,
            uniforms,
            source: None,
            target_texture,
            target_view,
            readback,
            readback_bytes_per_row,
            viewport,
            target,
            params,
        })
    }

    fn ensure_source(&mut self, size: SurfaceSize) {
        let matches = self.source.as_ref().is_some_and(|s| s.size == size);
        if matches {
            return;
        }
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("dockwarp_source"),
            size: wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.source = Some(SourceTexture {
            texture,
            view,
            size,
        });
    }

    fn write_uniforms(&self, source: SurfaceSize, progress: f32) {
        let mut bytes = [0u8; UNIFORM_SIZE as usize];
        let fields = [
            self.target.x,
            self.target.y,
            self.target.width,
            self.target.height,
            self.viewport.width as f32,
            self.viewport.height as f32,
            source.width as f32,
            source.height as f32,
            progress,
            self.params.squeeze_intensity,
            self.params.wave_intensity,
            self.params.wave_frequency,
            self.params.wave_speed,
            self.params.corner_radius,
        ];
        for (i, v) in fields.iter().enumerate() {
            bytes[i * 4..i * 4 + 4].copy_from_slice(&v.to_le_bytes());
        }
        self.queue.write_buffer(&self.uniforms, 0, &bytes);
    }
}

impl crate::render::backend::WarpBackend for GpuWarpRenderer {
    fn resize(&mut self, viewport: SurfaceSize) -> DockwarpResult<()> {
        if viewport == self.viewport {
            return Ok(());
        }
        let (texture, view, readback, bytes_per_row) = create_target(&self.device, viewport)?;
        self.target_texture = texture;
        self.target_view = view;
        self.readback = readback;
        self.readback_bytes_per_row = bytes_per_row;
        self.viewport = viewport;
        Ok(())
    }

    fn render(&mut self, source: &FrameRgba, progress: f32) -> DockwarpResult<FrameRgba> {
        if !progress.is_finite() {
            return Err(DockwarpError::render("progress must be finite"));
        }

        self.ensure_source(source.size());
        let src = self
            .source
            .as_ref()
            .ok_or_else(|| DockwarpError::gpu("source texture not initialized"))?;

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &src.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &source.data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(source.width * 4),
                rows_per_image: Some(source.height),
            },
            wgpu::Extent3d {
                width: source.width,
                height: source.height,
                depth_or_array_layers: 1,
            },
        );

        self.write_uniforms(source.size(), progress);

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("dockwarp_bg"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&src.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.uniforms.as_entire_binding(),
                },
            ],
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("dockwarp_encoder"),
            });

        {
            let mut rp = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("dockwarp_rp"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.target_view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rp.set_pipeline(&self.pipeline);
            rp.set_bind_group(0, &bind_group, &[]);
            rp.draw(0..3, 0..1);
        }

        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.target_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(self.readback_bytes_per_row),
                    rows_per_image: Some(self.viewport.height),
                },
            },
            wgpu::Extent3d {
                width: self.viewport.width,
                height: self.viewport.height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(Some(encoder.finish()));

        let buffer_slice = self.readback.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| DockwarpError::gpu(format!("wgpu poll failed: {e:?}")))?;
        rx.recv()
            .map_err(|_| DockwarpError::gpu("readback channel closed"))?
            .map_err(|e| DockwarpError::gpu(format!("readback map failed: {e:?}")))?;

        let mapped = buffer_slice.get_mapped_range();
        let row_bytes = self.viewport.width as usize * 4;
        let padded_row_bytes = self.readback_bytes_per_row as usize;
        let mut out = Vec::with_capacity(row_bytes * self.viewport.height as usize);
        for row in 0..self.viewport.height as usize {
            let start = row * padded_row_bytes;
            out.extend_from_slice(&mapped[start..start + row_bytes]);
        }
        drop(mapped);
        self.readback.unmap();

        FrameRgba::new(self.viewport.width, self.viewport.height, out)
    }
}

fn create_target(
    device: &wgpu::Device,
    viewport: SurfaceSize,
) -> DockwarpResult<(wgpu::Texture, wgpu::TextureView, wgpu::Buffer, u32)> {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("dockwarp_target"),
        size: wgpu::Extent3d {
            width: viewport.width,
            height: viewport.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    let bytes_per_row_unpadded = viewport
        .width
        .checked_mul(4)
        .ok_or_else(|| DockwarpError::gpu("render target width overflow"))?;
    let bytes_per_row = align_to(bytes_per_row_unpadded, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);
    let buffer_size = u64::from(bytes_per_row)
        .checked_mul(u64::from(viewport.height))
        .ok_or_else(|| DockwarpError::gpu("readback buffer size overflow"))?;

    let readback = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("dockwarp_readback"),
        size: buffer_size,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    Ok((texture, view, readback, bytes_per_row))
}

fn align_to(value: u32, alignment: u32) -> u32 {
    let mask = alignment - 1;
    (value + mask) & !mask
}
