use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::paint::Color;
use crate::render::{RenderCtx, RenderTarget};
use crate::text::{GlyphAtlas, GlyphInstance, InstanceSink, LayoutStats, TextLayout, GLYPH_BOX_SIZE};

use super::camera::screen_projection;
use super::common::{
    linear_clamp_sampler, premul_alpha_blend, uniform_entry, CameraUniform, QuadVertex, STRIP_QUAD,
};
use super::shader::{self, ShaderCompileError};

// ── batch queue ───────────────────────────────────────────────────────────

/// Frame-local list of flushed batches, packed for upload.
///
/// Every flush appends its instances and records one draw range; the
/// renderer uploads all of them in one buffer write and issues one instanced
/// draw per range, so later batches never overwrite earlier ones before the
/// GPU reads them.
#[derive(Debug, Default)]
pub struct BatchQueue {
    instances: Vec<GpuGlyph>,
    draws: Vec<Range<u32>>,
}

impl BatchQueue {
    /// One instance range per flushed batch, in flush order.
    pub fn draws(&self) -> &[Range<u32>] {
        &self.draws
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    pub fn clear(&mut self) {
        self.instances.clear();
        self.draws.clear();
    }
}

impl InstanceSink for BatchQueue {
    fn flush(&mut self, instances: &[GlyphInstance], color: Color) {
        if instances.is_empty() {
            return;
        }
        let start = self.instances.len() as u32;
        let color = color.to_array();
        self.instances.extend(instances.iter().map(|g| GpuGlyph {
            position: g.position,
            box_size: g.box_size,
            layer: g.atlas_layer,
            color,
        }));
        self.draws.push(start..self.instances.len() as u32);
    }
}

// ── per-frame text ────────────────────────────────────────────────────────

/// Layout engine plus the batches queued for the current frame.
///
/// A frame starts with [`begin_frame`](Self::begin_frame), which drops
/// anything a skipped frame left behind, so only text drawn since then is
/// ever submitted.
#[derive(Default)]
pub struct TextFrame {
    layout: TextLayout,
    queue: BatchQueue,
}

impl TextFrame {
    /// Discards batches queued by a frame that was never rendered.
    pub fn begin_frame(&mut self) {
        if !self.queue.is_empty() {
            log::debug!("text: dropping {} stale batches", self.queue.draws().len());
        }
        self.queue.clear();
    }

    pub fn draw_text(
        &mut self,
        atlas: &GlyphAtlas,
        text: &str,
        x: f32,
        y: f32,
        scale: f32,
        color: Color,
    ) -> LayoutStats {
        self.layout.layout(atlas, text, x, y, scale, color, &mut self.queue)
    }

    pub fn queue(&self) -> &BatchQueue {
        &self.queue
    }
}

// ── renderer ──────────────────────────────────────────────────────────────

/// Draws laid-out text from a layered glyph atlas.
///
/// The atlas texture array (`R8Unorm`, one 256×256 layer per glyph) is
/// created once from the atlas bitmaps and lives as long as the renderer.
/// Each frame opens with [`begin_frame`](Self::begin_frame); text is queued
/// with [`draw_text`](Self::draw_text) and submitted with
/// [`render`](Self::render), one instanced triangle-strip draw per batch.
pub struct TextRenderer {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    camera_ubo: wgpu::Buffer,

    // Bound through `bind_group`; kept so the atlas lives as long as we do.
    _atlas_texture: wgpu::Texture,

    quad_vbo: wgpu::Buffer,
    instance_vbo: Option<wgpu::Buffer>,
    instance_capacity: usize,

    frame: TextFrame,
}

impl TextRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        atlas: &GlyphAtlas,
    ) -> Result<Self, ShaderCompileError> {
        let shader = shader::compile(device, "pixelpen text shader", include_str!("shaders/text.wgsl"))?;

        let atlas_texture = upload_atlas(device, queue, atlas);
        let atlas_view = atlas_texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("pixelpen glyph atlas view"),
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            ..Default::default()
        });
        let sampler = linear_clamp_sampler(device, "pixelpen glyph sampler");

        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("pixelpen text bgl"),
            entries: &[
                uniform_entry::<CameraUniform>(0, wgpu::ShaderStages::VERTEX),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2Array,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let camera_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pixelpen text camera ubo"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("pixelpen text bind group"),
            layout: &bgl,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: camera_ubo.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::TextureView(&atlas_view) },
                wgpu::BindGroupEntry { binding: 2, resource: wgpu::BindingResource::Sampler(&sampler) },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pixelpen text pipeline layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("pixelpen text pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::layout(), GpuGlyph::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(premul_alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let quad_vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("pixelpen text quad vbo"),
            contents: bytemuck::cast_slice(&STRIP_QUAD),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Ok(Self {
            pipeline,
            bind_group,
            camera_ubo,
            _atlas_texture: atlas_texture,
            quad_vbo,
            instance_vbo: None,
            instance_capacity: 0,
            frame: TextFrame::default(),
        })
    }

    /// Starts a new frame, dropping text left over from a skipped one.
    pub fn begin_frame(&mut self) {
        self.frame.begin_frame();
    }

    /// Lays out `text` with its first baseline at `(x, y)` (pixels, bottom-left
    /// origin) and queues its batches for the next [`render`](Self::render).
    pub fn draw_text(
        &mut self,
        atlas: &GlyphAtlas,
        text: &str,
        x: f32,
        y: f32,
        scale: f32,
        color: Color,
    ) -> LayoutStats {
        self.frame.draw_text(atlas, text, x, y, scale, color)
    }

    /// Uploads every queued batch and issues one draw per batch.
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) {
        if self.frame.queue.is_empty() {
            return;
        }

        let camera = CameraUniform::new(screen_projection(ctx.viewport), Mat4::IDENTITY);
        ctx.queue.write_buffer(&self.camera_ubo, 0, bytemuck::bytes_of(&camera));

        self.ensure_instance_capacity(ctx, self.frame.queue.instance_count());
        let Some(instance_vbo) = self.instance_vbo.as_ref() else { return };
        ctx.queue.write_buffer(instance_vbo, 0, bytemuck::cast_slice(&self.frame.queue.instances));

        {
            let mut rpass = target.load_pass("pixelpen text pass");
            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, &self.bind_group, &[]);
            rpass.set_vertex_buffer(0, self.quad_vbo.slice(..));
            rpass.set_vertex_buffer(1, instance_vbo.slice(..));
            for range in self.frame.queue.draws() {
                rpass.draw(0..STRIP_QUAD.len() as u32, range.clone());
            }
        }

        log::trace!(
            "text: {} instances in {} draws",
            self.frame.queue.instance_count(),
            self.frame.queue.draws().len()
        );
        self.frame.queue.clear();
    }

    fn ensure_instance_capacity(&mut self, ctx: &RenderCtx<'_>, required: usize) {
        if required <= self.instance_capacity && self.instance_vbo.is_some() {
            return;
        }
        let new_cap = required.next_power_of_two().max(64);
        self.instance_vbo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pixelpen text instance vbo"),
            size: (new_cap * std::mem::size_of::<GpuGlyph>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.instance_capacity = new_cap;
        log::debug!("text instance buffer grown to {new_cap}");
    }
}

/// Creates the layered atlas texture and uploads each glyph bitmap into the
/// top-left corner of its layer.
fn upload_atlas(device: &wgpu::Device, queue: &wgpu::Queue, atlas: &GlyphAtlas) -> wgpu::Texture {
    let bitmaps = atlas.bitmaps();
    let layers = (bitmaps.len() as u32).max(1);

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("pixelpen glyph atlas"),
        size: wgpu::Extent3d {
            width: GLYPH_BOX_SIZE,
            height: GLYPH_BOX_SIZE,
            depth_or_array_layers: layers,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::R8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    for (layer, bitmap) in bitmaps.iter().enumerate() {
        if bitmap.is_empty() {
            continue;
        }
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d { x: 0, y: 0, z: layer as u32 },
                aspect: wgpu::TextureAspect::All,
            },
            &bitmap.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bitmap.width),
                rows_per_image: Some(bitmap.height),
            },
            wgpu::Extent3d { width: bitmap.width, height: bitmap.height, depth_or_array_layers: 1 },
        );
    }

    log::info!("glyph atlas uploaded: {layers} layers of {GLYPH_BOX_SIZE}x{GLYPH_BOX_SIZE}");
    texture
}

// ── GPU types ─────────────────────────────────────────────────────────────

/// Per-instance record (32 bytes):
///
///  offset  0  position  [f32; 2]  loc 1
///  offset  8  box_size  f32       loc 2
///  offset 12  layer     u32       loc 3
///  offset 16  color     [f32; 4]  loc 4
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct GpuGlyph {
    position: [f32; 2],
    box_size: f32,
    layer: u32,
    color: [f32; 4],
}

impl GpuGlyph {
    const ATTRS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        1 => Float32x2, // position
        2 => Float32,   // box_size
        3 => Uint32,    // layer
        4 => Float32x4  // color
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GpuGlyph>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}
