use crate::render::{RenderCtx, RenderTarget};
use crate::sprite::{SpriteGeometry, SpriteVertex, Transform};

use super::camera::WorldCamera;
use super::common::{binding_size, premul_alpha_blend, uniform_entry, CameraUniform};
use super::shader::{self, ShaderCompileError};
use super::texture::Texture;

/// Draws one textured sprite in world space.
///
/// Vertices, camera and the model matrix are re-uploaded on every
/// [`upload_and_draw`](Self::upload_and_draw); the matrix goes through a
/// read-only storage buffer indexed by instance.
pub struct SpriteRenderer {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    camera_ubo: wgpu::Buffer,
    transform_sbo: wgpu::Buffer,

    vbo: Option<wgpu::Buffer>,
    vbo_capacity: usize,

    _sheet: Texture,
}

impl SpriteRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        sheet: Texture,
    ) -> Result<Self, ShaderCompileError> {
        let shader = shader::compile(device, "pixelpen sprite shader", include_str!("shaders/sprite.wgsl"))?;

        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("pixelpen sprite bgl"),
            entries: &[
                uniform_entry::<CameraUniform>(0, wgpu::ShaderStages::VERTEX),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
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
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: binding_size::<[[f32; 4]; 4]>(),
                    },
                    count: None,
                },
            ],
        });

        let camera_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pixelpen sprite camera ubo"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // One model matrix: the scene has a single sprite instance.
        let transform_sbo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pixelpen sprite transform sbo"),
            size: std::mem::size_of::<[[f32; 4]; 4]>() as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("pixelpen sprite bind group"),
            layout: &bgl,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: camera_ubo.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::TextureView(&sheet.view) },
                wgpu::BindGroupEntry { binding: 2, resource: wgpu::BindingResource::Sampler(&sheet.sampler) },
                wgpu::BindGroupEntry { binding: 3, resource: transform_sbo.as_entire_binding() },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pixelpen sprite pipeline layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("pixelpen sprite pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[sprite_vertex_layout()],
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
                topology: wgpu::PrimitiveTopology::TriangleList,
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

        log::debug!("sprite renderer ready ({}x{} sheet)", sheet.size.0, sheet.size.1);

        Ok(Self {
            pipeline,
            bind_group,
            camera_ubo,
            transform_sbo,
            vbo: None,
            vbo_capacity: 0,
            _sheet: sheet,
        })
    }

    /// Uploads camera, model matrix and vertices, then draws one instance.
    pub fn upload_and_draw(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        geometry: &SpriteGeometry,
        transform: &Transform,
        camera: &WorldCamera,
    ) {
        let vertices = geometry.vertices();
        if vertices.is_empty() {
            return;
        }

        let cam = CameraUniform::new(camera.projection(ctx.viewport), camera.view());
        ctx.queue.write_buffer(&self.camera_ubo, 0, bytemuck::bytes_of(&cam));

        let model = transform.to_mat4().to_cols_array_2d();
        ctx.queue.write_buffer(&self.transform_sbo, 0, bytemuck::bytes_of(&model));

        self.ensure_vertex_capacity(ctx, vertices.len());
        let Some(vbo) = self.vbo.as_ref() else { return };
        ctx.queue.write_buffer(vbo, 0, bytemuck::cast_slice(vertices));

        let mut rpass = target.load_pass("pixelpen sprite pass");
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, vbo.slice(..));
        rpass.draw(0..geometry.vertex_count(), 0..1);
    }

    fn ensure_vertex_capacity(&mut self, ctx: &RenderCtx<'_>, required: usize) {
        if required <= self.vbo_capacity && self.vbo.is_some() {
            return;
        }
        let new_cap = required.next_power_of_two().max(6);
        self.vbo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pixelpen sprite vbo"),
            size: (new_cap * std::mem::size_of::<SpriteVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.vbo_capacity = new_cap;
    }
}

const SPRITE_ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
    0 => Float32x2, // position
    1 => Float32x2  // uv
];

fn sprite_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<SpriteVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &SPRITE_ATTRS,
    }
}
