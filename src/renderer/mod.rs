mod surface;

pub use surface::{render_extent, MountSurface, SurfaceFrame, MAX_PIXEL_RATIO};

use crate::camera::BackdropCamera;
use crate::model::{LineVertex, MeshVertex};
use crate::runtime::RenderRuntime;
use crate::scene::BackdropScene;
use crate::visual::VisualObject;
use anyhow::Result;
use wgpu::util::DeviceExt;

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const CLEAR_COLOR: wgpu::Color = wgpu::Color { r: 0.03, g: 0.04, b: 0.05, a: 1.0 };

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct FrameUniform {
    view_proj: [[f32; 4]; 4],
    ambient: [f32; 4],
    light_dir: [f32; 4],
    light_color: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct DrawUniform {
    model: [[f32; 4]; 4],
    base_color: [f32; 4],
    material: [f32; 4],
}

/// GPU resources for drawing one session's visual object: a lit mesh
/// pipeline and a translucent line pipeline for the wireframe overlay.
/// All buffers are owned here and released on drop.
pub struct Renderer {
    mesh_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    mesh_draw_buffer: wgpu::Buffer,
    line_draw_buffer: wgpu::Buffer,
    mesh_bind_group: wgpu::BindGroup,
    line_bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    line_vertex_buffer: Option<wgpu::Buffer>,
    line_vertex_count: u32,
}

impl Renderer {
    pub fn new(
        runtime: &RenderRuntime,
        surface_format: wgpu::TextureFormat,
        visual: &VisualObject,
    ) -> Result<Self> {
        let device = runtime.device();
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Backdrop Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../assets/shaders/backdrop.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Backdrop BGL"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Backdrop Frame UB"),
            size: std::mem::size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let mesh_draw_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Backdrop Mesh Draw UB"),
            size: std::mem::size_of::<DrawUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let line_draw_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Backdrop Line Draw UB"),
            size: std::mem::size_of::<DrawUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mesh_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Backdrop Mesh BG"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: frame_buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: mesh_draw_buffer.as_entire_binding() },
            ],
        });
        let line_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Backdrop Line BG"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: frame_buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: line_draw_buffer.as_entire_binding() },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Backdrop Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let mesh_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Backdrop Mesh Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_mesh"),
                buffers: &[MeshVertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_mesh"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let line_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Backdrop Line Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_line"),
                buffers: &[LineVertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_line"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Backdrop VB"),
            contents: bytemuck::cast_slice(&visual.mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Backdrop IB"),
            contents: bytemuck::cast_slice(&visual.mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let (line_vertex_buffer, line_vertex_count) = match &visual.wireframe {
            Some(wireframe) if !wireframe.lines.is_empty() => {
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Backdrop Wireframe VB"),
                    contents: bytemuck::cast_slice(&wireframe.lines),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                (Some(buffer), wireframe.lines.len() as u32)
            }
            _ => (None, 0),
        };

        Ok(Self {
            mesh_pipeline,
            line_pipeline,
            frame_buffer,
            mesh_draw_buffer,
            line_draw_buffer,
            mesh_bind_group,
            line_bind_group,
            vertex_buffer,
            index_buffer,
            index_count: visual.mesh.indices.len() as u32,
            line_vertex_buffer,
            line_vertex_count,
        })
    }

    pub fn render(
        &self,
        runtime: &RenderRuntime,
        target: &wgpu::TextureView,
        depth: &wgpu::TextureView,
        camera: &BackdropCamera,
        scene: &BackdropScene,
    ) {
        let queue = runtime.queue();
        let frame = FrameUniform {
            view_proj: camera.view_projection().to_cols_array_2d(),
            ambient: scene.ambient.color.extend(scene.ambient.intensity).to_array(),
            light_dir: scene.directional.direction_to_origin().extend(0.0).to_array(),
            light_color: scene.directional.color.extend(scene.directional.intensity).to_array(),
        };
        queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&frame));

        let model = scene.visual.model_matrix().to_cols_array_2d();
        let mesh_draw = DrawUniform {
            model,
            base_color: scene.visual.material.base_color.extend(1.0).to_array(),
            material: [scene.visual.material.roughness, scene.visual.material.metalness, 0.0, 0.0],
        };
        queue.write_buffer(&self.mesh_draw_buffer, 0, bytemuck::bytes_of(&mesh_draw));

        if let Some(wireframe) = &scene.visual.wireframe {
            let line_draw = DrawUniform {
                model,
                base_color: wireframe.color.extend(wireframe.opacity).to_array(),
                material: [0.0; 4],
            };
            queue.write_buffer(&self.line_draw_buffer, 0, bytemuck::bytes_of(&line_draw));
        }

        let mut encoder = runtime
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("Backdrop Encoder") });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Backdrop Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            pass.set_pipeline(&self.mesh_pipeline);
            pass.set_bind_group(0, &self.mesh_bind_group, &[]);
            pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..self.index_count, 0, 0..1);

            if let Some(line_buffer) = &self.line_vertex_buffer {
                pass.set_pipeline(&self.line_pipeline);
                pass.set_bind_group(0, &self.line_bind_group, &[]);
                pass.set_vertex_buffer(0, line_buffer.slice(..));
                pass.draw(0..self.line_vertex_count, 0..1);
            }
        }
        queue.submit(std::iter::once(encoder.finish()));
    }
}
