use crate::geometry::{self, LineVertex, MeshVertex};
use crate::shaders;
use boxscene_common::Color;
use boxscene_render::RenderList;
use boxscene_scene::{NodeKind, PerspectiveCamera, Scene};
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use std::ops::Range;
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color: [f32; 4],
}

impl InstanceData {
    fn new(model: Mat4, color: [f32; 4]) -> Self {
        let cols = model.to_cols_array_2d();
        Self {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
            color,
        }
    }
}

/// One draw call. Consecutive items sharing a pipeline are merged.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DrawCommand {
    Meshes { instances: Range<u32>, depth_test: bool },
    Lines { vertices: Range<u32>, depth_test: bool },
}

/// CPU-side contents of one frame, in render-list order.
#[derive(Debug, Default)]
pub(crate) struct FrameBatch {
    pub instances: Vec<InstanceData>,
    pub lines: Vec<LineVertex>,
    pub commands: Vec<DrawCommand>,
}

impl FrameBatch {
    /// `srgb_target` converts material colours to linear before upload.
    pub fn build(list: &RenderList, srgb_target: bool) -> Self {
        let to_rgba = |c: Color| {
            if srgb_target {
                c.to_linear_rgba(1.0)
            } else {
                [c.r, c.g, c.b, 1.0]
            }
        };

        let mut batch = Self::default();
        for item in list.items() {
            match &item.kind {
                NodeKind::Mesh { geometry, material } => {
                    let scale = Vec3::new(geometry.width, geometry.height, geometry.depth);
                    let model = item.model * Mat4::from_scale(scale);
                    let index = batch.instances.len() as u32;
                    batch.instances.push(InstanceData::new(model, to_rgba(material.color)));
                    match batch.commands.last_mut() {
                        Some(DrawCommand::Meshes { instances, depth_test })
                            if *depth_test == item.depth_test && instances.end == index =>
                        {
                            instances.end += 1;
                        }
                        _ => batch.commands.push(DrawCommand::Meshes {
                            instances: index..index + 1,
                            depth_test: item.depth_test,
                        }),
                    }
                }
                NodeKind::GridHelper { size, divisions, center_color, grid_color, .. } => {
                    let start = batch.lines.len() as u32;
                    geometry::grid_lines(
                        &mut batch.lines,
                        &item.model,
                        *size,
                        *divisions,
                        to_rgba(*center_color),
                        to_rgba(*grid_color),
                    );
                    batch.push_lines(start, item.depth_test);
                }
                NodeKind::AxesHelper { size, .. } => {
                    let start = batch.lines.len() as u32;
                    geometry::axes_lines(&mut batch.lines, &item.model, *size, to_rgba);
                    batch.push_lines(start, item.depth_test);
                }
                _ => {}
            }
        }
        batch
    }

    fn push_lines(&mut self, start: u32, depth_test: bool) {
        let end = self.lines.len() as u32;
        match self.commands.last_mut() {
            Some(DrawCommand::Lines { vertices, depth_test: d }) if *d == depth_test && vertices.end == start => {
                vertices.end = end;
            }
            _ => self.commands.push(DrawCommand::Lines { vertices: start..end, depth_test }),
        }
    }
}

struct PipelineDesc<'a> {
    label: &'a str,
    shader: &'a wgpu::ShaderModule,
    vs: &'a str,
    fs: &'a str,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    topology: wgpu::PrimitiveTopology,
    cull_mode: Option<wgpu::Face>,
    depth_test: bool,
}

/// Scene renderer for one colour target format.
///
/// Owns the pipelines, the shared unit cube and the per-frame instance and
/// line buffers, which grow on demand.
pub struct WgpuRenderer {
    mesh_pipeline: wgpu::RenderPipeline,
    mesh_overlay_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    line_overlay_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    cube_vertex_buffer: wgpu::Buffer,
    cube_index_buffer: wgpu::Buffer,
    cube_index_count: u32,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    line_buffer: wgpu::Buffer,
    line_capacity: usize,
    depth_view: wgpu::TextureView,
    msaa_view: Option<wgpu::TextureView>,
    sample_count: u32,
    surface_format: wgpu::TextureFormat,
    clear_color: wgpu::Color,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        sample_count: u32,
    ) -> Self {
        let sample_count = sample_count.max(1);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mesh_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::MESH_SHADER.into()),
        });
        let line_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("line_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::LINE_SHADER.into()),
        });

        let mesh_buffers = [
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<MeshVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![0 => Float32x3],
            },
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<InstanceData>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &wgpu::vertex_attr_array![
                    1 => Float32x4,
                    2 => Float32x4,
                    3 => Float32x4,
                    4 => Float32x4,
                    5 => Float32x4,
                ],
            },
        ];
        let line_buffers = [wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![
                0 => Float32x3,
                1 => Float32x4,
            ],
        }];

        let build = |desc: PipelineDesc<'_>| {
            Self::create_pipeline(device, &pipeline_layout, surface_format, sample_count, desc)
        };
        let mesh = |label, depth_test| PipelineDesc {
            label,
            shader: &mesh_shader,
            vs: "vs_mesh",
            fs: "fs_mesh",
            buffers: &mesh_buffers,
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: Some(wgpu::Face::Back),
            depth_test,
        };
        let lines = |label, depth_test| PipelineDesc {
            label,
            shader: &line_shader,
            vs: "vs_line",
            fs: "fs_line",
            buffers: &line_buffers,
            topology: wgpu::PrimitiveTopology::LineList,
            cull_mode: None,
            depth_test,
        };
        let mesh_pipeline = build(mesh("mesh_pipeline", true));
        let mesh_overlay_pipeline = build(mesh("mesh_overlay_pipeline", false));
        let line_pipeline = build(lines("line_pipeline", true));
        let line_overlay_pipeline = build(lines("line_overlay_pipeline", false));

        let (cube_verts, cube_indices) = geometry::unit_cube();
        let cube_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_vertex_buffer"),
            contents: bytemuck::cast_slice(&cube_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let cube_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_index_buffer"),
            contents: bytemuck::cast_slice(&cube_indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let instance_capacity = 64;
        let line_capacity = 256;
        let instance_buffer = Self::create_vertex_buffer::<InstanceData>(device, "instance_buffer", instance_capacity);
        let line_buffer = Self::create_vertex_buffer::<LineVertex>(device, "line_buffer", line_capacity);

        let depth_view = Self::create_depth_texture(device, width, height, sample_count);
        let msaa_view = Self::create_msaa_texture(device, surface_format, width, height, sample_count);

        Self {
            mesh_pipeline,
            mesh_overlay_pipeline,
            line_pipeline,
            line_overlay_pipeline,
            uniform_buffer,
            uniform_bind_group,
            cube_vertex_buffer,
            cube_index_buffer,
            cube_index_count: cube_indices.len() as u32,
            instance_buffer,
            instance_capacity,
            line_buffer,
            line_capacity,
            depth_view,
            msaa_view,
            sample_count,
            surface_format,
            clear_color: wgpu::Color {
                r: 0.1,
                g: 0.1,
                b: 0.15,
                a: 1.0,
            },
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_view = Self::create_depth_texture(device, width, height, self.sample_count);
        self.msaa_view =
            Self::create_msaa_texture(device, self.surface_format, width, height, self.sample_count);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Draw the scene into `view`. Returns the number of items drawn.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) -> usize {
        let list = RenderList::collect(scene);
        let batch = FrameBatch::build(&list, self.surface_format.is_srgb());

        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                view_proj: camera.view_projection().to_cols_array_2d(),
            }),
        );

        if batch.instances.len() > self.instance_capacity {
            self.instance_capacity = batch.instances.len().next_power_of_two();
            self.instance_buffer =
                Self::create_vertex_buffer::<InstanceData>(device, "instance_buffer", self.instance_capacity);
        }
        if batch.lines.len() > self.line_capacity {
            self.line_capacity = batch.lines.len().next_power_of_two();
            self.line_buffer = Self::create_vertex_buffer::<LineVertex>(device, "line_buffer", self.line_capacity);
        }
        if !batch.instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&batch.instances));
        }
        if !batch.lines.is_empty() {
            queue.write_buffer(&self.line_buffer, 0, bytemuck::cast_slice(&batch.lines));
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("scene_encoder"),
        });

        {
            let (target, resolve_target, store) = match &self.msaa_view {
                Some(msaa) => (msaa, Some(view), wgpu::StoreOp::Discard),
                None => (view, None, wgpu::StoreOp::Store),
            };
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            for command in &batch.commands {
                match command {
                    DrawCommand::Meshes { instances, depth_test } => {
                        let pipeline = if *depth_test {
                            &self.mesh_pipeline
                        } else {
                            &self.mesh_overlay_pipeline
                        };
                        pass.set_pipeline(pipeline);
                        pass.set_vertex_buffer(0, self.cube_vertex_buffer.slice(..));
                        pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                        pass.set_index_buffer(self.cube_index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                        pass.draw_indexed(0..self.cube_index_count, 0, instances.clone());
                    }
                    DrawCommand::Lines { vertices, depth_test } => {
                        let pipeline = if *depth_test {
                            &self.line_pipeline
                        } else {
                            &self.line_overlay_pipeline
                        };
                        pass.set_pipeline(pipeline);
                        pass.set_vertex_buffer(0, self.line_buffer.slice(..));
                        pass.draw(vertices.clone(), 0..1);
                    }
                }
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
        list.len()
    }

    fn create_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        format: wgpu::TextureFormat,
        sample_count: u32,
        desc: PipelineDesc<'_>,
    ) -> wgpu::RenderPipeline {
        // Overlays draw over whatever is already there and leave depth alone.
        let (depth_write_enabled, depth_compare) = if desc.depth_test {
            (true, wgpu::CompareFunction::Less)
        } else {
            (false, wgpu::CompareFunction::Always)
        };
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(desc.label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: desc.shader,
                entry_point: Some(desc.vs),
                compilation_options: Default::default(),
                buffers: desc.buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: desc.shader,
                entry_point: Some(desc.fs),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: desc.topology,
                cull_mode: desc.cull_mode,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled,
                depth_compare,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: sample_count,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        })
    }

    fn create_vertex_buffer<T>(device: &wgpu::Device, label: &str, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: (capacity * std::mem::size_of::<T>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        sample_count: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }

    fn create_msaa_texture(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        sample_count: u32,
    ) -> Option<wgpu::TextureView> {
        if sample_count <= 1 {
            return None;
        }
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("msaa_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        Some(texture.create_view(&Default::default()))
    }
}
