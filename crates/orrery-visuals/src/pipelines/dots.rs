use nalgebra as na;
use std::borrow::Cow;

use super::{
    line::{circle_geometry, InstanceGeometry},
    SharedResources,
};
use crate::render_window::{ActiveRenderWindow, RenderContext};

/// Parameters for the grid overlay point cloud.
#[derive(Clone, Copy, Debug)]
pub(crate) struct DotParams {
    /// Diameter of each point in screen pixels.
    pub size: f32,
    /// Color of the points in linear sRGB space.
    pub color: palette::LinSrgb,
}

impl Default for DotParams {
    fn default() -> Self {
        Self {
            size: 3.0,
            color: palette::LinSrgb::new(0.35, 0.35, 0.4),
        }
    }
}

/// Uniform parameters for the dot shader.
#[derive(Clone, Copy, Debug, encase::ShaderType)]
struct ParamUniforms {
    size: f32,
    color: na::Vector4<f32>,
}

/// Renders a point cloud as screen-sized circular billboards,
/// one circle primitive instanced per point.
pub(crate) struct DotPipeline {
    pipeline: wgpu::RenderPipeline,
    circle: InstanceGeometry,
    params_buf: wgpu::Buffer,
    params_bind_group: wgpu::BindGroup,
    // instance buffer grown on demand; the grid is drawn once per frame
    // so a single buffer is enough
    instance_buf: Option<wgpu::Buffer>,
    instance_capacity: usize,
}

impl DotPipeline {
    pub fn new(window: &ActiveRenderWindow, res: &SharedResources) -> Self {
        let label = Some("dots");

        let shader = window
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label,
                source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!(
                    "../shaders/dot.wgsl"
                ))),
            });

        let params_buf_size = <ParamUniforms as encase::ShaderType>::min_size();
        let params_buf = window.device.create_buffer(&wgpu::BufferDescriptor {
            label,
            size: params_buf_size.get(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let params_bind_group_layout =
            window
                .device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label,
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: Some(params_buf_size),
                        },
                        count: None,
                    }],
                });
        let params_bind_group = window.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label,
            layout: &params_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: params_buf.as_entire_binding(),
            }],
        });

        let pipeline_layout =
            window
                .device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label,
                    bind_group_layouts: &[&res.frame_bind_group_layout, &params_bind_group_layout],
                    push_constant_ranges: &[],
                });

        let pipeline = window
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label,
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: "vs_main",
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    buffers: &[
                        // vertices of the circle primitive
                        wgpu::VertexBufferLayout {
                            array_stride: 2 * 4,
                            step_mode: wgpu::VertexStepMode::Vertex,
                            attributes: &[wgpu::VertexAttribute {
                                format: wgpu::VertexFormat::Float32x2,
                                offset: 0,
                                shader_location: 0,
                            }],
                        },
                        // one world-space position per point
                        wgpu::VertexBufferLayout {
                            array_stride: 3 * 4,
                            step_mode: wgpu::VertexStepMode::Instance,
                            attributes: &[wgpu::VertexAttribute {
                                format: wgpu::VertexFormat::Float32x3,
                                offset: 0,
                                shader_location: 1,
                            }],
                        },
                    ],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: "fs_main",
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    targets: &[Some(window.swapchain_format().into())],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    ..Default::default()
                },
                // test against the bodies but don't occlude them:
                // the grid is an overlay, not scene geometry
                depth_stencil: Some(window.depth_stencil_state(false)),
                multisample: window.multisample_state(),
                multiview: None,
                cache: None,
            });

        Self {
            pipeline,
            circle: circle_geometry(&window.device, "dot", 12),
            params_buf,
            params_bind_group,
            instance_buf: None,
            instance_capacity: 0,
        }
    }

    pub fn draw(
        &mut self,
        res: &SharedResources,
        ctx: &mut RenderContext,
        params: DotParams,
        points: &[[f32; 3]],
    ) {
        let params_unif = ParamUniforms {
            size: params.size,
            color: na::Vector4::new(params.color.red, params.color.green, params.color.blue, 1.0),
        };
        let mut params_bytes = encase::UniformBuffer::new(Vec::new());
        params_bytes
            .write(&params_unif)
            .expect("Failed to write dot parameters");
        ctx.queue
            .write_buffer(&self.params_buf, 0, &params_bytes.into_inner());

        let instance_data: &[u8] = bytemuck::cast_slice(points);
        match &self.instance_buf {
            Some(buf) if instance_data.len() <= self.instance_capacity => {
                ctx.queue.write_buffer(buf, 0, instance_data);
            }
            _ => {
                use wgpu::util::DeviceExt;
                self.instance_buf = Some(ctx.device.create_buffer_init(
                    &wgpu::util::BufferInitDescriptor {
                        label: Some("dot instances"),
                        contents: instance_data,
                        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    },
                ));
                self.instance_capacity = instance_data.len();
            }
        }
        let instance_buf = self.instance_buf.as_ref().expect("buffer was just created");

        let mut pass = ctx.pass("grid");
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &res.frame_bind_group, &[]);
        pass.set_bind_group(1, &self.params_bind_group, &[]);
        let idx_range = self.circle.bind(&mut pass);
        pass.set_vertex_buffer(1, instance_buf.slice(..));
        pass.draw_indexed(idx_range, 0, 0..points.len() as u32);
    }
}
