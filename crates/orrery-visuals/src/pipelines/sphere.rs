use bytemuck::{Pod, Zeroable};
use std::{borrow::Cow, mem::size_of};

use super::SharedResources;
use crate::render_window::{ActiveRenderWindow, RenderContext};

// tessellation of the shared unit sphere mesh;
// plenty for bodies that are rarely more than a few dozen pixels across
const LAT_BANDS: u16 = 16;
const LONG_BANDS: u16 = 24;

/// One body to draw, in world space.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct SphereInstance {
    pub center: [f32; 3],
    pub radius: f32,
    pub color: [f32; 4],
}

/// Instanced renderer for the body spheres.
///
/// All bodies share one unit sphere mesh; position, radius and color
/// come in through the instance buffer, so the whole scene's bodies
/// are a single draw call.
pub(crate) struct SpherePipeline {
    pipeline: wgpu::RenderPipeline,
    vertex_buf: wgpu::Buffer,
    index_buf: wgpu::Buffer,
    index_count: u32,
    // instance buffer grown on demand; one sphere draw happens per frame
    // so a single buffer is enough
    instance_buf: Option<wgpu::Buffer>,
    instance_capacity: usize,
}

/// Generate a unit sphere as latitude/longitude bands.
/// Vertex positions double as normals.
fn generate_sphere_mesh() -> (Vec<[f32; 3]>, Vec<u16>) {
    let vertices: Vec<[f32; 3]> = itertools::iproduct!(0..=LAT_BANDS, 0..=LONG_BANDS)
        .map(|(lat, long)| {
            let theta = lat as f32 * std::f32::consts::PI / LAT_BANDS as f32;
            let phi = long as f32 * std::f32::consts::TAU / LONG_BANDS as f32;
            let (sin_theta, cos_theta) = theta.sin_cos();
            let (sin_phi, cos_phi) = phi.sin_cos();
            [sin_theta * cos_phi, cos_theta, sin_theta * sin_phi]
        })
        .collect();

    let mut indices = Vec::with_capacity((LAT_BANDS * LONG_BANDS * 6) as usize);
    for lat in 0..LAT_BANDS {
        for long in 0..LONG_BANDS {
            let first = lat * (LONG_BANDS + 1) + long;
            let second = first + LONG_BANDS + 1;
            indices.extend_from_slice(&[first, second, first + 1]);
            indices.extend_from_slice(&[second, second + 1, first + 1]);
        }
    }

    (vertices, indices)
}

impl SpherePipeline {
    pub fn new(window: &ActiveRenderWindow, res: &SharedResources) -> Self {
        let label = Some("sphere");

        let shader = window
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label,
                source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!(
                    "../shaders/sphere.wgsl"
                ))),
            });

        let (vertices, indices) = generate_sphere_mesh();
        use wgpu::util::DeviceExt;
        let vertex_buf = window
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label,
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buf = window
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label,
                contents: bytemuck::cast_slice(&indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        let pipeline_layout =
            window
                .device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label,
                    bind_group_layouts: &[&res.frame_bind_group_layout],
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
                        // vertices of the shared unit sphere
                        wgpu::VertexBufferLayout {
                            array_stride: 3 * 4,
                            step_mode: wgpu::VertexStepMode::Vertex,
                            attributes: &[wgpu::VertexAttribute {
                                format: wgpu::VertexFormat::Float32x3,
                                offset: 0,
                                shader_location: 0,
                            }],
                        },
                        // per-body instance data
                        wgpu::VertexBufferLayout {
                            array_stride: size_of::<SphereInstance>() as _,
                            step_mode: wgpu::VertexStepMode::Instance,
                            attributes: &[
                                // center
                                wgpu::VertexAttribute {
                                    format: wgpu::VertexFormat::Float32x3,
                                    offset: 0,
                                    shader_location: 1,
                                },
                                // radius
                                wgpu::VertexAttribute {
                                    format: wgpu::VertexFormat::Float32,
                                    offset: 3 * 4,
                                    shader_location: 2,
                                },
                                // color
                                wgpu::VertexAttribute {
                                    format: wgpu::VertexFormat::Float32x4,
                                    offset: 4 * 4,
                                    shader_location: 3,
                                },
                            ],
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
                    cull_mode: Some(wgpu::Face::Back),
                    ..Default::default()
                },
                depth_stencil: Some(window.depth_stencil_state(true)),
                multisample: window.multisample_state(),
                multiview: None,
                cache: None,
            });

        Self {
            pipeline,
            vertex_buf,
            index_buf,
            index_count: indices.len() as u32,
            instance_buf: None,
            instance_capacity: 0,
        }
    }

    pub fn draw(
        &mut self,
        res: &SharedResources,
        ctx: &mut RenderContext,
        instances: &[SphereInstance],
    ) {
        let instance_data: &[u8] = bytemuck::cast_slice(instances);
        match &self.instance_buf {
            Some(buf) if instance_data.len() <= self.instance_capacity => {
                ctx.queue.write_buffer(buf, 0, instance_data);
            }
            _ => {
                use wgpu::util::DeviceExt;
                self.instance_buf = Some(ctx.device.create_buffer_init(
                    &wgpu::util::BufferInitDescriptor {
                        label: Some("sphere instances"),
                        contents: instance_data,
                        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    },
                ));
                self.instance_capacity = instance_data.len();
            }
        }
        let instance_buf = self.instance_buf.as_ref().expect("buffer was just created");

        let mut pass = ctx.pass("bodies");
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &res.frame_bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buf.slice(..));
        pass.set_vertex_buffer(1, instance_buf.slice(..));
        pass.set_index_buffer(self.index_buf.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..self.index_count, 0, 0..instances.len() as u32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sphere_mesh_is_well_formed() {
        let (vertices, indices) = generate_sphere_mesh();

        assert_eq!(
            vertices.len(),
            ((LAT_BANDS + 1) * (LONG_BANDS + 1)) as usize
        );
        assert_eq!(indices.len(), (LAT_BANDS * LONG_BANDS * 6) as usize);

        // positions double as normals, so they must lie on the unit sphere
        for vert in &vertices {
            let norm = (vert[0].powi(2) + vert[1].powi(2) + vert[2].powi(2)).sqrt();
            assert_relative_eq!(norm, 1.0, epsilon = 1e-5);
        }

        // every index points at a vertex
        let max_idx = *indices.iter().max().expect("mesh has indices");
        assert!((max_idx as usize) < vertices.len());
    }
}
