mod resources;
use resources::SharedResources;

pub(crate) mod line;
use line::{LineDrawingMode, LineParams, LinePipeline};

pub(crate) mod axes;
pub(crate) use axes::AxesParams;

mod sphere;
use sphere::{SphereInstance, SpherePipeline};

mod dots;
use dots::DotPipeline;
pub(crate) use dots::DotParams;

//

use crate::render_window::{ActiveRenderWindow, RenderContext};
use orrery_core::scene::Scene;

pub(crate) struct Renderer {
    sphere_pl: SpherePipeline,
    line_pl: LinePipeline,
    dot_pl: DotPipeline,
    // some GPU resources are shared between different pipelines
    pub resources: SharedResources,
}

impl Renderer {
    pub fn new(window: &ActiveRenderWindow) -> Self {
        let resources = SharedResources::new(window);
        Self {
            sphere_pl: SpherePipeline::new(window, &resources),
            line_pl: LinePipeline::new(window, &resources),
            dot_pl: DotPipeline::new(window, &resources),
            resources,
        }
    }

    /// Reset any state accumulated within a frame
    /// to prepare for the next one.
    pub fn end_frame(&mut self) {
        self.line_pl.end_frame();
    }
}

/// The drawing interface the view uses once per frame.
pub(crate) struct Painter<'a, 'ctx: 'a> {
    pub(crate) ctx: &'a mut RenderContext<'ctx>,
    pub(crate) rend: &'a mut Renderer,
}

impl<'a, 'ctx: 'a> Painter<'a, 'ctx> {
    /// Draw every tracked body as a shaded sphere.
    pub fn bodies(&mut self, scene: &Scene) {
        let instances: Vec<SphereInstance> = scene
            .visuals()
            .map(|(_, visual)| SphereInstance {
                center: visual.position.into(),
                radius: visual.radius,
                color: [
                    visual.color.red,
                    visual.color.green,
                    visual.color.blue,
                    1.0,
                ],
            })
            .collect();
        if instances.is_empty() {
            return;
        }
        self.rend.sphere_pl.draw(&self.rend.resources, self.ctx, &instances);
    }

    /// Draw every body's motion trace as a line strip in the body's color.
    pub fn traces(&mut self, scene: &Scene, params: LineParams) {
        for (_, visual) in scene.visuals() {
            if visual.trace.len() < 2 {
                continue;
            }
            let points: Vec<[f32; 3]> = visual.trace.points().map(|p| (*p).into()).collect();
            self.lines(
                LineParams {
                    color: visual.color,
                    ..params
                },
                LineDrawingMode::Strip,
                &points,
            );
        }
    }

    /// Draw the grid overlay point cloud.
    pub fn grid(&mut self, scene: &Scene, params: DotParams) {
        let points: Vec<[f32; 3]> = scene.grid_points().iter().map(|p| (*p).into()).collect();
        if points.is_empty() {
            return;
        }
        self.rend
            .dot_pl
            .draw(&self.rend.resources, self.ctx, params, &points);
    }

    /// Draw the reference axes through the world origin.
    pub fn axes(&mut self, params: AxesParams) {
        axes::axes_3d(self, params);
    }

    /// Draw a list of line segments.
    ///
    /// Every two points in `points` define a distinct segment,
    /// with a gap left between them.
    #[inline]
    pub fn line_list(&mut self, params: LineParams, points: &[[f32; 3]]) {
        self.lines(params, LineDrawingMode::List, points);
    }

    fn lines(&mut self, params: LineParams, mode: LineDrawingMode, points: &[[f32; 3]]) {
        self.rend
            .line_pl
            .draw(&self.rend.resources, self.ctx, params, mode, points);
    }
}
