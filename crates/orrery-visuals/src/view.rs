//! User-facing configuration for a simulation view
//! and the handle the host uses to push data into it.

use orrery_core::{camera::Projection, controls::ControlParams, scene::SceneParams, Body};

use winit::event_loop::EventLoopProxy;

#[cfg(target_arch = "wasm32")]
use crate::render_window::ActiveRenderWindow;

/// A live view of an externally computed N-body simulation.
///
/// To display the view in a window, create a
/// [`ViewerWindow`][crate::ViewerWindow] and call
/// [`run_view`][crate::ViewerWindow::run_view] on it.
/// While the view runs, the host feeds it through a
/// [`ViewerHandle`][crate::ViewerHandle].
pub struct SimulationView {
    /// The body list the view starts from, as delivered on attach.
    pub initial_bodies: Vec<Body>,
    /// Control parameters.
    pub params: ViewParams,
}

/// Parameters to control aspects of a [`SimulationView`].
#[derive(Clone, Debug)]
pub struct ViewParams {
    /// How host data maps into the scene.
    pub scene: SceneParams,
    /// Orbit control tuning.
    pub controls: ControlParams,
    /// Camera projection.
    pub projection: Projection,
    /// Initial orbit distance. Default: 500, far enough out to frame
    /// the host's usual coordinate range.
    pub camera_distance: f32,
    /// Half-length of the reference axes drawn through the origin.
    /// Default: 100.
    pub axis_half_extent: f32,
    /// Width of the motion traces in screen pixels. Default: 1.5.
    pub trace_width: f32,
    /// Diameter of the grid overlay points in screen pixels. Default: 3.
    pub grid_point_size: f32,
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            scene: SceneParams::default(),
            controls: ControlParams::default(),
            projection: Projection::default(),
            camera_distance: 500.0,
            axis_half_extent: 100.0,
            trace_width: 1.5,
            grid_point_size: 3.0,
        }
    }
}

/// Events delivered to the view through the event loop.
///
/// Not exposed directly; the host uses the [`ViewerHandle`] methods.
#[derive(Debug)]
pub(crate) enum ViewerEvent {
    /// A refreshed body list, JSON-encoded.
    Bodies(String),
    /// A grid overlay payload, JSON-encoded.
    Grid(String),
    /// Move the camera to a body.
    Focus(u64),
    /// Frame the whole scene.
    Fit,
    /// Toggle the grid overlay.
    ToggleGrid,
    /// Window and render context finished async creation (wasm only).
    #[cfg(target_arch = "wasm32")]
    WindowCreated(ActiveRenderWindow),
}

/// Clonable handle for pushing host data into a running view.
///
/// This is the update channel of the view: the host calls these methods
/// whenever it has a refreshed body list, a new grid, or a user pressed one
/// of its focus/zoom/grid buttons. All methods are fire-and-forget; once the
/// view has shut down, sends degrade to a logged warning.
#[derive(Clone)]
pub struct ViewerHandle {
    pub(crate) proxy: EventLoopProxy<ViewerEvent>,
}

impl ViewerHandle {
    /// Deliver a refreshed body list as JSON
    /// (`[{"id": 1, "pos": [x, y, z], "color": "red", "radius": 5.0}, ...]`).
    ///
    /// A malformed payload is logged on the view side and ignored.
    pub fn update_bodies_json(&self, json: impl Into<String>) {
        self.send(ViewerEvent::Bodies(json.into()));
    }

    /// Deliver a grid overlay payload as JSON (`{"grid": [[x, y, z], ...]}`).
    ///
    /// Malformed points are logged and dropped individually on the view side.
    pub fn update_grid_json(&self, json: impl Into<String>) {
        self.send(ViewerEvent::Grid(json.into()));
    }

    /// Move the camera to the body with the given id.
    /// Ignored if the id is not currently tracked.
    pub fn focus_body(&self, id: u64) {
        self.send(ViewerEvent::Focus(id));
    }

    /// Pull the camera back (or in) until the whole scene is framed.
    pub fn fit_view(&self) {
        self.send(ViewerEvent::Fit);
    }

    /// Toggle the grid overlay.
    pub fn toggle_grid(&self) {
        self.send(ViewerEvent::ToggleGrid);
    }

    fn send(&self, event: ViewerEvent) {
        if self.proxy.send_event(event).is_err() {
            log::warn!("view has shut down, dropping a pushed update");
        }
    }
}
