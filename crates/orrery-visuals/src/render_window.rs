//! Low-level resources for window creation and rendering,
//! and the event-driven application that keeps the view alive.

use web_time::Instant;

#[cfg(target_arch = "wasm32")]
use winit::event_loop::EventLoopProxy;
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use orrery_core::{
    camera::OrbitCamera, controls::OrbitControls, payload, scene::Scene, transition::Transition,
};

use super::{
    pipelines as pl,
    view::{SimulationView, ViewerEvent, ViewerHandle},
};

//
// user-facing API
//

/// Parameters for the creation of a [`ViewerWindow`].
#[derive(Clone, Copy, Debug)]
pub struct WindowParams {
    /// Initial width of the window in pixels. Default: 800.
    pub width: usize,
    /// Initial height of the window in pixels. Default: 800.
    pub height: usize,
    /// Samples used for anti-aliasing. Default: 4.
    ///
    /// Note that MSAA is not supported on WebGL,
    /// so this setting does nothing there.
    pub msaa_samples: u32,
    /// Id of the HTML element to embed this window under on the web.
    /// Default: "orrery-canvas".
    ///
    /// If an element with this id is not found, the view logs an error and
    /// aborts without touching the rest of the page.
    /// This does not do anything outside of the web platform.
    pub parent_element_id: &'static str,
}

impl Default for WindowParams {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            msaa_samples: 4,
            parent_element_id: "orrery-canvas",
        }
    }
}

/// Error opening or running a view.
#[derive(thiserror::Error, Debug)]
pub enum ViewError {
    /// The underlying event loop could not be built or run.
    #[error("event loop error")]
    EventLoop(#[from] winit::error::EventLoopError),
}

/// A window displaying a live simulation view.
///
/// See [`run_view`][Self::run_view], [`SimulationView`],
/// and the demos in the repository for how to feed it.
pub struct ViewerWindow {
    // ViewerWindow is just a wrapper to implement winit's `ApplicationHandler`
    // on; all the actual resources are created on application resume
    // and stored in `ActiveRenderWindow`
    params: WindowParams,
    handle: ViewerHandle,
    // event loop in an option because we need to take it out to run it
    event_loop: Option<EventLoop<ViewerEvent>>,
}

impl ViewerWindow {
    /// Create a new viewer window.
    pub fn new(params: WindowParams) -> Result<Self, ViewError> {
        let event_loop = EventLoop::with_user_event().build()?;
        let handle = ViewerHandle {
            proxy: event_loop.create_proxy(),
        };
        Ok(Self {
            params,
            handle,
            event_loop: Some(event_loop),
        })
    }

    /// The channel the host pushes refreshed data through.
    /// Can be cloned and sent to other threads.
    pub fn handle(&self) -> ViewerHandle {
        self.handle.clone()
    }

    /// Attach a [`SimulationView`] and run it in the window.
    ///
    /// # Controls
    /// - drag with the left mouse button to orbit, scroll to zoom
    /// - `F`: pull the camera back until the whole scene is framed
    /// - `G`: toggle the grid overlay
    /// - `Q`: close the view and return from this function
    ///
    /// # Panics
    ///
    /// Due to architectural limitations in the current version of `winit`,
    /// we cannot propagate errors that occurred in render context creation.
    /// If the GPU context fails to initialize, this function will panic.
    /// A missing host element on the web is *not* fatal:
    /// it logs an error and the view simply never starts.
    ///
    /// # Consecutive views and WASM
    ///
    /// On native platforms this function returns once the window is closed
    /// or `Q` is pressed, so several views can be run consecutively in one
    /// program. On the web it never returns due to limitations in window
    /// handling inside a browser.
    pub fn run_view(&mut self, view: SimulationView) -> Result<(), ViewError> {
        let scene = Scene::seed(view.params.scene, &view.initial_bodies);
        let camera = OrbitCamera::new(
            scene.centroid().unwrap_or_else(nalgebra::Point3::origin),
            view.params.camera_distance,
            view.params.projection,
        );

        #[allow(unused_mut)]
        let mut event_loop = self.event_loop.take().expect("view is already running");
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = ViewerApp {
            #[cfg(target_arch = "wasm32")]
            loop_proxy: Some(event_loop.create_proxy()),

            window_params: self.params,
            window: None,
            controls: OrbitControls::new(view.params.controls),
            axes: pl::AxesParams {
                half_extent: view.params.axis_half_extent,
                ..Default::default()
            },
            trace_params: pl::line::LineParams {
                width: pl::line::LineWidth::ScreenPixels(view.params.trace_width),
                ..Default::default()
            },
            grid_params: pl::DotParams {
                size: view.params.grid_point_size,
                ..Default::default()
            },
            transition: None,
            frame_start_t: Instant::now(),
            cursor_position: None,
            scene,
            camera,
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            use winit::platform::run_on_demand::EventLoopExtRunOnDemand;
            event_loop.run_app_on_demand(&mut app)?;
            self.event_loop = Some(event_loop);
            Ok(())
        }

        #[cfg(target_arch = "wasm32")]
        {
            std::panic::set_hook(Box::new(console_error_panic_hook::hook));
            console_log::init().expect("Failed to initialize console logger");
            // using `run_app` instead of the recommended `spawn_app` here
            // because it allows us to use an API with lifetimes
            event_loop.run_app(&mut app)?;
            Ok(())
        }
    }
}

//
// actual window and wgpu context
//

/// Format of the depth buffer shared by all pipelines.
pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

// An active window (created after the event loop is started)
// and wgpu rendering context.
#[derive(Debug)]
pub(crate) struct ActiveRenderWindow {
    _window: Window,
    pub(crate) device: wgpu::Device,
    pub(crate) queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    swapchain_format: wgpu::TextureFormat,
    msaa_samples: u32,
    // msaa texture is only created if multisampling is used
    msaa_tex: Option<wgpu::Texture>,
    depth_tex: Option<wgpu::Texture>,
}

/// Return type for `ActiveRenderWindow::create_rest`.
/// When not on wasm we return the window directly from creation.
/// On wasm we instead maneuver it through a custom event and return nothing
/// because we can't block on futures to get their return values
#[cfg(not(target_arch = "wasm32"))]
type CreateWindowRet = ActiveRenderWindow;
#[cfg(target_arch = "wasm32")]
type CreateWindowRet = ();

impl ActiveRenderWindow {
    /// Create the window separately from the wgpu context.
    /// This is needed to avoid the lifetime of the event loop in the async
    /// task, since wasm requires the task to be 'static.
    ///
    /// Returns `None` if the window can't be created or, on the web, if the
    /// host element to embed into doesn't exist; both cases are logged and
    /// leave the host page untouched.
    fn create_window(event_loop: &ActiveEventLoop, params: WindowParams) -> Option<Window> {
        let window_attrs = Window::default_attributes()
            .with_title("orrery")
            .with_inner_size(winit::dpi::LogicalSize {
                width: params.width as f64,
                height: params.height as f64,
            });
        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => window,
            Err(err) => {
                log::error!("failed to create a window: {err}");
                return None;
            }
        };

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::WindowExtWebSys;
            let canvas = window.canvas()?;
            canvas.set_width(params.width as u32);
            canvas.set_height(params.height as u32);
            let canvas = web_sys::Element::from(canvas);
            let parent = web_sys::window()
                .and_then(|win| win.document())
                .and_then(|doc| doc.get_element_by_id(params.parent_element_id));
            let Some(parent) = parent else {
                log::error!(
                    "host element \"{}\" not found, view will not start",
                    params.parent_element_id
                );
                return None;
            };
            parent.append_child(&canvas).ok()?;
        }

        Some(window)
    }

    /// Create the rest of the contexts besides the window.
    async fn create_rest(
        window: Window,
        params: WindowParams,
        #[cfg(target_arch = "wasm32")] proxy: EventLoopProxy<ViewerEvent>,
    ) -> CreateWindowRet {
        let instance = wgpu::Instance::default();
        let surface = unsafe {
            instance
                .create_surface_unsafe(
                    wgpu::SurfaceTargetUnsafe::from_window(&window)
                        .expect("Failed to get window handle"),
                )
                .expect("Failed to create surface")
        };

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                force_fallback_adapter: false,
                compatible_surface: Some(&surface),
            })
            .await
            .expect("Failed to get adapter");

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    #[cfg(not(target_arch = "wasm32"))]
                    required_limits: wgpu::Limits::default(),
                    #[cfg(target_arch = "wasm32")]
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                    label: None,
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await
            .expect("Failed to get device");

        let window_size = window.inner_size();

        #[cfg(target_arch = "wasm32")]
        let swapchain_format = wgpu::TextureFormat::Rgba8UnormSrgb;
        #[cfg(not(target_arch = "wasm32"))]
        let swapchain_format = wgpu::TextureFormat::Bgra8UnormSrgb;
        let swapchain_capabilities = surface.get_capabilities(&adapter);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: swapchain_format,
            width: window_size.width,
            height: window_size.height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: swapchain_capabilities.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        // MSAA is not supported on WebGL, so always set samples to 1
        #[cfg(not(target_arch = "wasm32"))]
        let msaa_samples = params.msaa_samples;
        #[cfg(target_arch = "wasm32")]
        let msaa_samples = 1;

        // on the web, we can get a situation where the window size is 0 here.
        // in that case, postpone surface configuration until we get a resize event
        let window_has_pixels = surface_config.width != 0 && surface_config.height != 0;
        if window_has_pixels {
            surface.configure(&device, &surface_config);
        }
        let msaa_tex = if msaa_samples > 1 && window_has_pixels {
            Some(Self::create_msaa_texture(
                &device,
                swapchain_format,
                msaa_samples,
                window_size,
            ))
        } else {
            None
        };
        let depth_tex = if window_has_pixels {
            Some(Self::create_depth_texture(
                &device,
                msaa_samples,
                window_size,
            ))
        } else {
            None
        };

        let win = Self {
            _window: window,
            device,
            queue,
            surface,
            surface_config,
            swapchain_format,
            msaa_samples,
            msaa_tex,
            depth_tex,
        };

        // on wasm, the data needs to be maneuvered out through an event
        // because we can't block on futures
        #[cfg(target_arch = "wasm32")]
        proxy
            .send_event(ViewerEvent::WindowCreated(win))
            .expect("Successfully created wgpu context but failed to send window event");
        #[cfg(not(target_arch = "wasm32"))]
        win
    }

    /// Create a multisampled texture to render to.
    fn create_msaa_texture(
        device: &wgpu::Device,
        swapchain_format: wgpu::TextureFormat,
        msaa_samples: u32,
        window_size: winit::dpi::PhysicalSize<u32>,
    ) -> wgpu::Texture {
        device.create_texture(&wgpu::TextureDescriptor {
            label: Some("screen multisample"),
            size: wgpu::Extent3d {
                width: window_size.width,
                height: window_size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: msaa_samples,
            dimension: wgpu::TextureDimension::D2,
            format: swapchain_format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
    }

    /// Create the depth buffer. Sample count must match the color target.
    fn create_depth_texture(
        device: &wgpu::Device,
        msaa_samples: u32,
        window_size: winit::dpi::PhysicalSize<u32>,
    ) -> wgpu::Texture {
        device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth"),
            size: wgpu::Extent3d {
                width: window_size.width,
                height: window_size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: msaa_samples,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
    }

    /// Reconfigure the swapchain and recreate the MSAA and depth textures
    /// when the window size has changed.
    fn resize_swapchain(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size == self.window_size() || new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.surface_config.width = new_size.width;
        self.surface_config.height = new_size.height;
        self.surface.configure(&self.device, &self.surface_config);
        if self.msaa_samples > 1 {
            self.msaa_tex = Some(Self::create_msaa_texture(
                &self.device,
                self.swapchain_format,
                self.msaa_samples,
                new_size,
            ));
        }
        self.depth_tex = Some(Self::create_depth_texture(
            &self.device,
            self.msaa_samples,
            new_size,
        ));
    }

    /// Get the format of the swapchain texture being rendered to.
    #[inline]
    pub(crate) fn swapchain_format(&self) -> wgpu::TextureFormat {
        self.swapchain_format
    }

    /// Get the size of the render window in physical pixels.
    #[inline]
    pub(crate) fn window_size(&self) -> winit::dpi::PhysicalSize<u32> {
        winit::dpi::PhysicalSize::new(self.surface_config.width, self.surface_config.height)
    }

    /// Get the multisample state used by the window.
    #[inline]
    pub(crate) fn multisample_state(&self) -> wgpu::MultisampleState {
        wgpu::MultisampleState {
            count: self.msaa_samples,
            mask: !0,
            alpha_to_coverage_enabled: false,
        }
    }

    /// Depth state shared by every pipeline drawing into the window.
    #[inline]
    pub(crate) fn depth_stencil_state(&self, depth_write_enabled: bool) -> wgpu::DepthStencilState {
        wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }
    }

    /// Grab the next swapchain texture and start drawing on it.
    fn begin_frame(&mut self) -> RenderContext<'_> {
        let surface_tex = self
            .surface
            .get_current_texture()
            .expect("Failed to get next swapchain texture");
        let surface_view = surface_tex
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let (target, resolve_target) = if let Some(msaa_tex) = &self.msaa_tex {
            let msaa_view = msaa_tex.create_view(&wgpu::TextureViewDescriptor::default());
            (msaa_view, Some(surface_view))
        } else {
            (surface_view, None)
        };
        let depth_target = self
            .depth_tex
            .as_ref()
            .expect("depth texture missing despite nonzero window size")
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor::default());

        let multisample_state = self.multisample_state();

        RenderContext {
            clear_color: Some(wgpu::Color::BLACK),
            clear_depth: true,
            surface_tex,
            target,
            resolve_target,
            depth_target,
            encoder,
            device: &self.device,
            queue: &mut self.queue,
            viewport_size: (self.surface_config.width, self.surface_config.height),
            target_format: self.swapchain_format,
            multisample_state,
        }
    }
}

/// An active surface and other context required to draw a frame.
pub(crate) struct RenderContext<'a> {
    // if this is set, first pass automatically clears the framebuffer
    clear_color: Option<wgpu::Color>,
    clear_depth: bool,
    surface_tex: wgpu::SurfaceTexture,
    pub target: wgpu::TextureView,
    pub resolve_target: Option<wgpu::TextureView>,
    pub depth_target: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
    pub device: &'a wgpu::Device,
    pub queue: &'a mut wgpu::Queue,
    pub viewport_size: (u32, u32),
    pub target_format: wgpu::TextureFormat,
    pub multisample_state: wgpu::MultisampleState,
}

impl<'a> RenderContext<'a> {
    /// Start a render pass with default parameters.
    pub fn pass(&mut self, label: &str) -> wgpu::RenderPass {
        self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.target,
                resolve_target: self.resolve_target.as_ref(),
                ops: wgpu::Operations {
                    load: if let Some(c) = self.clear_color.take() {
                        wgpu::LoadOp::Clear(c)
                    } else {
                        wgpu::LoadOp::Load
                    },
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_target,
                depth_ops: Some(wgpu::Operations {
                    load: if std::mem::take(&mut self.clear_depth) {
                        wgpu::LoadOp::Clear(1.0)
                    } else {
                        wgpu::LoadOp::Load
                    },
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        })
    }
}

//
// view control
//

/// A `winit` app keeping the scene in sync with pushed host data
/// and redrawing it every display frame.
struct ViewerApp {
    // event loop proxy allows us to send the wgpu context to the active
    // window after creating it in an async future
    #[cfg(target_arch = "wasm32")]
    loop_proxy: Option<EventLoopProxy<ViewerEvent>>,

    window_params: WindowParams,
    window: Option<(ActiveRenderWindow, pl::Renderer)>,
    scene: Scene,
    camera: OrbitCamera,
    controls: OrbitControls,
    axes: pl::AxesParams,
    trace_params: pl::line::LineParams,
    grid_params: pl::DotParams,
    // at most one timed camera move; replacing it is the cancellation path
    transition: Option<Transition>,
    // state for the timing of frames
    frame_start_t: Instant,
    cursor_position: Option<PhysicalPosition<f64>>,
}

impl ViewerApp {
    fn apply_body_payload(&mut self, json: &str) {
        match payload::parse_bodies(json) {
            Ok(bodies) => {
                let summary = self.scene.apply_update(&bodies);
                if summary.added > 0 || summary.removed > 0 {
                    log::debug!(
                        "reconciled bodies: +{} -{} (tracking {})",
                        summary.added,
                        summary.removed,
                        self.scene.len()
                    );
                }
            }
            Err(err) => log::warn!("ignoring body update: {err}"),
        }
    }

    fn apply_grid_payload(&mut self, json: &str) {
        match payload::parse_grid(json) {
            Ok(batch) => self.scene.set_grid(batch),
            Err(err) => log::warn!("ignoring grid update: {err}"),
        }
    }

    fn start_focus(&mut self, id: u64) {
        if let Some(transition) = Transition::focus(id, &self.scene, &self.camera) {
            self.transition = Some(transition);
        }
    }

    fn start_fit(&mut self) {
        if let Some(transition) = Transition::fit(&self.scene, &self.camera) {
            self.transition = Some(transition);
        }
    }
}

impl winit::application::ApplicationHandler<ViewerEvent> for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(window) = ActiveRenderWindow::create_window(event_loop, self.window_params) else {
            // already logged; abort without a scene or render loop,
            // leaving the host process/page intact
            event_loop.exit();
            return;
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            let active_win = futures::executor::block_on(ActiveRenderWindow::create_rest(
                window,
                self.window_params,
            ));
            let renderer = pl::Renderer::new(&active_win);
            self.window = Some((active_win, renderer));
        }

        #[cfg(target_arch = "wasm32")]
        {
            wasm_bindgen_futures::spawn_local(ActiveRenderWindow::create_rest(
                window,
                self.window_params,
                self.loop_proxy.take().unwrap(),
            ));
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: ViewerEvent) {
        match event {
            ViewerEvent::Bodies(json) => self.apply_body_payload(&json),
            ViewerEvent::Grid(json) => self.apply_grid_payload(&json),
            ViewerEvent::Focus(id) => self.start_focus(id),
            ViewerEvent::Fit => self.start_fit(),
            ViewerEvent::ToggleGrid => self.scene.toggle_grid(),
            // get the wgpu context that was created in a spawned task
            #[cfg(target_arch = "wasm32")]
            ViewerEvent::WindowCreated(active_win) => {
                let renderer = pl::Renderer::new(&active_win);
                self.window = Some((active_win, renderer));
            }
        }
    }

    /// step and draw in about_to_wait even though winit recommends against it,
    /// because waiting for RedrawRequested events causes stuttering on web
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        let Some((window, renderer)) = self.window.as_mut() else {
            return;
        };
        if window.surface_config.width == 0 || window.surface_config.height == 0 {
            // we're on the web (most likely)
            // and the canvas hasn't been fully initialized yet, keep waiting
            return;
        }

        let dt = self.frame_start_t.elapsed().as_secs_f32();
        self.frame_start_t = Instant::now();

        // camera motion: an active transition owns the target and distance;
        // otherwise auto-follow may ease the target toward the centroid
        if let Some(transition) = &mut self.transition {
            if transition.advance(dt, &self.scene, &mut self.camera) {
                self.transition = None;
            }
        } else if self.controls.auto_follow_ready() {
            if let Some(centroid) = self.scene.centroid() {
                self.controls.follow(dt, &mut self.camera, centroid);
            }
        }
        self.controls.update(dt, &mut self.camera);

        // draw

        let mut ctx = window.begin_frame();
        renderer
            .resources
            .upload_frame_uniforms(&self.camera, &mut ctx);

        let mut painter = pl::Painter {
            ctx: &mut ctx,
            rend: renderer,
        };
        painter.bodies(&self.scene);
        painter.traces(&self.scene, self.trace_params);
        if self.scene.grid_visible() {
            painter.grid(&self.scene, self.grid_params);
        }
        painter.axes(self.axes);

        ctx.queue.submit(Some(ctx.encoder.finish()));
        renderer.end_frame();
        ctx.surface_tex.present();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some((window, _renderer)) = self.window.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                window.resize_swapchain(new_size);
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => self.controls.pointer_pressed(),
                ElementState::Released => self.controls.pointer_released(),
            },
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(prev) = self.cursor_position {
                    self.controls.pointer_moved(
                        (position.x - prev.x) as f32,
                        (position.y - prev.y) as f32,
                    );
                }
                self.cursor_position = Some(position);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
                };
                self.controls.wheel(steps);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let (ElementState::Pressed, PhysicalKey::Code(code)) =
                    (event.state, event.physical_key)
                {
                    match code {
                        KeyCode::KeyQ => {
                            // don't exit on web since there's nothing we can do afterwards there
                            #[cfg(not(target_arch = "wasm32"))]
                            event_loop.exit();
                        }
                        KeyCode::KeyF => self.start_fit(),
                        KeyCode::KeyG => self.scene.toggle_grid(),
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
}
