//! `orrery` renders a live-updating 3D view of an N-body simulation that is
//! computed somewhere else: one sphere per body, motion traces, an
//! interactive orbit camera, and a point-cloud grid overlay. The simulation
//! host pushes JSON-encoded body snapshots into the view, which keeps its
//! visual object graph synchronized and redraws every display frame.
//!
//! The GPU-free parts (payload schema, scene reconciliation, camera math)
//! live in `orrery-core` and are re-exported here. The rendering half lives
//! in `orrery-visuals`, available through the `visuals` cargo feature as the
//! [`visuals`] module:
//!
//! ```toml
//! [dependencies]
//! orrery = { version = "0.1", features = ["visuals"] }
//! ```
//!
//! With the feature enabled, a minimal host looks like this:
//!
//! ```no_run
//! # #[cfg(feature = "visuals")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use orrery::visuals as ov;
//!
//! let mut window = ov::ViewerWindow::new(ov::WindowParams::default())?;
//! let handle = window.handle();
//! // hand `handle` to whatever computes the simulation;
//! // it pushes refreshed states with `handle.update_bodies_json(...)`
//!
//! window.run_view(ov::SimulationView {
//!     initial_bodies: orrery::parse_bodies(
//!         r#"[{"id": 1, "pos": [0, 0, 0], "color": "gold", "radius": 10}]"#,
//!     )?,
//!     params: ov::ViewParams::default(),
//! })?;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "visuals"))]
//! # fn main() {}
//! ```
//!
//! See the demos in the repository for a complete example.

pub use orrery_core::*;

/// Real-time rendering, re-exported from `orrery-visuals`.
#[cfg(feature = "visuals")]
pub use orrery_visuals as visuals;
