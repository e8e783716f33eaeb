//! This is the core crate containing everything about `orrery`
//! that doesn't need a GPU: the host payload schema, the scene state
//! that tracks one visual per simulated body, and the orbit camera
//! with its controls and timed transitions.
//! See the `orrery` crate's documentation for an overview.

#![warn(missing_docs)]

pub mod payload;
#[doc(inline)]
pub use payload::{parse_bodies, parse_grid, Body, ColorSpec, GridBatch, PayloadError};

pub mod scene;
#[doc(inline)]
pub use scene::{BodyVisual, Scene, SceneParams, Trace, UpdateSummary};

pub mod camera;
#[doc(inline)]
pub use camera::{OrbitCamera, Projection};

pub mod controls;
#[doc(inline)]
pub use controls::{ControlParams, OrbitControls};

pub mod transition;
#[doc(inline)]
pub use transition::Transition;

// re-exports of the math and color crates the public API is expressed in

pub use nalgebra as na;
pub use palette;
