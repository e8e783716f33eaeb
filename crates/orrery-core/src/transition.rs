//! Timed camera moves: focus-on-body and zoom-to-fit.
//!
//! A [`Transition`] owns everything about one move, and the view holds at
//! most one of them: starting a new transition replaces whatever was in
//! flight, so two moves can never race each other for the camera.

use nalgebra as na;

use crate::{camera::OrbitCamera, scene::Scene};

/// Seconds a focus transition takes.
pub const FOCUS_DURATION: f32 = 1.0;
/// Orbit distance a focus transition settles at.
pub const FOCUS_DISTANCE: f32 = 25.0;
/// Seconds a zoom-to-fit transition takes.
pub const FIT_DURATION: f32 = 0.5;
/// Multiplier on the scene's bounding radius for zoom-to-fit.
pub const FIT_DISTANCE_FACTOR: f32 = 2.5;
/// Smallest distance zoom-to-fit will settle at.
pub const FIT_MIN_DISTANCE: f32 = 5.0;

/// What the camera is moving toward.
#[derive(Clone, Copy, Debug, PartialEq)]
enum End {
    /// A tracked body; its position is re-read every frame
    /// so a moving body is tracked, not chased to a stale point.
    Body { id: u64, distance: f32 },
    /// A fixed point and distance.
    Point {
        target: na::Point3<f32>,
        distance: f32,
    },
}

/// An in-flight camera move.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    end: End,
    from_target: na::Point3<f32>,
    from_distance: f32,
    elapsed: f32,
    duration: f32,
}

impl Transition {
    /// Begin moving the camera to a tracked body.
    ///
    /// Returns `None` (and leaves the camera untouched) if `id` is not
    /// currently tracked.
    pub fn focus(id: u64, scene: &Scene, camera: &OrbitCamera) -> Option<Self> {
        scene.body_position(id)?;
        Some(Self {
            end: End::Body {
                id,
                distance: FOCUS_DISTANCE,
            },
            from_target: camera.target,
            from_distance: camera.distance,
            elapsed: 0.0,
            duration: FOCUS_DURATION,
        })
    }

    /// Begin framing the whole scene: the camera target moves to the
    /// bounding-sphere center and the distance to
    /// `radius ×` [`FIT_DISTANCE_FACTOR`], floored at [`FIT_MIN_DISTANCE`].
    ///
    /// Returns `None` if the scene is empty.
    pub fn fit(scene: &Scene, camera: &OrbitCamera) -> Option<Self> {
        let (center, radius) = scene.bounding_sphere()?;
        Some(Self {
            end: End::Point {
                target: center,
                distance: (radius * FIT_DISTANCE_FACTOR).max(FIT_MIN_DISTANCE),
            },
            from_target: camera.target,
            from_distance: camera.distance,
            elapsed: 0.0,
            duration: FIT_DURATION,
        })
    }

    /// Advance by `dt` seconds, moving the camera.
    ///
    /// Returns `true` once the move is complete (or its subject vanished);
    /// the owner drops the transition at that point.
    pub fn advance(&mut self, dt: f32, scene: &Scene, camera: &mut OrbitCamera) -> bool {
        self.elapsed += dt;
        let t = (self.elapsed / self.duration).min(1.0);

        let (end_target, end_distance) = match self.end {
            End::Body { id, distance } => match scene.body_position(id) {
                Some(position) => (position, distance),
                // the body was pruned mid-flight; settle where we are
                None => return true,
            },
            End::Point { target, distance } => (target, distance),
        };

        camera.target = na::Point3::from(self.from_target.coords.lerp(&end_target.coords, t));
        camera.distance = self.from_distance + (end_distance - self.from_distance) * t;
        t >= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        camera::Projection,
        payload::{Body, ColorSpec},
        scene::SceneParams,
    };
    use approx::assert_relative_eq;

    fn body(id: u64, pos: [f64; 3]) -> Body {
        Body {
            id,
            pos,
            color: ColorSpec::Packed(0xffffff),
            radius: 2.0,
        }
    }

    fn rig() -> (Scene, OrbitCamera) {
        (
            Scene::seed(
                SceneParams::default(),
                &[body(1, [100.0, 0.0, 0.0]), body(2, [-100.0, 0.0, 0.0])],
            ),
            OrbitCamera::new(na::Point3::origin(), 50.0, Projection::default()),
        )
    }

    #[test]
    fn focus_on_untracked_id_is_a_noop() {
        let (scene, camera) = rig();
        assert!(Transition::focus(999, &scene, &camera).is_none());
        // camera untouched by construction: focus takes it by shared reference
        assert_relative_eq!(camera.target, na::Point3::origin());
    }

    #[test]
    fn focus_lands_on_the_body() {
        let (scene, mut camera) = rig();
        let mut transition =
            Transition::focus(1, &scene, &camera).expect("body 1 is tracked");

        // halfway in wall-clock time is halfway in space
        assert!(!transition.advance(0.5, &scene, &mut camera));
        assert_relative_eq!(camera.target.x, 50.0, epsilon = 1e-4);

        assert!(transition.advance(0.5, &scene, &mut camera));
        assert_relative_eq!(camera.target, na::Point3::new(100.0, 0.0, 0.0));
        assert_relative_eq!(camera.distance, FOCUS_DISTANCE);
    }

    #[test]
    fn focus_tracks_a_moving_body() {
        let (mut scene, mut camera) = rig();
        let mut transition =
            Transition::focus(1, &scene, &camera).expect("body 1 is tracked");

        transition.advance(0.25, &scene, &mut camera);
        // the body moves mid-transition; the end point moves with it
        scene.apply_update(&[body(1, [200.0, 0.0, 0.0]), body(2, [-100.0, 0.0, 0.0])]);
        assert!(transition.advance(0.75, &scene, &mut camera));
        assert_relative_eq!(camera.target, na::Point3::new(200.0, 0.0, 0.0));
    }

    #[test]
    fn focus_ends_early_if_the_body_is_pruned() {
        let (mut scene, mut camera) = rig();
        let mut transition =
            Transition::focus(1, &scene, &camera).expect("body 1 is tracked");

        transition.advance(0.25, &scene, &mut camera);
        let target_before = camera.target;
        scene.apply_update(&[body(2, [-100.0, 0.0, 0.0])]);

        assert!(transition.advance(0.1, &scene, &mut camera));
        assert_relative_eq!(camera.target, target_before);
    }

    #[test]
    fn fit_frames_the_bounding_sphere() {
        let (scene, mut camera) = rig();
        let mut transition = Transition::fit(&scene, &camera).expect("scene is non-empty");

        assert!(transition.advance(FIT_DURATION, &scene, &mut camera));
        assert_relative_eq!(camera.target, na::Point3::origin());
        // bounding radius is 100 (farthest body) + 2 (its radius)
        assert_relative_eq!(camera.distance, 102.0 * FIT_DISTANCE_FACTOR);
    }

    #[test]
    fn fit_distance_is_floored() {
        let tiny = Body {
            radius: 0.5,
            ..body(1, [0.0, 0.0, 0.0])
        };
        let scene = Scene::seed(SceneParams::default(), &[tiny]);
        let camera = OrbitCamera::new(na::Point3::origin(), 50.0, Projection::default());
        let transition = Transition::fit(&scene, &camera).expect("scene is non-empty");

        let mut camera = camera;
        let mut transition = transition;
        assert!(transition.advance(FIT_DURATION, &scene, &mut camera));
        assert_relative_eq!(camera.distance, FIT_MIN_DISTANCE);
    }

    #[test]
    fn fit_on_an_empty_scene_is_a_noop() {
        let scene = Scene::new(SceneParams::default());
        let camera = OrbitCamera::new(na::Point3::origin(), 50.0, Projection::default());
        assert!(Transition::fit(&scene, &camera).is_none());
    }

    #[test]
    fn a_new_transition_supersedes_the_old_one() {
        let (scene, mut camera) = rig();
        // the view holds transitions in an Option; replacing it is the
        // cancellation mechanism
        let mut active = Transition::focus(1, &scene, &camera);

        active
            .as_mut()
            .expect("transition exists")
            .advance(0.25, &scene, &mut camera);
        active = Transition::focus(2, &scene, &camera);

        let mut transition = active.expect("body 2 is tracked");
        // the replacement starts from the camera state the old one left behind
        assert!(transition.advance(FOCUS_DURATION, &scene, &mut camera));
        assert_relative_eq!(camera.target, na::Point3::new(-100.0, 0.0, 0.0));
        assert_relative_eq!(camera.distance, FOCUS_DISTANCE);
    }
}
