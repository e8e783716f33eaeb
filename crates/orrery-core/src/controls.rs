//! Pointer-driven orbit controls with inertial damping,
//! plus the idle window that gates camera auto-follow.
//!
//! The controls are clock-free: the render loop feeds in elapsed frame time,
//! which keeps this module testable without a display.

use crate::camera::OrbitCamera;

/// Parameters for [`OrbitControls`].
#[derive(Clone, Copy, Debug)]
pub struct ControlParams {
    /// Radians of rotation per pixel of drag. Default: 0.008.
    pub rotate_speed: f32,
    /// Per-second exponential decay rate of rotation velocity after the
    /// pointer is released. Default: 8.0.
    pub damping: f32,
    /// Fraction of the orbit distance removed per wheel step. Default: 0.1.
    pub zoom_speed: f32,
    /// Seconds after the last input before auto-follow resumes,
    /// so auto-centering never fights manual input. Default: 2.0.
    pub idle_delay: f32,
    /// Per-second rate at which the camera target eases toward the scene
    /// centroid while auto-following. Default: 2.0.
    pub follow_rate: f32,
}

impl Default for ControlParams {
    fn default() -> Self {
        Self {
            rotate_speed: 0.008,
            damping: 8.0,
            zoom_speed: 0.1,
            idle_delay: 2.0,
            follow_rate: 2.0,
        }
    }
}

/// Accumulates pointer input between frames and applies it to the camera
/// once per frame.
#[derive(Clone, Copy, Debug)]
pub struct OrbitControls {
    params: ControlParams,
    dragging: bool,
    // drag input accumulated since the last frame, in radians
    pending_yaw: f32,
    pending_pitch: f32,
    // velocity carried past pointer release for the inertial glide
    yaw_velocity: f32,
    pitch_velocity: f32,
    // wheel steps accumulated since the last frame
    pending_zoom: f32,
    idle_time: f32,
}

impl OrbitControls {
    /// Create controls with the given parameters.
    pub fn new(params: ControlParams) -> Self {
        Self {
            params,
            dragging: false,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
            pending_zoom: 0.0,
            idle_time: 0.0,
        }
    }

    /// The primary pointer button went down.
    pub fn pointer_pressed(&mut self) {
        self.dragging = true;
        self.yaw_velocity = 0.0;
        self.pitch_velocity = 0.0;
        self.idle_time = 0.0;
    }

    /// The primary pointer button was released.
    pub fn pointer_released(&mut self) {
        self.dragging = false;
        self.idle_time = 0.0;
    }

    /// The pointer moved by `(dx, dy)` pixels.
    /// Only accumulates rotation while dragging.
    pub fn pointer_moved(&mut self, dx: f32, dy: f32) {
        if !self.dragging {
            return;
        }
        self.pending_yaw -= dx * self.params.rotate_speed;
        self.pending_pitch += dy * self.params.rotate_speed;
        self.idle_time = 0.0;
    }

    /// The wheel scrolled by `steps` (positive away from the user).
    pub fn wheel(&mut self, steps: f32) {
        self.pending_zoom += steps;
        self.idle_time = 0.0;
    }

    /// Whether a drag is in progress.
    pub fn dragging(&self) -> bool {
        self.dragging
    }

    /// Apply accumulated input to the camera and decay the glide velocity.
    /// Called once per frame with the elapsed frame time in seconds.
    pub fn update(&mut self, dt: f32, camera: &mut OrbitCamera) {
        if dt <= 0.0 {
            return;
        }

        if self.pending_yaw != 0.0 || self.pending_pitch != 0.0 {
            camera.orbit(self.pending_yaw, self.pending_pitch);
            self.yaw_velocity = self.pending_yaw / dt;
            self.pitch_velocity = self.pending_pitch / dt;
            self.pending_yaw = 0.0;
            self.pending_pitch = 0.0;
        } else if !self.dragging {
            camera.orbit(self.yaw_velocity * dt, self.pitch_velocity * dt);
            let decay = (-self.params.damping * dt).exp();
            self.yaw_velocity *= decay;
            self.pitch_velocity *= decay;
        }

        if self.pending_zoom != 0.0 {
            camera.zoom((1.0 - self.params.zoom_speed).powf(self.pending_zoom));
            self.pending_zoom = 0.0;
        }

        self.idle_time += dt;
    }

    /// Whether enough idle time has passed for auto-follow to act.
    pub fn auto_follow_ready(&self) -> bool {
        !self.dragging && self.idle_time >= self.params.idle_delay
    }

    /// Ease the camera target toward `centroid` by one frame's worth
    /// of follow motion.
    pub fn follow(&self, dt: f32, camera: &mut OrbitCamera, centroid: nalgebra::Point3<f32>) {
        let t = 1.0 - (-self.params.follow_rate * dt).exp();
        camera.target = nalgebra::Point3::from(camera.target.coords.lerp(&centroid.coords, t));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{OrbitCamera, Projection};
    use approx::assert_relative_eq;
    use nalgebra as na;

    fn rig() -> (OrbitControls, OrbitCamera) {
        (
            OrbitControls::new(ControlParams::default()),
            OrbitCamera::new(na::Point3::origin(), 10.0, Projection::default()),
        )
    }

    #[test]
    fn drag_rotates_the_camera() {
        let (mut controls, mut camera) = rig();
        let yaw_before = camera.yaw;

        controls.pointer_pressed();
        controls.pointer_moved(-100.0, 0.0);
        controls.update(1.0 / 60.0, &mut camera);

        assert_relative_eq!(camera.yaw - yaw_before, 0.8, epsilon = 1e-5);
    }

    #[test]
    fn movement_without_drag_is_ignored() {
        let (mut controls, mut camera) = rig();
        let yaw_before = camera.yaw;

        controls.pointer_moved(-100.0, 0.0);
        controls.update(1.0 / 60.0, &mut camera);

        assert_relative_eq!(camera.yaw, yaw_before);
    }

    #[test]
    fn glide_decays_after_release() {
        let (mut controls, mut camera) = rig();
        controls.pointer_pressed();
        controls.pointer_moved(-100.0, 0.0);
        controls.update(1.0 / 60.0, &mut camera);
        controls.pointer_released();

        // the camera keeps moving right after release...
        let before_glide = camera.yaw;
        controls.update(1.0 / 60.0, &mut camera);
        assert!(camera.yaw != before_glide, "glide should carry momentum");

        // ...but the glide must die out
        for _ in 0..600 {
            controls.update(1.0 / 60.0, &mut camera);
        }
        let resting = camera.yaw;
        controls.update(1.0 / 60.0, &mut camera);
        assert_relative_eq!(camera.yaw, resting, epsilon = 1e-3);
    }

    #[test]
    fn wheel_zooms_in() {
        let (mut controls, mut camera) = rig();
        controls.wheel(1.0);
        controls.update(1.0 / 60.0, &mut camera);
        assert_relative_eq!(camera.distance, 9.0);
    }

    #[test]
    fn auto_follow_waits_for_the_idle_delay() {
        let (mut controls, mut camera) = rig();
        controls.pointer_pressed();
        controls.pointer_released();

        controls.update(1.0, &mut camera);
        assert!(!controls.auto_follow_ready(), "only 1 s idle");

        controls.update(1.5, &mut camera);
        assert!(controls.auto_follow_ready(), "2.5 s idle");

        // any input resets the window
        controls.wheel(1.0);
        assert!(!controls.auto_follow_ready());
    }

    #[test]
    fn auto_follow_is_off_while_dragging() {
        let (mut controls, mut camera) = rig();
        controls.update(3.0, &mut camera);
        assert!(controls.auto_follow_ready());
        controls.pointer_pressed();
        assert!(!controls.auto_follow_ready());
    }

    #[test]
    fn follow_eases_toward_the_centroid() {
        let (controls, mut camera) = rig();
        let centroid = na::Point3::new(10.0, 0.0, 0.0);

        controls.follow(0.1, &mut camera, centroid);
        let first = camera.target.x;
        assert!(first > 0.0 && first < 10.0);

        for _ in 0..200 {
            controls.follow(0.1, &mut camera, centroid);
        }
        assert_relative_eq!(camera.target.x, 10.0, epsilon = 1e-3);
    }
}
