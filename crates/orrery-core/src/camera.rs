//! The orbit camera used to look at the simulation.

use nalgebra as na;

/// Pitch is clamped just short of the poles to keep the view basis stable.
pub const PITCH_LIMIT: f32 = 1.55;

/// A camera orbiting a target point in 3D space.
///
/// The camera always looks at [`target`][Self::target]; its position is
/// derived from the spherical coordinates `yaw`, `pitch` and `distance`.
/// Both user controls and programmatic transitions move the camera by
/// mutating these fields, so the two can never disagree about where the
/// camera is.
#[derive(Clone, Copy, Debug)]
pub struct OrbitCamera {
    /// The point being orbited and looked at.
    pub target: na::Point3<f32>,
    /// Rotation around the world `+Y` axis, in radians.
    pub yaw: f32,
    /// Elevation above the horizontal plane, in radians.
    /// Clamped to ±[`PITCH_LIMIT`].
    pub pitch: f32,
    /// Distance from the target, clamped to `distance_range`.
    pub distance: f32,
    /// Smallest and largest allowed orbit distance.
    pub distance_range: (f32, f32),
    /// How the camera projects the world onto the screen.
    pub projection: Projection,
}

/// A perspective projection.
#[derive(Clone, Copy, Debug)]
pub struct Projection {
    /// Vertical field of view in radians. Default: 75°.
    pub fov_y: f32,
    /// Near clipping plane. Default: 0.1.
    pub z_near: f32,
    /// Far clipping plane. Default: 1000.
    pub z_far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_y: 75.0_f32.to_radians(),
            z_near: 0.1,
            z_far: 1000.0,
        }
    }
}

impl OrbitCamera {
    /// Create a camera orbiting `target` from the given distance,
    /// slightly elevated so the ground grid reads as a plane.
    pub fn new(target: na::Point3<f32>, distance: f32, projection: Projection) -> Self {
        let mut camera = Self {
            target,
            yaw: 0.0,
            pitch: 0.4,
            distance: 1.0,
            distance_range: (0.5, 2000.0),
            projection,
        };
        camera.distance = camera.clamp_distance(distance);
        camera
    }

    /// The camera's position in world space.
    pub fn position(&self) -> na::Point3<f32> {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let offset = na::Vector3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw);
        self.target + offset * self.distance
    }

    /// Rotate around the target. Pitch is clamped short of the poles.
    pub fn orbit(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.yaw = (self.yaw + yaw_delta).rem_euclid(std::f32::consts::TAU);
        self.pitch = (self.pitch + pitch_delta).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Scale the orbit distance, clamped to `distance_range`.
    pub fn zoom(&mut self, factor: f32) {
        self.distance = self.clamp_distance(self.distance * factor);
    }

    /// Clamp a distance to `distance_range`.
    pub fn clamp_distance(&self, distance: f32) -> f32 {
        distance.clamp(self.distance_range.0, self.distance_range.1)
    }

    /// World-to-camera transform.
    pub fn view_matrix(&self) -> na::Matrix4<f32> {
        na::Isometry3::look_at_rh(&self.position(), &self.target, &na::Vector3::y())
            .to_homogeneous()
    }

    /// Combined world-to-clip transform for the given viewport,
    /// uploaded once per frame as part of the frame uniforms.
    pub fn view_projection_matrix(&self, viewport_size: (u32, u32)) -> na::Matrix4<f32> {
        let aspect = viewport_size.0.max(1) as f32 / viewport_size.1.max(1) as f32;
        let proj = na::Perspective3::new(
            aspect,
            self.projection.fov_y,
            self.projection.z_near,
            self.projection.z_far,
        );
        proj.to_homogeneous() * self.view_matrix()
    }

    /// Camera-to-world rotation, used for billboarding:
    /// columns are the camera's right, up and backward axes in world space.
    pub fn basis(&self) -> na::Matrix3<f32> {
        na::Isometry3::look_at_rh(&self.position(), &self.target, &na::Vector3::y())
            .rotation
            .inverse()
            .to_rotation_matrix()
            .into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera() -> OrbitCamera {
        OrbitCamera::new(na::Point3::origin(), 10.0, Projection::default())
    }

    #[test]
    fn position_keeps_the_orbit_distance() {
        let mut camera = camera();
        for _ in 0..17 {
            camera.orbit(0.31, 0.07);
            assert_relative_eq!(
                (camera.position() - camera.target).norm(),
                camera.distance,
                epsilon = 1e-4
            );
        }
    }

    #[test]
    fn pitch_clamps_short_of_the_poles() {
        let mut camera = camera();
        camera.orbit(0.0, 100.0);
        assert_relative_eq!(camera.pitch, PITCH_LIMIT);
        camera.orbit(0.0, -200.0);
        assert_relative_eq!(camera.pitch, -PITCH_LIMIT);
    }

    #[test]
    fn zoom_clamps_to_the_distance_range() {
        let mut camera = camera();
        camera.zoom(1e-9);
        assert_relative_eq!(camera.distance, camera.distance_range.0);
        camera.zoom(1e9);
        assert_relative_eq!(camera.distance, camera.distance_range.1);
    }

    #[test]
    fn view_matrix_centers_the_camera() {
        let camera = camera();
        let eye = camera.position();
        let in_view = camera.view_matrix().transform_point(&eye);
        assert_relative_eq!(in_view, na::Point3::origin(), epsilon = 1e-4);
    }

    #[test]
    fn target_projects_in_front_of_the_camera() {
        let camera = camera();
        let clip = camera.view_projection_matrix((800, 600))
            * camera.target.coords.push(1.0);
        // -z is the view direction, so the target lands inside the frustum
        assert!(clip.w > 0.0);
        let ndc = clip / clip.w;
        assert_relative_eq!(ndc.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(ndc.y, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn basis_backward_axis_points_from_target_to_camera() {
        let camera = camera();
        let backward = camera.basis().column(2).into_owned();
        let expected = (camera.position() - camera.target).normalize();
        assert_relative_eq!(backward, expected, epsilon = 1e-4);
    }
}
