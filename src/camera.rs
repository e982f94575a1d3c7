// Perspective camera and damped orbit controller
//
// The camera is a plain viewing transform. OrbitControls accumulates user
// input (rotate, pan, zoom) and bleeds it into the camera a fraction at a
// time on every update, which produces inertial movement that settles once
// input stops.

use crate::picking::Ray;
use glam::{Mat4, Vec2, Vec3};
use std::f32::consts::PI;
use std::time::Duration;

/// Fraction of pending input applied per reference step
pub const DAMPING_FACTOR: f32 = 0.05;

/// Update rate the damping factor is calibrated against
const DAMPING_REFERENCE_HZ: f32 = 60.0;

/// Closest the camera may orbit to its target
pub const MIN_DISTANCE: f32 = 2.0;

/// Farthest the camera may orbit from its target
pub const MAX_DISTANCE: f32 = 80.0;

/// Per-step zoom multiplier (one wheel notch)
const ZOOM_STEP: f32 = 0.95;

/// Keeps the polar angle away from the poles so look-at stays defined
const PHI_MARGIN: f32 = 1e-3;

/// Pending input below this magnitude is dropped
const SETTLE_EPSILON: f32 = 1e-4;

// ============================================================================
// Viewport size
// ============================================================================

/// Size of the drawing surface in pixel-like units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
}

impl ViewportSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width over height, or 1.0 for a degenerate surface
    pub fn aspect(&self) -> f32 {
        if self.width <= 0.0 || self.height <= 0.0 {
            1.0
        } else {
            self.width / self.height
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

// ============================================================================
// Camera
// ============================================================================

/// Point projected into normalized device coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    /// Position in the [-1, 1] device range (y up)
    pub ndc: Vec2,
    /// Distance in front of the camera along its view axis
    pub depth: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(position: Vec3, target: Vec3, fov_y_degrees: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            target,
            fov_y_degrees,
            aspect: 1.0,
            near,
            far,
        }
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(
            self.fov_y_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        )
    }

    /// Tangent of half the vertical field of view
    pub fn half_fov_tan(&self) -> f32 {
        (self.fov_y_degrees.to_radians() * 0.5).tan()
    }

    /// Unit vectors (right, up) of the camera frame in world space
    pub fn basis(&self) -> (Vec3, Vec3) {
        let forward = (self.target - self.position).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward);
        (right, up)
    }

    /// Project a world point; None when it lies behind the near plane
    pub fn project(&self, world: Vec3) -> Option<Projected> {
        let view = self.view_matrix().transform_point3(world);
        let depth = -view.z;
        if depth <= self.near {
            return None;
        }
        let ndc = self.projection_matrix().project_point3(view);
        Some(Projected {
            ndc: ndc.truncate(),
            depth,
        })
    }

    /// Ray from the camera through a point in device coordinates
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inverse = (self.projection_matrix() * self.view_matrix()).inverse();
        // GL convention: the near plane sits at ndc z = -1
        let on_near_plane = inverse.project_point3(ndc.extend(-1.0));
        Ray {
            origin: self.position,
            direction: (on_near_plane - self.position).normalize(),
        }
    }

    /// Radius in device units of a sphere of `radius` seen at `depth`
    pub fn projected_radius(&self, radius: f32, depth: f32) -> f32 {
        if depth <= 0.0 {
            return 0.0;
        }
        radius / (depth * self.half_fov_tan())
    }
}

// ============================================================================
// Orbit controls
// ============================================================================

/// Spherical coordinates around the orbit target (y up)
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    theta: f32,
    phi: f32,
}

impl Spherical {
    fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self {
                radius,
                theta: 0.0,
                phi: 0.0,
            };
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let ring = self.phi.sin() * self.radius;
        Vec3::new(
            ring * self.theta.sin(),
            self.phi.cos() * self.radius,
            ring * self.theta.cos(),
        )
    }
}

/// Damped orbit/pan/zoom interaction for a Camera
#[derive(Debug, Clone)]
pub struct OrbitControls {
    damping: f32,
    home_position: Vec3,
    home_target: Vec3,
    delta_theta: f32,
    delta_phi: f32,
    pan_offset: Vec3,
    scale: f32,
}

impl OrbitControls {
    /// Controls orbiting the camera's current target; the current pose
    /// becomes the reset pose
    pub fn new(camera: &Camera, damping: f32) -> Self {
        Self {
            damping: damping.clamp(f32::EPSILON, 1.0),
            home_position: camera.position,
            home_target: camera.target,
            delta_theta: 0.0,
            delta_phi: 0.0,
            pan_offset: Vec3::ZERO,
            scale: 1.0,
        }
    }

    /// Queue an orbit from a pointer drag of (dx, dy) pixels
    pub fn rotate(&mut self, dx: f32, dy: f32, viewport: ViewportSize) {
        let height = viewport.height.max(1.0);
        self.delta_theta -= 2.0 * PI * dx / height;
        self.delta_phi -= 2.0 * PI * dy / height;
    }

    /// Queue a pan from a pointer drag of (dx, dy) pixels
    pub fn pan(&mut self, dx: f32, dy: f32, viewport: ViewportSize, camera: &Camera) {
        let height = viewport.height.max(1.0);
        let target_distance = (camera.position - camera.target).length() * camera.half_fov_tan();
        let (right, up) = camera.basis();

        self.pan_offset -= right * (2.0 * dx * target_distance / height);
        self.pan_offset += up * (2.0 * dy * target_distance / height);
    }

    /// Zoom by wheel notches; positive moves closer
    pub fn zoom(&mut self, notches: f32) {
        self.scale *= ZOOM_STEP.powf(notches);
    }

    /// Share of pending input left over after `dt`
    ///
    /// The damping factor applies once per reference step, so the decay
    /// over a second is the same whatever the frame rate.
    fn retained_after(&self, dt: Duration) -> f32 {
        (1.0 - self.damping).powf(dt.as_secs_f32() * DAMPING_REFERENCE_HZ)
    }

    /// Apply the damped share of pending input for a frame `dt` long
    ///
    /// Returns true if the camera moved.
    pub fn update(&mut self, camera: &mut Camera, dt: Duration) -> bool {
        if self.is_settled() {
            return false;
        }
        let before = (camera.position, camera.target);
        let keep = self.retained_after(dt);
        let applied = 1.0 - keep;

        let mut spherical = Spherical::from_offset(camera.position - camera.target);
        spherical.theta += self.delta_theta * applied;
        spherical.phi = (spherical.phi + self.delta_phi * applied)
            .clamp(PHI_MARGIN, PI - PHI_MARGIN);
        spherical.radius = (spherical.radius * self.scale).clamp(MIN_DISTANCE, MAX_DISTANCE);

        camera.target += self.pan_offset * applied;
        camera.position = camera.target + spherical.to_offset();

        self.delta_theta = settle(self.delta_theta * keep);
        self.delta_phi = settle(self.delta_phi * keep);
        self.pan_offset *= keep;
        if self.pan_offset.length() < SETTLE_EPSILON {
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        before.0.distance(camera.position) > SETTLE_EPSILON
            || before.1.distance(camera.target) > SETTLE_EPSILON
    }

    /// True once no pending input remains
    pub fn is_settled(&self) -> bool {
        self.delta_theta == 0.0
            && self.delta_phi == 0.0
            && self.pan_offset == Vec3::ZERO
            && self.scale == 1.0
    }

    /// Return the camera to its starting pose and drop pending input
    pub fn reset(&mut self, camera: &mut Camera) {
        camera.position = self.home_position;
        camera.target = self.home_target;
        self.delta_theta = 0.0;
        self.delta_phi = 0.0;
        self.pan_offset = Vec3::ZERO;
        self.scale = 1.0;
    }
}

fn settle(value: f32) -> f32 {
    if value.abs() < SETTLE_EPSILON {
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE_STEP: Duration = Duration::from_nanos(1_000_000_000 / 60);

    fn default_camera() -> Camera {
        let mut camera = Camera::new(Vec3::new(10.0, 10.0, 10.0), Vec3::ZERO, 75.0, 0.1, 1000.0);
        camera.set_aspect(16.0 / 9.0);
        camera
    }

    #[test]
    fn test_target_projects_to_center() {
        let camera = default_camera();
        let projected = camera.project(Vec3::ZERO).unwrap();
        assert!(projected.ndc.length() < 1e-5);
        assert!((projected.depth - 300f32.sqrt()).abs() < 1e-3);
    }

    #[test]
    fn test_point_behind_camera_not_projected() {
        let camera = default_camera();
        assert!(camera.project(Vec3::new(20.0, 20.0, 20.0)).is_none());
    }

    #[test]
    fn test_ray_passes_through_projected_point() {
        let camera = default_camera();
        let point = Vec3::new(-3.0, 2.0, 0.0);
        let projected = camera.project(point).unwrap();
        let ray = camera.ray_from_ndc(projected.ndc);

        // Distance from the point to the ray line
        let to_point = point - ray.origin;
        let along = to_point.dot(ray.direction);
        let closest = ray.origin + ray.direction * along;
        assert!(closest.distance(point) < 1e-3);
        assert!(along > 0.0);
    }

    #[test]
    fn test_aspect_of_degenerate_viewport() {
        assert_eq!(ViewportSize::new(100.0, 0.0).aspect(), 1.0);
        assert_eq!(ViewportSize::new(200.0, 100.0).aspect(), 2.0);
        assert!(ViewportSize::new(0.0, 10.0).is_empty());
    }

    #[test]
    fn test_set_aspect_ignores_invalid() {
        let mut camera = default_camera();
        camera.set_aspect(0.0);
        camera.set_aspect(f32::NAN);
        assert_eq!(camera.aspect, 16.0 / 9.0);
    }

    #[test]
    fn test_first_update_applies_damped_fraction() {
        let mut camera = default_camera();
        let mut controls = OrbitControls::new(&camera, DAMPING_FACTOR);
        let start = Spherical::from_offset(camera.position - camera.target);
        let viewport = ViewportSize::new(200.0, 100.0);

        controls.rotate(10.0, 0.0, viewport);
        let requested = -2.0 * PI * 10.0 / 100.0;
        assert!(controls.update(&mut camera, REFERENCE_STEP));

        let after = Spherical::from_offset(camera.position - camera.target);
        let applied = after.theta - start.theta;
        assert!((applied - requested * DAMPING_FACTOR).abs() < 1e-4);
    }

    #[test]
    fn test_rotation_mostly_applied_within_a_second_at_30fps() {
        let mut camera = default_camera();
        let mut controls = OrbitControls::new(&camera, DAMPING_FACTOR);
        let start = Spherical::from_offset(camera.position - camera.target);

        controls.rotate(10.0, 0.0, ViewportSize::new(100.0, 56.0));
        let requested = -2.0 * PI * 10.0 / 56.0;

        let frame = Duration::from_secs(1) / 30;
        for _ in 0..30 {
            controls.update(&mut camera, frame);
        }

        let after = Spherical::from_offset(camera.position - camera.target);
        let applied = (after.theta - start.theta) / requested;
        assert!(applied >= 0.95, "only {applied} applied after one second");
        assert!(applied <= 1.0);
    }

    #[test]
    fn test_decay_is_independent_of_frame_rate() {
        let viewport = ViewportSize::new(100.0, 100.0);
        let mut slow_camera = default_camera();
        let mut fast_camera = default_camera();
        let mut slow = OrbitControls::new(&slow_camera, DAMPING_FACTOR);
        let mut fast = OrbitControls::new(&fast_camera, DAMPING_FACTOR);
        slow.rotate(5.0, 0.0, viewport);
        fast.rotate(5.0, 0.0, viewport);

        for _ in 0..15 {
            slow.update(&mut slow_camera, Duration::from_secs(1) / 15);
        }
        for _ in 0..60 {
            fast.update(&mut fast_camera, REFERENCE_STEP);
        }

        assert!(slow_camera.position.distance(fast_camera.position) < 1e-2);
    }

    #[test]
    fn test_rotation_settles_to_requested_angle() {
        let mut camera = default_camera();
        let mut controls = OrbitControls::new(&camera, DAMPING_FACTOR);
        let start = Spherical::from_offset(camera.position - camera.target);

        controls.rotate(5.0, 0.0, ViewportSize::new(100.0, 100.0));
        let requested = -2.0 * PI * 5.0 / 100.0;

        let mut updates = 0;
        while !controls.is_settled() {
            controls.update(&mut camera, REFERENCE_STEP);
            updates += 1;
            assert!(updates < 1000, "controls never settled");
        }

        let after = Spherical::from_offset(camera.position - camera.target);
        assert!((after.theta - start.theta - requested).abs() < 0.01);
        // Distance from target is untouched by rotation
        assert!((after.radius - start.radius).abs() < 1e-3);
        assert!(!controls.update(&mut camera, REFERENCE_STEP));
    }

    #[test]
    fn test_polar_angle_is_clamped() {
        let mut camera = default_camera();
        let mut controls = OrbitControls::new(&camera, 1.0);
        controls.rotate(0.0, -10_000.0, ViewportSize::new(100.0, 100.0));
        controls.update(&mut camera, REFERENCE_STEP);

        assert!(camera.position.is_finite());
        let (right, _) = camera.basis();
        assert!(right.length() > 0.5);
    }

    #[test]
    fn test_zoom_changes_distance_within_limits() {
        let mut camera = default_camera();
        let mut controls = OrbitControls::new(&camera, DAMPING_FACTOR);
        let start = camera.position.length();

        controls.zoom(1.0);
        controls.update(&mut camera, REFERENCE_STEP);
        assert!((camera.position.length() - start * ZOOM_STEP).abs() < 1e-3);

        controls.zoom(500.0);
        controls.update(&mut camera, REFERENCE_STEP);
        assert!((camera.position.length() - MIN_DISTANCE).abs() < 1e-3);

        controls.zoom(-500.0);
        controls.update(&mut camera, REFERENCE_STEP);
        assert!((camera.position.length() - MAX_DISTANCE).abs() < 1e-2);
    }

    #[test]
    fn test_pan_moves_target_and_reset_restores() {
        let mut camera = default_camera();
        let mut controls = OrbitControls::new(&camera, DAMPING_FACTOR);
        let viewport = ViewportSize::new(100.0, 100.0);

        controls.pan(10.0, 0.0, viewport, &camera);
        for _ in 0..10 {
            controls.update(&mut camera, REFERENCE_STEP);
        }
        assert!(camera.target.length() > 0.0);

        // Dragging right pulls the scene right, so the target moves left
        let (right, _) = camera.basis();
        assert!(camera.target.dot(right) < 0.0);

        controls.reset(&mut camera);
        assert_eq!(camera.target, Vec3::ZERO);
        assert_eq!(camera.position, Vec3::new(10.0, 10.0, 10.0));
        assert!(controls.is_settled());
    }
}
