use glam::{Mat4, Vec2, Vec3};
use primer_common::{MovementIntent, SurfaceSize};

/// Pitch never reaches ±90°, where forward and world-up become parallel.
pub const MAX_PITCH: f32 = 89.9;

/// First-person fly camera. Angles are in degrees.
///
/// Yaw 0 / pitch 0 looks down +X. The forward/right/up basis is derived from
/// yaw and pitch on every [`FlyCamera::update`] and is always orthonormal.
#[derive(Debug, Clone)]
pub struct FlyCamera {
    pub position: Vec3,
    pub world_up: Vec3,
    yaw: f32,
    pitch: f32,
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    /// World units per second.
    pub speed: f32,
    /// Degrees per unit of raw mouse motion.
    pub sensitivity: f32,
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for FlyCamera {
    fn default() -> Self {
        // Yaw 270 looks down -Z, towards the origin from +Z.
        Self::new(Vec3::new(0.0, 0.0, 3.0), 270.0, 0.0)
    }
}

impl FlyCamera {
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            world_up: Vec3::Y,
            yaw: wrap_yaw(yaw),
            pitch: pitch.clamp(-MAX_PITCH, MAX_PITCH),
            forward: Vec3::X,
            right: Vec3::Z,
            up: Vec3::Y,
            speed: 2.5,
            sensitivity: 0.1,
            fov: 45.0,
            near: 0.1,
            far: 100.0,
        };
        camera.update_basis();
        camera
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Advance one frame: translate with the current basis, then rotate by the
    /// mouse delta and rebuild the basis.
    pub fn update(&mut self, intent: MovementIntent, dt: f32, mouse_delta: Vec2) {
        self.translate(intent, dt);
        self.rotate(mouse_delta.x, mouse_delta.y);
    }

    /// Move along the Y-flattened forward, right and world-up vectors.
    ///
    /// Looking up or down never changes altitude; only the up intent does.
    pub fn translate(&mut self, intent: MovementIntent, dt: f32) {
        if intent.is_idle() {
            return;
        }
        let flat_forward = Vec3::new(self.forward.x, 0.0, self.forward.z).normalize_or_zero();
        let weights = intent.weights();
        let step = self.speed * dt;
        self.position += flat_forward * (weights.x * step)
            + self.right * (weights.y * step)
            + self.world_up * (weights.z * step);
    }

    /// Add scaled mouse deltas to yaw and pitch. Positive `dy` looks up.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw = wrap_yaw(self.yaw + dx * self.sensitivity);
        self.pitch = (self.pitch + dy * self.sensitivity).clamp(-MAX_PITCH, MAX_PITCH);
        self.update_basis();
    }

    fn update_basis(&mut self) {
        let (yaw_sin, yaw_cos) = self.yaw.to_radians().sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.to_radians().sin_cos();
        self.forward = Vec3::new(yaw_cos * pitch_cos, pitch_sin, yaw_sin * pitch_cos).normalize();
        self.right = self.forward.cross(self.world_up).normalize();
        self.up = self.right.cross(self.forward).normalize();
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward, self.up)
    }

    pub fn projection_matrix(&self, surface: SurfaceSize) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), surface.aspect(), self.near, self.far)
    }
}

fn wrap_yaw(yaw: f32) -> f32 {
    let wrapped = yaw.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use primer_common::Axis;

    const EPS: f32 = 1e-4;

    fn assert_orthonormal(cam: &FlyCamera) {
        let (f, r, u) = (cam.forward(), cam.right(), cam.up());
        for v in [f, r, u] {
            assert!((v.length() - 1.0).abs() < EPS, "not unit length: {v}");
        }
        assert!(f.dot(r).abs() < EPS);
        assert!(f.dot(u).abs() < EPS);
        assert!(r.dot(u).abs() < EPS);
    }

    #[test]
    fn zero_angles_look_down_x() {
        let cam = FlyCamera::new(Vec3::ZERO, 0.0, 0.0);
        assert!(cam.forward().abs_diff_eq(Vec3::X, EPS));
        assert!(cam.up().abs_diff_eq(Vec3::Y, EPS));
    }

    #[test]
    fn default_looks_down_negative_z() {
        let cam = FlyCamera::default();
        assert!(cam.forward().abs_diff_eq(Vec3::NEG_Z, EPS));
    }

    #[test]
    fn basis_is_orthonormal_for_any_angles() {
        let mut yaw = 0.0;
        while yaw < 360.0 {
            let mut pitch = -MAX_PITCH;
            while pitch <= MAX_PITCH {
                assert_orthonormal(&FlyCamera::new(Vec3::ZERO, yaw, pitch));
                pitch += 7.3;
            }
            yaw += 11.7;
        }
    }

    #[test]
    fn yaw_wraps_past_360() {
        let mut cam = FlyCamera::new(Vec3::ZERO, 359.0, 0.0);
        cam.sensitivity = 1.0;
        cam.rotate(2.0, 0.0);
        assert!((cam.yaw() - 1.0).abs() < EPS, "yaw = {}", cam.yaw());
    }

    #[test]
    fn yaw_wraps_below_zero() {
        let mut cam = FlyCamera::new(Vec3::ZERO, 1.0, 0.0);
        cam.sensitivity = 1.0;
        cam.rotate(-2.0, 0.0);
        assert!((cam.yaw() - 359.0).abs() < EPS, "yaw = {}", cam.yaw());
    }

    #[test]
    fn pitch_clamps_below_90() {
        let mut cam = FlyCamera::new(Vec3::ZERO, 0.0, 80.0);
        cam.sensitivity = 1.0;
        cam.rotate(0.0, 45.0);
        assert_eq!(cam.pitch(), MAX_PITCH);
        assert!(cam.pitch() < 90.0);
        assert_orthonormal(&cam);

        cam.rotate(0.0, -500.0);
        assert_eq!(cam.pitch(), -MAX_PITCH);
        assert_orthonormal(&cam);
    }

    #[test]
    fn idle_intent_keeps_position() {
        let mut cam = FlyCamera::default();
        let start = cam.position;
        cam.update(MovementIntent::NONE, 0.5, Vec2::ZERO);
        assert_eq!(cam.position, start);
    }

    #[test]
    fn forward_moves_speed_units_per_second_on_the_ground_plane() {
        let mut cam = FlyCamera::new(Vec3::ZERO, 30.0, 60.0);
        cam.speed = 4.0;
        let intent = MovementIntent::new(Axis::Positive, Axis::Zero, Axis::Zero);
        cam.translate(intent, 1.0);
        assert!((cam.position.length() - 4.0).abs() < EPS);
        assert!(cam.position.y.abs() < EPS);

        let flat = Vec3::new(cam.forward().x, 0.0, cam.forward().z).normalize();
        assert!(cam.position.normalize().abs_diff_eq(flat, EPS));
    }

    #[test]
    fn strafe_and_climb() {
        let mut cam = FlyCamera::new(Vec3::ZERO, 0.0, 0.0);
        cam.speed = 1.0;
        cam.translate(MovementIntent::new(Axis::Zero, Axis::Positive, Axis::Positive), 1.0);
        // Looking down +X, right is +Z.
        assert!(cam.position.abs_diff_eq(Vec3::new(0.0, 1.0, 1.0), EPS));
    }

    #[test]
    fn translate_uses_basis_from_before_rotation() {
        let mut cam = FlyCamera::new(Vec3::ZERO, 0.0, 0.0);
        cam.speed = 1.0;
        cam.sensitivity = 1.0;
        let intent = MovementIntent::new(Axis::Positive, Axis::Zero, Axis::Zero);
        cam.update(intent, 1.0, Vec2::new(90.0, 0.0));
        assert!(cam.position.abs_diff_eq(Vec3::X, EPS));
        assert!((cam.yaw() - 90.0).abs() < EPS);
    }

    #[test]
    fn view_matrix_maps_target_onto_negative_z() {
        let cam = FlyCamera::default();
        let target = cam.position + cam.forward() * 2.0;
        let in_view = cam.view_matrix().transform_point3(target);
        assert!(in_view.abs_diff_eq(Vec3::new(0.0, 0.0, -2.0), EPS));
    }

    #[test]
    fn projection_is_finite() {
        let cam = FlyCamera::default();
        let proj = cam.projection_matrix(SurfaceSize::default());
        assert!(proj.is_finite());
    }
}
