use glam::{Mat4, Vec2, Vec3, Vec4};
use primer_assets::{GeometryKind, Instances, Lesson, LessonAssets};
use primer_common::{MovementIntent, SurfaceSize};
use primer_render::FlyCamera;
use primer_render_wgpu::{FrameData, SceneUniforms};

/// Advance of the quad lesson's offset phase, per frame rather than per second.
const PHASE_STEP: f32 = 0.01;

/// Spin rate for lessons overridden to `Instances::Spinning`, degrees per second.
const SPIN_DEGREES_PER_SECOND: f32 = 50.0;
const SPIN_AXIS: Vec3 = Vec3::new(0.5, 1.0, 0.0);

/// Where the lighting lesson's point light sits.
const LIGHT_POSITION: Vec3 = Vec3::new(1.2, 1.0, 2.0);

const CUBE_POSITIONS: [Vec3; 10] = [
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(2.0, 5.0, -15.0),
    Vec3::new(-1.5, -2.2, -2.5),
    Vec3::new(-3.8, -2.0, -12.3),
    Vec3::new(2.4, -0.4, -3.5),
    Vec3::new(-1.7, 3.0, -7.5),
    Vec3::new(1.3, -2.0, -2.5),
    Vec3::new(1.5, 2.0, -2.5),
    Vec3::new(1.5, 0.2, -1.5),
    Vec3::new(-1.3, 1.0, -1.5),
];

/// Per-lesson animation state and the fly camera.
pub struct Scene {
    lesson: Lesson,
    instances: Instances,
    perspective: bool,
    camera_enabled: bool,
    pub camera: FlyCamera,
    phase: f32,
    elapsed: f32,
    models: Vec<Mat4>,
}

impl Scene {
    pub fn new(lesson: Lesson, assets: &LessonAssets) -> Self {
        let mut scene = Self {
            lesson,
            instances: assets.instances,
            perspective: matches!(assets.geometry, GeometryKind::Cube | GeometryKind::LitCube),
            camera_enabled: assets.camera,
            camera: FlyCamera::default(),
            phase: 0.0,
            elapsed: 0.0,
            models: Vec::new(),
        };
        scene.rebuild_models();
        scene
    }

    pub fn lesson(&self) -> Lesson {
        self.lesson
    }

    pub fn camera_enabled(&self) -> bool {
        self.camera_enabled
    }

    pub fn models(&self) -> &[Mat4] {
        &self.models
    }

    /// Step animation and, for camera lessons, the fly camera.
    pub fn update(&mut self, intent: MovementIntent, dt: f32, look: Vec2) {
        if self.camera_enabled {
            self.camera.update(intent, dt, look);
        }
        self.elapsed += dt;
        self.phase += PHASE_STEP;
        self.rebuild_models();
    }

    fn rebuild_models(&mut self) {
        self.models.clear();
        match self.instances {
            // The cube lesson's rotation angle is fixed at zero.
            Instances::Single => self.models.push(Mat4::IDENTITY),
            Instances::Spinning => {
                let angle = (self.elapsed * SPIN_DEGREES_PER_SECOND).to_radians();
                self.models
                    .push(Mat4::from_axis_angle(SPIN_AXIS.normalize(), angle));
            }
            Instances::Scattered => {
                let axis = Vec3::new(1.0, 0.3, 0.5).normalize();
                self.models.extend(CUBE_POSITIONS.iter().enumerate().map(|(i, &position)| {
                    let angle = (20.0 * i as f32).to_radians();
                    Mat4::from_translation(position) * Mat4::from_axis_angle(axis, angle)
                }));
            }
        }
    }

    fn uniforms(&self, surface: SurfaceSize) -> SceneUniforms {
        let offset = Vec4::new(self.phase.sin(), self.phase.cos(), self.elapsed, 0.0);
        if self.camera_enabled {
            return SceneUniforms::new(
                self.camera.view_matrix(),
                self.camera.projection_matrix(surface),
            )
            .with_light(LIGHT_POSITION, self.camera.position)
            .with_params(offset);
        }
        if !self.perspective {
            return SceneUniforms::default().with_params(offset);
        }
        // Fixed camera three units back from the origin.
        let view = Mat4::from_translation(Vec3::new(0.0, 0.0, -3.0));
        let proj = self.camera.projection_matrix(surface);
        SceneUniforms::new(view, proj)
            .with_light(LIGHT_POSITION, Vec3::new(0.0, 0.0, 3.0))
            .with_params(offset)
    }

    pub fn frame(&self, surface: SurfaceSize) -> FrameData<'_> {
        FrameData {
            uniforms: self.uniforms(surface),
            instances: self.models(),
            clear: wgpu::Color::BLACK,
        }
    }
}
