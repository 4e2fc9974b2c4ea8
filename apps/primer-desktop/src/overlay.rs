use primer_assets::Lesson;
use primer_render::FlyCamera;

/// Values shown in the debug overlay for one frame.
pub struct OverlayStats<'a> {
    pub lesson: Lesson,
    pub gpu: &'a str,
    pub frame_seconds: f32,
    pub reloads: u32,
    pub camera: Option<&'a FlyCamera>,
}

/// F1-toggled side panel with frame and camera readouts.
pub struct Overlay {
    visible: bool,
}

impl Default for Overlay {
    fn default() -> Self {
        Self::new()
    }
}

impl Overlay {
    pub fn new() -> Self {
        Self { visible: true }
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn draw(&self, ctx: &egui::Context, stats: &OverlayStats<'_>) {
        if !self.visible {
            return;
        }

        egui::SidePanel::left("lesson_overlay")
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.heading(format!("Lesson: {}", stats.lesson));
                ui.label(stats.gpu);
                ui.separator();
                ui.label(format!(
                    "Frame: {:.2} ms ({:.0} fps)",
                    stats.frame_seconds * 1000.0,
                    1.0 / stats.frame_seconds.max(f32::EPSILON)
                ));
                ui.label(format!("Shader reloads: {}", stats.reloads));

                if let Some(camera) = stats.camera {
                    ui.separator();
                    ui.heading("Camera");
                    let p = camera.position;
                    ui.label(format!("Position: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z));
                    ui.label(format!("Yaw: {:.1}  Pitch: {:.1}", camera.yaw(), camera.pitch()));
                    ui.separator();
                    ui.small("WASD: Move | Space/Shift: Up/Down | RMB: Look");
                }

                ui.separator();
                ui.small("F1: Toggle Overlay | Esc: Quit");
                ui.small("Edit the .wgsl files to hot reload");
            });
    }
}
