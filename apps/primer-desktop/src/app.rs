use crate::overlay::{Overlay, OverlayStats};
use crate::scene::Scene;
use anyhow::{Context as _, Result};
use primer_assets::{Lesson, LessonAssets};
use primer_common::SurfaceSize;
use primer_input::{FrameSignal, InputState};
use primer_render_wgpu::{GpuContext, LessonRenderer};
use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{DeviceEvent, DeviceId, ElementState, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::window::{CursorGrabMode, Window, WindowId};

pub const WINDOW_TITLE: &str = "Learning Project";
pub const WINDOW_SIZE: SurfaceSize = SurfaceSize {
    width: 1280,
    height: 720,
};
const WINDOW_POSITION: PhysicalPosition<i32> = PhysicalPosition::new(200, 200);

/// Everything that exists only once the window is up.
struct Gpu {
    window: Arc<Window>,
    context: GpuContext,
    renderer: LessonRenderer,
    version: String,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn paint_overlay(
        &mut self,
        egui_ctx: &egui::Context,
        view: &wgpu::TextureView,
        run_ui: impl FnMut(&egui::Context),
    ) {
        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = egui_ctx.run(raw_input, run_ui);
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.context.config.width, self.context.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let device = &self.context.device;
        let queue = &self.context.queue;
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui_encoder"),
        });
        self.egui_renderer.update_buffers(
            device,
            queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }

    fn set_capture(&self, capture: bool) {
        self.window.set_cursor_visible(!capture);
        let grab = if capture {
            self.window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined))
        } else {
            self.window.set_cursor_grab(CursorGrabMode::None)
        };
        if let Err(e) = grab {
            tracing::debug!("cursor grab unavailable: {e}");
        }
    }
}

/// Button releases always reach the input state, so look capture ends even
/// when the button comes up over an egui panel.
fn reaches_input_when_consumed(event: &WindowEvent) -> bool {
    matches!(
        event,
        WindowEvent::MouseInput {
            state: ElementState::Released,
            ..
        }
    )
}

/// The windowed lesson runner.
pub struct LessonApp {
    assets: LessonAssets,
    input: InputState,
    scene: Scene,
    overlay: Overlay,
    egui_ctx: egui::Context,
    gpu: Option<Gpu>,
    last_frame: Instant,
    frame_seconds: f32,
    fatal: Option<anyhow::Error>,
}

impl LessonApp {
    /// `assets` must have paths resolved against the assets root.
    pub fn new(lesson: Lesson, assets: LessonAssets) -> Self {
        Self {
            scene: Scene::new(lesson, &assets),
            assets,
            input: InputState::new(WINDOW_SIZE),
            overlay: Overlay::new(),
            egui_ctx: egui::Context::default(),
            gpu: None,
            last_frame: Instant::now(),
            frame_seconds: 0.0,
            fatal: None,
        }
    }

    /// The error that stopped the event loop, if any.
    pub fn take_fatal(&mut self) -> Option<anyhow::Error> {
        self.fatal.take()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        tracing::error!("{err:#}");
        self.fatal = Some(err);
        event_loop.exit();
    }

    fn init_gpu(&self, event_loop: &ActiveEventLoop) -> Result<Gpu> {
        let attrs = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(PhysicalSize::new(WINDOW_SIZE.width, WINDOW_SIZE.height))
            .with_position(WINDOW_POSITION);
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let size = window.inner_size();
        let surface = SurfaceSize::new(size.width, size.height);
        let context = GpuContext::new(window.clone(), surface)?;
        let version = context.version();
        tracing::info!("GPU version: {version}");

        let renderer = LessonRenderer::new(
            &context.device,
            &context.queue,
            context.format(),
            surface,
            &self.assets,
        )
        .with_context(|| format!("failed to load lesson '{}'", self.scene.lesson()))?;

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer =
            egui_wgpu::Renderer::new(&context.device, context.format(), None, 1, false);

        Ok(Gpu {
            window,
            context,
            renderer,
            version,
            egui_winit,
            egui_renderer,
        })
    }

    fn handle_signal(&mut self, event_loop: &ActiveEventLoop, signal: FrameSignal) {
        match signal {
            FrameSignal::Quit => event_loop.exit(),
            FrameSignal::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.context.resize(size);
                    gpu.renderer.resize(&gpu.context.device, size);
                }
            }
            FrameSignal::Capture(capture) => {
                if let Some(gpu) = &self.gpu {
                    gpu.set_capture(capture);
                }
            }
            FrameSignal::ToggleOverlay => self.overlay.toggle(),
        }
    }

    /// Input, camera, draw, present, then the shader change check.
    fn redraw(&mut self) -> Result<()> {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32().min(0.1);
        self.last_frame = now;
        self.frame_seconds = dt;

        let intent = self.input.intent();
        let look = self.input.take_look_delta();
        self.scene.update(intent, dt, look);

        let Some(gpu) = &mut self.gpu else {
            return Ok(());
        };
        let Some(output) = gpu.context.acquire()? else {
            return Ok(());
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let frame = self.scene.frame(self.input.surface());
        gpu.renderer
            .render(&gpu.context.device, &gpu.context.queue, &view, &frame);

        if self.overlay.visible() {
            let version = gpu.version.clone();
            let stats = OverlayStats {
                lesson: self.scene.lesson(),
                gpu: &version,
                frame_seconds: self.frame_seconds,
                reloads: gpu.renderer.reload_count(),
                camera: self
                    .scene
                    .camera_enabled()
                    .then_some(&self.scene.camera),
            };
            let overlay = &self.overlay;
            gpu.paint_overlay(&self.egui_ctx, &view, |ctx| overlay.draw(ctx, &stats));
        }

        output.present();
        gpu.renderer.check_shaders(&gpu.context.device)?;
        gpu.window.request_redraw();
        Ok(())
    }
}

impl ApplicationHandler for LessonApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match self.init_gpu(event_loop) {
            Ok(gpu) => {
                let size = gpu.window.inner_size();
                self.input.resize(size.width, size.height);
                self.gpu = Some(gpu);
                self.last_frame = Instant::now();
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed && !reaches_input_when_consumed(&event) {
                return;
            }
        }

        if let Some(signal) = self.input.on_window_event(&event) {
            self.handle_signal(event_loop, signal);
        }

        if let WindowEvent::RedrawRequested = event {
            if let Err(err) = self.redraw() {
                self.fail(event_loop, err);
            }
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.input.on_mouse_motion(delta.0, delta.1);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}
