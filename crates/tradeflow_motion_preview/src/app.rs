// SPDX-License-Identifier: MIT OR Apache-2.0
//! Preview window setup and event loop.

use crate::log_panel::{LogPanel, TracingEvent};
use crate::stage::{Stage, TouchPhase};
use egui_wgpu::wgpu;
use std::sync::{mpsc, Arc};
use std::time::Instant;
use thiserror::Error;
use tradeflow_motion_scroll::{ConfigError, SequenceConfig};
use winit::application::ApplicationHandler;
use winit::event::{MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

/// CSS pixels per wheel line
const LINE_HEIGHT: f32 = 40.0;

/// Longest frame step fed to the animation clock
const MAX_FRAME_DT: f32 = 0.1;

/// Preview application errors
#[derive(Debug, Error)]
pub enum PreviewError {
    /// Window creation failed
    #[error("Failed to create window: {0}")]
    WindowCreation(String),

    /// Renderer initialization failed
    #[error("Failed to initialize renderer: {0}")]
    RendererInit(String),

    /// Event loop error
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// Motion config could not be loaded
    #[error("Motion config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for preview operations
pub type Result<T> = std::result::Result<T, PreviewError>;

/// Convert a winit wheel delta to CSS pixels, positive scrolling down
pub fn wheel_delta_y(delta: MouseScrollDelta, scale_factor: f64) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y * LINE_HEIGHT,
        MouseScrollDelta::PixelDelta(position) => -position.to_logical::<f32>(scale_factor).y,
    }
}

/// Graphics state for wgpu rendering
struct GraphicsState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    egui_renderer: egui_wgpu::Renderer,
}

impl GraphicsState {
    fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .map_err(|e| PreviewError::RendererInit(e.to_string()))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| PreviewError::RendererInit("no suitable GPU adapter".to_string()))?;

        tracing::info!("Using GPU: {}", adapter.get_info().name);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Motion Preview Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            },
            None,
        ))
        .map_err(|e| PreviewError::RendererInit(e.to_string()))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(wgpu::TextureFormat::is_srgb)
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| PreviewError::RendererInit("surface has no formats".to_string()))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            egui_renderer,
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    fn render(
        &mut self,
        egui_ctx: &egui::Context,
        full_output: egui::FullOutput,
        window: &Window,
    ) -> std::result::Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Preview Encoder"),
        });

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: window.scale_factor() as f32,
        };

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer.update_texture(&self.device, &self.queue, *id, image_delta);
        }

        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Preview Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color {
                                r: 0.04,
                                g: 0.05,
                                b: 0.08,
                                a: 1.0,
                            }),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                .forget_lifetime();

            self.egui_renderer.render(&mut render_pass, &paint_jobs, &screen_descriptor);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        Ok(())
    }
}

/// Running state of the preview
struct PreviewRunning {
    window: Arc<Window>,
    graphics: GraphicsState,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    stage: Stage,
    log: LogPanel,
    last_frame: Instant,
}

impl PreviewRunning {
    /// Forward wheel and touch input to the sequence. Returns `true` when
    /// the controller captured the event.
    fn capture_input(&self, event: &WindowEvent) -> bool {
        let scale_factor = self.window.scale_factor();
        match event {
            WindowEvent::MouseWheel { delta, .. } => self
                .stage
                .on_wheel(wheel_delta_y(*delta, scale_factor))
                .prevents_default(),
            WindowEvent::Touch(touch) => {
                let phase = match touch.phase {
                    winit::event::TouchPhase::Started => TouchPhase::Start,
                    winit::event::TouchPhase::Moved => TouchPhase::Move,
                    winit::event::TouchPhase::Ended | winit::event::TouchPhase::Cancelled => {
                        TouchPhase::End
                    }
                };
                let y = touch.location.to_logical::<f32>(scale_factor).y;
                self.stage.on_touch(phase, y).prevents_default()
            }
            _ => false,
        }
    }
}

/// Motion preview application
pub struct PreviewApp {
    config: SequenceConfig,
    tracing_rx: Option<mpsc::Receiver<TracingEvent>>,
    running: Option<PreviewRunning>,
    failure: Option<PreviewError>,
}

impl PreviewApp {
    /// Create the application
    pub fn new(config: SequenceConfig, tracing_rx: Option<mpsc::Receiver<TracingEvent>>) -> Self {
        Self {
            config,
            tracing_rx,
            running: None,
            failure: None,
        }
    }

    /// Run the preview until the window closes
    pub fn run(
        config: SequenceConfig,
        tracing_rx: Option<mpsc::Receiver<TracingEvent>>,
    ) -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = PreviewApp::new(config, tracing_rx);
        event_loop.run_app(&mut app)?;

        match app.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<PreviewRunning> {
        tracing::info!("Creating preview window...");

        let window_attrs = Window::default_attributes()
            .with_title("Tradeflow Motion Preview")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 800))
            .with_min_inner_size(winit::dpi::LogicalSize::new(640, 480));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .map_err(|e| PreviewError::WindowCreation(e.to_string()))?,
        );

        let graphics = GraphicsState::new(window.clone())?;
        let egui_ctx = egui::Context::default();
        egui_ctx.set_visuals(egui::Visuals::dark());

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            &window,
            Some(window.scale_factor() as f32),
            None,
            Some(2 * 1024),
        );

        let stage = Stage::new(self.config.clone());
        let log = LogPanel::new(self.tracing_rx.take());

        tracing::info!("Window size: {:?}", window.inner_size());

        Ok(PreviewRunning {
            window,
            graphics,
            egui_ctx,
            egui_state,
            stage,
            log,
            last_frame: Instant::now(),
        })
    }
}

impl ApplicationHandler for PreviewApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }

        match self.start(event_loop) {
            Ok(running) => self.running = Some(running),
            Err(err) => {
                tracing::error!("{err}");
                self.failure = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(running) = &mut self.running else {
            return;
        };

        // The sequence sees scroll input before egui does.
        if running.capture_input(&event) {
            return;
        }

        let response = running.egui_state.on_window_event(&running.window, &event);
        if response.consumed {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Close requested, exiting...");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                tracing::debug!("Window resized to {:?}", new_size);
                running.graphics.resize(new_size);
                let logical = new_size.to_logical::<f32>(running.window.scale_factor());
                running.stage.on_resize(logical.width, logical.height);
                running.window.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = now
                    .duration_since(running.last_frame)
                    .as_secs_f32()
                    .min(MAX_FRAME_DT);
                running.last_frame = now;
                running.stage.tick(dt);

                let raw_input = running.egui_state.take_egui_input(&running.window);
                let full_output = running.egui_ctx.run(raw_input, |ctx| {
                    running.log.ui(ctx);
                    running.stage.ui(ctx);
                });

                running
                    .egui_state
                    .handle_platform_output(&running.window, full_output.platform_output.clone());

                match running.graphics.render(&running.egui_ctx, full_output, &running.window) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = running.window.inner_size();
                        running.graphics.resize(size);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        tracing::error!("Out of GPU memory!");
                        event_loop.exit();
                    }
                    Err(wgpu::SurfaceError::Timeout) => {
                        tracing::warn!("Surface timeout");
                    }
                }

                running.window.request_redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(running) = &self.running {
            running.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Dropping the stage unmounts the controller.
        self.running = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn test_wheel_lines_scroll_down() {
        assert_eq!(wheel_delta_y(MouseScrollDelta::LineDelta(0.0, -3.0), 1.0), 120.0);
        assert_eq!(wheel_delta_y(MouseScrollDelta::LineDelta(0.0, 1.0), 2.0), -40.0);
    }

    #[test]
    fn test_wheel_pixels_are_logical() {
        let delta = MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -90.0));
        assert_eq!(wheel_delta_y(delta, 2.0), 45.0);
    }

    #[test]
    fn test_config_error_converts() {
        let err = SequenceConfig::from_ron("(crossfade_overlap: 2.0)").unwrap_err();
        let err = PreviewError::from(err);
        assert!(err.to_string().starts_with("Motion config error"));
    }
}
