use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowId};

use crate::cli::Cli;
use crate::core::controller::Controller;
use crate::core::input_adapter::WinitController;
use crate::error::Result;
use crate::render_loop::{RenderLoop, TickControl};
use crate::renderer::WgpuBackend;
use crate::scene::ScenePool;
use crate::settings::SettingsState;
use crate::ui::Inspector;

/// winit application: owns the window, the render loop and the optional inspector
pub struct App {
    cli: Cli,
    startup: Option<(ScenePool, SettingsState)>,
    window: Option<Arc<Window>>,
    controller: WinitController,
    render_loop: Option<RenderLoop<WgpuBackend>>,
    inspector: Option<Inspector>,
    failure: Option<anyhow::Error>,
}

impl App {
    pub fn new(cli: Cli, scene: ScenePool, settings: SettingsState) -> Self {
        Self {
            cli,
            startup: Some((scene, settings)),
            window: None,
            controller: WinitController::new(),
            render_loop: None,
            inspector: None,
            failure: None,
        }
    }

    /// The error that stopped the event loop, if any
    pub fn take_failure(&mut self) -> Option<anyhow::Error> {
        self.failure.take()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{error:#}");
        self.failure = Some(error);
        event_loop.exit();
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window = Arc::new(
            event_loop.create_window(
                Window::default_attributes()
                    .with_title("Path Tracer")
                    .with_inner_size(winit::dpi::PhysicalSize::new(self.cli.width, self.cli.height)),
            )?,
        );

        let backend = pollster::block_on(WgpuBackend::new(window.clone()))?;
        let inspector = (!self.cli.no_ui).then(|| Inspector::new(&window, &backend));
        let (scene, settings) = self.startup.take().unwrap_or_default();
        let render_loop = RenderLoop::new(backend, scene, settings)?;

        self.window = Some(window);
        self.render_loop = Some(render_loop);
        self.inspector = inspector;
        Ok(())
    }

    fn redraw(&mut self, window: &Window) -> Result<TickControl> {
        let Some(render_loop) = self.render_loop.as_mut() else {
            return Ok(TickControl::Continue);
        };

        if render_loop.update(self.controller.snapshot()) == TickControl::Exit {
            return Ok(TickControl::Exit);
        }
        render_loop.draw()?;
        if let Some(inspector) = self.inspector.as_mut() {
            let touched = inspector.run(window, render_loop)?;
            render_loop.request_sync(touched);
        }
        render_loop.present()?;
        Ok(TickControl::Continue)
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.initialize(event_loop) {
                self.fail(event_loop, e.context("failed to initialize renderer"));
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };

        // Let egui handle the event first; releases still reach the controller
        if let Some(inspector) = self.inspector.as_mut() {
            if inspector.handle_event(&window, &event) && !is_release(&event) {
                return;
            }
        }
        self.controller.process_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("window close requested");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(render_loop) = self.render_loop.as_mut() {
                    render_loop.backend_mut().resize(size.width, size.height);
                    render_loop.resized(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => match self.redraw(&window) {
                Ok(TickControl::Continue) => {}
                Ok(TickControl::Exit) => event_loop.exit(),
                Err(e) => self.fail(event_loop, anyhow::Error::new(e).context("render tick failed")),
            },
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn is_release(event: &WindowEvent) -> bool {
    match event {
        WindowEvent::KeyboardInput { event, .. } => event.state == ElementState::Released,
        WindowEvent::MouseInput { state, .. } => *state == ElementState::Released,
        _ => false,
    }
}
