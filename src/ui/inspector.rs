use std::collections::BTreeSet;

use winit::event::WindowEvent;
use winit::window::Window;

use crate::error::Result;
use crate::render_loop::RenderLoop;
use crate::renderer::WgpuBackend;
use crate::scene::FieldKind;

use super::{FrameStats, Profiler, SceneWindow, SettingsWindow};

/// egui overlay that edits the scene and settings of a running render loop.
///
/// Owned by the application and passed the loop explicitly each frame.
pub struct Inspector {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    scene_window: SceneWindow,
    settings_window: SettingsWindow,
    profiler: Profiler,
}

impl Inspector {
    pub fn new(window: &Window, backend: &WgpuBackend) -> Self {
        let ctx = egui::Context::default();
        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let renderer = egui_wgpu::Renderer::new(
            backend.context().device(),
            backend.surface_format(),
            egui_wgpu::RendererOptions::default(),
        );

        Self {
            ctx,
            state,
            renderer,
            scene_window: SceneWindow::new(),
            settings_window: SettingsWindow::new(),
            profiler: Profiler::new(),
        }
    }

    /// Returns true when egui wants the event for itself
    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Build the windows, paint them into the frame in flight and
    /// return the field kinds the user edited.
    pub fn run(
        &mut self,
        window: &Window,
        render_loop: &mut RenderLoop<WgpuBackend>,
    ) -> Result<BTreeSet<FieldKind>> {
        self.profiler.tick();

        let stats = FrameStats {
            total: render_loop.pipeline().total_frames(),
            accumulated: render_loop.pipeline().accumulated_frames(),
        };
        let mut touched = BTreeSet::new();

        let raw_input = self.state.take_egui_input(window);
        let full_output = {
            let (scene, settings) = render_loop.editable();
            let scene_window = &mut self.scene_window;
            let settings_window = &mut self.settings_window;
            let profiler = &mut self.profiler;
            self.ctx.run(raw_input, |ctx| {
                scene_window.show(ctx, scene, &mut touched);
                settings_window.show(ctx, settings, stats);
                profiler.show(ctx);
            })
        };

        self.state
            .handle_platform_output(window, full_output.platform_output);

        let pixels_per_point = self.ctx.pixels_per_point();
        let tris = self.ctx.tessellate(full_output.shapes, pixels_per_point);
        let renderer = &mut self.renderer;

        render_loop.backend_mut().overlay(|gpu, encoder, view, size| {
            let device = gpu.device();
            let queue = gpu.queue();
            for (id, image_delta) in &full_output.textures_delta.set {
                renderer.update_texture(device, queue, *id, image_delta);
            }

            let screen_descriptor = egui_wgpu::ScreenDescriptor {
                size_in_pixels: size,
                pixels_per_point,
            };
            renderer.update_buffers(device, queue, encoder, &tris, &screen_descriptor);

            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();
            renderer.render(&mut pass, &tris, &screen_descriptor);
        })?;

        for id in &full_output.textures_delta.free {
            self.renderer.free_texture(id);
        }

        Ok(touched)
    }
}
