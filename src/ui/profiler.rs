use crate::core::clock::Clock;

const GRAPH_SIZE: egui::Vec2 = egui::vec2(220.0, 50.0);
const FPS_COLOR: egui::Color32 = egui::Color32::from_rgb(74, 158, 255);
const FRAME_TIME_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 170, 60);

/// FPS and frame-time history
#[derive(Debug)]
pub struct Profiler {
    clock: Clock,
    open: bool,
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Profiler {
    pub fn new() -> Self {
        Self {
            clock: Clock::new(),
            open: true,
        }
    }

    /// Call once per presented frame
    pub fn tick(&mut self) -> f32 {
        self.clock.tick()
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn show(&mut self, ctx: &egui::Context) {
        let clock = &self.clock;
        egui::Window::new("Profiling")
            .open(&mut self.open)
            .default_pos(egui::pos2(290.0, 200.0))
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new(format!("{:.0}", clock.fps()))
                        .size(32.0)
                        .color(FPS_COLOR),
                );
                ui.label(egui::RichText::new("FPS").size(12.0).color(egui::Color32::GRAY));
                let fps: Vec<f32> = clock
                    .frame_times()
                    .map(|dt| if dt > 0.0 { 1.0 / dt } else { 0.0 })
                    .collect();
                graph(ui, &fps, FPS_COLOR);

                let frame_ms = clock.last_frame_time().unwrap_or(0.0) * 1000.0;
                ui.label(format!("Frame time: {frame_ms:.2} ms"));
                let times: Vec<f32> = clock.frame_times().map(|dt| dt * 1000.0).collect();
                graph(ui, &times, FRAME_TIME_COLOR);
            });
    }
}

fn graph(ui: &mut egui::Ui, values: &[f32], color: egui::Color32) {
    let (response, painter) = ui.allocate_painter(GRAPH_SIZE, egui::Sense::hover());
    let rect = response.rect;
    painter.rect_filled(rect, 2.0, egui::Color32::from_black_alpha(120));

    let max = values.iter().copied().fold(f32::EPSILON, f32::max);
    if values.len() < 2 {
        return;
    }
    let step = rect.width() / (values.len() - 1) as f32;
    let points: Vec<egui::Pos2> = values
        .iter()
        .enumerate()
        .map(|(i, v)| egui::pos2(rect.left() + i as f32 * step, rect.bottom() - v / max * rect.height()))
        .collect();
    painter.add(egui::Shape::line(points, egui::Stroke::new(1.0, color)));
}
