use crate::settings::{AccumulationMode, SettingsState, BOUNCES_RANGE, SAMPLES_RANGE};

/// Frame counters shown next to the accumulation selector
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStats {
    pub total: u64,
    pub accumulated: u32,
}

#[derive(Debug)]
pub struct SettingsWindow {
    open: bool,
}

impl Default for SettingsWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsWindow {
    pub fn new() -> Self {
        Self { open: true }
    }

    pub fn show(&mut self, ctx: &egui::Context, settings: &mut SettingsState, stats: FrameStats) {
        egui::Window::new("Render Settings")
            .open(&mut self.open)
            .default_pos(egui::pos2(290.0, 10.0))
            .resizable(false)
            .show(ctx, |ui| {
                let label = format!("View: {} (V)", settings.view.label());
                if ui.button(label).clicked() {
                    settings.view = settings.view.flipped();
                }

                let mut samples = settings.samples;
                if ui
                    .add(egui::Slider::new(&mut samples, SAMPLES_RANGE.0..=SAMPLES_RANGE.1).text("SPP"))
                    .changed()
                {
                    settings.set_samples(samples);
                }
                let mut bounces = settings.bounces;
                if ui
                    .add(egui::Slider::new(&mut bounces, BOUNCES_RANGE.0..=BOUNCES_RANGE.1).text("Bounces"))
                    .changed()
                {
                    settings.set_bounces(bounces);
                }

                ui.separator();
                egui::ComboBox::from_label("Accumulation (T)")
                    .selected_text(settings.accumulation.label())
                    .show_ui(ui, |ui| {
                        for mode in AccumulationMode::ALL {
                            ui.selectable_value(&mut settings.accumulation, mode, mode.label());
                        }
                    });
                if settings.accumulation.is_active() {
                    ui.label(format!("Accumulated frames: {}", stats.accumulated));
                }
                ui.label(
                    egui::RichText::new(format!("Frame {}", stats.total))
                        .small()
                        .color(egui::Color32::GRAY),
                );
            });
    }
}
