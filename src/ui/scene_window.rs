use std::collections::BTreeSet;

use glam::{Vec3, Vec4};

use crate::scene::{FieldKind, ScenePool, Sphere, MAX_LIGHT_INTENSITY};

/// Per-sphere transform and material editor
#[derive(Debug)]
pub struct SceneWindow {
    open: bool,
}

impl Default for SceneWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneWindow {
    pub fn new() -> Self {
        Self { open: true }
    }

    /// Draw the window and collect every field kind the user changed
    pub fn show(&mut self, ctx: &egui::Context, scene: &mut ScenePool, touched: &mut BTreeSet<FieldKind>) {
        egui::Window::new("Scene Settings")
            .open(&mut self.open)
            .default_pos(egui::pos2(10.0, 10.0))
            .default_width(260.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for (index, sphere) in scene.objects_mut().iter_mut().enumerate() {
                        egui::CollapsingHeader::new(sphere.id.as_str())
                            .id_salt(index)
                            .show(ui, |ui| sphere_editor(ui, sphere, touched));
                    }
                });
            });
    }
}

fn sphere_editor(ui: &mut egui::Ui, sphere: &mut Sphere, touched: &mut BTreeSet<FieldKind>) {
    ui.horizontal(|ui| {
        ui.label("Position");
        if vec3_drag(ui, &mut sphere.position) {
            touched.insert(FieldKind::Position);
        }
    });
    ui.horizontal(|ui| {
        ui.label("Radius");
        let response = ui.add(
            egui::DragValue::new(&mut sphere.radius)
                .speed(0.05)
                .range(0.01..=1000.0),
        );
        if response.changed() {
            touched.insert(FieldKind::Radius);
        }
    });

    ui.separator();
    let material = &mut sphere.material;

    ui.horizontal(|ui| {
        ui.label("Diffuse");
        if rgba_edit(ui, &mut material.diffuse) {
            touched.insert(FieldKind::DiffuseColor);
        }
        ui.label("Specular");
        if rgba_edit(ui, &mut material.specular_color) {
            touched.insert(FieldKind::SpecularColor);
        }
    });

    let mut smoothness = material.smoothness();
    if ui.add(egui::Slider::new(&mut smoothness, 0.0..=1.0).text("Smoothness")).changed() {
        material.set_smoothness(smoothness);
        touched.insert(FieldKind::Smoothness);
    }
    let mut gloss = material.gloss();
    if ui.add(egui::Slider::new(&mut gloss, 0.0..=1.0).text("Gloss")).changed() {
        material.set_gloss(gloss);
        touched.insert(FieldKind::Gloss);
    }

    ui.horizontal(|ui| {
        ui.label("Light");
        let mut rgb = material.light_color.to_array();
        if ui.color_edit_button_rgb(&mut rgb).changed() {
            material.light_color = Vec3::from_array(rgb);
            touched.insert(FieldKind::LightColor);
        }
    });
    let mut intensity = material.light_intensity();
    if ui
        .add(egui::Slider::new(&mut intensity, 0.0..=MAX_LIGHT_INTENSITY).text("Intensity"))
        .changed()
    {
        material.set_light_intensity(intensity);
        touched.insert(FieldKind::LightIntensity);
    }
}

fn vec3_drag(ui: &mut egui::Ui, value: &mut Vec3) -> bool {
    let mut changed = false;
    for component in [&mut value.x, &mut value.y, &mut value.z] {
        changed |= ui.add(egui::DragValue::new(component).speed(0.05)).changed();
    }
    changed
}

fn rgba_edit(ui: &mut egui::Ui, value: &mut Vec4) -> bool {
    let mut rgba = value.to_array();
    let changed = ui.color_edit_button_rgba_unmultiplied(&mut rgba).changed();
    if changed {
        *value = Vec4::from_array(rgba);
    }
    changed
}
