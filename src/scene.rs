use std::fmt;
use std::path::Path;
use std::str::FromStr;

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::core::params::{ParamKind, ParamValue, ParameterTable};
use crate::error::{Error, Result};
use crate::settings::SettingsState;

pub const MAX_SPHERES: usize = 10;
pub const MAX_LIGHT_INTENSITY: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub diffuse: Vec4,
    pub specular_color: Vec4,
    pub light_color: Vec3,
    smoothness: f32,
    gloss: f32,
    light_intensity: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse: Vec4::new(0.0, 0.0, 0.0, 1.0),
            specular_color: Vec4::ONE,
            light_color: Vec3::ZERO,
            smoothness: 0.0,
            gloss: 0.0,
            light_intensity: 0.0,
        }
    }
}

impl Material {
    pub fn smoothness(&self) -> f32 {
        self.smoothness
    }

    pub fn gloss(&self) -> f32 {
        self.gloss
    }

    pub fn light_intensity(&self) -> f32 {
        self.light_intensity
    }

    pub fn set_smoothness(&mut self, value: f32) {
        self.smoothness = value.clamp(0.0, 1.0);
    }

    /// Probability that a bounce takes the specular lobe
    pub fn set_gloss(&mut self, value: f32) {
        self.gloss = value.clamp(0.0, 1.0);
    }

    pub fn set_light_intensity(&mut self, value: f32) {
        self.light_intensity = value.clamp(0.0, MAX_LIGHT_INTENSITY);
    }

    fn clamped(mut self) -> Self {
        self.set_smoothness(self.smoothness);
        self.set_gloss(self.gloss);
        self.set_light_intensity(self.light_intensity);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub id: String,
    pub position: Vec3,
    pub radius: f32,
    #[serde(default)]
    pub material: Material,
}

impl Sphere {
    /// Diffuse sphere with a white specular colour
    pub fn diffuse(id: &str, position: Vec3, radius: f32, color: Vec4, smoothness: f32, gloss: f32) -> Self {
        Self::with_specular(id, position, radius, color, Vec4::ONE, smoothness, gloss)
    }

    pub fn with_specular(
        id: &str,
        position: Vec3,
        radius: f32,
        color: Vec4,
        specular_color: Vec4,
        smoothness: f32,
        gloss: f32,
    ) -> Self {
        let mut material = Material {
            diffuse: color,
            specular_color,
            ..Material::default()
        };
        material.set_smoothness(smoothness);
        material.set_gloss(gloss);
        Self {
            id: id.to_string(),
            position,
            radius,
            material,
        }
    }

    /// Emissive sphere; diffuse and specular colours are black
    pub fn light(id: &str, position: Vec3, radius: f32, color: Vec3, intensity: f32) -> Self {
        let mut material = Material {
            diffuse: Vec4::new(0.0, 0.0, 0.0, 1.0),
            specular_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            light_color: color,
            ..Material::default()
        };
        material.set_light_intensity(intensity);
        Self {
            id: id.to_string(),
            position,
            radius,
            material,
        }
    }
}

/// One per-object field the path-trace program receives as a parallel array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldKind {
    Position,
    Radius,
    DiffuseColor,
    SpecularColor,
    LightColor,
    Smoothness,
    Gloss,
    LightIntensity,
}

impl FieldKind {
    pub const ALL: [FieldKind; 8] = [
        FieldKind::Position,
        FieldKind::Radius,
        FieldKind::DiffuseColor,
        FieldKind::SpecularColor,
        FieldKind::LightColor,
        FieldKind::Smoothness,
        FieldKind::Gloss,
        FieldKind::LightIntensity,
    ];

    fn entry(self) -> &'static FieldBinding {
        // FIELD_BINDINGS is laid out in ALL order
        &FIELD_BINDINGS[self as usize]
    }

    pub fn binding(self) -> &'static str {
        self.entry().name
    }

    pub fn param_kind(self) -> ParamKind {
        match self.entry().extract {
            Extract::Float(_) => ParamKind::FloatArray,
            Extract::Vec3(_) => ParamKind::Vec3Array,
            Extract::Vec4(_) => ParamKind::Vec4Array,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binding())
    }
}

impl FromStr for FieldKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        FIELD_BINDINGS
            .iter()
            .find(|b| b.name == s)
            .map(|b| b.kind)
            .ok_or_else(|| Error::UnknownField(s.to_string()))
    }
}

impl TryFrom<u32> for FieldKind {
    type Error = Error;

    fn try_from(index: u32) -> Result<Self> {
        FieldKind::ALL
            .get(index as usize)
            .copied()
            .ok_or_else(|| Error::UnknownField(index.to_string()))
    }
}

enum Extract {
    Float(fn(&Sphere) -> f32),
    Vec3(fn(&Sphere) -> Vec3),
    Vec4(fn(&Sphere) -> Vec4),
}

struct FieldBinding {
    kind: FieldKind,
    name: &'static str,
    extract: Extract,
}

fn position(s: &Sphere) -> Vec3 {
    s.position
}

fn radius(s: &Sphere) -> f32 {
    s.radius
}

fn diffuse(s: &Sphere) -> Vec4 {
    s.material.diffuse
}

fn specular_color(s: &Sphere) -> Vec4 {
    s.material.specular_color
}

fn light_color(s: &Sphere) -> Vec3 {
    s.material.light_color
}

fn smoothness(s: &Sphere) -> f32 {
    s.material.smoothness()
}

fn gloss(s: &Sphere) -> f32 {
    s.material.gloss()
}

fn light_intensity(s: &Sphere) -> f32 {
    s.material.light_intensity()
}

static FIELD_BINDINGS: [FieldBinding; 8] = [
    FieldBinding { kind: FieldKind::Position, name: "SPHERE_POS", extract: Extract::Vec3(position) },
    FieldBinding { kind: FieldKind::Radius, name: "SPHERE_RADIUS", extract: Extract::Float(radius) },
    FieldBinding { kind: FieldKind::DiffuseColor, name: "SPHERE_DIFF_COL", extract: Extract::Vec4(diffuse) },
    FieldBinding { kind: FieldKind::SpecularColor, name: "SPHERE_SPEC_COL", extract: Extract::Vec4(specular_color) },
    FieldBinding { kind: FieldKind::LightColor, name: "SPHERE_LITE_COL", extract: Extract::Vec3(light_color) },
    FieldBinding { kind: FieldKind::Smoothness, name: "SPHERE_SPEC", extract: Extract::Float(smoothness) },
    FieldBinding { kind: FieldKind::Gloss, name: "SPHERE_GLOSS", extract: Extract::Float(gloss) },
    FieldBinding { kind: FieldKind::LightIntensity, name: "SPHERE_LITE", extract: Extract::Float(light_intensity) },
];

/// Fixed set of spheres. Objects are mutated in place, never added or removed.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenePool {
    objects: Vec<Sphere>,
}

impl Default for ScenePool {
    fn default() -> Self {
        Self {
            objects: vec![
                Sphere::light("Light", Vec3::new(0.0, 0.0, 60.0), 40.0, Vec3::ONE, 5.0),
                Sphere::diffuse("Ground", Vec3::new(0.0, -32.0, 0.0), 30.0, Vec4::new(1.0, 0.0, 1.0, 1.0), 0.4, 0.6),
                Sphere::diffuse("Red", Vec3::new(4.0, 0.0, 0.0), 2.0, Vec4::new(1.0, 0.0, 0.0, 1.0), 1.0, 1.0),
                Sphere::diffuse("Green", Vec3::ZERO, 2.0, Vec4::new(0.0, 1.0, 0.0, 1.0), 1.0, 0.7),
                Sphere::diffuse("Blue", Vec3::new(-4.0, 0.0, 0.0), 2.0, Vec4::new(0.0, 0.0, 1.0, 1.0), 0.5, 0.5),
            ],
        }
    }
}

impl ScenePool {
    pub fn new(objects: Vec<Sphere>) -> Result<Self> {
        if objects.is_empty() || objects.len() > MAX_SPHERES {
            return Err(Error::PoolSize {
                max: MAX_SPHERES,
                actual: objects.len(),
            });
        }
        let objects = objects
            .into_iter()
            .map(|mut sphere| {
                sphere.material = sphere.material.clamped();
                sphere
            })
            .collect();
        Ok(Self { objects })
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> &[Sphere] {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut [Sphere] {
        &mut self.objects
    }

    pub fn get(&self, index: usize) -> Option<&Sphere> {
        self.objects.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Sphere> {
        self.objects.get_mut(index)
    }

    /// Full rebuild of one parallel array from current object state
    pub fn field_array(&self, kind: FieldKind) -> ParamValue {
        match kind.entry().extract {
            Extract::Float(f) => ParamValue::FloatArray(self.objects.iter().map(f).collect()),
            Extract::Vec3(f) => ParamValue::Vec3Array(self.objects.iter().map(f).collect()),
            Extract::Vec4(f) => ParamValue::Vec4Array(self.objects.iter().map(f).collect()),
        }
    }

    /// Rebuilds the array for `kind` and writes it to the matching program parameter
    pub fn set_data(&self, kind: FieldKind, params: &mut ParameterTable) -> Result<()> {
        log::debug!("sync {} ({} objects)", kind, self.len());
        params.set(kind.binding(), self.field_array(kind))
    }

    pub fn set_data_named(&self, name: &str, params: &mut ParameterTable) -> Result<()> {
        self.set_data(name.parse()?, params)
    }
}

/// On-disk scene description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneFile {
    pub spheres: Vec<Sphere>,
    #[serde(default)]
    pub settings: Option<SettingsState>,
}

impl SceneFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    pub fn into_parts(self) -> Result<(ScenePool, Option<SettingsState>)> {
        Ok((ScenePool::new(self.spheres)?, self.settings))
    }
}

impl From<&ScenePool> for SceneFile {
    fn from(pool: &ScenePool) -> Self {
        Self {
            spheres: pool.objects.clone(),
            settings: None,
        }
    }
}
