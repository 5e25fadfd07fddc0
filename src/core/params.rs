use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::error::{Error, Result};
use crate::scene::FieldKind;

pub const CAMERA_POSITION: &str = "_cameraPosition";
pub const CAMERA_TRANSFORM: &str = "_cameraTransform";
pub const VIEWPORT_SIZE: &str = "_viewportSize";
pub const FOCAL_LENGTH: &str = "_focalLength";
pub const FRAME: &str = "_frame";
pub const SCREEN_X: &str = "_screenX";
pub const SCREEN_Y: &str = "_screenY";
pub const SAMPLES: &str = "SPP";
pub const BOUNCES: &str = "BOUNCES";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Int,
    Float,
    Vec2,
    Vec3,
    Mat4,
    FloatArray,
    Vec3Array,
    Vec4Array,
}

impl ParamKind {
    pub fn is_array(self) -> bool {
        matches!(
            self,
            ParamKind::FloatArray | ParamKind::Vec3Array | ParamKind::Vec4Array
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(i32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Mat4(Mat4),
    FloatArray(Vec<f32>),
    Vec3Array(Vec<Vec3>),
    Vec4Array(Vec<Vec4>),
}

impl ParamValue {
    pub fn kind(&self) -> ParamKind {
        match self {
            ParamValue::Int(_) => ParamKind::Int,
            ParamValue::Float(_) => ParamKind::Float,
            ParamValue::Vec2(_) => ParamKind::Vec2,
            ParamValue::Vec3(_) => ParamKind::Vec3,
            ParamValue::Mat4(_) => ParamKind::Mat4,
            ParamValue::FloatArray(_) => ParamKind::FloatArray,
            ParamValue::Vec3Array(_) => ParamKind::Vec3Array,
            ParamValue::Vec4Array(_) => ParamKind::Vec4Array,
        }
    }

    /// Element count; scalars, vectors and matrices count as one
    pub fn len(&self) -> usize {
        match self {
            ParamValue::FloatArray(v) => v.len(),
            ParamValue::Vec3Array(v) => v.len(),
            ParamValue::Vec4Array(v) => v.len(),
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Storage-buffer layout: vec3 elements are padded to a 16-byte stride
    pub fn as_gpu_bytes(&self) -> Vec<u8> {
        match self {
            ParamValue::Int(v) => bytemuck::bytes_of(v).to_vec(),
            ParamValue::Float(v) => bytemuck::bytes_of(v).to_vec(),
            ParamValue::Vec2(v) => bytemuck::bytes_of(v).to_vec(),
            ParamValue::Vec3(v) => bytemuck::bytes_of(&v.extend(0.0)).to_vec(),
            ParamValue::Mat4(v) => bytemuck::bytes_of(v).to_vec(),
            ParamValue::FloatArray(v) => bytemuck::cast_slice::<f32, u8>(v).to_vec(),
            ParamValue::Vec3Array(v) => {
                let padded: Vec<Vec4> = v.iter().map(|p| p.extend(0.0)).collect();
                bytemuck::cast_slice::<Vec4, u8>(&padded).to_vec()
            }
            ParamValue::Vec4Array(v) => bytemuck::cast_slice::<Vec4, u8>(v).to_vec(),
        }
    }
}

/// One named parameter a GPU program declares
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDecl {
    pub name: &'static str,
    pub kind: ParamKind,
    pub len: usize,
}

impl ParamDecl {
    pub const fn scalar(name: &'static str, kind: ParamKind) -> Self {
        Self { name, kind, len: 1 }
    }

    pub const fn array(name: &'static str, kind: ParamKind, len: usize) -> Self {
        Self { name, kind, len }
    }
}

/// The parameters a program expects, with array capacities fixed at creation
#[derive(Debug, Clone)]
pub struct ProgramLayout {
    decls: Vec<ParamDecl>,
}

impl ProgramLayout {
    pub fn new(decls: Vec<ParamDecl>) -> Self {
        Self { decls }
    }

    /// Path-trace stage layout: camera/settings scalars plus one array per sphere field
    pub fn path_tracer(sphere_count: usize) -> Self {
        let mut decls = vec![
            ParamDecl::scalar(CAMERA_POSITION, ParamKind::Vec3),
            ParamDecl::scalar(CAMERA_TRANSFORM, ParamKind::Mat4),
            ParamDecl::scalar(VIEWPORT_SIZE, ParamKind::Vec2),
            ParamDecl::scalar(FOCAL_LENGTH, ParamKind::Float),
            ParamDecl::scalar(FRAME, ParamKind::Int),
            ParamDecl::scalar(SCREEN_X, ParamKind::Int),
            ParamDecl::scalar(SCREEN_Y, ParamKind::Int),
            ParamDecl::scalar(SAMPLES, ParamKind::Int),
            ParamDecl::scalar(BOUNCES, ParamKind::Int),
        ];
        decls.extend(
            FieldKind::ALL
                .iter()
                .map(|kind| ParamDecl::array(kind.binding(), kind.param_kind(), sphere_count)),
        );
        Self { decls }
    }

    pub fn decls(&self) -> &[ParamDecl] {
        &self.decls
    }

    pub fn find(&self, name: &str) -> Option<(usize, &ParamDecl)> {
        self.decls.iter().enumerate().find(|(_, d)| d.name == name)
    }
}

/// Current values for every declared parameter. The render pipeline is the only writer.
#[derive(Debug, Clone)]
pub struct ParameterTable {
    layout: ProgramLayout,
    values: Vec<Option<ParamValue>>,
    dirty: Vec<bool>,
}

impl ParameterTable {
    pub fn new(layout: ProgramLayout) -> Self {
        let count = layout.decls.len();
        Self {
            layout,
            values: vec![None; count],
            dirty: vec![false; count],
        }
    }

    pub fn layout(&self) -> &ProgramLayout {
        &self.layout
    }

    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<()> {
        let (index, decl) = self
            .layout
            .find(name)
            .ok_or_else(|| Error::MissingParameter(name.to_string()))?;

        if decl.kind != value.kind() {
            return Err(Error::ParameterType {
                name: name.to_string(),
                expected: decl.kind,
                actual: value.kind(),
            });
        }
        if decl.kind.is_array() && decl.len != value.len() {
            return Err(Error::ArrayLength {
                name: name.to_string(),
                expected: decl.len,
                actual: value.len(),
            });
        }

        self.values[index] = Some(value);
        self.dirty[index] = true;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        let (index, _) = self.layout.find(name)?;
        self.values[index].as_ref()
    }

    fn bound(&self, name: &str) -> Result<&ParamValue> {
        let (index, decl) = self
            .layout
            .find(name)
            .ok_or_else(|| Error::MissingParameter(name.to_string()))?;
        self.values[index]
            .as_ref()
            .ok_or(Error::UnboundParameter(decl.name))
    }

    fn mismatch(name: &str, expected: ParamKind, value: &ParamValue) -> Error {
        Error::ParameterType {
            name: name.to_string(),
            expected,
            actual: value.kind(),
        }
    }

    pub fn int(&self, name: &str) -> Result<i32> {
        match self.bound(name)? {
            ParamValue::Int(v) => Ok(*v),
            other => Err(Self::mismatch(name, ParamKind::Int, other)),
        }
    }

    pub fn float(&self, name: &str) -> Result<f32> {
        match self.bound(name)? {
            ParamValue::Float(v) => Ok(*v),
            other => Err(Self::mismatch(name, ParamKind::Float, other)),
        }
    }

    pub fn vec2(&self, name: &str) -> Result<Vec2> {
        match self.bound(name)? {
            ParamValue::Vec2(v) => Ok(*v),
            other => Err(Self::mismatch(name, ParamKind::Vec2, other)),
        }
    }

    pub fn vec3(&self, name: &str) -> Result<Vec3> {
        match self.bound(name)? {
            ParamValue::Vec3(v) => Ok(*v),
            other => Err(Self::mismatch(name, ParamKind::Vec3, other)),
        }
    }

    pub fn mat4(&self, name: &str) -> Result<Mat4> {
        match self.bound(name)? {
            ParamValue::Mat4(v) => Ok(*v),
            other => Err(Self::mismatch(name, ParamKind::Mat4, other)),
        }
    }

    pub fn floats(&self, name: &str) -> Result<&[f32]> {
        match self.bound(name)? {
            ParamValue::FloatArray(v) => Ok(v),
            other => Err(Self::mismatch(name, ParamKind::FloatArray, other)),
        }
    }

    /// Fails on the first declared parameter that has never been set
    pub fn ensure_bound(&self) -> Result<()> {
        match self
            .layout
            .decls
            .iter()
            .zip(&self.values)
            .find(|(_, value)| value.is_none())
        {
            Some((decl, _)) => Err(Error::UnboundParameter(decl.name)),
            None => Ok(()),
        }
    }

    /// Arrays written since the last `clear_dirty`
    pub fn dirty_arrays(&self) -> impl Iterator<Item = (&'static str, &ParamValue)> + '_ {
        self.layout
            .decls
            .iter()
            .zip(self.values.iter().zip(&self.dirty))
            .filter(|(decl, (_, dirty))| decl.kind.is_array() && **dirty)
            .filter_map(|(decl, (value, _))| value.as_ref().map(|v| (decl.name, v)))
    }

    pub fn clear_dirty(&mut self) {
        self.dirty.iter_mut().for_each(|d| *d = false);
    }
}
