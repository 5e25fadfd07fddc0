pub mod clock;
pub mod controller;
pub mod controls;
pub mod frame;
pub mod gpu_context;
pub mod input_adapter;
pub mod input_mapper;
pub mod params;
pub mod render_pipeline;
pub mod sphere;

pub use clock::Clock;
pub use controller::{Button, Controller, DeviceSnapshot, PointerButton};
pub use controls::{DragControl, KeyPair, PairMode, ScrollControl, Toggle, ToggleControl};
pub use frame::{AccumulationStep, FrameCounter, Technique};
pub use gpu_context::GpuContext;
pub use input_adapter::WinitController;
pub use input_mapper::InputMapper;
pub use params::{ParamDecl, ParamKind, ParamValue, ParameterTable, ProgramLayout};
pub use render_pipeline::RenderPipeline;
