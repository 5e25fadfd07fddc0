pub mod app;
pub mod camera;
pub mod cli;
pub mod core;
pub mod error;
pub mod render_loop;
pub mod renderer;
pub mod scene;
pub mod settings;
pub mod traits;
pub mod types;
pub mod ui;

pub use error::{Error, Result};
