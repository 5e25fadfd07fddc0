use thiserror::Error;

use crate::core::params::ParamKind;

/// Configuration-class failures. None of these are retried; a tick that hits one ends the loop.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown scene field kind: {0}")]
    UnknownField(String),

    #[error("program declares no parameter named {0}")]
    MissingParameter(String),

    #[error("parameter {0} was never bound")]
    UnboundParameter(&'static str),

    #[error("parameter {name} expects {expected:?}, got {actual:?}")]
    ParameterType {
        name: String,
        expected: ParamKind,
        actual: ParamKind,
    },

    #[error("parameter {name} declares {expected} elements, got {actual}")]
    ArrayLength {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("scene pool must hold between 1 and {max} objects, got {actual}")]
    PoolSize { max: usize, actual: usize },

    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("gpu setup failed: {0}")]
    Gpu(String),

    #[error("scene file: {0}")]
    SceneFile(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
