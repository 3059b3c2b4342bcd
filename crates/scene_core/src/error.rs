//! Error types shared by the scene graph, cameras and renderer

use thiserror::Error;

use crate::foundation::memory::PoolError;

/// Errors produced by frame-loop operations
///
/// Pool exhaustion is a configuration error: pools are sized up front and
/// never grow, so callers are expected to treat [`SceneError::Pool`] as fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// A fixed-capacity pool ran out of slots, or a pooled handle went stale
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// The scene was deleted or never existed
    #[error("scene not found")]
    SceneNotFound,

    /// The node was deleted or belongs to a deleted scene
    #[error("node not found")]
    NodeNotFound,

    /// The camera was deleted or never existed
    #[error("camera not found")]
    CameraNotFound,

    /// The pipeline was deleted or never existed
    #[error("pipeline not found")]
    PipelineNotFound,
}

/// Result type for frame-loop operations
pub type SceneResult<T> = Result<T, SceneError>;
