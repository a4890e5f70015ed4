//! Error types for scene loading and rendering.
//!
//! The geometric predicates never fail; errors only come from validating
//! input at the loading boundary, from I/O, and from the worker pool.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// I/O error while reading a scene or writing an image.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON scene description.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A frustum whose parameters do not describe a view pyramid.
    #[error("Invalid frustum: {0}")]
    InvalidFrustum(String),

    /// A primitive, entity or camera in a scene description is degenerate.
    #[error("Invalid scene: {0}")]
    InvalidScene(String),

    /// A worker thread failed while rendering.
    #[error("Render error: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, Error>;
