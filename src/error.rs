//! Error types for asset loading and configuration.
//!
//! Picking and measurement cannot fail; every fallible path in the viewer is
//! either reading a file from disk or decoding it.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for viewer operations.
pub type ViewerResult<T> = Result<T, ViewerError>;

/// Errors raised while loading the model, the texture or the configuration.
#[derive(Debug, Error)]
pub enum ViewerError {
    /// A file could not be opened or read.
    #[error("failed to read {path}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The OBJ text could not be parsed.
    #[error("failed to parse OBJ from {path}: {details}")]
    ObjParse { path: PathBuf, details: String },

    /// The OBJ parsed but contains no triangles.
    #[error("model is empty: {details}")]
    EmptyModel { details: String },

    /// The texture image could not be decoded.
    #[error("failed to decode texture {path}")]
    TextureDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The JSON configuration file is malformed.
    #[error("invalid configuration in {path}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The loader thread went away without reporting a result.
    #[error("asset loader stopped before finishing")]
    LoaderDisconnected,
}

impl ViewerError {
    /// Short, user-facing message shown in place of the scene.
    pub fn user_message(&self) -> &'static str {
        match self {
            ViewerError::TextureDecode { .. } => "Failed to load texture.",
            ViewerError::Config { .. } => "Failed to load configuration.",
            _ => "Failed to load OBJ file.",
        }
    }

    /// Whether this error came from the texture rather than the mesh.
    pub fn is_texture_error(&self) -> bool {
        matches!(self, ViewerError::TextureDecode { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_errors_share_the_obj_message() {
        let err = ViewerError::EmptyModel {
            details: "no faces".into(),
        };
        assert_eq!(err.user_message(), "Failed to load OBJ file.");
        assert!(!err.is_texture_error());

        let err = ViewerError::ObjParse {
            path: PathBuf::from("model.obj"),
            details: "bad face".into(),
        };
        assert!(err.to_string().contains("model.obj"));
    }

    #[test]
    fn texture_errors_are_reported_separately() {
        let err = ViewerError::TextureDecode {
            path: PathBuf::from("capsule0.jpg"),
            source: image::ImageError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "missing",
            )),
        };
        assert_eq!(err.user_message(), "Failed to load texture.");
        assert!(err.is_texture_error());
    }
}
