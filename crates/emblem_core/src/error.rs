//! Error types for the core model

use crate::decal::DecalId;
use thiserror::Error;

/// Errors produced by layer/decal model operations
#[derive(Error, Debug)]
pub enum DesignError {
    /// A layer is already holding its maximum number of decals
    #[error("layer '{layer}' already holds {limit} decals")]
    CapacityExceeded { layer: String, limit: usize },

    /// A design or operation referenced a layer that does not exist
    #[error("unknown layer '{0}'")]
    LayerNotFound(String),

    /// An operation referenced a decal that does not exist on the given layer
    #[error("decal {0} not found")]
    DecalNotFound(DecalId),

    /// A color string was not a 6-hex-digit color
    #[error("invalid color '{0}': expected 6 hex digits")]
    InvalidColor(String),

    /// Texture pixel data did not match its declared dimensions
    #[error("invalid texture data: {0}")]
    Texture(String),

    /// A design document was structurally malformed
    #[error("malformed design: {0}")]
    Schema(#[from] serde_json::Error),

    /// A decal entry in a design was missing its type-specific payload
    #[error("decal '{name}' is missing its {kind} payload")]
    MissingPayload { name: String, kind: &'static str },
}

pub type Result<T> = std::result::Result<T, DesignError>;
