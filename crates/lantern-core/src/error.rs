//! Error types for Lantern

use thiserror::Error;

/// The main error type for Lantern operations
#[derive(Debug, Error)]
pub enum LanternError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    #[error("Duplicate node name: {0}")]
    DuplicateNodeName(String),

    #[error("Scene error: {0}")]
    SceneError(String),

    #[error("Property not found: {0}")]
    PropertyNotFound(String),

    #[error("Property type mismatch: {property} is not a {expected}")]
    PropertyTypeMismatch { property: String, expected: String },

    #[error("Geometry error: {0}")]
    GeometryError(String),

    #[error("Effect error: {0}")]
    EffectError(String),

    #[error("Technique not found: {effect}/{technique}")]
    TechniqueNotFound { effect: String, technique: String },

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    #[error("Asset error: {0}")]
    AssetError(String),

    #[error("No protocol for uri: {0}")]
    NoProtocol(String),

    #[error("Protocol error: {uri}: {message}")]
    ProtocolError { uri: String, message: String },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Import error: {0}")]
    ImportError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),
}

/// Result type alias for Lantern operations
pub type Result<T> = std::result::Result<T, LanternError>;

impl From<toml::de::Error> for LanternError {
    fn from(err: toml::de::Error) -> Self {
        LanternError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for LanternError {
    fn from(err: toml::ser::Error) -> Self {
        LanternError::TomlSerError(err.to_string())
    }
}
