//! Error types for Diorama

use thiserror::Error;

/// The main error type for Diorama operations
#[derive(Debug, Error)]
pub enum DioramaError {
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Invalid object id: '{0}'")]
    InvalidObjectId(String),

    #[error("Duplicate object id: {0}")]
    DuplicateObjectId(String),

    #[error("Object {id} has no {surface} surface")]
    MissingSurface { id: String, surface: &'static str },

    #[error("Material not found: {0}")]
    MaterialNotFound(String),

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Catalog error: {0}")]
    CatalogError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Unsupported schema version {found}: this build understands up to {supported}")]
    UnsupportedSchema { found: u32, supported: u32 },

    #[error("Outdated schema version {found} rejected by strict policy (current is {current})")]
    OutdatedSchema { found: u32, current: u32 },

    #[error("Fetch failed for {url}: {reason}")]
    FetchError { url: String, reason: String },

    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(String),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),
}

/// Result type alias for Diorama operations
pub type Result<T> = std::result::Result<T, DioramaError>;

impl From<serde_json::Error> for DioramaError {
    fn from(err: serde_json::Error) -> Self {
        DioramaError::JsonError(err.to_string())
    }
}

impl From<toml::de::Error> for DioramaError {
    fn from(err: toml::de::Error) -> Self {
        DioramaError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for DioramaError {
    fn from(err: toml::ser::Error) -> Self {
        DioramaError::TomlSerError(err.to_string())
    }
}
