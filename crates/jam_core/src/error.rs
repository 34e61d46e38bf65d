use thiserror::Error;

/// Infrastructure errors (config, state paths, replication payloads).
///
/// Gameplay rejections are not errors; see [`crate::engine::Rejection`].
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Unknown state path: {path}")]
    UnknownPath { path: String },

    #[error("State path {path} is read-only")]
    ReadOnlyPath { path: String },

    #[error("Invalid value for {path}: {reason}")]
    InvalidValue { path: String, reason: String },

    #[error("Unknown player: {id}")]
    UnknownPlayer { id: u8 },

    #[error("Malformed authority message: {0}")]
    MalformedMessage(String),
}

impl CoreError {
    /// Whether the simulation loop can keep running after this error.
    pub fn is_recoverable(&self) -> bool {
        match self {
            CoreError::Io(_) => true,
            CoreError::UnknownPath { .. } => true,
            CoreError::ReadOnlyPath { .. } => true,
            CoreError::InvalidValue { .. } => true,
            CoreError::UnknownPlayer { .. } => true,
            CoreError::MalformedMessage(_) => true,
            CoreError::InvalidConfig(_) => false,
            CoreError::UnsupportedFormat { .. } => false,
            CoreError::Json(_) | CoreError::Yaml(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(CoreError::UnknownPath { path: "score.draw".into() }.is_recoverable());
        assert!(CoreError::MalformedMessage("bad".into()).is_recoverable());
        assert!(!CoreError::InvalidConfig("tick rate".into()).is_recoverable());
    }

    #[test]
    fn test_json_error_converts() {
        let err: CoreError = serde_json::from_str::<u8>("nope").unwrap_err().into();
        assert!(matches!(err, CoreError::Json(_)));
        assert!(err.to_string().starts_with("JSON error"));
    }
}
