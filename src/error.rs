//! Error types for casting, method dispatch and settings/schema loading.

use std::fmt;

use thiserror::Error;

/// Boxed error returned by caller-supplied hooks.
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for field transforms and class methods.
///
/// A transform returning one of these never aborts a cast; the failure is
/// routed to the `on_transform_error` handler instead.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformError {
    InvalidArgs(String),
    ExecutionError(String),
    UnexpectedType {
        expected: &'static str,
        actual: &'static str,
    },
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformError::InvalidArgs(msg) => write!(f, "Invalid arguments: {}", msg),
            TransformError::ExecutionError(msg) => write!(f, "Execution error: {}", msg),
            TransformError::UnexpectedType { expected, actual } => {
                write!(f, "Unexpected type: expected {}, got {}", expected, actual)
            }
        }
    }
}

impl std::error::Error for TransformError {}

/// Which side of the shape upgrade a hook ran on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStage {
    BeforeTypeCast,
    AfterTypeCast,
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookStage::BeforeTypeCast => f.write_str("beforeTypeCast"),
            HookStage::AfterTypeCast => f.write_str("afterTypeCast"),
        }
    }
}

/// Errors surfaced to callers of the crate.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A before/after hook failed; the cast stopped at that record.
    #[error("{stage} hook failed for type '{type_name}': {source}")]
    Hook {
        stage: HookStage,
        type_name: String,
        #[source]
        source: HookError,
    },

    #[error("Record is plain; cannot call method '{method}'")]
    NotTyped { method: String },

    #[error("Type '{type_name}' has no method '{method}'")]
    MethodNotFound { type_name: String, method: String },

    #[error("Method '{type_name}.{method}' failed: {source}")]
    Method {
        type_name: String,
        method: String,
        #[source]
        source: TransformError,
    },

    #[error("Invalid schema: {0}")]
    Schema(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn hook(stage: HookStage, type_name: &str, source: HookError) -> Self {
        Error::Hook {
            stage,
            type_name: type_name.to_string(),
            source,
        }
    }

    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Error::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hook_error_message_names_stage_and_type() {
        let err = Error::hook(HookStage::AfterTypeCast, "Person", "boom".into());
        assert_eq!(
            err.to_string(),
            "afterTypeCast hook failed for type 'Person': boom"
        );
    }

    #[test]
    fn test_transform_error_display() {
        let err = TransformError::UnexpectedType {
            expected: "string",
            actual: "number",
        };
        assert_eq!(err.to_string(), "Unexpected type: expected string, got number");
    }
}
