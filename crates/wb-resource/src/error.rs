//! Resource loading errors.

use std::path::PathBuf;

use thiserror::Error;
use wb_core::{FormatError, FreeListError};

pub type ResourceResult<T> = Result<T, ResourceError>;

#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("Type {type_name} has no registered resource loader (requested id '{id}')")]
    Unregistered { type_name: &'static str, id: String },

    #[error("A resource loader for type {type_name} is already registered")]
    AlreadyRegistered { type_name: &'static str },

    #[error("Resource file {path} does not exist")]
    NotFound { path: PathBuf },

    #[error("Failed to read resource file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse resource file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid resource definition: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("Invalid resource: {0}")]
    Invalid(String),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    FreeList(#[from] FreeListError),

    #[error("While loading '{type_name}' with id '{id}': {source}")]
    Load {
        type_name: &'static str,
        id: String,
        #[source]
        source: Box<ResourceError>,
    },
}

impl ResourceError {
    /// The innermost error, looking through `Load` wrappers.
    pub fn root(&self) -> &ResourceError {
        match self {
            ResourceError::Load { source, .. } => source.root(),
            other => other,
        }
    }

    /// True when the resource could not be produced: no loader for its
    /// type, or a file for its id that is missing or failed to load.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ResourceError::Unregistered { .. }
                | ResourceError::NotFound { .. }
                | ResourceError::Load { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_wrapper_exposes_root() {
        let err = ResourceError::Load {
            type_name: "Component",
            id: "res.r1".into(),
            source: Box::new(ResourceError::NotFound {
                path: PathBuf::from("assets/components/res/r1.json"),
            }),
        };
        assert!(err.is_not_found());
        let msg = err.to_string();
        assert!(msg.contains("res.r1"));
        assert!(msg.contains("does not exist"));
    }

    #[test]
    fn format_error_is_not_a_missing_resource() {
        let err: ResourceError = FormatError::BadQuantity {
            literal: "x".into(),
        }
        .into();
        assert!(!err.is_not_found());
    }

    #[test]
    fn malformed_file_is_a_missing_resource() {
        let err = ResourceError::Load {
            type_name: "Connector",
            id: "jst.xh".into(),
            source: Box::new(
                FormatError::BadQuantity {
                    literal: "x".into(),
                }
                .into(),
            ),
        };
        assert!(err.is_not_found());
        assert!(!err.root().is_not_found());
    }
}
