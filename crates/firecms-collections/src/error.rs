//! Error types for collection persistence
//!
//! This module defines the errors raised while composing collection ids,
//! decoding stored collection documents and preparing collections for
//! storage.

use thiserror::Error;

/// Collection persistence error types.
#[derive(Debug, Error)]
pub enum CollectionError {
    /// A stored collection document has no data payload
    #[error("Entity collection {id} has not been persisted correctly")]
    DataIntegrity {
        /// Composite id of the document
        id: String,
    },

    /// A stored collection document does not have the collection shape
    #[error("Entity collection {id} could not be decoded: {source}")]
    Malformed {
        /// Composite id of the document
        id: String,
        /// Decoding failure
        #[source]
        source: serde_json::Error,
    },

    /// A field required for persistence is structurally absent
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A path segment contains the composite id separator
    #[error("Path segment {segment:?} contains the reserved separator {separator:?}")]
    InvalidPathSegment {
        /// Offending segment
        segment: String,
        /// Separator in use
        separator: String,
    },
}

/// Result type for collection persistence operations.
pub type CollectionResult<T> = Result<T, CollectionError>;

impl CollectionError {
    /// Check if this error means stored data is unusable, as opposed to a
    /// problem with the caller's input.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            CollectionError::DataIntegrity { .. } | CollectionError::Malformed { .. }
        )
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            CollectionError::DataIntegrity { .. } => "DATA_INTEGRITY",
            CollectionError::Malformed { .. } => "MALFORMED_COLLECTION",
            CollectionError::Configuration(_) => "CONFIG_ERROR",
            CollectionError::InvalidPathSegment { .. } => "INVALID_PATH_SEGMENT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_integrity_message() {
        let err = CollectionError::DataIntegrity {
            id: "products".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Entity collection products has not been persisted correctly"
        );
        assert!(err.is_data_error());
        assert_eq!(err.error_code(), "DATA_INTEGRITY");
    }

    #[test]
    fn test_input_errors_are_not_data_errors() {
        let err = CollectionError::InvalidPathSegment {
            segment: "a::b".to_string(),
            separator: "::".to_string(),
        };
        assert!(!err.is_data_error());
        assert!(!CollectionError::Configuration("missing path".to_string()).is_data_error());
    }
}
