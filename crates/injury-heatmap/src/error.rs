//! Error types for heatmap configuration.
//!
//! Normalization and aggregation are total; these errors only surface while
//! loading or validating the catalog and synonym table.

use thiserror::Error;

/// Errors that can occur while building a normalizer or loading its configuration.
#[derive(Debug, Error)]
pub enum HeatmapError {
    /// Reading a configuration file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration document or record list could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A synonym references a region that is not in the catalog.
    #[error("synonym '{key}' references unknown region: {region}")]
    UnknownRegion { key: String, region: String },

    /// A synonym key is blank after trimming.
    #[error("synonym key cannot be empty")]
    EmptyKey,

    /// A synonym key maps to no regions.
    #[error("synonym '{key}' maps to no regions")]
    EmptyRegions { key: String },

    /// An extra region reuses an id already in the catalog.
    #[error("region already exists: {id}")]
    DuplicateRegion { id: String },

    /// A configuration value could not be interpreted.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for heatmap configuration operations.
pub type Result<T> = std::result::Result<T, HeatmapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HeatmapError::UnknownRegion {
            key: "tail".to_string(),
            region: "tail".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "synonym 'tail' references unknown region: tail"
        );

        let err = HeatmapError::EmptyRegions {
            key: "knee".to_string(),
        };
        assert_eq!(err.to_string(), "synonym 'knee' maps to no regions");
    }
}
