//! Error types for the hair_shade_match library

use thiserror::Error;

/// Result type alias for hair_shade_match operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Error types for shade extraction and catalog matching
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Image file could not be loaded or decoded
    #[error("Failed to load image: {message}")]
    ImageLoadError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The segmentation model failed or returned an unusable tensor
    #[error("Inference error: {message}")]
    InferenceError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Tensor or grid dimensions disagree with the configured model grid
    #[error("Dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: String,
        expected: String,
        actual: String,
    },

    /// Parallel arrays (mask, pixel planes) have different lengths
    #[error("Length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    /// Color parsing or conversion error
    #[error("Color conversion error: {message}")]
    ColorConversionError { message: String },

    /// Catalog could not be read, parsed or written
    #[error("Catalog error: {message}")]
    CatalogError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration could not be read, parsed or validated
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl AnalysisError {
    /// Create an image load error with context
    pub fn image_load<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ImageLoadError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an inference error with context
    pub fn inference(message: impl Into<String>) -> Self {
        Self::InferenceError {
            message: message.into(),
            source: None,
        }
    }

    /// Create a catalog error with context
    pub fn catalog<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::CatalogError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error with context
    pub fn config<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ConfigError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn invalid_parameter(parameter: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }

    /// Check if this error is a caller contract violation rather than a runtime failure
    pub fn is_precondition_violation(&self) -> bool {
        matches!(
            self,
            AnalysisError::DimensionMismatch { .. } | AnalysisError::LengthMismatch { .. }
        )
    }

    /// Get user-friendly error description for application display
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::ImageLoadError { .. } => {
                "Could not load the image. Please check the file format and try again.".to_string()
            }
            AnalysisError::InferenceError { .. } => {
                "Hair segmentation failed. Please try again with a different photo.".to_string()
            }
            AnalysisError::InvalidParameter { parameter, .. } => {
                format!("Invalid value for '{}'.", parameter)
            }
            AnalysisError::CatalogError { .. } => {
                "The extension catalog is unavailable.".to_string()
            }
            _ => "Hair color analysis failed. Please try with a different image.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_classification() {
        let dims = AnalysisError::DimensionMismatch {
            context: "mask".into(),
            expected: "320x320".into(),
            actual: "160x160".into(),
        };
        assert!(dims.is_precondition_violation());

        let lengths = AnalysisError::LengthMismatch {
            what: "red plane".into(),
            expected: 4,
            actual: 3,
        };
        assert!(lengths.is_precondition_violation());

        assert!(!AnalysisError::inference("boom").is_precondition_violation());
    }

    #[test]
    fn test_error_display() {
        let err = AnalysisError::invalid_parameter("id", "");
        assert_eq!(err.to_string(), "Invalid parameter: id = ");
        assert_eq!(err.user_message(), "Invalid value for 'id'.");
    }

    #[test]
    fn test_source_is_preserved() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = AnalysisError::catalog("read extensions.json", io);
        let source = std::error::Error::source(&err).expect("source attached");
        assert_eq!(source.to_string(), "missing");
    }
}
