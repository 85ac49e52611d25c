//! Error types for barcode merging.

use thiserror::Error;

/// Result type alias for merge operations
pub type Result<T> = std::result::Result<T, MergeError>;

/// Error type for merge operations
#[derive(Error, Debug)]
pub enum MergeError {
    /// The barcodes catalog could not be opened
    #[error("Can't open barcodes file '{path}': {source}")]
    CatalogOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The barcodes catalog was opened but reading a line failed
    #[error("Failed to read barcodes file '{path}': {source}")]
    CatalogRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid parameter value provided
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter { parameter: String, reason: String },

    /// A cell without molecules reached the intersection stage
    #[error("Cell {cell_id} has no molecules; intersection fraction is undefined")]
    EmptyCell { cell_id: usize },

    /// A cell id outside the container was referenced
    #[error("Unknown cell id {cell_id}")]
    UnknownCell { cell_id: usize },

    /// Barcode cannot be split into two fragments
    #[error("Barcode '{barcode}' is too short for a second fragment of length {barcode2_length}")]
    BarcodeTooShort { barcode: String, barcode2_length: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_message() {
        let error = MergeError::InvalidParameter {
            parameter: "min-merge-fraction".to_string(),
            reason: "must be between 0 and 1".to_string(),
        };
        let msg = format!("{error}");
        assert!(msg.contains("Invalid parameter 'min-merge-fraction'"));
        assert!(msg.contains("between 0 and 1"));
    }

    #[test]
    fn test_catalog_open_message() {
        let error = MergeError::CatalogOpen {
            path: "/missing/barcodes.txt".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(format!("{error}").contains("/missing/barcodes.txt"));
    }
}
