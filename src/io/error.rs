//! Error types for extraction, persistence and reconstruction

use std::fmt;
use std::path::PathBuf;

/// Main error type for all pipeline operations
#[derive(Debug)]
pub enum PipelineError {
    /// Fewer than two images were supplied to an extraction run
    InsufficientInput {
        /// Number of images actually supplied
        provided: usize,
    },

    /// An image in the batch does not share the batch dimensions
    DimensionMismatch {
        /// 1-based index of the offending image
        image_index: usize,
        /// Batch dimensions (width, height) taken from the first image
        expected: (u32, u32),
        /// Dimensions (width, height) of the offending image
        found: (u32, u32),
    },

    /// Reconstruction requested for an image index with no records
    UnknownImageIndex {
        /// The requested 1-based image index
        image_index: usize,
    },

    /// Failed to write fragment pixels to storage
    StorageWrite {
        /// Storage reference that was being written
        reference: String,
        /// Underlying image encoding or I/O error
        source: image::ImageError,
    },

    /// Failed to read or write fragment records
    Persistence {
        /// Description of the store operation that failed
        operation: &'static str,
        /// Underlying database error
        source: rusqlite::Error,
    },

    /// Extraction refused because the store already holds records
    CatalogNotEmpty {
        /// Number of records already present
        existing_records: usize,
    },

    /// Failed to load a source image from the filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Failed to open a previously stored fragment
    FragmentLoad {
        /// Storage reference of the fragment
        reference: String,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Failed to save a reconstructed image
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Configuration value failed validation
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Persisted or decoded data is inconsistent with what the pipeline expects
    InvalidSourceData {
        /// Description of what's wrong with the data
        reason: String,
    },

    /// Structural similarity could not be computed
    Similarity {
        /// Storage reference of the catalog entry being compared against
        reference: String,
        /// Description of the failure
        reason: String,
    },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientInput { provided } => {
                write!(
                    f,
                    "At least 2 images are required for extraction, got {provided}"
                )
            }
            Self::DimensionMismatch {
                image_index,
                expected,
                found,
            } => {
                write!(
                    f,
                    "Image {image_index} is {}x{} but the batch is {}x{}",
                    found.0, found.1, expected.0, expected.1
                )
            }
            Self::UnknownImageIndex { image_index } => {
                write!(f, "No fragment records exist for image index {image_index}")
            }
            Self::StorageWrite { reference, source } => {
                write!(f, "Failed to write fragment '{reference}': {source}")
            }
            Self::Persistence { operation, source } => {
                write!(f, "Record store error during {operation}: {source}")
            }
            Self::CatalogNotEmpty { existing_records } => {
                write!(
                    f,
                    "Output already holds {existing_records} fragment records; \
                     use an empty output directory"
                )
            }
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::FragmentLoad { reference, source } => {
                write!(f, "Failed to open fragment '{reference}': {source}")
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::InvalidSourceData { reason } => {
                write!(f, "Invalid source data: {reason}")
            }
            Self::Similarity { reference, reason } => {
                write!(f, "Similarity against '{reference}' failed: {reason}")
            }
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::StorageWrite { source, .. }
            | Self::ImageLoad { source, .. }
            | Self::FragmentLoad { source, .. }
            | Self::ImageExport { source, .. } => Some(source),
            Self::Persistence { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for pipeline results
pub type Result<T> = std::result::Result<T, PipelineError>;

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

impl From<rusqlite::Error> for PipelineError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Persistence {
            operation: "unknown",
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> PipelineError {
    PipelineError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create an invalid source data error
pub fn invalid_data(reason: &impl ToString) -> PipelineError {
    PipelineError::InvalidSourceData {
        reason: reason.to_string(),
    }
}

/// Attach the failing store operation to a database error
pub trait PersistenceContext<T> {
    /// Map a database error into [`PipelineError::Persistence`]
    ///
    /// # Errors
    ///
    /// Propagates the original database error tagged with `operation`
    fn persistence(self, operation: &'static str) -> Result<T>;
}

impl<T> PersistenceContext<T> for std::result::Result<T, rusqlite::Error> {
    fn persistence(self, operation: &'static str) -> Result<T> {
        self.map_err(|source| PipelineError::Persistence { operation, source })
    }
}
