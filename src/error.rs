//! Error types for the export pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while rasterizing or compositing sections.
///
/// Style resolution and stylesheet scoping never produce errors; they degrade
/// to defaults or pass input through instead.
#[derive(Error, Debug)]
pub enum Error {
    /// The rasterization primitive rejected a section
    #[error("Rasterization failed for section {section_id}: {message}")]
    Rasterization { section_id: String, message: String },

    /// The output canvas could not be acquired or a section could not be drawn
    #[error("Composition failed: {message}")]
    Composition {
        /// The section being drawn, when the failure belongs to one
        section_id: Option<String>,
        message: String,
    },

    /// An image or data URL could not be decoded
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// No rendered view was supplied for a section in the job
    #[error("No rendered view for section {0}")]
    MissingView(String),

    /// Invalid configuration or input document
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The export session worker is gone
    #[error("Export session closed")]
    SessionClosed,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// A composition failure not tied to any one section.
    pub fn composition(message: impl Into<String>) -> Self {
        Error::Composition {
            section_id: None,
            message: message.into(),
        }
    }

    /// Id of the section the failure belongs to, if this error carries one.
    pub fn section_id(&self) -> Option<&str> {
        match self {
            Error::Rasterization { section_id, .. } => Some(section_id.as_str()),
            Error::MissingView(id) => Some(id.as_str()),
            Error::Composition { section_id, .. } => section_id.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rasterization_error_exposes_section_id() {
        let err = Error::Rasterization {
            section_id: "s2".into(),
            message: "zero height".into(),
        };
        assert_eq!(err.section_id(), Some("s2"));
        assert!(err.to_string().contains("s2"));
        assert_eq!(Error::composition("x").section_id(), None);

        let err = Error::Composition {
            section_id: Some("s3".into()),
            message: "bad raster".into(),
        };
        assert_eq!(err.section_id(), Some("s3"));
        assert_eq!(err.to_string(), "Composition failed: bad raster");
    }
}
