//! Error type shared by every engine operation.

/// An error type for the image engine.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    /// A caller-supplied parameter is outside its accepted range.
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// Human readable description of the accepted range.
        reason: String,
    },

    /// Raw pixel data does not match the declared dimensions.
    #[error("Data length ({actual}) does not match a {width}x{height} RGBA image ({expected})")]
    InvalidDimensions {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    /// The pixel count of the requested dimensions overflows `usize`.
    #[error("Image of {width}x{height} pixels is too large")]
    ImageTooLarge { width: usize, height: usize },

    /// History navigation was requested before any image was stored.
    #[error("Edit history is empty")]
    EmptyHistory,

    /// The image holds no visible content.
    #[error("Image is empty")]
    EmptyImage,

    /// The background worker thread could not be started.
    #[error("Failed to start the background worker. {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// The background worker thread is no longer running.
    #[error("Background worker disconnected")]
    WorkerDisconnected,

    /// Failed to decode an image file.
    #[cfg(feature = "io")]
    #[error("Failed to decode the image. {0}")]
    Decode(#[source] image::ImageError),

    /// Failed to encode an image file.
    #[cfg(feature = "io")]
    #[error("Failed to encode the image. {0}")]
    Encode(#[source] image::ImageError),
}

impl EngineError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EngineError>;
