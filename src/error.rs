//! Error types for rendering, upload handling and webhook delivery

use thiserror::Error;

/// Result type alias for htmlshot operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while accepting, rendering or forwarding a page
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to start the browser session
    #[error("Browser initialization failed: {0}")]
    InitializationError(String),

    /// Failed to load the HTML file into the browser
    #[error("Failed to load page: {0}")]
    LoadError(String),

    /// Failed to capture the screenshot
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// Missing or invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Network error while talking to the webhook
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The webhook answered with a status outside {200, 204}
    #[error("Webhook returned status code {0}")]
    WebhookStatus(u16),

    /// Upload request used a method other than POST
    #[error("Method {0} not allowed")]
    MethodNotAllowed(String),

    /// No usable file part in the upload
    #[error("Failed to read uploaded file: {0}")]
    MissingFile(String),

    /// Uploaded file name is not the accepted one
    #[error("Unsupported file name: {0:?}")]
    UnsupportedFileName(String),

    /// Upload body is larger than the configured limit (bytes)
    #[error("Request body exceeds {0} bytes")]
    BodyTooLarge(u64),

    /// Could not create the scratch file for the upload
    #[error("Failed to create temp file: {0}")]
    TempFileCreate(#[source] std::io::Error),

    /// Could not write the upload into the scratch file
    #[error("Failed to save file: {0}")]
    TempFileSave(#[source] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the error was caused by the caller's input rather than an
    /// internal failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::MethodNotAllowed(_)
                | Error::MissingFile(_)
                | Error::UnsupportedFileName(_)
                | Error::BodyTooLarge(_)
        )
    }

    /// Whether the error happened while delivering to the webhook.
    pub fn is_delivery_error(&self) -> bool {
        matches!(
            self,
            Error::ConfigError(_) | Error::NetworkError(_) | Error::WebhookStatus(_)
        )
    }
}
