//! htmlshot
//!
//! Render an HTML file to an image with headless Chrome, then either write
//! the image to disk or deliver it to a chat webhook.
//!
//! # Features
//!
//! - **CDP Backend** (default): renders through the Chrome DevTools Protocol
//!   via headless Chrome (`cdp` feature)
//! - **Upload service**: a small HTTP endpoint that accepts an HTML upload,
//!   renders it and forwards the screenshot to a webhook
//! - **Seams for testing**: rendering and delivery sit behind the
//!   [`Renderer`] and [`Forwarder`] traits
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "cdp")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use htmlshot::{ChromeRenderer, RenderConfig, Renderer};
//!
//! let renderer = ChromeRenderer::new(RenderConfig::default());
//! let image = renderer.render_file(std::path::Path::new("/tmp/page.html"))?;
//! std::fs::write("page.png", image)?;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "cdp"))]
//! # fn main() {}
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod multipart;
pub mod render;
pub mod server;
pub mod webhook;

pub use multipart::UploadedFile;
pub use render::Renderer;
#[cfg(feature = "cdp")]
pub use render::ChromeRenderer;
pub use server::{UploadHandler, UploadServer};
pub use webhook::{Endpoint, Forwarder, WebhookForwarder};

/// The only file name the upload service accepts.
pub const ACCEPTED_FILE_NAME: &str = "hoge.html";

/// Multipart field carrying the uploaded HTML.
pub const UPLOAD_FIELD: &str = "file";

/// Environment variable holding the webhook URL.
pub const WEBHOOK_URL_ENV: &str = "DISCORD_WEBHOOK_URL";

/// Screenshot quality used when nothing else is configured.
pub const DEFAULT_QUALITY: u8 = 90;

/// Configuration for a render session
///
/// The defaults match what both entry points use out of the box: a
/// 1280x720 starting window, JPEG at quality 90 and the Chrome sandbox
/// enabled.
///
/// # Examples
///
/// ```
/// let cfg = htmlshot::RenderConfig::default();
/// assert_eq!(cfg.quality, 90);
/// assert_eq!(cfg.format(), htmlshot::ScreenshotFormat::Jpeg);
/// ```
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Window size the page is laid out in; the capture still covers the
    /// whole document
    pub viewport: Viewport,
    /// Screenshot quality in `0..=100`; 100 selects lossless PNG
    pub quality: u8,
    /// Whether Chrome runs with its sandbox (disable when running as root)
    pub sandbox: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            quality: DEFAULT_QUALITY,
            sandbox: true,
        }
    }
}

impl RenderConfig {
    /// Encoding picked for the screenshot.
    ///
    /// Quality 100 means lossless PNG, anything lower is JPEG at that
    /// quality.
    pub fn format(&self) -> ScreenshotFormat {
        if self.quality >= 100 {
            ScreenshotFormat::Png
        } else {
            ScreenshotFormat::Jpeg
        }
    }
}

/// Viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Image encoding of a captured screenshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenshotFormat {
    Png,
    Jpeg,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RenderConfig::default();
        assert_eq!(config.viewport.width, 1280);
        assert_eq!(config.viewport.height, 720);
        assert_eq!(config.quality, 90);
        assert!(config.sandbox);
    }

    #[test]
    fn test_format_from_quality() {
        let mut config = RenderConfig::default();
        assert_eq!(config.format(), ScreenshotFormat::Jpeg);
        config.quality = 100;
        assert_eq!(config.format(), ScreenshotFormat::Png);
        config.quality = 0;
        assert_eq!(config.format(), ScreenshotFormat::Jpeg);
    }
}
