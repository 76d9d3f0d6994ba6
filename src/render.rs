//! Rendering HTML files to images
//!
//! The [`Renderer`] trait is the seam between the entry points and the
//! browser. [`ChromeRenderer`] (feature `cdp`) implements it with the
//! `headless_chrome` crate: one fresh browser per call, no reuse.

use crate::Result;
use std::path::Path;

/// Turns an HTML file on disk into encoded image bytes.
pub trait Renderer: Send + Sync {
    /// Render the file at `path` (absolute) and return the encoded image.
    fn render_file(&self, path: &Path) -> Result<Vec<u8>>;
}

impl<F> Renderer for F
where
    F: Fn(&Path) -> Result<Vec<u8>> + Send + Sync,
{
    fn render_file(&self, path: &Path) -> Result<Vec<u8>> {
        self(path)
    }
}

#[cfg(feature = "cdp")]
pub use cdp::ChromeRenderer;

#[cfg(feature = "cdp")]
mod cdp {
    use super::Renderer;
    use crate::{Error, RenderConfig, Result, ScreenshotFormat};
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as Base64Engine;
    use headless_chrome::browser::tab::Tab;
    use headless_chrome::protocol::cdp::Page;
    use headless_chrome::{Browser, LaunchOptions};
    use log::debug;
    use serde::Deserialize;
    use std::path::Path;
    use url::Url;

    // Full document extent, measured after load
    const CONTENT_SIZE_SCRIPT: &str = r#"
        (function() {
            const doc = document.documentElement;
            const body = document.body;
            return JSON.stringify({
                width: Math.max(doc.scrollWidth, body ? body.scrollWidth : 0, doc.clientWidth),
                height: Math.max(doc.scrollHeight, body ? body.scrollHeight : 0, doc.clientHeight)
            });
        })()
    "#;

    #[derive(Debug, Deserialize)]
    struct ContentSize {
        width: f64,
        height: f64,
    }

    /// CDP-based renderer (uses the `headless_chrome` crate)
    ///
    /// Each call launches headless Chrome, opens a tab on the file URL,
    /// resizes the window to the whole document and captures it. The
    /// browser process is dropped when the call returns.
    #[derive(Debug, Clone, Default)]
    pub struct ChromeRenderer {
        config: RenderConfig,
    }

    impl ChromeRenderer {
        pub fn new(config: RenderConfig) -> Self {
            Self { config }
        }

        pub fn config(&self) -> &RenderConfig {
            &self.config
        }

        fn launch(&self) -> Result<Browser> {
            let viewport = self.config.viewport;
            let launch_options = LaunchOptions::default_builder()
                .headless(true)
                .sandbox(self.config.sandbox)
                .window_size(Some((viewport.width, viewport.height)))
                .build()
                .map_err(|e| Error::InitializationError(format!("Failed to build launch options: {}", e)))?;

            Browser::new(launch_options)
                .map_err(|e| Error::InitializationError(format!("Failed to launch browser: {}", e)))
        }

        fn content_size(tab: &Tab) -> Result<ContentSize> {
            let eval = tab
                .evaluate(CONTENT_SIZE_SCRIPT, false)
                .map_err(|e| Error::RenderError(format!("Failed to measure page: {}", e)))?;

            let raw = eval
                .value
                .and_then(|v| v.as_str().map(str::to_owned))
                .ok_or_else(|| Error::RenderError("No value returned from page measurement".into()))?;

            serde_json::from_str(&raw)
                .map_err(|e| Error::RenderError(format!("Unexpected page measurement {:?}: {}", raw, e)))
        }
    }

    /// Full-page capture: the clip covers the whole document and Chrome is
    /// asked to paint beyond the layout viewport, so the window never has to
    /// grow.
    fn capture_command(config: &RenderConfig, size: &ContentSize) -> Page::CaptureScreenshot {
        let (format, quality) = match config.format() {
            ScreenshotFormat::Png => (Page::CaptureScreenshotFormatOption::Png, None),
            ScreenshotFormat::Jpeg => (
                Page::CaptureScreenshotFormatOption::Jpeg,
                Some(u32::from(config.quality)),
            ),
        };

        Page::CaptureScreenshot {
            format: Some(format),
            quality,
            clip: Some(Page::Viewport {
                x: 0.0,
                y: 0.0,
                width: size.width.max(1.0).ceil(),
                height: size.height.max(1.0).ceil(),
                scale: 1.0,
            }),
            from_surface: Some(true),
            capture_beyond_viewport: Some(true),
            optimize_for_speed: None,
        }
    }

    impl Renderer for ChromeRenderer {
        fn render_file(&self, path: &Path) -> Result<Vec<u8>> {
            let url = Url::from_file_path(path)
                .map_err(|_| Error::LoadError(format!("Not an absolute path: {}", path.display())))?;

            let browser = self.launch()?;
            let tab = browser
                .new_tab()
                .map_err(|e| Error::InitializationError(format!("Failed to create tab: {}", e)))?;

            tab.navigate_to(url.as_str())
                .map_err(|e| Error::LoadError(format!("Navigation failed: {}", e)))?;
            tab.wait_until_navigated()
                .map_err(|e| Error::LoadError(format!("Wait for navigation failed: {}", e)))?;

            let size = Self::content_size(&tab)?;
            debug!("Capturing {} at {}x{}", url, size.width, size.height);

            let capture = capture_command(&self.config, &size);
            let shot = tab
                .call_method(capture)
                .map_err(|e| Error::RenderError(format!("Screenshot failed: {}", e)))?;
            let data = STANDARD
                .decode(shot.data)
                .map_err(|e| Error::RenderError(format!("Screenshot is not valid base64: {}", e)))?;

            // Tab first, then the browser process
            drop(tab);
            drop(browser);
            Ok(data)
        }
    }

}
