//! Delivering rendered images to a chat webhook

use crate::{Error, Result, WEBHOOK_URL_ENV};
use log::{debug, info};
use reqwest::blocking::{multipart, Client};
use reqwest::StatusCode;

/// File name of the image part in the outgoing form.
pub const SCREENSHOT_FILE_NAME: &str = "screenshot.png";

/// Sends a rendered image somewhere.
pub trait Forwarder: Send + Sync {
    fn forward(&self, image: &[u8]) -> Result<()>;
}

impl<F> Forwarder for F
where
    F: Fn(&[u8]) -> Result<()> + Send + Sync,
{
    fn forward(&self, image: &[u8]) -> Result<()> {
        self(image)
    }
}

/// Where the webhook URL comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// A URL known up front
    Fixed(String),
    /// Name of an environment variable, read on every send
    Env(String),
}

impl Default for Endpoint {
    fn default() -> Self {
        Endpoint::Env(WEBHOOK_URL_ENV.to_string())
    }
}

impl Endpoint {
    /// Resolve the URL to post to.
    ///
    /// An unset or empty environment variable is a configuration error.
    pub fn resolve(&self) -> Result<String> {
        match self {
            Endpoint::Fixed(url) => Ok(url.clone()),
            Endpoint::Env(name) => match std::env::var(name) {
                Ok(url) if !url.trim().is_empty() => Ok(url),
                _ => Err(Error::ConfigError(format!("{} is not set", name))),
            },
        }
    }
}

/// Posts images as a multipart upload (field `file`, name `screenshot.png`).
///
/// Only 200 and 204 count as delivered; every other status, including the
/// remaining 2xx codes, is an error.
pub struct WebhookForwarder {
    endpoint: Endpoint,
    client: Client,
}

impl WebhookForwarder {
    pub fn new(endpoint: Endpoint) -> Self {
        Self::with_client(endpoint, Client::new())
    }

    /// Use a preconfigured HTTP client (proxies, TLS roots, timeouts).
    pub fn with_client(endpoint: Endpoint, client: Client) -> Self {
        Self { endpoint, client }
    }

    /// Forwarder reading `DISCORD_WEBHOOK_URL` at send time.
    pub fn from_env() -> Self {
        Self::new(Endpoint::default())
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

impl Default for WebhookForwarder {
    fn default() -> Self {
        Self::from_env()
    }
}

impl Forwarder for WebhookForwarder {
    fn forward(&self, image: &[u8]) -> Result<()> {
        let url = self.endpoint.resolve()?;

        let part = multipart::Part::bytes(image.to_vec())
            .file_name(SCREENSHOT_FILE_NAME)
            .mime_str("application/octet-stream")
            .map_err(|e| Error::Other(format!("Failed to build image part: {}", e)))?;
        let form = multipart::Form::new().part(crate::UPLOAD_FIELD, part);

        debug!("Posting {} byte image to webhook", image.len());
        let resp = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .map_err(|e| Error::NetworkError(format!("Webhook request failed: {}", e)))?;

        let status = resp.status();
        if status != StatusCode::OK && status != StatusCode::NO_CONTENT {
            return Err(Error::WebhookStatus(status.as_u16()));
        }

        info!("Delivered screenshot to webhook ({})", status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Endpoint, Error, Forwarder, WebhookForwarder};
    use std::sync::mpsc;
    use tiny_http::{Response, Server, StatusCode};

    /// One-shot webhook stub answering `status`; yields (content type, body).
    fn stub_webhook(status: u16) -> (String, mpsc::Receiver<(String, Vec<u8>)>) {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || {
            if let Ok(mut request) = server.recv() {
                let content_type = request
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("Content-Type"))
                    .map(|h| h.value.as_str().to_string())
                    .unwrap_or_default();
                let mut body = Vec::new();
                let _ = request.as_reader().read_to_end(&mut body);
                let _ = request.respond(Response::empty(StatusCode(status)));
                let _ = tx.send((content_type, body));
            }
        });

        (format!("http://{}/hook", addr), rx)
    }

    fn forwarder(url: String) -> WebhookForwarder {
        let client = reqwest::blocking::Client::builder().no_proxy().build().unwrap();
        WebhookForwarder::with_client(Endpoint::Fixed(url), client)
    }

    #[test]
    fn test_unset_env_is_config_error() {
        let forwarder = WebhookForwarder::new(Endpoint::Env("HTMLSHOT_TEST_UNSET_WEBHOOK".into()));
        let err = forwarder.forward(b"img").unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)), "got {:?}", err);
    }

    #[test]
    fn test_default_endpoint_env() {
        assert_eq!(Endpoint::default(), Endpoint::Env("DISCORD_WEBHOOK_URL".into()));
    }

    #[test]
    fn test_posts_multipart_image() {
        let (url, rx) = stub_webhook(200);
        let forwarder = forwarder(url);
        forwarder.forward(b"\x89PNG fake").unwrap();

        let (content_type, body) = rx.recv().unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
        let body = String::from_utf8_lossy(&body);
        assert!(body.contains("name=\"file\""));
        assert!(body.contains("filename=\"screenshot.png\""));
        assert!(body.contains("PNG fake"));
    }

    #[test]
    fn test_no_content_is_success() {
        let (url, _rx) = stub_webhook(204);
        forwarder(url).forward(b"img").unwrap();
    }

    #[test]
    fn test_other_statuses_fail() {
        for status in [201u16, 400, 500] {
            let (url, _rx) = stub_webhook(status);
            let err = forwarder(url).forward(b"img").unwrap_err();
            assert!(matches!(err, Error::WebhookStatus(s) if s == status), "got {:?}", err);
        }
    }

    #[test]
    fn test_unreachable_is_network_error() {
        // Bind then drop so nothing listens on the port
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let forwarder = forwarder(format!("http://{}/hook", addr));
        let err = forwarder.forward(b"img").unwrap_err();
        assert!(matches!(err, Error::NetworkError(_)), "got {:?}", err);
    }
}
