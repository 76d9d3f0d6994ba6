//! The upload service: `POST /upload` -> render -> webhook
//!
//! Every request runs on its own thread and owns everything it touches (the
//! body, a temp file, one browser session). Nothing is shared between
//! requests except the read-only handler.

use crate::multipart::{base_name, read_file_field};
use crate::{Error, Forwarder, Renderer, Result, ACCEPTED_FILE_NAME, UPLOAD_FIELD};
use log::{debug, info, warn};
use std::io::{Read, Write};
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

/// Route served by [`UploadServer`].
pub const UPLOAD_PATH: &str = "/upload";

/// Body sent when an upload went all the way through.
pub const SUCCESS_BODY: &str = "File processed and sent to Discord";

const NOT_FOUND_BODY: &str = "404 page not found";

/// Largest upload body read into memory (32 MiB).
pub const DEFAULT_BODY_LIMIT: u64 = 32 << 20;

/// Validates an upload, renders it and forwards the image.
#[derive(Clone)]
pub struct UploadHandler {
    renderer: Arc<dyn Renderer>,
    forwarder: Arc<dyn Forwarder>,
    body_limit: u64,
}

impl UploadHandler {
    pub fn new<R, F>(renderer: R, forwarder: F) -> Self
    where
        R: Renderer + 'static,
        F: Forwarder + 'static,
    {
        Self {
            renderer: Arc::new(renderer),
            forwarder: Arc::new(forwarder),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Reject request bodies larger than `limit` bytes.
    pub fn with_body_limit(mut self, limit: u64) -> Self {
        self.body_limit = limit;
        self
    }

    /// Run one upload through the pipeline. The first failing step aborts.
    ///
    /// The temp file holding the upload is removed before this returns,
    /// whatever the outcome.
    pub fn process(&self, method: &Method, content_type: Option<&str>, body: Vec<u8>) -> Result<()> {
        if *method != Method::Post {
            return Err(Error::MethodNotAllowed(method.to_string()));
        }

        let upload = read_file_field(content_type, body, UPLOAD_FIELD)?
            .ok_or_else(|| Error::MissingFile(format!("no file in field {:?}", UPLOAD_FIELD)))?;

        if base_name(&upload.file_name) != ACCEPTED_FILE_NAME {
            return Err(Error::UnsupportedFileName(upload.file_name));
        }

        let mut scratch = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(".html")
            .tempfile()
            .map_err(Error::TempFileCreate)?;
        scratch
            .write_all(&upload.data)
            .and_then(|_| scratch.flush())
            .map_err(Error::TempFileSave)?;
        debug!("Saved {} bytes to {}", upload.data.len(), scratch.path().display());

        let image = self.renderer.render_file(scratch.path())?;
        self.forwarder.forward(&image)
    }

    /// Answer a raw HTTP request.
    pub fn handle(&self, mut request: Request) {
        let method = request.method().clone();
        let url = request.url().to_string();
        let path = url.split('?').next().unwrap_or_default();

        if path != UPLOAD_PATH {
            debug!("{} {} -> 404", method, url);
            respond(request, 404, &format!("{}\n", NOT_FOUND_BODY));
            return;
        }

        let content_type = request
            .headers()
            .iter()
            .find(|h| h.field.equiv("Content-Type"))
            .map(|h| h.value.as_str().to_string());

        let outcome = if method == Method::Post {
            read_body(request.as_reader(), self.body_limit)
                .and_then(|body| self.process(&method, content_type.as_deref(), body))
        } else {
            self.process(&method, content_type.as_deref(), Vec::new())
        };

        let (status, text) = match &outcome {
            Ok(()) => (200, SUCCESS_BODY.to_string()),
            Err(e) => {
                let (status, text) = reply_for(e);
                (status, format!("{}\n", text))
            }
        };

        match &outcome {
            Ok(()) => info!("{} {} -> {}", method, url, status),
            Err(e) if e.is_client_error() => info!("{} {} -> {}: {}", method, url, status, e),
            Err(e) => warn!("{} {} -> {}: {}", method, url, status, e),
        }

        respond(request, status, &text);
    }
}

/// Read at most `limit` bytes of body; anything longer is rejected.
fn read_body<R: Read>(reader: R, limit: u64) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut body)
        .map_err(|e| Error::MissingFile(format!("failed to read request body: {}", e)))?;
    if body.len() as u64 > limit {
        return Err(Error::BodyTooLarge(limit));
    }
    Ok(body)
}

/// Status code and plain-text message for a failed upload.
pub fn reply_for(err: &Error) -> (u16, &'static str) {
    match err {
        Error::MethodNotAllowed(_) => (405, "Invalid method"),
        Error::MissingFile(_) => (400, "Failed to read file"),
        Error::UnsupportedFileName(_) => (400, "Unsupported file name"),
        Error::BodyTooLarge(_) => (413, "Request body too large"),
        Error::TempFileCreate(_) => (500, "Failed to create temp file"),
        Error::TempFileSave(_) => (500, "Failed to save file"),
        e if e.is_delivery_error() => (500, "Failed to send to Discord"),
        _ => (500, "Failed to render HTML"),
    }
}

fn respond(request: Request, status: u16, text: &str) {
    let mut response = Response::from_string(text).with_status_code(StatusCode(status));
    if let Ok(header) = "Content-Type: text/plain; charset=utf-8".parse::<Header>() {
        response.add_header(header);
    }
    if let Err(e) = request.respond(response) {
        warn!("Failed to send response: {}", e);
    }
}

/// HTTP listener dispatching each request to an [`UploadHandler`] on its
/// own thread.
pub struct UploadServer {
    server: Server,
    handler: Arc<UploadHandler>,
}

impl UploadServer {
    pub fn bind<A: ToSocketAddrs>(addr: A, handler: UploadHandler) -> Result<Self> {
        let server = Server::http(addr).map_err(|e| Error::InitializationError(format!("Failed to bind listener: {}", e)))?;
        Ok(Self {
            server,
            handler: Arc::new(handler),
        })
    }

    /// Address actually bound (useful after binding port 0).
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Serve until the listener fails. Blocks the calling thread.
    pub fn run(self) {
        for request in self.server.incoming_requests() {
            let handler = Arc::clone(&self.handler);
            std::thread::spawn(move || handler.handle(request));
        }
    }
}
