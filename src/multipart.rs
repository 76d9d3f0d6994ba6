//! Inbound `multipart/form-data` parsing for the upload endpoint

use crate::{Error, Result};
use futures::stream;

/// A file part pulled out of an upload form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// File name as sent by the client (may contain directories)
    pub file_name: String,
    /// Raw file contents
    pub data: Vec<u8>,
}

/// Find the first file part named `field` in a multipart body.
///
/// Returns `Ok(None)` when the form parses but has no such file part (a
/// plain text field with the same name, or one sent with an empty
/// `filename`, does not count). A missing or
/// non-multipart content type and a malformed body are reported as
/// [`Error::MissingFile`].
pub fn read_file_field(content_type: Option<&str>, body: Vec<u8>, field: &str) -> Result<Option<UploadedFile>> {
    let content_type = content_type.ok_or_else(|| Error::MissingFile("request has no content type".into()))?;
    let boundary = multer::parse_boundary(content_type)
        .map_err(|e| Error::MissingFile(format!("not a multipart request: {}", e)))?;

    let body = stream::once(async move { Ok::<Vec<u8>, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(body, boundary);

    let found: Result<Option<UploadedFile>> = futures::executor::block_on(async move {
        while let Some(part) = multipart
            .next_field()
            .await
            .map_err(|e| Error::MissingFile(format!("malformed multipart body: {}", e)))?
        {
            if part.name() != Some(field) {
                continue;
            }
            let Some(file_name) = part.file_name().filter(|n| !n.is_empty()).map(str::to_owned) else {
                continue;
            };
            let data = part
                .bytes()
                .await
                .map_err(|e| Error::MissingFile(format!("failed to read part {:?}: {}", field, e)))?;
            return Ok(Some(UploadedFile {
                file_name,
                data: data.to_vec(),
            }));
        }
        Ok(None)
    });
    found
}

/// Last path component of a client supplied file name.
///
/// Both `/` and `\` count as separators so Windows style names reduce the
/// same way. A name ending in a separator yields an empty string.
pub fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}
