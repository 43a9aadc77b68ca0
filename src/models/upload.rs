//! Upload model.
//!
//! An `Upload` is the file part of an inbound `/file/{username}` request. It
//! lives only for the duration of that request and is relayed byte-for-byte.

use bytes::Bytes;

/// Content type used when neither the caller nor the filename tells us one
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// A file received from a caller, ready to be relayed
#[derive(Debug, Clone)]
pub struct Upload {
    /// Filename as sent by the caller
    pub filename: String,

    /// File bytes, untouched
    pub content: Bytes,

    /// Content type to forward
    pub content_type: String,
}

impl Upload {
    /// Build an upload, resolving the content type
    ///
    /// The declared content type wins; otherwise it is guessed from the
    /// filename, and failing that [`FALLBACK_CONTENT_TYPE`] is used.
    pub fn new(filename: String, content: Bytes, declared: Option<&str>) -> Self {
        let content_type = match declared {
            Some(ct) if !ct.trim().is_empty() => ct.to_string(),
            _ => mime_guess::from_path(&filename)
                .first_raw()
                .unwrap_or(FALLBACK_CONTENT_TYPE)
                .to_string(),
        };

        Self {
            filename,
            content,
            content_type,
        }
    }

    /// Size in bytes
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
