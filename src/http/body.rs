//! Body length policy and incremental body reading.
//!
//! Once the header section is complete, [`BodyReader::prepare`] inspects the
//! headers to pick an encoding. [`BodyReader::process`] then moves body bytes
//! into the message until the declared length has been read.

use tracing::{debug, trace};

use crate::http::error::{HttpError, Result};
use crate::http::headers::HttpHeaders;
use crate::http::message::MessageKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    /// No policy selected yet
    Unknown,
    /// Length known up front, `remaining` bytes still to read
    Plain { remaining: usize },
    /// Response without a declared length, nominally delimited by the peer closing
    UntilClose,
}

#[derive(Debug)]
pub struct BodyReader {
    encoding: BodyEncoding,
}

impl Default for BodyReader {
    fn default() -> Self {
        Self::new()
    }
}

impl BodyReader {
    pub fn new() -> Self {
        Self {
            encoding: BodyEncoding::Unknown,
        }
    }

    pub fn encoding(&self) -> BodyEncoding {
        self.encoding
    }

    /// Selects the body encoding from a complete header section.
    ///
    /// `Content-Length` wins over `Transfer-Encoding`. A length above
    /// `max_body_size` is rejected here, before any body byte is read.
    pub fn prepare(
        &mut self,
        headers: &HttpHeaders,
        kind: MessageKind,
        max_body_size: usize,
    ) -> Result<()> {
        let length = headers.get("Content-Length");

        self.encoding = if !length.is_empty() {
            let malformed = || HttpError::MalformedContentLength(length.to_string());
            // digits only: `usize::from_str` would also take a leading `+`
            if !length.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            let size = length.parse::<usize>().map_err(|_| malformed())?;

            if size > max_body_size {
                return Err(HttpError::BodyTooLarge {
                    size,
                    limit: max_body_size,
                });
            }
            BodyEncoding::Plain { remaining: size }
        } else if headers.get("Transfer-Encoding") == "chunked" {
            return Err(HttpError::UnsupportedBodyEncoding("chunked".to_string()));
        } else {
            match kind {
                MessageKind::Request => BodyEncoding::Plain { remaining: 0 },
                MessageKind::Response => BodyEncoding::UntilClose,
            }
        };

        debug!(encoding = ?self.encoding, "body encoding selected");
        Ok(())
    }

    /// Moves up to the remaining number of body bytes from `buf` into `body`.
    ///
    /// Returns how many bytes were taken and whether the body is complete.
    pub fn process(&mut self, buf: &[u8], body: &mut Vec<u8>) -> Result<(usize, bool)> {
        match &mut self.encoding {
            // Read-until-close bodies are never read: the message ends with
            // its headers and any trailing bytes are left to the caller.
            BodyEncoding::UntilClose => {
                trace!("no declared body length, treating body as empty");
                Ok((0, true))
            }
            BodyEncoding::Plain { remaining } => {
                let processed = (*remaining).min(buf.len());
                body.extend_from_slice(&buf[..processed]);
                *remaining -= processed;
                Ok((processed, *remaining == 0))
            }
            BodyEncoding::Unknown => Err(HttpError::InternalEncodingError),
        }
    }
}
