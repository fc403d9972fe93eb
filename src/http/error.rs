//! Failure kinds raised while parsing or building an HTTP message.
//!
//! Every kind is fatal for the message being parsed: the parser session that
//! produced it must be discarded. Each kind carries the status code a server
//! would answer with, see [`HttpError::status`].

use thiserror::Error;

use crate::http::status::HttpStatus;

pub type Result<T> = std::result::Result<T, HttpError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HttpError {
    /// Header name is empty or contains a non-token character
    #[error("Invalid header name: {0:?}")]
    InvalidHeaderName(String),

    /// Header line without a `:` separator, or not valid UTF-8.
    ///
    /// Values are stored as `String`, so obs-text bytes (0x80-0xFF) that do
    /// not form UTF-8, such as Latin-1 `caf\xe9`, fail here instead of being
    /// kept as opaque bytes.
    #[error("Invalid header line: {0:?}")]
    MalformedHeaderLine(String),

    #[error("Invalid start line: {0:?}")]
    MalformedStartLine(String),

    #[error("Unable to parse Content-Length header: {0:?}")]
    MalformedContentLength(String),

    #[error("Maximum header size exceeded: {size} bytes exceeds limit of {limit} bytes")]
    HeaderSectionTooLarge { size: usize, limit: usize },

    #[error("HTTP message body too large: {size} bytes exceeds limit of {limit} bytes")]
    BodyTooLarge { size: usize, limit: usize },

    /// A transfer coding the parser does not implement, such as `chunked`
    #[error("Unsupported body encoding: {0}")]
    UnsupportedBodyEncoding(String),

    /// Blank line where the start line was expected
    #[error("Incomplete message")]
    IncompleteMessage,

    /// Body bytes were offered before a body encoding was selected
    #[error("Unexpected body encoding")]
    InternalEncodingError,
}

impl HttpError {
    pub fn status(&self) -> HttpStatus {
        match self {
            HttpError::InvalidHeaderName(_)
            | HttpError::MalformedHeaderLine(_)
            | HttpError::MalformedStartLine(_)
            | HttpError::MalformedContentLength(_)
            | HttpError::IncompleteMessage => HttpStatus::BadRequest,
            HttpError::HeaderSectionTooLarge { .. } => HttpStatus::RequestHeaderFieldsTooLarge,
            HttpError::BodyTooLarge { .. } => HttpStatus::PayloadTooLarge,
            HttpError::UnsupportedBodyEncoding(_) => HttpStatus::NotImplemented,
            HttpError::InternalEncodingError => HttpStatus::InternalServerError,
        }
    }
}
