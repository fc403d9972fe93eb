pub mod body;
pub mod error;
pub mod headers;
pub mod message;
pub mod params;
pub mod parser;
pub mod request;
pub mod response;
pub mod status;
pub mod stream;

pub use error::HttpError;
pub use headers::HttpHeaders;
pub use message::{HttpMessage, MessageKind};
pub use parser::{Parser, ParserState, RequestParser, ResponseParser};
pub use request::HttpRequest;
pub use response::HttpResponse;
pub use status::HttpStatus;

/// All existing HTTP versions
/// Used to compare the version text of a parsed message, e.g. to require
/// HTTP/1.1 for an opening handshake.
#[derive(PartialEq, PartialOrd, Debug, Clone, Copy)]
pub enum HttpVersion {
    V0_9,
    V1_0,
    V1_1,
    V2_0,
    V3_0,
}

impl HttpVersion {
    /// Parses `HTTP/<major>.<minor>`, `None` for anything else
    pub fn parse(version: &str) -> Option<HttpVersion> {
        let (maj, min) = version.strip_prefix("HTTP/")?.split_once('.')?;
        match (maj.parse::<u8>().ok()?, min.parse::<u8>().ok()?) {
            (0, 9) => Some(HttpVersion::V0_9),
            (1, 0) => Some(HttpVersion::V1_0),
            (1, 1) => Some(HttpVersion::V1_1),
            (2, 0) => Some(HttpVersion::V2_0),
            (3, 0) => Some(HttpVersion::V3_0),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVersion::V0_9 => "HTTP/0.9",
            HttpVersion::V1_0 => "HTTP/1.0",
            HttpVersion::V1_1 => "HTTP/1.1",
            HttpVersion::V2_0 => "HTTP/2.0",
            HttpVersion::V3_0 => "HTTP/3.0",
        }
    }
}
