//! Behaviour shared by [`HttpRequest`](crate::http::request::HttpRequest) and
//! [`HttpResponse`](crate::http::response::HttpResponse).
//!
//! The two variants differ only in their start line and in how a missing
//! body length is read (see [`MessageKind`]). Everything else, header
//! handling and body bookkeeping included, is provided here.

use crate::http::error::{HttpError, Result};
use crate::http::headers::{HttpHeaders, is_lws};
use crate::http::params::ParameterList;

/// Which side of an exchange a message is, as far as body framing cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// No declared length means no body
    Request,
    /// No declared length means the body runs until the peer closes
    Response,
}

pub trait HttpMessage {
    const KIND: MessageKind;

    /// Parses the first line of the message, without its CRLF.
    fn process_start_line(&mut self, line: &str) -> Result<()>;

    fn headers(&self) -> &HttpHeaders;

    fn headers_mut(&mut self) -> &mut HttpHeaders;

    fn body(&self) -> &[u8];

    /// Raw body buffer. Writing through it skips the `Content-Length`
    /// bookkeeping of [`set_body`](HttpMessage::set_body).
    fn body_mut(&mut self) -> &mut Vec<u8>;

    fn version(&self) -> &str;

    fn set_version(&mut self, version: &str);

    /// Serializes the message: start line, headers, blank line, body.
    fn raw(&self) -> Vec<u8>;

    fn append_header(&mut self, name: &str, value: &str) -> Result<()> {
        self.headers_mut().append(name, value)
    }

    fn replace_header(&mut self, name: &str, value: &str) {
        self.headers_mut().replace(name, value);
    }

    fn remove_header(&mut self, name: &str) {
        self.headers_mut().remove(name);
    }

    fn header(&self, name: &str) -> &str {
        self.headers().get(name)
    }

    fn header_as_parameter_list(&self, name: &str) -> Option<ParameterList> {
        self.headers().get_as_parameter_list(name)
    }

    fn raw_headers(&self) -> String {
        self.headers().raw()
    }

    /// Sets the body and keeps `Content-Length` in sync with it.
    /// An empty body removes the header rather than writing `0`.
    fn set_body(&mut self, body: &[u8]) {
        if body.is_empty() {
            self.remove_header("Content-Length");
            self.body_mut().clear();
            return;
        }

        self.replace_header("Content-Length", &body.len().to_string());
        let buf = self.body_mut();
        buf.clear();
        buf.extend_from_slice(body);
    }

    /// Parses a `Name: Value` line, without its CRLF, into the header store.
    fn process_header(&mut self, line: &str) -> Result<()> {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| HttpError::MalformedHeaderLine(line.to_string()))?;

        self.append_header(name.trim_matches(is_lws), value.trim_matches(is_lws))
    }
}

/// Shared wire layout of both message variants.
pub(crate) fn serialize(start_line: [&str; 3], headers: &HttpHeaders, body: &[u8]) -> Vec<u8> {
    let headers = headers.raw();
    let [first, second, third] = start_line;

    let mut ret = Vec::with_capacity(
        first.len() + 1 + second.len() + 1 + third.len() + 2 + headers.len() + 2 + body.len(),
    );
    ret.extend_from_slice(first.as_bytes());
    ret.push(b' ');
    ret.extend_from_slice(second.as_bytes());
    ret.push(b' ');
    ret.extend_from_slice(third.as_bytes());
    ret.extend_from_slice(b"\r\n");
    ret.extend_from_slice(headers.as_bytes());
    ret.extend_from_slice(b"\r\n");
    ret.extend_from_slice(body);
    ret
}
