use crate::http::error::{HttpError, Result};
use crate::http::headers::{HttpHeaders, is_token_char};
use crate::http::message::{self, HttpMessage, MessageKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    method: String,
    uri: String,
    version: String,
    headers: HttpHeaders,
    body: Vec<u8>,
}

impl Default for HttpRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpRequest {
    pub fn new() -> Self {
        Self {
            method: "GET".to_string(),
            uri: "/".to_string(),
            version: "HTTP/1.1".to_string(),
            headers: HttpHeaders::new(),
            body: Vec::new(),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Sets the method, which must be a non-empty token.
    pub fn set_method(&mut self, method: &str) -> Result<()> {
        if method.is_empty() || !method.bytes().all(is_token_char) {
            return Err(HttpError::MalformedStartLine(method.to_string()));
        }
        self.method = method.to_string();
        Ok(())
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn set_uri(&mut self, uri: &str) {
        self.uri = uri.to_string();
    }
}

impl HttpMessage for HttpRequest {
    const KIND: MessageKind = MessageKind::Request;

    /// Request line: `METHOD SP TARGET SP VERSION`.
    fn process_start_line(&mut self, line: &str) -> Result<()> {
        let malformed = || HttpError::MalformedStartLine(line.to_string());

        let (method, rest) = line.split_once(' ').ok_or_else(malformed)?;
        let (uri, version) = rest.split_once(' ').ok_or_else(malformed)?;
        if uri.is_empty() || version.is_empty() {
            return Err(malformed());
        }

        self.set_method(method).map_err(|_| malformed())?;
        self.set_uri(uri);
        self.set_version(version);
        Ok(())
    }

    fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HttpHeaders {
        &mut self.headers
    }

    fn body(&self) -> &[u8] {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Vec<u8> {
        &mut self.body
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn set_version(&mut self, version: &str) {
        self.version = version.to_string();
    }

    fn raw(&self) -> Vec<u8> {
        message::serialize(
            [&self.method, &self.uri, &self.version],
            &self.headers,
            &self.body,
        )
    }
}
