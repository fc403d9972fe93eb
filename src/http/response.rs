use crate::http::error::{HttpError, Result};
use crate::http::headers::HttpHeaders;
use crate::http::message::{self, HttpMessage, MessageKind};
use crate::http::status::{HttpStatus, reason_phrase};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    version: String,
    status_code: u16,
    status_msg: String,
    headers: HttpHeaders,
    body: Vec<u8>,
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpResponse {
    pub fn new() -> Self {
        Self {
            version: "HTTP/1.1".to_string(),
            status_code: HttpStatus::Ok.code(),
            status_msg: HttpStatus::Ok.reason().to_string(),
            headers: HttpHeaders::new(),
            body: Vec::new(),
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn status_msg(&self) -> &str {
        &self.status_msg
    }

    /// Sets the status code along with its canonical reason phrase.
    pub fn set_status(&mut self, code: u16) {
        self.status_code = code;
        self.status_msg = reason_phrase(code).to_string();
    }

    pub fn set_status_with_message(&mut self, code: u16, msg: &str) {
        self.status_code = code;
        self.status_msg = msg.to_string();
    }
}

impl HttpMessage for HttpResponse {
    const KIND: MessageKind = MessageKind::Response;

    /// Status line: `VERSION SP CODE SP MESSAGE`.
    ///
    /// The message is everything after the second space and may itself
    /// contain spaces or be empty, but the second space is mandatory.
    fn process_start_line(&mut self, line: &str) -> Result<()> {
        let malformed = || HttpError::MalformedStartLine(line.to_string());

        let (version, rest) = line.split_once(' ').ok_or_else(malformed)?;
        let (code, msg) = rest.split_once(' ').ok_or_else(malformed)?;
        let code = code.parse::<u16>().map_err(|_| malformed())?;

        self.set_version(version);
        self.set_status_with_message(code, msg);
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

    // HTTP/<major>.<minor> <status> <reason>\r\n
    // <header_name>: <header_value>\r\n
    // ...
    // \r\n
    // <body>
    fn raw(&self) -> Vec<u8> {
        let code = self.status_code.to_string();
        message::serialize(
            [&self.version, &code, &self.status_msg],
            &self.headers,
            &self.body,
        )
    }
}
