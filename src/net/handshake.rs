//! Opening handshake validation and the responses that answer it.
//!
//! [`validate`] plays the part of a server's validation hook: it checks that
//! the request asks for a WebSocket upgrade, logs what the client sent, and
//! picks a sub-protocol. [`accept`] and [`reject`] build the reply.

use std::time::SystemTime;

use rustyshake::http::status::HttpStatus;
use rustyshake::http::{HttpMessage, HttpRequest, HttpResponse, HttpVersion};
use thiserror::Error;
use tracing::info;

use crate::net::accept::accept_key;

const SUPPORTED_WS_VERSION: &str = "13";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandshakeError {
    #[error("handshake must use GET, got {0}")]
    MethodNotAllowed(String),

    #[error("handshake requires HTTP/1.1 or later, got {0}")]
    HttpVersionNotSupported(String),

    #[error("missing or invalid {0} header")]
    MissingHeader(&'static str),

    #[error("unsupported WebSocket version {0:?}")]
    UnsupportedWebSocketVersion(String),
}

impl HandshakeError {
    pub fn into_http_status(self) -> HttpStatus {
        match self {
            HandshakeError::MethodNotAllowed(_) => HttpStatus::MethodNotAllowed,
            HandshakeError::HttpVersionNotSupported(_) => HttpStatus::HttpVersionNotSupported,
            HandshakeError::MissingHeader(_) => HttpStatus::BadRequest,
            HandshakeError::UnsupportedWebSocketVersion(_) => HttpStatus::UpgradeRequired,
        }
    }
}

/// What a valid handshake agreed on.
#[derive(Debug, PartialEq, Eq)]
pub struct Handshake {
    pub accept: String,
    pub subprotocol: Option<String>,
}

/// Checks an opening handshake request and selects a sub-protocol.
///
/// The first requested sub-protocol found in `supported` is selected; with an
/// empty `supported` list the first requested one is.
pub fn validate(req: &HttpRequest, supported: &[String]) -> Result<Handshake, HandshakeError> {
    if req.method() != "GET" {
        return Err(HandshakeError::MethodNotAllowed(req.method().to_string()));
    }

    match HttpVersion::parse(req.version()) {
        Some(v) if v >= HttpVersion::V1_1 => {}
        _ => {
            return Err(HandshakeError::HttpVersionNotSupported(
                req.version().to_string(),
            ));
        }
    }

    let upgrade = req.header("Upgrade");
    if !upgrade
        .split(',')
        .any(|p| p.trim().eq_ignore_ascii_case("websocket"))
    {
        return Err(HandshakeError::MissingHeader("Upgrade"));
    }

    let connection_upgrade = req
        .header_as_parameter_list("Connection")
        .is_some_and(|list| list.iter().any(|(t, _)| t.eq_ignore_ascii_case("upgrade")));
    if !connection_upgrade {
        return Err(HandshakeError::MissingHeader("Connection"));
    }

    let ws_version = req.header("Sec-WebSocket-Version");
    if ws_version != SUPPORTED_WS_VERSION {
        return Err(HandshakeError::UnsupportedWebSocketVersion(
            ws_version.to_string(),
        ));
    }

    let key = req.header("Sec-WebSocket-Key");
    if key.is_empty() {
        return Err(HandshakeError::MissingHeader("Sec-WebSocket-Key"));
    }

    info!("Cache-Control: {}", req.header("Cache-Control"));

    let requested: Vec<String> = req
        .header_as_parameter_list("Sec-WebSocket-Protocol")
        .unwrap_or_default()
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    for name in &requested {
        info!("Requested: {name}");
    }

    let subprotocol = requested
        .into_iter()
        .find(|name| supported.is_empty() || supported.contains(name));

    Ok(Handshake {
        accept: accept_key(key),
        subprotocol,
    })
}

/// `101 Switching Protocols` completing `handshake`.
pub fn accept(handshake: &Handshake, server_name: &str) -> HttpResponse {
    let mut res = base_response(HttpStatus::SwitchingProtocols, server_name);
    res.replace_header("Upgrade", "websocket");
    res.replace_header("Connection", "Upgrade");
    res.replace_header("Sec-WebSocket-Accept", &handshake.accept);
    if let Some(subprotocol) = &handshake.subprotocol {
        res.replace_header("Sec-WebSocket-Protocol", subprotocol);
    }
    res
}

/// Error reply closing the connection.
pub fn reject(status: HttpStatus, server_name: &str) -> HttpResponse {
    let mut res = base_response(status, server_name);
    res.replace_header("Connection", "close");
    if status == HttpStatus::UpgradeRequired {
        res.replace_header("Sec-WebSocket-Version", SUPPORTED_WS_VERSION);
    }
    res
}

fn base_response(status: HttpStatus, server_name: &str) -> HttpResponse {
    let mut res = HttpResponse::new();
    res.set_status(status.code());
    res.replace_header("Date", &httpdate::fmt_http_date(SystemTime::now()));
    res.replace_header("Server", server_name);
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handshake_request(extra: &[(&str, &str)]) -> HttpRequest {
        let mut req = HttpRequest::new();
        req.process_start_line("GET /chat HTTP/1.1").unwrap();
        for (name, value) in [
            ("Host", "server.example.com"),
            ("Upgrade", "websocket"),
            ("Connection", "keep-alive, Upgrade"),
            ("Sec-WebSocket-Key", "dGhlIHNhbXBsZSBub25jZQ=="),
            ("Sec-WebSocket-Version", "13"),
        ] {
            req.replace_header(name, value);
        }
        for (name, value) in extra {
            req.replace_header(name, value);
        }
        req
    }

    #[test]
    fn test_valid_handshake_selects_first_subprotocol() {
        let req = handshake_request(&[("Sec-WebSocket-Protocol", "chat, superchat")]);
        let handshake = validate(&req, &[]).unwrap();
        assert_eq!(handshake.accept, "s3pPLMBiTxaQ9kYGzzhZRbK+xOo=");
        assert_eq!(handshake.subprotocol.as_deref(), Some("chat"));
    }

    #[test]
    fn test_subprotocol_restricted_to_supported() {
        let req = handshake_request(&[("Sec-WebSocket-Protocol", "chat, superchat")]);
        let handshake = validate(&req, &["superchat".to_string()]).unwrap();
        assert_eq!(handshake.subprotocol.as_deref(), Some("superchat"));

        let handshake = validate(&req, &["mqtt".to_string()]).unwrap();
        assert_eq!(handshake.subprotocol, None);
    }

    #[test]
    fn test_no_subprotocol_requested() {
        let handshake = validate(&handshake_request(&[]), &[]).unwrap();
        assert_eq!(handshake.subprotocol, None);
    }

    #[test]
    fn test_rejections() {
        let mut req = handshake_request(&[]);
        req.set_method("POST").unwrap();
        assert_eq!(
            validate(&req, &[]),
            Err(HandshakeError::MethodNotAllowed("POST".to_string()))
        );

        let mut req = handshake_request(&[]);
        req.set_version("HTTP/1.0");
        assert!(matches!(
            validate(&req, &[]),
            Err(HandshakeError::HttpVersionNotSupported(_))
        ));

        let req = handshake_request(&[("Upgrade", "h2c")]);
        assert_eq!(
            validate(&req, &[]),
            Err(HandshakeError::MissingHeader("Upgrade"))
        );

        let req = handshake_request(&[("Connection", "close")]);
        assert_eq!(
            validate(&req, &[]),
            Err(HandshakeError::MissingHeader("Connection"))
        );

        let req = handshake_request(&[("Sec-WebSocket-Version", "8")]);
        let err = validate(&req, &[]).unwrap_err();
        assert_eq!(err.into_http_status(), HttpStatus::UpgradeRequired);

        let mut req = handshake_request(&[]);
        req.remove_header("Sec-WebSocket-Key");
        assert_eq!(
            validate(&req, &[]),
            Err(HandshakeError::MissingHeader("Sec-WebSocket-Key"))
        );
    }

    #[test]
    fn test_accept_response() {
        let handshake = Handshake {
            accept: "abc=".to_string(),
            subprotocol: Some("chat".to_string()),
        };
        let res = accept(&handshake, "rustyshake/test");
        assert_eq!(res.status_code(), 101);
        assert_eq!(res.status_msg(), "Switching Protocols");
        assert_eq!(res.header("Sec-WebSocket-Accept"), "abc=");
        assert_eq!(res.header("Sec-WebSocket-Protocol"), "chat");
        assert_eq!(res.header("Server"), "rustyshake/test");
        assert!(!res.header("Date").is_empty());

        let raw = String::from_utf8(res.raw()).unwrap();
        assert!(raw.starts_with("HTTP/1.1 101 Switching Protocols\r\n"));
        assert!(raw.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_reject_response() {
        let res = reject(HttpStatus::UpgradeRequired, "s");
        assert_eq!(res.status_code(), 426);
        assert_eq!(res.header("Sec-WebSocket-Version"), "13");
        assert_eq!(res.header("Connection"), "close");
        assert!(!res.headers().contains("Content-Length"));
    }
}
