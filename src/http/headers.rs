//! HTTP headers abstraction for [`HttpRequest`](crate::http::request::HttpRequest) and
//! [`HttpResponse`](crate::http::response::HttpResponse)
//!
//! Headers are stored in an ordered map to preserve insertion order, which is
//! also the order [`HttpHeaders::raw`] renders them in.
//!
//! Names are compared exactly as stored: `content-length` and `Content-Length`
//! are two distinct entries. A name maps to at most one value; repeated
//! [`append`](HttpHeaders::append) calls fold values into a single
//! comma-separated list.

use indexmap::IndexMap;

use crate::http::error::{HttpError, Result};
use crate::http::params::{self, ParameterList};

/// Returned by [`HttpHeaders::get`] for absent headers.
const EMPTY_HEADER: &str = "";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpHeaders {
    headers: IndexMap<String, String>,
}

impl HttpHeaders {
    pub fn new() -> Self {
        Self {
            headers: IndexMap::new(),
        }
    }

    /// Appends a value to a header.
    ///
    /// A first value is stored as is. A later value for the same name is joined
    /// to the stored one with `", "`, unless the stored value is empty, in which
    /// case it is replaced.
    pub fn append(&mut self, name: &str, value: &str) -> Result<()> {
        if name.is_empty() || !name.bytes().all(is_token_char) {
            return Err(HttpError::InvalidHeaderName(name.to_string()));
        }

        match self.headers.get_mut(name) {
            Some(existing) if !existing.is_empty() => {
                existing.push_str(", ");
                existing.push_str(value);
            }
            Some(existing) => *existing = value.to_string(),
            None => {
                self.headers.insert(name.to_string(), value.to_string());
            }
        }
        Ok(())
    }

    /// Sets a header, overwriting any stored value. The name is not validated.
    pub fn replace(&mut self, name: &str, value: &str) {
        self.headers.insert(name.to_string(), value.to_string());
    }

    pub fn remove(&mut self, name: &str) {
        self.headers.shift_remove(name);
    }

    /// Value of a header, or an empty string when absent.
    pub fn get(&self, name: &str) -> &str {
        self.headers
            .get(name)
            .map(String::as_str)
            .unwrap_or(EMPTY_HEADER)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.headers.contains_key(name)
    }

    /// Parses a header value as a parameter list such as
    /// `"foo; a=1, bar; b=\"x y\""`.
    ///
    /// Returns `None` if the header is absent, empty, or not a complete list.
    pub fn get_as_parameter_list(&self, name: &str) -> Option<ParameterList> {
        match self.headers.get(name) {
            Some(value) if !value.is_empty() => params::parse_parameter_list(value),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Renders every header as `Name: Value\r\n`, in insertion order.
    pub fn raw(&self) -> String {
        let mut result = String::new();
        for (name, value) in &self.headers {
            result.push_str(name);
            result.push_str(": ");
            result.push_str(value);
            result.push_str("\r\n");
        }
        result
    }
}

/// `tchar` from RFC 7230: visible ASCII except delimiters.
pub(crate) fn is_token_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

/// Linear white space: space or horizontal tab.
pub(crate) fn is_lws(c: char) -> bool {
    c == ' ' || c == '\t'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_folds_values() {
        let mut headers = HttpHeaders::new();
        headers.append("X-A", "1").unwrap();
        headers.append("X-A", "2").unwrap();
        assert_eq!(headers.get("X-A"), "1, 2");

        headers.replace("X-A", "z");
        assert_eq!(headers.get("X-A"), "z");
    }

    #[test]
    fn test_append_replaces_empty_value() {
        let mut headers = HttpHeaders::new();
        headers.append("X-A", "").unwrap();
        headers.append("X-A", "1").unwrap();
        assert_eq!(headers.get("X-A"), "1");
    }

    #[test]
    fn test_append_rejects_invalid_names() {
        let mut headers = HttpHeaders::new();
        assert_eq!(
            headers.append("Bad Name", "v"),
            Err(HttpError::InvalidHeaderName("Bad Name".to_string()))
        );
        assert!(headers.append("X(y)", "v").is_err());
        assert!(headers.append("", "v").is_err());
        assert!(headers.is_empty());
    }

    #[test]
    fn test_get_absent_is_empty() {
        let headers = HttpHeaders::new();
        assert_eq!(headers.get("Host"), "");
        assert!(!headers.contains("Host"));
    }

    #[test]
    fn test_remove() {
        let mut headers = HttpHeaders::new();
        headers.replace("Host", "example.com");
        headers.remove("Host");
        assert!(!headers.contains("Host"));
        headers.remove("Host");
    }

    #[test]
    fn test_names_are_case_sensitive() {
        // Names are not folded: HTTP treats these as one header, this store does not.
        let mut headers = HttpHeaders::new();
        headers.append("Content-Length", "5").unwrap();
        headers.append("content-length", "7").unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("Content-Length"), "5");
        assert_eq!(headers.get("content-length"), "7");
    }

    #[test]
    fn test_raw_keeps_insertion_order() {
        let mut headers = HttpHeaders::new();
        headers.append("Upgrade", "websocket").unwrap();
        headers.append("Connection", "Upgrade").unwrap();
        headers.replace("Host", "a");
        assert_eq!(
            headers.raw(),
            "Upgrade: websocket\r\nConnection: Upgrade\r\nHost: a\r\n"
        );
    }

    #[test]
    fn test_parameter_list_absent_or_empty() {
        let mut headers = HttpHeaders::new();
        assert!(headers.get_as_parameter_list("Cache-Control").is_none());
        headers.replace("Cache-Control", "");
        assert!(headers.get_as_parameter_list("Cache-Control").is_none());
    }

    #[test]
    fn test_parameter_list_from_header() {
        let mut headers = HttpHeaders::new();
        headers.replace(
            "Sec-WebSocket-Extensions",
            "permessage-deflate; client_max_window_bits, x-webkit-deflate-frame",
        );
        let list = headers
            .get_as_parameter_list("Sec-WebSocket-Extensions")
            .unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].0, "permessage-deflate");
        assert_eq!(list[0].1.get("client_max_window_bits").unwrap(), "");
        assert_eq!(list[1].0, "x-webkit-deflate-frame");
    }

    #[test]
    fn test_parameter_list_trailing_garbage() {
        let mut headers = HttpHeaders::new();
        headers.replace("Cache-Control", "no-cache, max-age=0");
        assert!(headers.get_as_parameter_list("Cache-Control").is_none());
    }
}
