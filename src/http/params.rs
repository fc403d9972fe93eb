//! Parameter list grammar used by headers such as `Sec-WebSocket-Extensions`
//! and `Sec-WebSocket-Protocol`:
//!
//! ```text
//! list      = element *( "," element )
//! element   = token *( ";" attribute )
//! attribute = token [ "=" ( token / quoted-string ) ]
//! ```
//!
//! Linear white space is allowed around every delimiter.

use indexmap::IndexMap;

use crate::http::headers::is_token_char;

/// Attributes of one list element, in the order they appear.
pub type AttributeList = IndexMap<String, String>;

/// Elements of a parameter list with their attributes.
pub type ParameterList = Vec<(String, AttributeList)>;

/// Parses `input` as a complete parameter list.
///
/// Returns `None` if the input is empty or if any characters are left over
/// after the last element.
pub fn parse_parameter_list(input: &str) -> Option<ParameterList> {
    let mut cursor = Cursor::new(input.as_bytes());
    let mut list = ParameterList::new();

    loop {
        cursor.skip_lws();
        let name = cursor.token()?;
        let mut attributes = AttributeList::new();

        cursor.skip_lws();
        while cursor.eat(b';') {
            cursor.skip_lws();
            let attribute = cursor.token()?;
            cursor.skip_lws();

            let value = if cursor.eat(b'=') {
                cursor.skip_lws();
                match cursor.peek() {
                    Some(b'"') => cursor.quoted_string()?,
                    _ => cursor.token()?,
                }
            } else {
                String::new()
            };

            attributes.insert(attribute, value);
            cursor.skip_lws();
        }

        list.push((name, attributes));

        if cursor.is_at_end() {
            return Some(list);
        }
        if !cursor.eat(b',') {
            return None;
        }
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_lws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t')) {
            self.pos += 1;
        }
    }

    /// Non-empty run of token characters.
    fn token(&mut self) -> Option<String> {
        let start = self.pos;
        while self.peek().is_some_and(is_token_char) {
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        // token characters are ASCII
        Some(String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned())
    }

    /// Quoted string starting at the current `"`, with `\` escapes removed.
    fn quoted_string(&mut self) -> Option<String> {
        if !self.eat(b'"') {
            return None;
        }

        let mut value = Vec::new();
        loop {
            let b = self.peek()?;
            self.pos += 1;
            match b {
                b'"' => return String::from_utf8(value).ok(),
                b'\\' => {
                    value.push(self.peek()?);
                    self.pos += 1;
                }
                _ => value.push(b),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_token() {
        let list = parse_parameter_list("chat").unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].0, "chat");
        assert!(list[0].1.is_empty());
    }

    #[test]
    fn test_comma_separated_tokens() {
        let list = parse_parameter_list("chat, superchat ,v2.proto").unwrap();
        let names: Vec<&str> = list.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["chat", "superchat", "v2.proto"]);
    }

    #[test]
    fn test_attributes() {
        let list =
            parse_parameter_list("foo; a=1; b = \"x, y\"; flag, bar;c=\"q\\\"d\"").unwrap();
        assert_eq!(list.len(), 2);

        let (name, attributes) = &list[0];
        assert_eq!(name, "foo");
        assert_eq!(attributes.get("a").unwrap(), "1");
        assert_eq!(attributes.get("b").unwrap(), "x, y");
        assert_eq!(attributes.get("flag").unwrap(), "");
        let keys: Vec<&str> = attributes.keys().map(String::as_str).collect();
        assert_eq!(keys, ["a", "b", "flag"]);

        assert_eq!(list[1].1.get("c").unwrap(), "q\"d");
    }

    #[test]
    fn test_incomplete_lists_fail() {
        assert!(parse_parameter_list("").is_none());
        assert!(parse_parameter_list("   ").is_none());
        assert!(parse_parameter_list("a,").is_none());
        assert!(parse_parameter_list("a,,b").is_none());
        assert!(parse_parameter_list("a;").is_none());
        assert!(parse_parameter_list("a; b=").is_none());
        assert!(parse_parameter_list("a; b=\"open").is_none());
        assert!(parse_parameter_list("a b").is_none());
        assert!(parse_parameter_list("max-age=0").is_none());
    }

    #[test]
    fn test_surrounding_whitespace() {
        let list = parse_parameter_list("  a ; x=1 \t").unwrap();
        assert_eq!(list[0].0, "a");
        assert_eq!(list[0].1.get("x").unwrap(), "1");
    }
}
