//! Incremental HTTP/1.x message parser.
//!
//! A [`Parser`] is fed whatever byte chunks the transport happens to read, in
//! order, through [`Parser::consume`]. It never waits for more data: when a
//! chunk ends in the middle of a line the partial line is kept and the call
//! returns, to be resumed by the next call.
//!
//! ```text
//! StartLine --line--> Headers --line--> Headers
//!                        |
//!                   blank line
//!                        v
//!                      Body --declared length read--> Done
//! ```
//!
//! Any error moves the parser to `Failed` from whichever state it was in.
//!
//! Header bytes are buffered until the blank line. That buffer is dropped as
//! soon as the body phase starts, so at most one header section is held in
//! memory, and its size is capped by [`ParserLimits::max_header_size`].
//!
//! One parser reads one message. Any error is final: later calls return the
//! same error and leave the message untouched. Headers parsed before the
//! failure can still be inspected through [`Parser::message`].

use tracing::{debug, trace};

use crate::config::ParserLimits;
use crate::http::body::BodyReader;
use crate::http::error::{HttpError, Result};
use crate::http::message::HttpMessage;
use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;

const HEADER_DELIMITER: &[u8] = b"\r\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd)]
pub enum ParserState {
    StartLine,
    Headers,
    Body,
    Done,
    Failed,
}

pub struct Parser<M> {
    message: M,
    state: ParserState,
    /// Bytes of the header section not yet split into lines
    scratch: Option<Vec<u8>>,
    header_bytes: usize,
    body: BodyReader,
    limits: ParserLimits,
    error: Option<HttpError>,
}

pub type RequestParser = Parser<HttpRequest>;
pub type ResponseParser = Parser<HttpResponse>;

impl<M: HttpMessage + Default> Parser<M> {
    pub fn new(limits: ParserLimits) -> Self {
        Self::with_message(M::default(), limits)
    }
}

impl<M: HttpMessage> Parser<M> {
    /// Parses into `message`, whose start line and headers are overwritten or
    /// extended by what is read.
    pub fn with_message(message: M, limits: ParserLimits) -> Self {
        Self {
            message,
            state: ParserState::StartLine,
            scratch: Some(Vec::new()),
            header_bytes: 0,
            body: BodyReader::new(),
            limits,
            error: None,
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == ParserState::Done
    }

    pub fn message(&self) -> &M {
        &self.message
    }

    pub fn into_message(self) -> M {
        self.message
    }

    pub fn limits(&self) -> &ParserLimits {
        &self.limits
    }

    /// The error that ended the session, if any.
    pub fn error(&self) -> Option<&HttpError> {
        self.error.as_ref()
    }

    /// Feeds the next chunk of the message.
    ///
    /// Returns how many bytes of `buf` belong to this message. That is all of
    /// them until the body is complete; the first unconsumed byte starts
    /// whatever follows the message on the stream. A finished parser consumes
    /// nothing, and a failed one returns its error again.
    pub fn consume(&mut self, buf: &[u8]) -> Result<usize> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }

        let result = self.advance(buf);
        if let Err(err) = &result {
            debug!(state = ?self.state, "parse failed: {err}");
            self.state = ParserState::Failed;
            self.scratch = None;
            self.error = Some(err.clone());
        }
        result
    }

    fn advance(&mut self, buf: &[u8]) -> Result<usize> {
        match self.state {
            ParserState::Done | ParserState::Failed => return Ok(0),
            ParserState::Body => return self.process_body(buf),
            ParserState::StartLine | ParserState::Headers => {}
        }

        let mut scratch = self.scratch.take().unwrap_or_default();
        scratch.extend_from_slice(buf);

        let mut begin = 0;
        loop {
            let Some(len) = find_delimiter(&scratch[begin..]) else {
                // Partial line: keep it for the next call. It is part of the
                // header section, so it counts against the limit already.
                let tail = scratch.len() - begin;
                self.check_header_size(self.header_bytes + tail)?;

                scratch.drain(..begin);
                self.scratch = Some(scratch);
                return Ok(buf.len());
            };

            let end = begin + len;
            self.header_bytes += len + HEADER_DELIMITER.len();
            self.check_header_size(self.header_bytes)?;

            if len == 0 {
                if self.state == ParserState::StartLine {
                    return Err(HttpError::IncompleteMessage);
                }

                // The old scratch tail never holds a whole delimiter, so the
                // blank line ends inside `buf`.
                let rest = scratch.len() - (end + HEADER_DELIMITER.len());
                let read = buf.len() - rest;
                drop(scratch);

                self.body.prepare(
                    self.message.headers(),
                    M::KIND,
                    self.limits.max_body_size,
                )?;
                self.state = ParserState::Body;
                debug!(header_bytes = self.header_bytes, "header section complete");

                return Ok(read + self.process_body(&buf[read..])?);
            }

            let line = &scratch[begin..end];
            match self.state {
                ParserState::StartLine => {
                    let line = std::str::from_utf8(line).map_err(|_| {
                        HttpError::MalformedStartLine(String::from_utf8_lossy(line).into_owned())
                    })?;
                    self.message.process_start_line(line)?;
                    self.state = ParserState::Headers;
                    trace!(start_line = line, "start line parsed");
                }
                _ => {
                    let line = std::str::from_utf8(line).map_err(|_| {
                        HttpError::MalformedHeaderLine(String::from_utf8_lossy(line).into_owned())
                    })?;
                    self.message.process_header(line)?;
                }
            }

            begin = end + HEADER_DELIMITER.len();
        }
    }

    fn process_body(&mut self, buf: &[u8]) -> Result<usize> {
        let (processed, done) = self.body.process(buf, self.message.body_mut())?;
        if done {
            self.state = ParserState::Done;
            trace!(body_len = self.message.body().len(), "message complete");
        }
        Ok(processed)
    }

    fn check_header_size(&self, size: usize) -> Result<()> {
        if size > self.limits.max_header_size {
            return Err(HttpError::HeaderSectionTooLarge {
                size,
                limit: self.limits.max_header_size,
            });
        }
        Ok(())
    }
}

fn find_delimiter(haystack: &[u8]) -> Option<usize> {
    haystack
        .windows(HEADER_DELIMITER.len())
        .position(|w| w == HEADER_DELIMITER)
}
