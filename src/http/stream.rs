//! Drives a [`Parser`] from a buffered byte source, one line at a time.
//!
//! Each read stops after a `\n` or after [`LINE_BUFFER_CAP`] bytes, whichever
//! comes first. `read_until` keeps the delimiter, so the parser sees the byte
//! stream unchanged; longer lines simply arrive in several pieces.
//!
//! The adapters stop when the source is exhausted, when a read fails, when the
//! message is complete, or when the parser takes fewer bytes than were read.
//! In that last case the untaken bytes are dropped, so these adapters suit
//! sources that carry exactly one message.
//!
//! A failed read is not a parser error. Bytes the failed read had already
//! pulled from the source are still handed to the parser, then the adapter
//! returns the running total and leaves the parser where it stopped.

use std::io::{self, BufRead, Read};

use tracing::{trace, warn};

use crate::http::error::Result;
use crate::http::message::HttpMessage;
use crate::http::parser::Parser;

/// Most bytes handed to the parser per read.
pub const LINE_BUFFER_CAP: usize = 512;

impl<M: HttpMessage> Parser<M> {
    /// Feeds the parser from a blocking reader.
    ///
    /// Returns the total number of bytes consumed. Read errors end the loop
    /// and are logged; parser errors are returned.
    pub fn consume_reader<R: BufRead + ?Sized>(&mut self, reader: &mut R) -> Result<usize> {
        let mut total = 0;
        let mut line = Vec::with_capacity(LINE_BUFFER_CAP);

        while !self.is_done() {
            // `read_until` already retries interrupted reads
            let mut limited = Read::take(&mut *reader, LINE_BUFFER_CAP as u64);
            let read_failed = match limited.read_until(b'\n', &mut line) {
                Ok(_) => false,
                Err(e) => {
                    warn!("read error while parsing message: {e}");
                    true
                }
            };

            if !self.feed_line(&line, &mut total)? || read_failed {
                break;
            }
            line.clear();
        }

        Ok(total)
    }

    /// Async counterpart of [`consume_reader`](Parser::consume_reader).
    pub async fn consume_async_reader<R>(&mut self, reader: &mut R) -> Result<usize>
    where
        R: async_std::io::BufRead + Unpin + ?Sized,
    {
        let mut total = 0;
        let mut line = Vec::with_capacity(LINE_BUFFER_CAP);

        while !self.is_done() {
            let mut limited = async_std::io::ReadExt::take(&mut *reader, LINE_BUFFER_CAP as u64);
            let read = async_std::io::BufReadExt::read_until(&mut limited, b'\n', &mut line);
            let read_failed = match read.await {
                Ok(_) => false,
                // unlike std, async-std hands interrupted reads back to the
                // caller; bytes read so far stay in `line`
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("read error while parsing message: {e}");
                    true
                }
            };

            if !self.feed_line(&line, &mut total)? || read_failed {
                break;
            }
            line.clear();
        }

        Ok(total)
    }

    /// Hands one read to the parser. Returns whether reading should go on.
    fn feed_line(&mut self, line: &[u8], total: &mut usize) -> Result<bool> {
        if line.is_empty() {
            trace!("end of stream");
            return Ok(false);
        }

        let processed = self.consume(line)?;
        *total += processed;

        if processed != line.len() {
            trace!(read = line.len(), processed, "parser stopped short of the read");
            return Ok(false);
        }
        Ok(true)
    }
}
