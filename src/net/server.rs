//! Opening handshake server.
//!
//! This module owns only the networking side of a handshake:
//! - accepting TCP connections,
//! - reading raw bytes from the network,
//! - writing the serialized reply back to the client.
//!
//! Parsing is delegated to [`RequestParser`], validation and the reply
//! itself to [`handshake`](crate::net::handshake).
//!
//! ## Connection flow
//!
//! 1. Accept a TCP connection
//! 2. Feed the stream to a [`RequestParser`] until the request is complete
//! 3. Validate the handshake and select a sub-protocol
//! 4. Write `101 Switching Protocols`, or an error status on failure
//! 5. Close the connection; message framing is not handled here

use std::io;

use async_std::io::BufReader;
use async_std::net::{TcpListener, TcpStream};
use async_std::prelude::*;
use async_std::task;
use rustyshake::config::config;
use rustyshake::http::{HttpError, HttpMessage, HttpRequest, HttpResponse, RequestParser};
use tracing::{debug, info, warn};

use crate::net::handshake;

pub struct Server;

/// Errors that can occur while reading and parsing a request from the stream
/// used to interrupt the flow and return appropriate responses.
enum ReadError {
    Io(io::Error),
    ConnectionClosed,
    Parser(HttpError),
}

impl Server {
    /// Binds to the configured address and port, then accepts connections
    /// forever, one task per client.
    pub async fn run(&self) -> io::Result<()> {
        let listener = TcpListener::bind((config().address, config().port)).await?;
        info!("listening on {}", listener.local_addr()?);

        let mut incoming = listener.incoming();
        while let Some(stream) = incoming.next().await {
            match stream {
                Ok(stream) => {
                    task::spawn(async move {
                        if let Err(err) = Self::handle_client(stream).await {
                            warn!("I/O error while writing response: {err}");
                        }
                    });
                }
                Err(err) => warn!("failed to accept connection: {err}"),
            }
        }

        Ok(())
    }

    /// Reads one request off the stream under the configured read timeout.
    async fn read_request(stream: &TcpStream) -> Result<HttpRequest, ReadError> {
        let mut parser = RequestParser::new(config().limits);
        let mut reader = BufReader::new(stream);

        let parsed = async_std::io::timeout(config().read_timeout, async {
            Ok::<_, io::Error>(parser.consume_async_reader(&mut reader).await)
        })
        .await
        .map_err(ReadError::Io)?;

        let consumed = parsed.map_err(ReadError::Parser)?;
        if !parser.is_done() {
            debug!(consumed, "connection closed before the request was complete");
            return Err(ReadError::ConnectionClosed);
        }

        Ok(parser.into_message())
    }

    async fn write_response(mut stream: &TcpStream, response: &HttpResponse) -> io::Result<()> {
        let raw = response.raw();
        async_std::io::timeout(config().write_timeout, async {
            stream.write_all(&raw).await?;
            stream.flush().await
        })
        .await
    }

    async fn handle_client(stream: TcpStream) -> io::Result<()> {
        let peer = stream.peer_addr().ok();
        let server_name = &config().server_name;

        let response = match Self::read_request(&stream).await {
            Ok(req) => match handshake::validate(&req, &config().subprotocols) {
                Ok(accepted) => {
                    info!(?peer, subprotocol = ?accepted.subprotocol, "handshake accepted");
                    handshake::accept(&accepted, server_name)
                }
                Err(err) => {
                    info!(?peer, "handshake rejected: {err}");
                    handshake::reject(err.into_http_status(), server_name)
                }
            },
            Err(ReadError::Io(err)) => {
                warn!(?peer, "I/O error while reading request: {err}");
                return Ok(());
            }
            Err(ReadError::ConnectionClosed) => return Ok(()),
            Err(ReadError::Parser(err)) => {
                info!(?peer, "malformed request: {err}");
                handshake::reject(err.status(), server_name)
            }
        };

        Self::write_response(&stream, &response).await
    }
}
