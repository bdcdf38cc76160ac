use bytes::BytesMut;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tracing::{error, info};

use crate::http::parser;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::status::StatusTable;
use crate::http::writer::ResponseWriter;
use crate::server::router::{Handler, Router};

/// Per-read chunk size; also the threshold of the short-read framing
/// heuristic.
pub const READ_BUFFER_SIZE: usize = 4096;

/// Owns one accepted connection end-to-end: read, parse, route, invoke,
/// write, close. Exactly one request is served per connection and the
/// socket is always closed when `run` returns, whichever path was taken.
pub struct Connection {
    stream: TcpStream,
    buffer: BytesMut,
    state: ConnectionState,
    router: Arc<Router>,
    statuses: Arc<StatusTable>,
}

enum ConnectionState {
    Reading,
    Parsed(Request),
    ParseFailed,
    Routed(Request, Arc<dyn Handler>),
    Unrouted(Request),
    Handled(Request, Response),
    Responded,
    Closed,
}

impl Connection {
    pub fn new(stream: TcpStream, router: Arc<Router>, statuses: Arc<StatusTable>) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(READ_BUFFER_SIZE),
            state: ConnectionState::Reading,
            router,
            statuses,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        loop {
            let state = std::mem::replace(&mut self.state, ConnectionState::Closed);

            self.state = match state {
                ConnectionState::Reading => {
                    self.read_message().await?;

                    match parser::parse(&self.buffer) {
                        Ok(request) => ConnectionState::Parsed(request),
                        Err(e) => {
                            error!("Error parsing request: {:?}", e);
                            ConnectionState::ParseFailed
                        }
                    }
                }

                ConnectionState::Parsed(request) => {
                    match self.router.resolve(&request.method, &request.path) {
                        Some(handler) => ConnectionState::Routed(request, handler),
                        None => ConnectionState::Unrouted(request),
                    }
                }

                // Malformed input gets a minimal 400 before the close
                // rather than a silent drop.
                ConnectionState::ParseFailed => {
                    self.reject(400).await;
                    ConnectionState::Closed
                }

                ConnectionState::Unrouted(request) => {
                    info!("{} {} => 404 Not found", request.method, request.path);
                    self.reject(404).await;
                    ConnectionState::Closed
                }

                ConnectionState::Routed(request, handler) => {
                    let mut response = Response::new(Arc::clone(&self.statuses));
                    handler.handle(&request, &mut response);
                    ConnectionState::Handled(request, response)
                }

                ConnectionState::Handled(request, response) => {
                    match self.write_response(&response).await {
                        Ok(()) => {
                            info!(
                                "{} {} => Status {} {}",
                                request.method,
                                request.path,
                                response.status_code(),
                                response.status_text()
                            );
                            ConnectionState::Responded
                        }
                        Err(e) => {
                            // No retry on a short or failed write.
                            error!("Error sending data to client: {}", e);
                            ConnectionState::Closed
                        }
                    }
                }

                ConnectionState::Responded => ConnectionState::Closed,

                ConnectionState::Closed => break,
            }
        }

        Ok(())
    }

    /// Accumulates one request's worth of bytes.
    ///
    /// Reads in `READ_BUFFER_SIZE` chunks until the peer closes its write
    /// side or a short read signals end-of-message. Once the header
    /// terminator is buffered and a `Content-Length` header is present,
    /// reading continues until that many body bytes have arrived, so
    /// bodies landing exactly on a chunk boundary do not depend on the
    /// short-read heuristic.
    async fn read_message(&mut self) -> anyhow::Result<()> {
        let mut temp = [0u8; READ_BUFFER_SIZE];

        loop {
            let n = self.stream.read(&mut temp).await?;

            if n == 0 {
                // Client closed the write side
                break;
            }

            self.buffer.extend_from_slice(&temp[..n]);

            match parser::find_headers_end(&self.buffer) {
                Some(headers_end) => match parser::content_length_hint(&self.buffer) {
                    Some(content_length) => {
                        if self.buffer.len() >= headers_end + 4 + content_length {
                            break;
                        }
                    }
                    None => {
                        if n < READ_BUFFER_SIZE {
                            break;
                        }
                    }
                },
                None => {
                    if n < READ_BUFFER_SIZE {
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    /// Writes a minimal error response (default headers, no body) for the
    /// given status code. Failures here only end this connection sooner.
    async fn reject(&mut self, status_code: u16) {
        let mut response = Response::new(Arc::clone(&self.statuses));

        if let Err(e) = response.set_status(status_code) {
            error!("No status entry for rejection code {}: {:?}", status_code, e);
            return;
        }

        if let Err(e) = self.write_response(&response).await {
            error!("Error sending data to client: {}", e);
        }
    }

    async fn write_response(&mut self, response: &Response) -> anyhow::Result<()> {
        ResponseWriter::new(response)
            .write_to_stream(&mut self.stream)
            .await
    }
}
