//! The response-writing capability handed to every handler.
//!
//! A handler does not return bytes to the server directly. It receives a
//! `&mut dyn ResponseWriter` and writes through it: set headers, optionally
//! write a status, then write body bytes. Anything that implements the trait
//! can stand in for the server's own writer, which is how middleware observes
//! what a handler sends without changing it.
//!
//! The server's writer is [`ResponseBuffer`]. It follows the usual transport
//! rules:
//!
//! - The status and headers are committed by the first `write_header` call or
//!   the first `write` call, whichever comes first.
//! - `write` without a prior `write_header` commits `200 OK`.
//! - A second `write_header` is ignored (and reported via `tracing`).
//! - Header edits after commit never reach the wire.

use std::io;

use bytes::{Bytes, BytesMut};
use http::{HeaderMap, StatusCode};
use http_body_util::Full;
use tracing::warn;

// ── ResponseWriter ────────────────────────────────────────────────────────────

/// Writes an HTTP response on behalf of a handler.
///
/// Object safe: handlers take `&mut dyn ResponseWriter`. `Send` so a handler
/// future holding the writer can move between tokio worker threads.
pub trait ResponseWriter: Send {
    /// Mutable access to the header map that will be sent on commit.
    fn header(&mut self) -> &mut HeaderMap;

    /// Sends the status line and headers.
    fn write_header(&mut self, status: StatusCode);

    /// Writes body bytes, committing `200 OK` first if no status was written.
    /// Returns the number of bytes accepted.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;
}

// ── ResponseBuffer ────────────────────────────────────────────────────────────

/// In-memory [`ResponseWriter`] used by the server for every request.
///
/// The body is buffered and handed to hyper as a single `Full<Bytes>` once the
/// handler returns. Its accessors also make it a convenient recorder in tests.
#[derive(Debug, Default)]
pub struct ResponseBuffer {
    headers: HeaderMap,
    committed: Option<(StatusCode, HeaderMap)>,
    body: BytesMut,
}

impl ResponseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The committed status, or `None` if the handler has written nothing.
    pub fn status(&self) -> Option<StatusCode> {
        self.committed.as_ref().map(|(status, _)| *status)
    }

    /// Headers as they will be sent: the committed snapshot if there is one,
    /// otherwise the map the handler is still editing.
    pub fn headers(&self) -> &HeaderMap {
        match &self.committed {
            Some((_, headers)) => headers,
            None => &self.headers,
        }
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Converts the buffered response into a hyper response.
    ///
    /// A handler that wrote nothing produces `200 OK` with an empty body.
    pub fn into_response(self) -> http::Response<Full<Bytes>> {
        let (status, headers) = match self.committed {
            Some(sent) => sent,
            None => (StatusCode::OK, self.headers),
        };

        let mut response = http::Response::new(Full::new(self.body.freeze()));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }

    fn commit(&mut self, status: StatusCode) {
        self.committed = Some((status, self.headers.clone()));
    }
}

impl ResponseWriter for ResponseBuffer {
    fn header(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_header(&mut self, status: StatusCode) {
        if let Some((sent, _)) = &self.committed {
            warn!(sent = %sent, ignored = %status, "superfluous write_header call");
            return;
        }
        self.commit(status);
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.committed.is_none() {
            self.commit(StatusCode::OK);
        }
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }
}
