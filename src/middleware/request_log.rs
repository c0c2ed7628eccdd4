//! Request lifecycle logging.
//!
//! [`RequestLog`] wraps a handler and writes two lines per request to a
//! [`LogSink`]: one before the handler runs, one after it returns.
//!
//! ```text
//! [dc6efe7f-cfe7-418c-baa3-7c0f80334572] Started GET /goodbye for [::1]:62966
//! [dc6efe7f-cfe7-418c-baa3-7c0f80334572] Completed 200 OK in 237.884µs
//! ```
//!
//! The bracketed id is the `X-Request-ID` header, omitted when absent. The
//! address is `X-Forwarded-For` when present, else the peer address. The
//! status and byte count come from an [`ObservingWriter`] handed to the inner
//! handler in place of the real writer.
//!
//! The completion line is written only after the inner handler returns. A
//! handler that hangs delays it indefinitely; one that panics never produces
//! it, and the panic propagates unchanged.

use std::borrow::Cow;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use http::{HeaderMap, Method, StatusCode};

use crate::handler::{BoxFuture, Handler};
use crate::log::{LogSink, Logger};
use crate::request::Request;
use crate::response::status_text;
use crate::writer::ResponseWriter;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REQUEST_ID: &str = "x-request-id";

// ── ObservingWriter ───────────────────────────────────────────────────────────

/// A [`ResponseWriter`] that forwards every call unchanged and records the
/// status and the number of body bytes written.
///
/// One instance per request. It holds no locks and is never shared.
pub struct ObservingWriter<'a> {
    inner: &'a mut dyn ResponseWriter,
    status: u16,
    size: usize,
}

impl<'a> ObservingWriter<'a> {
    pub fn new(inner: &'a mut dyn ResponseWriter) -> Self {
        Self { inner, status: 0, size: 0 }
    }

    /// The recorded status: the last `write_header` value, or `200` if the
    /// body was written first. `0` means nothing has been written yet.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Total body bytes the inner writer accepted.
    pub fn size(&self) -> usize {
        self.size
    }
}

impl ResponseWriter for ObservingWriter<'_> {
    fn header(&mut self) -> &mut HeaderMap {
        self.inner.header()
    }

    // Records every call, last one wins. The inner writer decides whether a
    // repeated header write means anything.
    fn write_header(&mut self, status: StatusCode) {
        self.inner.write_header(status);
        self.status = status.as_u16();
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.status == 0 {
            self.status = StatusCode::OK.as_u16();
        }
        let n = self.inner.write(buf)?;
        self.size += n;
        Ok(n)
    }
}

// ── RequestLog ────────────────────────────────────────────────────────────────

/// Middleware that logs a start and a completion line for every request.
///
/// Build with [`request_log`] or [`request_log_default`].
pub struct RequestLog<H> {
    inner: H,
    sink: Arc<dyn LogSink>,
}

/// Wraps `handler` so each request is logged to `sink`.
///
/// ```rust,no_run
/// use std::sync::Arc;
///
/// use http::Method;
/// use requestlog::log::Logger;
/// use requestlog::middleware::request_log;
/// use requestlog::{Request, Router, Server};
///
/// async fn hello(_req: Request) -> &'static str { "hello\n" }
///
/// # async fn run() -> Result<(), requestlog::Error> {
/// let app = Router::new().on(Method::GET, "/hello", hello);
/// let logger = Arc::new(Logger::stderr().prefix("web: "));
///
/// Server::bind("0.0.0.0:8080")?.serve(request_log(app, logger)).await
/// # }
/// ```
pub fn request_log<H: Handler>(handler: H, sink: Arc<dyn LogSink>) -> RequestLog<H> {
    RequestLog { inner: handler, sink }
}

/// Wraps `handler` with a request log writing to standard error with a
/// date and time prefix.
pub fn request_log_default<H: Handler>(handler: H) -> RequestLog<H> {
    request_log(handler, Arc::new(Logger::stderr()))
}

impl<H: Handler> Handler for RequestLog<H> {
    fn serve<'a>(&'a self, req: Request, w: &'a mut dyn ResponseWriter) -> BoxFuture<'a> {
        Box::pin(async move {
            let start = Instant::now();
            let mut rw = ObservingWriter::new(w);

            let id = correlation_id(&req).map(Cow::into_owned);
            let id = id.as_deref();
            let addr = client_addr(&req);
            self.sink.log_line(&started_line(id, req.method(), &req.decoded_path(), &addr));

            self.inner.serve(req, &mut rw).await;

            self.sink.log_line(&completed_line(id, rw.status(), start.elapsed()));
        })
    }
}

// ── Request details ───────────────────────────────────────────────────────────

/// The client address: `X-Forwarded-For` if set and non-empty, otherwise the
/// peer address (`""` if unknown).
pub fn client_addr(req: &Request) -> String {
    match req.header_text(X_FORWARDED_FOR) {
        Some(addr) if !addr.is_empty() => addr.into_owned(),
        _ => req.remote_addr().map(|a| a.to_string()).unwrap_or_default(),
    }
}

/// The caller-supplied `X-Request-ID`, if set and non-empty. Never generated.
pub fn correlation_id(req: &Request) -> Option<Cow<'_, str>> {
    req.header_text(X_REQUEST_ID).filter(|id| !id.is_empty())
}

// ── Line formatting ───────────────────────────────────────────────────────────

/// `[<id>] Started <METHOD> <PATH> for <addr>`
pub fn started_line(id: Option<&str>, method: &Method, path: &str, addr: &str) -> String {
    format!("{}Started {method} {path} for {addr}", id_prefix(id))
}

/// `[<id>] Completed <status> <status-text> in <elapsed>`
///
/// `elapsed` uses `Duration`'s debug format, e.g. `237.884µs` or `1.5ms`.
/// Long requests stay in seconds (`90s`), never `1m30s`.
pub fn completed_line(id: Option<&str>, status: u16, elapsed: Duration) -> String {
    format!("{}Completed {status} {} in {elapsed:?}", id_prefix(id), status_text(status))
}

fn id_prefix(id: Option<&str>) -> String {
    id.map(|id| format!("[{id}] ")).unwrap_or_default()
}
