//! Middleware layer.
//!
//! Middleware wraps a [`Handler`](crate::Handler) and returns another one, so
//! it composes with the router and with other middleware. It is the right
//! place for cross-cutting concerns that must not change what the wrapped
//! handler sends.
//!
//! Built-in middleware:
//! - [`request_log`] — a start and a completion line per request, with status
//!   and latency

mod request_log;

pub use request_log::{
    ObservingWriter, RequestLog, client_addr, completed_line, correlation_id, request_log,
    request_log_default, started_line,
};
