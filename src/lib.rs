//! # requestlog
//!
//! Request lifecycle logging for a minimal hyper-based HTTP framework.
//!
//! Wrap any [`Handler`] with [`middleware::request_log`] and every request
//! produces exactly two lines on the configured [`log::LogSink`]:
//!
//! ```text
//! 2017/03/13 14:20:57 [dc6efe7f] Started GET /goodbye for [::1]:62966
//! 2017/03/13 14:20:57 [dc6efe7f] Completed 200 OK in 237.884µs
//! ```
//!
//! ## How it works
//!
//! Handlers write their response through a [`ResponseWriter`]. The logging
//! middleware hands the inner handler an
//! [`ObservingWriter`](middleware::ObservingWriter) instead of the real one. It
//! forwards every call unchanged and records the status and body size on the
//! way through, so the completion line reports what was actually sent.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use http::Method;
//! use requestlog::middleware::request_log_default;
//! use requestlog::{Request, Response, Router, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), requestlog::Error> {
//!     let app = Router::new()
//!         .on(Method::GET,  "/users/{id}", get_user)
//!         .on(Method::POST, "/users",      create_user);
//!
//!     Server::bind("0.0.0.0:3000")?.serve(request_log_default(app)).await
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#))
//! }
//!
//! async fn create_user(req: Request) -> Response {
//!     if req.body().is_empty() {
//!         return Response::status(http::StatusCode::BAD_REQUEST);
//!     }
//!     Response::builder()
//!         .status(http::StatusCode::CREATED)
//!         .json(r#"{"id":"99"}"#)
//! }
//! ```

mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;
mod writer;

pub mod log;
pub mod middleware;

pub use error::Error;
pub use handler::{BoxFuture, BoxedHandler, Handler, IntoHandler};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder, status_text};
pub use router::Router;
pub use server::Server;
pub use writer::{ResponseBuffer, ResponseWriter};
