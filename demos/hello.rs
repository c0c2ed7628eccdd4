//! Two handlers behind the default request log.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example hello
//!
//! Try:
//!   curl http://localhost:8080/hello
//!   curl -H 'x-request-id: dc6efe7f' http://localhost:8080/goodbye
//!
//! stderr then shows, per request:
//!   2017/03/13 14:20:57 [dc6efe7f] Started GET /goodbye for 127.0.0.1:62966
//!   2017/03/13 14:20:57 [dc6efe7f] Completed 200 OK in 237.884µs
//!
//! Set `REQUESTLOG_SINK=tracing` to send the request log through the tracing
//! subscriber instead of plain stderr.

use std::sync::Arc;

use http::Method;
use requestlog::log::{LogSink, Logger, TracingSink};
use requestlog::middleware::request_log;
use requestlog::{Request, Router, Server};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), requestlog::Error> {
    tracing_subscriber::fmt::init();

    let app = Router::new()
        .on(Method::GET, "/hello",   hello)
        .on(Method::GET, "/goodbye", goodbye);

    let sink: Arc<dyn LogSink> = match std::env::var("REQUESTLOG_SINK").as_deref() {
        Ok("tracing") => Arc::new(TracingSink),
        _ => Arc::new(Logger::stderr()),
    };

    Server::bind("0.0.0.0:8080")?
        .serve(request_log(app, sink))
        .await
}

async fn hello(req: Request) -> String {
    info!("running hello handler");
    format!("Hello, {:?}\n", req.path())
}

async fn goodbye(req: Request) -> String {
    info!("running goodbye handler");
    format!("Goodbye, {:?}\n", req.path())
}
