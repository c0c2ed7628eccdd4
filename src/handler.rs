//! Handler traits and type erasure.
//!
//! # Two ways to write a handler
//!
//! Every handler ultimately implements [`Handler`]: it receives the request
//! and a `&mut dyn ResponseWriter` and writes its response through it. That
//! is the shape middleware needs, because it can hand the inner handler a
//! different writer than the one it was given.
//!
//! Most application code does not want to touch a writer, so any
//! `async fn(Request) -> impl IntoResponse` also works. [`IntoHandler`] wraps
//! such a function and writes its return value through the writer:
//!
//! ```text
//! async fn hello(req: Request) -> Response { … }   ← user writes this
//!        ↓ router.on(Method::GET, "/", hello)
//! hello.into_boxed_handler()                       ← IntoHandler blanket impl
//!        ↓
//! Arc::new(FnHandler(hello))                       ← implements Handler
//!        ↓  stored as BoxedHandler = Arc<dyn Handler>
//! handler.serve(req, writer)  at request time      ← one vtable dispatch
//!        ↓
//! hello(req).await.into_response().write_to(writer)
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::debug;

use crate::request::Request;
use crate::response::IntoResponse;
use crate::writer::ResponseWriter;

/// A heap-allocated, type-erased future that borrows the handler and the
/// writer for `'a`.
///
/// `Send` lets tokio move the future across worker threads.
pub type BoxFuture<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// A heap-allocated, type-erased handler shared across concurrent requests.
pub type BoxedHandler = Arc<dyn Handler>;

// ── Handler ───────────────────────────────────────────────────────────────────

/// Serves one request by writing a response through a [`ResponseWriter`].
///
/// Implement this directly when a handler needs the writer, typically for
/// middleware. The returned future must not outlive the borrowed writer.
///
/// ```rust
/// use http::StatusCode;
/// use requestlog::{BoxFuture, Handler, Request, ResponseWriter};
///
/// struct Teapot;
///
/// impl Handler for Teapot {
///     fn serve<'a>(&'a self, _req: Request, w: &'a mut dyn ResponseWriter) -> BoxFuture<'a> {
///         Box::pin(async move {
///             w.write_header(StatusCode::IM_A_TEAPOT);
///             let _ = w.write(b"short and stout\n");
///         })
///     }
/// }
/// ```
pub trait Handler: Send + Sync + 'static {
    fn serve<'a>(&'a self, req: Request, w: &'a mut dyn ResponseWriter) -> BoxFuture<'a>;
}

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn serve<'a>(&'a self, req: Request, w: &'a mut dyn ResponseWriter) -> BoxFuture<'a> {
        (**self).serve(req, w)
    }
}

// ── IntoHandler ───────────────────────────────────────────────────────────────

/// Implemented for every valid `async fn` route handler.
///
/// You never implement this yourself. It is automatically satisfied for any
/// `async fn` with the signature:
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
///
/// The trait is **sealed** (via the private `Sealed` supertrait): only the
/// blanket impl below can satisfy it. Types that need the writer implement
/// [`Handler`] instead.
pub trait IntoHandler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> IntoHandler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Newtype wrapper that holds an `async fn` handler and implements
/// [`Handler`] by writing its return value through the writer.
struct FnHandler<F>(F);

impl<F, Fut, R> Handler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn serve<'a>(&'a self, req: Request, w: &'a mut dyn ResponseWriter) -> BoxFuture<'a> {
        let fut = (self.0)(req);
        Box::pin(async move {
            if let Err(e) = fut.await.into_response().write_to(w) {
                debug!("response write failed: {e}");
            }
        })
    }
}
