//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. The router is itself a
//! [`Handler`], so it can be wrapped by middleware like any other handler.

use std::collections::HashMap;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;
use tracing::debug;

use crate::handler::{BoxFuture, BoxedHandler, Handler, IntoHandler};
use crate::request::Request;
use crate::response::Response;
use crate::writer::ResponseWriter;

/// The application router.
///
/// Build it once at startup; pass it (or middleware wrapping it) to
/// [`Server::serve`](crate::Server::serve). Each registration returns `self`
/// so calls chain naturally. Unmatched requests get `404 Not Found`.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register an `async fn` handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax — `req.param("name")` retrieves them:
    ///
    /// ```rust
    /// # use http::Method;
    /// # use requestlog::{Request, Response, Router};
    /// # async fn get_user(_: Request) -> Response { Response::text("") }
    /// # async fn create_user(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::GET,  "/users/{id}", get_user)
    ///     .on(Method::POST, "/users",      create_user);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route pattern or conflicts with an
    /// existing route for the same method.
    pub fn on(self, method: Method, path: &str, handler: impl IntoHandler) -> Self {
        self.add(method, path, handler.into_boxed_handler())
    }

    /// Register a [`Handler`] implementation for a method + path pair.
    ///
    /// # Panics
    ///
    /// Same conditions as [`Router::on`].
    pub fn handle(self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.add(method, path, std::sync::Arc::new(handler))
    }

    fn add(mut self, method: Method, path: &str, handler: BoxedHandler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(&BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((matched.value, params))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

impl Handler for Router {
    fn serve<'a>(&'a self, mut req: Request, w: &'a mut dyn ResponseWriter) -> BoxFuture<'a> {
        match self.lookup(req.method(), req.path()) {
            Some((handler, params)) => {
                req.params = params;
                handler.serve(req, w)
            }
            None => Box::pin(async move {
                debug!(method = %req.method(), path = req.path(), "no route matched");
                if let Err(e) = Response::status(StatusCode::NOT_FOUND).write_to(w) {
                    debug!("response write failed: {e}");
                }
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::writer::ResponseBuffer;

    fn request(method: Method, path: &str) -> Request {
        Request::from(
            http::Request::builder()
                .method(method)
                .uri(path)
                .body(Bytes::new())
                .unwrap(),
        )
    }

    async fn get_user(req: Request) -> String {
        format!("user {}", req.param("id").unwrap_or("?"))
    }

    #[tokio::test]
    async fn routes_by_method_and_path() {
        let router = Router::new().on(Method::GET, "/users/{id}", get_user);

        let mut buf = ResponseBuffer::new();
        router.serve(request(Method::GET, "/users/42"), &mut buf).await;
        assert_eq!(buf.status(), Some(StatusCode::OK));
        assert_eq!(buf.body(), b"user 42");
    }

    #[tokio::test]
    async fn unmatched_request_is_not_found() {
        let router = Router::new().on(Method::GET, "/users/{id}", get_user);

        let mut buf = ResponseBuffer::new();
        router.serve(request(Method::POST, "/users/42"), &mut buf).await;
        assert_eq!(buf.status(), Some(StatusCode::NOT_FOUND));

        let mut buf = ResponseBuffer::new();
        router.serve(request(Method::GET, "/nope"), &mut buf).await;
        assert_eq!(buf.status(), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn conflicting_route_panics() {
        let _ = Router::new()
            .on(Method::GET, "/users/{id}", get_user)
            .on(Method::GET, "/users/{id}", get_user);
    }
}
