//! Incoming HTTP request type.

use std::borrow::Cow;
use std::collections::HashMap;
use std::net::SocketAddr;

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};

/// An incoming HTTP request with its body already collected.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) uri: Uri,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
    pub(crate) remote_addr: Option<SocketAddr>,
}

impl Request {
    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// The peer address of the connection, if the request came off a socket.
    pub fn remote_addr(&self) -> Option<SocketAddr> { self.remote_addr }

    /// Case-insensitive header lookup. Returns the first value, or `None` if
    /// the header is missing or not visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Header lookup for values meant to be shown, not parsed. Bytes outside
    /// visible ASCII are decoded as UTF-8, lossily.
    pub fn header_text(&self, name: &str) -> Option<Cow<'_, str>> {
        self.headers.get(name).map(|v| String::from_utf8_lossy(v.as_bytes()))
    }

    /// The path with `%XX` escapes decoded (`/a%20b` → `/a b`). Malformed
    /// escapes are kept as-is and invalid UTF-8 is replaced.
    pub fn decoded_path(&self) -> Cow<'_, str> {
        let raw = self.path();
        if !raw.contains('%') {
            return Cow::Borrowed(raw);
        }

        let bytes = raw.as_bytes();
        let mut out = Vec::with_capacity(bytes.len());
        let mut i = 0;
        while i < bytes.len() {
            match (bytes[i], bytes.get(i + 1..i + 3)) {
                (b'%', Some(&[hi, lo])) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
                    out.push((hex_value(hi) << 4) | hex_value(lo));
                    i += 3;
                }
                (b, _) => {
                    out.push(b);
                    i += 1;
                }
            }
        }
        Cow::Owned(String::from_utf8_lossy(&out).into_owned())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Attaches the peer address. The server does this for every request;
    /// tests and embedders building requests by hand can do it too.
    pub fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}

/// Builds a [`Request`] from an `http` request whose body is already in memory.
///
/// ```rust
/// use bytes::Bytes;
/// use requestlog::Request;
///
/// let req = Request::from(
///     http::Request::get("/foo")
///         .header("x-request-id", "abc")
///         .body(Bytes::new())
///         .unwrap(),
/// );
/// assert_eq!(req.path(), "/foo");
/// assert_eq!(req.header("X-Request-ID"), Some("abc"));
/// ```
impl From<http::Request<Bytes>> for Request {
    fn from(req: http::Request<Bytes>) -> Self {
        let (parts, body) = req.into_parts();
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
            params: HashMap::new(),
            remote_addr: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use http::HeaderValue;

    use super::*;

    fn get(uri: &str) -> Request {
        Request::from(http::Request::get(uri).body(Bytes::new()).unwrap())
    }

    #[test]
    fn decoded_path_unescapes_percent_sequences() {
        assert_eq!(get("/a%20b/%C3%A9t%c3%a9").decoded_path(), "/a b/été");
        assert_eq!(get("/users/42?q=%20").decoded_path(), "/users/42");
    }

    #[test]
    fn decoded_path_keeps_malformed_escapes() {
        assert_eq!(get("/100%25").decoded_path(), "/100%");
        assert_eq!(get("/bad%zz/%4").decoded_path(), "/bad%zz/%4");
        assert_eq!(get("/%FF").decoded_path(), "/\u{FFFD}");
    }

    #[test]
    fn plain_path_is_borrowed() {
        let req = get("/plain");
        assert!(matches!(req.decoded_path(), Cow::Borrowed("/plain")));
    }

    #[test]
    fn header_text_keeps_utf8_values() {
        let req = Request::from(
            http::Request::get("/")
                .header("x-request-id", HeaderValue::from_bytes("réq-1".as_bytes()).unwrap())
                .body(Bytes::new())
                .unwrap(),
        );
        assert_eq!(req.header("x-request-id"), None);
        assert_eq!(req.header_text("X-Request-ID").as_deref(), Some("réq-1"));
        assert_eq!(req.header_text("x-forwarded-for"), None);
    }
}
