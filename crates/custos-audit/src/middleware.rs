//! Request middleware that populates the identity context.

use custos_core::{context, UserAccount};
use http::header::{HeaderMap, HeaderValue, IntoHeaderName};
use std::net::SocketAddr;
use tracing::trace;

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// The parts of an inbound request the audit layer needs.
#[derive(Debug, Clone, Default)]
pub struct Request {
    /// Authenticated user, `None` for anonymous requests.
    pub user: Option<UserAccount>,
    headers: HeaderMap,
    /// Address of the connected peer.
    pub remote_addr: Option<String>,
}

impl Request {
    /// Creates an anonymous request with no headers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures an `http` request.
    ///
    /// The user comes from a [`UserAccount`] extension placed by the
    /// authentication layer, the peer address from a [`SocketAddr`]
    /// extension.
    #[must_use]
    pub fn from_http<B>(request: &http::Request<B>) -> Self {
        let extensions = request.extensions();
        Self {
            user: extensions.get::<UserAccount>().cloned(),
            headers: request.headers().clone(),
            remote_addr: extensions.get::<SocketAddr>().map(|addr| addr.ip().to_string()),
        }
    }

    /// Sets the authenticated user.
    #[must_use]
    pub fn with_user(mut self, user: UserAccount) -> Self {
        self.user = Some(user);
        self
    }

    /// Appends a header value.
    #[must_use]
    pub fn with_header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Sets the peer address.
    #[must_use]
    pub fn with_remote_addr(mut self, addr: impl Into<String>) -> Self {
        self.remote_addr = Some(addr.into());
        self
    }

    /// Returns the request headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

/// Returns the client IP of a request.
///
/// Uses the last `X-Forwarded-For` entry (the one added by the nearest
/// proxy) when present, the peer address otherwise.
#[must_use]
pub fn client_ip(request: &Request) -> Option<String> {
    request
        .headers()
        .get_all(X_FORWARDED_FOR)
        .iter()
        .next_back()
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.rsplit(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(String::from)
        .or_else(|| request.remote_addr.clone())
}

/// Stores the request's user in the identity context, then hands the request
/// to the wrapped handler.
///
/// Place it after authentication so `Request::user` is populated.
///
/// # Examples
///
/// ```rust
/// use custos_audit::{Request, UserDetailsMiddleware};
/// use custos_core::{context, UserAccount};
///
/// let middleware = UserDetailsMiddleware::new(|_req: &Request| {
///     context::current_actor().map(|a| a.username)
/// });
///
/// let request = Request::new().with_user(UserAccount::new("alice"));
/// assert_eq!(middleware.call(&request).as_deref(), Some("alice"));
/// ```
#[derive(Debug, Clone)]
pub struct UserDetailsMiddleware<H> {
    get_response: H,
}

impl<H> UserDetailsMiddleware<H> {
    /// Wraps a handler.
    pub const fn new(get_response: H) -> Self {
        Self { get_response }
    }

    /// Handles one request.
    pub fn call<R>(&self, request: &Request) -> R
    where
        H: Fn(&Request) -> R,
    {
        set_actor_from_request(request);
        (self.get_response)(request)
    }
}

/// Stores the request's user (or `None`) as the current actor.
pub fn set_actor_from_request(request: &Request) {
    let actor = request.user.as_ref().map(UserAccount::identity);
    trace!(username = ?actor.as_ref().map(|a| &a.username), "Setting request actor");
    context::set_current_actor(actor);
}
