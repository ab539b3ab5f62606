//! Identity middleware resolving the session user on every request.
//!
//! [`ResolveIdentity`] reads the `user_id` stored in the session, asks an
//! [`IdentityResolver`] for the matching user and stores the resulting
//! [`Identity`] in the request extensions. It never rejects a request:
//! unreadable sessions and store faults degrade to
//! [`Identity::Anonymous`]. Handlers read the result through
//! [`CurrentIdentity`].
//!
//! Must be registered inside the session middleware, i.e. wrapped before it.

use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};

use actix_session::SessionExt;
use actix_web::dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::warn;

use crate::domain::Identity;
use crate::domain::ports::IdentityResolver;
use crate::inbound::http::session::SessionContext;

/// Middleware factory attaching an [`Identity`] to each request.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use actix_web::App;
/// use listings::domain::ports::AnonymousIdentityResolver;
/// use listings::middleware::ResolveIdentity;
///
/// let _app = App::new().wrap(ResolveIdentity::new(Arc::new(AnonymousIdentityResolver)));
/// ```
#[derive(Clone)]
pub struct ResolveIdentity {
    resolver: Arc<dyn IdentityResolver>,
}

impl ResolveIdentity {
    /// Wrap services so each request resolves its identity via `resolver`.
    pub fn new(resolver: Arc<dyn IdentityResolver>) -> Self {
        Self { resolver }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ResolveIdentity
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = ResolveIdentityMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ResolveIdentityMiddleware {
            service: Rc::new(service),
            resolver: Arc::clone(&self.resolver),
        }))
    }
}

/// Service wrapper produced by [`ResolveIdentity`].
pub struct ResolveIdentityMiddleware<S> {
    service: Rc<S>,
    resolver: Arc<dyn IdentityResolver>,
}

impl<S, B> Service<ServiceRequest> for ResolveIdentityMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let resolver = Arc::clone(&self.resolver);
        Box::pin(async move {
            let session = SessionContext::new(req.get_session());
            let user_id = session.user_id().unwrap_or_else(|error| {
                warn!(%error, "unreadable session; continuing anonymously");
                None
            });
            let identity = resolver.resolve(user_id).await;
            req.extensions_mut().insert(identity);
            service.call(req).await
        })
    }
}

/// Extractor yielding the [`Identity`] attached by [`ResolveIdentity`].
///
/// Defaults to [`Identity::Anonymous`] when the middleware is not installed.
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub Identity);

impl CurrentIdentity {
    /// Unwrap the resolved identity.
    pub fn into_inner(self) -> Identity {
        self.0
    }
}

impl FromRequest for CurrentIdentity {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let identity = req
            .extensions()
            .get::<Identity>()
            .cloned()
            .unwrap_or_default();
        ready(Ok(Self(identity)))
    }
}
