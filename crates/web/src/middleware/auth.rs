use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::common::RouteErrorResponse;

/// The token every resource request has to present. `None` leaves the
/// resources open.
#[derive(Debug, Clone, Default)]
pub struct ApiToken(Option<Arc<str>>);

impl ApiToken {
    pub fn new(token: Option<String>) -> Self {
        Self(token.map(Arc::from))
    }

    pub fn accepts(&self, presented: Option<&str>) -> bool {
        match (&self.0, presented) {
            (None, _) => true,
            (Some(expected), Some(presented)) => expected.as_ref() == presented,
            (Some(_), None) => false,
        }
    }
}

pub async fn require_token(
    State(token): State<ApiToken>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    req: Request,
    next: Next,
) -> Result<Response, RouteErrorResponse> {
    let presented = bearer.as_ref().map(|TypedHeader(auth)| auth.token());
    if !token.accepts(presented) {
        log::warn!("rejected unauthenticated {} {}", req.method(), req.uri().path());
        return Err(RouteErrorResponse::unauthorized()
            .with_method(req.method())
            .with_uri(req.uri().path()));
    }
    Ok(next.run(req).await)
}
