use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use certmail_common::CertmailError;
use std::sync::Arc;
use tracing::debug;

/// Static shared-secret check for the `Authorization` header.
#[derive(Clone)]
pub struct BearerAuth {
    expected: Arc<str>,
}

impl BearerAuth {
    pub fn new(token: &str) -> Self {
        Self {
            expected: format!("Bearer {}", token).into(),
        }
    }

    pub fn is_authorized(&self, headers: &HeaderMap) -> bool {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value == &*self.expected)
    }
}

/// Rejects the request with 401 before the wrapped handler runs.
pub async fn require_bearer(
    State(auth): State<BearerAuth>,
    request: Request,
    next: Next,
) -> Result<Response, CertmailError> {
    if !auth.is_authorized(request.headers()) {
        debug!(
            method = %request.method(),
            path = %request.uri().path(),
            "missing or invalid bearer token"
        );
        return Err(CertmailError::Unauthorized);
    }
    Ok(next.run(request).await)
}
