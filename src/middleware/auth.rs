//! API Key authentication middleware.
//!
//! Callers authenticate with a single shared secret sent in the `x-api-key`
//! header. The secret is compared verbatim; it is not hashed or rotated.
//!
//! The layer is installed with `route_layer` on the protected routes only,
//! so public routes (`/`, `/health`) never see it and rejected requests are
//! answered before their body is read.
//!
//! # Example
//!
//! ```rust,ignore
//! let auth = ApiKeyAuth::new(&config.auth);
//! let app = Router::new()
//!     .route("/click", post(click))
//!     .route_layer(auth.layer());
//! ```

use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use std::{
    sync::Arc,
    task::{Context, Poll},
};
use tower::{Layer, Service};
use tracing::{debug, warn};

use crate::config::AuthConfig;
use crate::error::AppError;
use crate::services::API_KEY_HEADER;

const REJECTION: &str =
    "Invalid or missing API key for this server. Provide the key in the 'x-api-key' header.";

/// API key authenticator
#[derive(Clone)]
pub struct ApiKeyAuth {
    expected: Arc<str>,
}

impl ApiKeyAuth {
    /// Create a new API key authenticator from configuration
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            expected: Arc::from(config.api_key.as_str()),
        }
    }

    /// Create a Tower Layer for this authenticator
    pub fn layer(&self) -> ApiKeyAuthLayer {
        ApiKeyAuthLayer {
            auth: self.clone(),
        }
    }

    /// Check a presented key
    fn validate_key(&self, key: Option<&str>) -> bool {
        matches!(key, Some(key) if !self.expected.is_empty() && key == &*self.expected)
    }
}

/// Tower Layer for API key authentication
#[derive(Clone)]
pub struct ApiKeyAuthLayer {
    auth: ApiKeyAuth,
}

impl<S> Layer<S> for ApiKeyAuthLayer {
    type Service = ApiKeyAuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ApiKeyAuthMiddleware {
            inner,
            auth: self.auth.clone(),
        }
    }
}

/// API key authentication middleware service
#[derive(Clone)]
pub struct ApiKeyAuthMiddleware<S> {
    inner: S,
    auth: ApiKeyAuth,
}

impl<S> Service<Request<Body>> for ApiKeyAuthMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let path = req.uri().path().to_string();
        let presented = extract_api_key(&req).map(str::to_owned);

        if self.auth.validate_key(presented.as_deref()) {
            debug!(path = %path, "API key authentication successful");
            let mut inner = self.inner.clone();
            return Box::pin(async move { inner.call(req).await });
        }

        if presented.is_some() {
            warn!(path = %path, "Invalid API key");
        } else {
            warn!(path = %path, "Missing API key");
        }

        Box::pin(async move {
            Ok::<_, S::Error>(AppError::unauthorized(REJECTION).into_response())
        })
    }
}

/// Extract API key from the `x-api-key` header
fn extract_api_key<B>(req: &Request<B>) -> Option<&str> {
    req.headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
}
