use crate::error::AppError;
use crate::utils::signature::secrets_match;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use secrecy::{ExposeSecret, Secret};

pub const SIGNATURE_HEADER: &str = "x-signature";

/// Shared-secret header check applied in front of the protected routes.
#[derive(Clone, Debug)]
pub struct SignatureConfig {
    pub secret: Secret<String>,
    pub excluded_paths: Vec<String>,
}

impl SignatureConfig {
    pub fn new(secret: Secret<String>) -> Self {
        Self {
            secret,
            excluded_paths: Vec::new(),
        }
    }

    pub fn exclude(mut self, path: impl Into<String>) -> Self {
        self.excluded_paths.push(path.into());
        self
    }

    fn is_excluded(&self, path: &str) -> bool {
        self.excluded_paths.iter().any(|p| path == p)
    }
}

pub async fn signature_validation_middleware<S>(
    State(state): State<S>,
    req: Request,
    next: Next,
) -> Result<Response, AppError>
where
    S: AsRef<SignatureConfig> + Clone + Send + Sync + 'static,
{
    let config = state.as_ref();

    if config.is_excluded(req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let presented = req
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    let Some(presented) = presented else {
        tracing::warn!(path = %req.uri().path(), "Missing signature header");
        return Err(AppError::Forbidden(anyhow::anyhow!("Invalid signature")));
    };

    if !secrets_match(config.secret.expose_secret(), presented) {
        tracing::warn!(path = %req.uri().path(), "Signature mismatch");
        return Err(AppError::Forbidden(anyhow::anyhow!("Invalid signature")));
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
    };
    use tower::ServiceExt;

    #[derive(Clone)]
    struct TestState(SignatureConfig);

    impl AsRef<SignatureConfig> for TestState {
        fn as_ref(&self) -> &SignatureConfig {
            &self.0
        }
    }

    fn app() -> Router {
        let state = TestState(
            SignatureConfig::new(Secret::new("s3cret".to_string())).exclude("/health"),
        );
        Router::new()
            .route("/protected", get(|| async { "ok" }))
            .route("/health", get(|| async { "ok" }))
            .layer(from_fn_with_state(
                state.clone(),
                signature_validation_middleware::<TestState>,
            ))
            .with_state(state)
    }

    async fn status_for(uri: &str, signature: Option<&str>) -> StatusCode {
        let mut builder = Request::builder().uri(uri);
        if let Some(signature) = signature {
            builder = builder.header("X-Signature", signature);
        }
        app()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_signature_middleware() {
        assert_eq!(status_for("/protected", Some("s3cret")).await, StatusCode::OK);
        assert_eq!(
            status_for("/protected", Some("wrong!")).await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(status_for("/protected", None).await, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_excluded_path_skips_check() {
        assert_eq!(status_for("/health", None).await, StatusCode::OK);
    }
}
