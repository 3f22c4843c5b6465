// ViewerContext Extractor - hands the middleware's ViewerContext to handlers

use crate::error::AppError;
use crate::infrastructure::viewer::ViewerContext;
use axum::{extract::FromRequestParts, http::request::Parts};
use std::sync::Arc;

/// Cheap-to-clone handle on the request's ViewerContext.
///
/// ```rust,ignore
/// async fn handler(vc: Vc, Json(data): Json<RequestData>) -> AppResult<impl IntoResponse> {
///     let user_id = vc.require_user()?;
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Vc(Arc<ViewerContext>);

// Deref so handlers can write vc.request_id, vc.require_user(), ...
impl std::ops::Deref for Vc {
    type Target = ViewerContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Vc
where
    S: Send + Sync,
{
    type Rejection = AppError;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let vc = parts
            .extensions
            .get::<Arc<ViewerContext>>()
            .map(|vc| Vc(vc.clone()))
            .ok_or_else(|| {
                AppError::Internal("ViewerContext missing - is the viewer middleware installed?".to_string())
            });

        async move { vc }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[tokio::test]
    async fn test_extracts_viewer_from_extensions() {
        let mut request = Request::new(());
        request
            .extensions_mut()
            .insert(Arc::new(ViewerContext::anonymous("test-request".to_string())));
        let (mut parts, _) = request.into_parts();

        let vc = Vc::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(vc.request_id, "test-request");
        assert!(!vc.is_authenticated());
    }

    #[tokio::test]
    async fn test_missing_viewer_is_internal_error() {
        let (mut parts, _) = Request::new(()).into_parts();
        let err = Vc::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
