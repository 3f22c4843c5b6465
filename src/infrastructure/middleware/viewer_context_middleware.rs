// ViewerContext Middleware - creates the ViewerContext from the bearer session token
// and injects it into request extensions

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    infrastructure::{database::SessionProvider, viewer::ViewerContext},
    models::current_time_millis,
};

/// Trait for application state that can resolve sessions
pub trait HasSessionProvider {
    fn sessions(&self) -> &Arc<dyn SessionProvider>;
}

/// Middleware that creates the request-scoped viewer context.
/// A missing, unknown or expired session yields an anonymous viewer. A failed lookup is
/// carried on the viewer and only fails routes that require a user.
pub async fn viewer_context_middleware<T>(
    State(app_state): State<T>,
    mut request: Request,
    next: Next,
) -> Response
where
    T: HasSessionProvider + Clone + Send + Sync + 'static,
{
    let token = extract_bearer_token(request.headers()).map(str::to_string);
    let viewer_context = create_viewer_context(token.as_deref(), app_state.sessions().as_ref()).await;

    request.extensions_mut().insert(viewer_context);

    next.run(request).await
}

/// Pull the session token out of an `Authorization: Bearer <token>` header
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let auth_str = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = auth_str.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

async fn create_viewer_context(token: Option<&str>, sessions: &dyn SessionProvider) -> Arc<ViewerContext> {
    let request_id = format!("req-{}", Uuid::new_v4());

    let Some(token) = token else {
        return Arc::new(ViewerContext::anonymous(request_id));
    };

    let viewer_context = match sessions.resolve_session(token, current_time_millis()).await {
        Ok(Some(user_id)) => {
            tracing::debug!(%request_id, %user_id, "resolved session");
            ViewerContext::authenticated_user(user_id, request_id)
        }
        Ok(None) => {
            tracing::debug!(%request_id, "unknown or expired session token");
            ViewerContext::anonymous(request_id)
        }
        Err(e) => {
            tracing::error!(%request_id, error = %e, "session lookup failed");
            ViewerContext::session_unavailable(e.to_string(), request_id)
        }
    };

    Arc::new(viewer_context)
}
