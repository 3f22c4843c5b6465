// Comment Interface - HTTP surface for the comment procedures and the theme data

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Path, Request, State},
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{get, patch, post},
    Router,
};
use serde::de::DeserializeOwned;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    app_state::AppState,
    error::{AppError, AppResult},
    infrastructure::middleware::{viewer_context_middleware, Vc},
    models::{CreateCommentInput, EditCommentInput},
    theme::THEME,
};

/// JSON body extractor whose rejections use the common error body
pub struct JsonInput<T>(pub T);

impl<T, S> FromRequest<S> for JsonInput<T>
where
    T: DeserializeOwned,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::Validation(rejection.body_text())),
        }
    }
}

/// Full application: routes, viewer middleware, tracing and CORS
pub fn create_app(app_state: AppState) -> Router {
    create_comment_router(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    )
}

pub fn create_comment_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/comments", post(create_comment))
        .route("/api/comments/{id}", patch(edit_comment).delete(delete_comment))
        .route("/api/posts/{post_id}/comments", get(comments_by_post))
        .route("/api/theme", get(get_theme))
        .route("/api/theme/animations.css", get(get_theme_css))
        .route("/health", get(health))
        .fallback(handler_404)
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            viewer_context_middleware::<AppState>,
        ))
        .with_state(app_state)
}

// Protected routes take the body as a Result so the session check runs
// before a body rejection can surface.

// POST /api/comments
async fn create_comment(
    State(state): State<AppState>,
    vc: Vc,
    body: Result<JsonInput<CreateCommentInput>, AppError>,
) -> AppResult<impl IntoResponse> {
    vc.require_user()?;
    let JsonInput(input) = body?;
    let comment = state.comments.create(&vc, input).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

// PATCH /api/comments/{id}
async fn edit_comment(
    State(state): State<AppState>,
    vc: Vc,
    Path(id): Path<String>,
    body: Result<JsonInput<EditCommentInput>, AppError>,
) -> AppResult<impl IntoResponse> {
    vc.require_user()?;
    let JsonInput(input) = body?;
    let comment = state.comments.edit(&vc, &id, input).await?;
    Ok(Json(comment))
}

// DELETE /api/comments/{id}
async fn delete_comment(
    State(state): State<AppState>,
    vc: Vc,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let deleted = state.comments.delete(&vc, &id).await?;
    Ok(Json(deleted))
}

// GET /api/posts/{post_id}/comments
async fn comments_by_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let comments = state.comments.by_post_id(&post_id).await?;
    Ok(Json(comments))
}

async fn get_theme() -> impl IntoResponse {
    Json(&THEME)
}

async fn get_theme_css() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], THEME.to_css())
}

async fn health() -> &'static str {
    "ok"
}

async fn handler_404() -> AppError {
    AppError::NotFound("nothing to see here".to_string())
}
