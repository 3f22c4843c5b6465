// Viewer Context - request-scoped identity of the caller

use crate::error::{AppError, AppResult};

/// Who is making the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerType {
    Anonymous,
    User { user_id: String },
    /// A session token was sent but the lookup itself failed
    SessionUnavailable { error: String },
}

#[derive(Debug, Clone)]
pub struct ViewerContext {
    pub request_id: String,
    pub viewer_type: ViewerType,
}

impl ViewerContext {
    pub fn anonymous(request_id: String) -> Self {
        Self {
            request_id,
            viewer_type: ViewerType::Anonymous,
        }
    }

    pub fn authenticated_user(user_id: String, request_id: String) -> Self {
        Self {
            request_id,
            viewer_type: ViewerType::User { user_id },
        }
    }

    pub fn session_unavailable(error: String, request_id: String) -> Self {
        Self {
            request_id,
            viewer_type: ViewerType::SessionUnavailable { error },
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        match &self.viewer_type {
            ViewerType::User { user_id } => Some(user_id.as_str()),
            ViewerType::Anonymous | ViewerType::SessionUnavailable { .. } => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id().is_some()
    }

    /// The caller's user id. Anonymous viewers get `Unauthorized`; a failed
    /// session lookup surfaces as the store error it was.
    pub fn require_user(&self) -> AppResult<&str> {
        match &self.viewer_type {
            ViewerType::User { user_id } => Ok(user_id.as_str()),
            ViewerType::Anonymous => Err(AppError::Unauthorized(
                "A signed-in session is required".to_string(),
            )),
            ViewerType::SessionUnavailable { error } => Err(AppError::DatabaseError(format!(
                "Session lookup failed: {}",
                error
            ))),
        }
    }
}
