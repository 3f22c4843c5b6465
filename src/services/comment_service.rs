// CommentService - create/edit/delete/list for comments
// Ownership is enforced by conditional writes keyed on (id, user_id)

use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    infrastructure::{database::CommentStore, viewer::ViewerContext},
    models::{
        current_time_millis, CommentDetail, CommentRecord, CommentSummary, CreateCommentInput,
        EditCommentInput, NewComment,
    },
};

#[derive(Clone)]
pub struct CommentService {
    store: Arc<dyn CommentStore>,
}

impl CommentService {
    pub fn new(store: Arc<dyn CommentStore>) -> Self {
        Self { store }
    }

    /// Create a comment owned by the caller. A fresh comment has no likes.
    pub async fn create(&self, vc: &ViewerContext, input: CreateCommentInput) -> AppResult<CommentDetail> {
        let user_id = vc.require_user()?;
        input.validate()?;

        let comment = NewComment {
            id: Uuid::new_v4().to_string(),
            message: input.message,
            post_id: input.post_id,
            parent_id: input.parent_id,
            user_id: user_id.to_string(),
            created_at: current_time_millis(),
        };
        let post_id = comment.post_id.clone();

        let detail = self.store.insert_comment(comment).await?;
        info!(
            request_id = %vc.request_id,
            comment_id = %detail.summary.id,
            %post_id,
            "comment created"
        );

        Ok(CommentDetail {
            liked_by_me: false,
            ..detail
        })
    }

    /// Replace the message of a comment the caller authored
    pub async fn edit(&self, vc: &ViewerContext, id: &str, input: EditCommentInput) -> AppResult<CommentDetail> {
        let user_id = vc.require_user()?;
        input.validate()?;

        let updated = self
            .store
            .update_message_if_owner(id, user_id, &input.message, current_time_millis())
            .await?;
        if !updated {
            return Err(self.write_rejection(vc, id).await);
        }

        // The comment can vanish between the write and this read if its author deletes it concurrently
        let (summary, likes) = self
            .store
            .find_comment_with_likes(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment {} not found", id)))?;

        info!(request_id = %vc.request_id, comment_id = %id, "comment edited");
        Ok(CommentDetail::from_likes(summary, &likes, user_id))
    }

    /// Permanently delete a comment the caller authored, returning the deleted record
    pub async fn delete(&self, vc: &ViewerContext, id: &str) -> AppResult<CommentRecord> {
        let user_id = vc.require_user()?;

        match self.store.delete_if_owner(id, user_id).await? {
            Some(deleted) => {
                info!(request_id = %vc.request_id, comment_id = %id, "comment deleted");
                Ok(deleted)
            }
            None => Err(self.write_rejection(vc, id).await),
        }
    }

    /// All comments on a post, newest first. No session required.
    pub async fn by_post_id(&self, post_id: &str) -> AppResult<Vec<CommentSummary>> {
        let comments = self.store.comments_by_post(post_id).await?;
        debug!(%post_id, count = comments.len(), "listed comments");
        Ok(comments)
    }

    /// Explain why an owner-conditional write touched nothing
    async fn write_rejection(&self, vc: &ViewerContext, id: &str) -> AppError {
        match self.store.comment_exists(id).await {
            Ok(true) => {
                warn!(
                    request_id = %vc.request_id,
                    comment_id = %id,
                    user_id = vc.user_id().unwrap_or_default(),
                    "rejected write by non-author"
                );
                AppError::Forbidden("Only the author can modify this comment".to_string())
            }
            Ok(false) => AppError::NotFound(format!("Comment {} not found", id)),
            Err(err) => err,
        }
    }
}
