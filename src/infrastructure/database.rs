// Database Interface - Persistent store operations for comments and sessions
// Implementations translate these calls directly into SQL

use crate::error::AppResult;
use crate::models::{CommentDetail, CommentRecord, CommentSummary, LikeRecord, NewComment, Timestamp};
use async_trait::async_trait;

/// Store interface for the Comment entity and the relations it reads (author, likes)
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Insert a comment and return it shaped with author summary and like count.
    /// The returned `liked_by_me` is always false.
    async fn insert_comment(&self, comment: NewComment) -> AppResult<CommentDetail>;

    /// Overwrite the message of comment `id` only when it is owned by `user_id`.
    /// `updated_at` becomes `max(updated_at + 1, now)` so it strictly advances.
    /// Returns false when no row matched.
    async fn update_message_if_owner(
        &self,
        id: &str,
        user_id: &str,
        message: &str,
        now: Timestamp,
    ) -> AppResult<bool>;

    /// Delete comment `id` only when it is owned by `user_id`, returning the deleted row
    async fn delete_if_owner(&self, id: &str, user_id: &str) -> AppResult<Option<CommentRecord>>;

    async fn comment_exists(&self, id: &str) -> AppResult<bool>;

    /// Load a comment with its author and every like record on it
    async fn find_comment_with_likes(
        &self,
        id: &str,
    ) -> AppResult<Option<(CommentSummary, Vec<LikeRecord>)>>;

    /// All comments on a post, newest first
    async fn comments_by_post(&self, post_id: &str) -> AppResult<Vec<CommentSummary>>;
}

/// Resolves bearer session tokens to user ids
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Returns the owning user id for an unexpired session, `None` otherwise
    async fn resolve_session(&self, session_token: &str, now: Timestamp) -> AppResult<Option<String>>;
}
