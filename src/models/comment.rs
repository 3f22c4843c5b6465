use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Milliseconds since the Unix epoch, the unit timestamps are stored in
pub type Timestamp = i64;

pub fn current_time_millis() -> Timestamp {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as Timestamp
}

/// Convert a stored timestamp into a UTC datetime; out-of-range values map to the epoch.
pub fn timestamp_to_datetime(millis: Timestamp) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}

/// Author summary attached to every comment view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub name: Option<String>,
}

/// Raw comment row as persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    pub id: String,
    pub message: String,
    pub post_id: String,
    pub parent_id: Option<String>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything the store needs to insert a comment
#[derive(Debug, Clone)]
pub struct NewComment {
    pub id: String,
    pub message: String,
    pub post_id: String,
    pub parent_id: Option<String>,
    pub user_id: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRecord {
    pub user_id: String,
    pub comment_id: String,
}

/// Comment view without like data, as listed for a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentSummary {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub message: String,
    pub parent_id: Option<String>,
    pub user: UserSummary,
}

/// Comment view returned from mutations, carrying like data relative to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDetail {
    #[serde(flatten)]
    pub summary: CommentSummary,
    pub like_count: u64,
    pub liked_by_me: bool,
}

impl CommentDetail {
    /// Build a detail view from the full list of like records of the comment.
    pub fn from_likes(summary: CommentSummary, likes: &[LikeRecord], viewer_id: &str) -> Self {
        Self {
            summary,
            like_count: likes.len() as u64,
            liked_by_me: likes.iter().any(|like| like.user_id == viewer_id),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentInput {
    #[validate(length(min = 1, message = "postId can't be blank"))]
    pub post_id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[validate(length(min = 1, message = "message can't be blank"))]
    pub message: String,
}

/// Edit payload. Only the message is writable; any other field sent by the client is ignored.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EditCommentInput {
    #[validate(length(min = 1, message = "message can't be blank"))]
    pub message: String,
}
