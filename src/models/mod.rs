// Comment domain types - stored records, caller-facing views and request payloads

pub mod comment;

pub use comment::{
    CommentDetail, CommentRecord, CommentSummary, CreateCommentInput, EditCommentInput,
    LikeRecord, NewComment, Timestamp, UserSummary,
};
pub use comment::{current_time_millis, timestamp_to_datetime};
