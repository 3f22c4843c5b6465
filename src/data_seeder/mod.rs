use crate::{
    error::AppResult,
    infrastructure::{database::CommentStore, sqlite_database::SqliteDatabase},
    models::{current_time_millis, NewComment},
};

const SESSION_LIFETIME_MILLIS: i64 = 30 * 24 * 60 * 60 * 1000;

/// Bearer tokens of the seeded sessions, for trying the API by hand
#[derive(Debug, Clone)]
pub struct SeededSessions {
    pub alice: String,
    pub bob: String,
}

/// Seed two users with sessions, one post and a liked comment.
/// Safe to run against a database that was already seeded.
pub async fn seed_sample_data(db: &SqliteDatabase) -> AppResult<SeededSessions> {
    let expires = current_time_millis() + SESSION_LIFETIME_MILLIS;

    db.insert_user("user-alice", Some("Alice")).await?;
    db.insert_user("user-bob", Some("Bob")).await?;
    db.insert_session("dev-session-alice", "user-alice", expires).await?;
    db.insert_session("dev-session-bob", "user-bob", expires).await?;
    db.insert_post("post-welcome", "Welcome", "user-alice").await?;

    if !db.comment_exists("comment-welcome").await? {
        db.insert_comment(NewComment {
            id: "comment-welcome".to_string(),
            message: "First!".to_string(),
            post_id: "post-welcome".to_string(),
            parent_id: None,
            user_id: "user-alice".to_string(),
            created_at: current_time_millis(),
        })
        .await?;
    }
    db.insert_like("user-bob", "comment-welcome").await?;

    tracing::info!("seeded sample users, sessions, post and comment");

    Ok(SeededSessions {
        alice: "dev-session-alice".to_string(),
        bob: "dev-session-bob".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::SessionProvider;

    #[tokio::test]
    async fn test_seeding_is_repeatable() {
        let db = SqliteDatabase::new_in_memory().await.unwrap();

        let sessions = seed_sample_data(&db).await.unwrap();
        seed_sample_data(&db).await.unwrap();

        let now = current_time_millis();
        assert_eq!(
            db.resolve_session(&sessions.alice, now).await.unwrap().as_deref(),
            Some("user-alice")
        );
        let comments = db.comments_by_post("post-welcome").await.unwrap();
        assert_eq!(comments.len(), 1);

        let (_, likes) = db.find_comment_with_likes("comment-welcome").await.unwrap().unwrap();
        assert_eq!(likes.len(), 1);
    }
}
