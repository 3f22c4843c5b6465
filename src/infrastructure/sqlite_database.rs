use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;

use crate::config::DatabaseConfig;
use crate::error::{AppError, AppResult};
use crate::infrastructure::database::{CommentStore, SessionProvider};
use crate::models::{
    timestamp_to_datetime, CommentDetail, CommentRecord, CommentSummary, LikeRecord, NewComment,
    Timestamp, UserSummary,
};

const SUMMARY_COLUMNS: &str = r#"
    SELECT c.id, c.message, c.parent_id, c.created_at, c.updated_at,
           u.id AS author_id, u.name AS author_name
"#;

const SUMMARY_FROM: &str = "FROM comments c INNER JOIN users u ON u.id = c.user_id";

/// SQLite implementation of the comment store and session provider
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    /// Open (creating if missing) the database described by `config` and bootstrap the schema
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| {
                AppError::ConfigurationError(format!("Invalid DATABASE_URL {}: {}", config.url, e))
            })?
            .create_if_missing(true)
            .foreign_keys(true);

        // An in-memory database lives only as long as its connection
        let in_memory = config.url.contains(":memory:") || config.url.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(config.max_connections)
        };

        let pool = pool_options.connect_with(options).await.map_err(|e| {
            AppError::DatabaseError(format!("Failed to connect to {}: {}", config.url, e))
        })?;

        let db = Self { pool };
        db.initialize().await?;
        Ok(db)
    }

    pub async fn new_in_memory() -> AppResult<Self> {
        Self::connect(&DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        })
        .await
    }

    /// Create tables and indexes if they do not exist yet
    pub async fn initialize(&self) -> AppResult<()> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS posts (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at INTEGER NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS comments (
                id TEXT PRIMARY KEY,
                message TEXT NOT NULL,
                post_id TEXT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
                parent_id TEXT REFERENCES comments(id) ON DELETE CASCADE,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS likes (
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                comment_id TEXT NOT NULL REFERENCES comments(id) ON DELETE CASCADE,
                PRIMARY KEY (user_id, comment_id)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                session_token TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                expires INTEGER NOT NULL
            )
            "#,
            "CREATE INDEX IF NOT EXISTS idx_comments_post_created ON comments(post_id, created_at DESC)",
            "CREATE INDEX IF NOT EXISTS idx_comments_parent ON comments(parent_id)",
            "CREATE INDEX IF NOT EXISTS idx_likes_comment ON likes(comment_id)",
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(format!("Failed to create schema: {}", e)))?;
        }

        Ok(())
    }

    pub async fn insert_user(&self, id: &str, name: Option<&str>) -> AppResult<()> {
        sqlx::query("INSERT INTO users (id, name) VALUES (?, ?) ON CONFLICT(id) DO NOTHING")
            .bind(id)
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn insert_post(&self, id: &str, title: &str, user_id: &str) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO posts (id, title, user_id, created_at) VALUES (?, ?, ?, ?) ON CONFLICT(id) DO NOTHING",
        )
        .bind(id)
        .bind(title)
        .bind(user_id)
        .bind(crate::models::current_time_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_session(&self, session_token: &str, user_id: &str, expires: Timestamp) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (session_token, user_id, expires) VALUES (?, ?, ?)
            ON CONFLICT(session_token) DO UPDATE SET user_id = excluded.user_id, expires = excluded.expires
            "#,
        )
        .bind(session_token)
        .bind(user_id)
        .bind(expires)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_like(&self, user_id: &str, comment_id: &str) -> AppResult<()> {
        sqlx::query("INSERT INTO likes (user_id, comment_id) VALUES (?, ?) ON CONFLICT DO NOTHING")
            .bind(user_id)
            .bind(comment_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Raw lookup of a stored comment
    pub async fn get_comment(&self, id: &str) -> AppResult<Option<CommentRecord>> {
        let row = sqlx::query(
            "SELECT id, message, post_id, parent_id, user_id, created_at, updated_at FROM comments WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to get comment {}: {}", id, e)))?;

        row.as_ref().map(record_from_row).transpose()
    }
}

fn summary_from_row(row: &SqliteRow) -> AppResult<CommentSummary> {
    Ok(CommentSummary {
        id: row.try_get("id")?,
        created_at: timestamp_to_datetime(row.try_get("created_at")?),
        updated_at: timestamp_to_datetime(row.try_get("updated_at")?),
        message: row.try_get("message")?,
        parent_id: row.try_get("parent_id")?,
        user: UserSummary {
            id: row.try_get("author_id")?,
            name: row.try_get("author_name")?,
        },
    })
}

fn record_from_row(row: &SqliteRow) -> AppResult<CommentRecord> {
    Ok(CommentRecord {
        id: row.try_get("id")?,
        message: row.try_get("message")?,
        post_id: row.try_get("post_id")?,
        parent_id: row.try_get("parent_id")?,
        user_id: row.try_get("user_id")?,
        created_at: timestamp_to_datetime(row.try_get("created_at")?),
        updated_at: timestamp_to_datetime(row.try_get("updated_at")?),
    })
}

#[async_trait]
impl CommentStore for SqliteDatabase {
    async fn insert_comment(&self, comment: NewComment) -> AppResult<CommentDetail> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO comments (id, message, post_id, parent_id, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&comment.id)
        .bind(&comment.message)
        .bind(&comment.post_id)
        .bind(&comment.parent_id)
        .bind(&comment.user_id)
        .bind(comment.created_at)
        .bind(comment.created_at)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query(&format!(
            "{}, (SELECT COUNT(*) FROM likes l WHERE l.comment_id = c.id) AS like_count {} WHERE c.id = ?",
            SUMMARY_COLUMNS, SUMMARY_FROM
        ))
        .bind(&comment.id)
        .fetch_one(&mut *tx)
        .await?;

        let detail = CommentDetail {
            summary: summary_from_row(&row)?,
            like_count: row.try_get::<i64, _>("like_count")? as u64,
            liked_by_me: false,
        };

        tx.commit().await?;
        Ok(detail)
    }

    async fn update_message_if_owner(
        &self,
        id: &str,
        user_id: &str,
        message: &str,
        now: Timestamp,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE comments SET message = ?, updated_at = MAX(updated_at + 1, ?) WHERE id = ? AND user_id = ?",
        )
        .bind(message)
        .bind(now)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update comment {}: {}", id, e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_if_owner(&self, id: &str, user_id: &str) -> AppResult<Option<CommentRecord>> {
        let row = sqlx::query(
            r#"
            DELETE FROM comments
            WHERE id = ? AND user_id = ?
            RETURNING id, message, post_id, parent_id, user_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn comment_exists(&self, id: &str) -> AppResult<bool> {
        let row = sqlx::query("SELECT 1 FROM comments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to check if comment {} exists: {}", id, e))
            })?;
        Ok(row.is_some())
    }

    async fn find_comment_with_likes(
        &self,
        id: &str,
    ) -> AppResult<Option<(CommentSummary, Vec<LikeRecord>)>> {
        let row = sqlx::query(&format!("{} {} WHERE c.id = ?", SUMMARY_COLUMNS, SUMMARY_FROM))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to get comment {}: {}", id, e)))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let likes = sqlx::query("SELECT user_id, comment_id FROM likes WHERE comment_id = ?")
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to get likes for comment {}: {}", id, e))
            })?
            .iter()
            .map(|like| {
                Ok(LikeRecord {
                    user_id: like.try_get("user_id")?,
                    comment_id: like.try_get("comment_id")?,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Some((summary_from_row(&row)?, likes)))
    }

    async fn comments_by_post(&self, post_id: &str) -> AppResult<Vec<CommentSummary>> {
        let rows = sqlx::query(&format!(
            "{} {} WHERE c.post_id = ? ORDER BY c.created_at DESC, c.rowid DESC",
            SUMMARY_COLUMNS, SUMMARY_FROM
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to list comments for post {}: {}", post_id, e))
        })?;

        rows.iter().map(summary_from_row).collect()
    }
}

#[async_trait]
impl SessionProvider for SqliteDatabase {
    async fn resolve_session(&self, session_token: &str, now: Timestamp) -> AppResult<Option<String>> {
        let user_id = sqlx::query_scalar::<_, String>(
            "SELECT user_id FROM sessions WHERE session_token = ? AND expires > ?",
        )
        .bind(session_token)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to resolve session: {}", e)))?;
        Ok(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> SqliteDatabase {
        let db = SqliteDatabase::new_in_memory().await.unwrap();
        db.insert_user("u1", Some("Alice")).await.unwrap();
        db.insert_user("u2", None).await.unwrap();
        db.insert_post("p1", "First post", "u1").await.unwrap();
        db
    }

    fn new_comment(id: &str, parent_id: Option<&str>, user_id: &str, created_at: Timestamp) -> NewComment {
        NewComment {
            id: id.to_string(),
            message: format!("message {}", id),
            post_id: "p1".to_string(),
            parent_id: parent_id.map(str::to_string),
            user_id: user_id.to_string(),
            created_at,
        }
    }

    #[tokio::test]
    async fn test_insert_returns_shaped_comment() {
        let db = seeded().await;
        let detail = db.insert_comment(new_comment("c1", None, "u1", 1_000)).await.unwrap();

        assert_eq!(detail.summary.id, "c1");
        assert_eq!(detail.summary.user.name.as_deref(), Some("Alice"));
        assert_eq!(detail.summary.created_at, detail.summary.updated_at);
        assert_eq!(detail.like_count, 0);
        assert!(!detail.liked_by_me);
    }

    #[tokio::test]
    async fn test_insert_with_unknown_post_is_validation_error() {
        let db = seeded().await;
        let mut comment = new_comment("c1", None, "u1", 1_000);
        comment.post_id = "missing".to_string();

        let err = db.insert_comment(comment).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_conditional_update_ignores_non_owner() {
        let db = seeded().await;
        db.insert_comment(new_comment("c1", None, "u1", 1_000)).await.unwrap();

        assert!(!db.update_message_if_owner("c1", "u2", "hijacked", 2_000).await.unwrap());
        let stored = db.get_comment("c1").await.unwrap().unwrap();
        assert_eq!(stored.message, "message c1");

        assert!(db.update_message_if_owner("c1", "u1", "edited", 2_000).await.unwrap());
        let stored = db.get_comment("c1").await.unwrap().unwrap();
        assert_eq!(stored.message, "edited");
        assert_eq!(stored.updated_at.timestamp_millis(), 2_000);
        assert_eq!(stored.created_at.timestamp_millis(), 1_000);
    }

    #[tokio::test]
    async fn test_updated_at_strictly_advances_with_stale_clock() {
        let db = seeded().await;
        db.insert_comment(new_comment("c1", None, "u1", 5_000)).await.unwrap();

        db.update_message_if_owner("c1", "u1", "a", 5_000).await.unwrap();
        db.update_message_if_owner("c1", "u1", "a", 4_000).await.unwrap();
        let stored = db.get_comment("c1").await.unwrap().unwrap();
        assert_eq!(stored.updated_at.timestamp_millis(), 5_002);
    }

    #[tokio::test]
    async fn test_delete_cascades_to_replies_and_likes() {
        let db = seeded().await;
        db.insert_comment(new_comment("c1", None, "u1", 1_000)).await.unwrap();
        db.insert_comment(new_comment("c2", Some("c1"), "u2", 2_000)).await.unwrap();
        db.insert_like("u2", "c1").await.unwrap();

        assert!(db.delete_if_owner("c1", "u2").await.unwrap().is_none());

        let deleted = db.delete_if_owner("c1", "u1").await.unwrap().unwrap();
        assert_eq!(deleted.id, "c1");
        assert_eq!(deleted.post_id, "p1");
        assert!(!db.comment_exists("c1").await.unwrap());
        assert!(!db.comment_exists("c2").await.unwrap());
    }

    #[tokio::test]
    async fn test_comments_by_post_newest_first() {
        let db = seeded().await;
        db.insert_comment(new_comment("old", None, "u1", 1_000)).await.unwrap();
        db.insert_comment(new_comment("new", None, "u2", 3_000)).await.unwrap();
        db.insert_comment(new_comment("tie", None, "u2", 3_000)).await.unwrap();

        let ids: Vec<String> = db
            .comments_by_post("p1")
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["tie", "new", "old"]);
        assert!(db.comments_by_post("p2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_comment_with_likes() {
        let db = seeded().await;
        db.insert_comment(new_comment("c1", None, "u1", 1_000)).await.unwrap();
        db.insert_like("u1", "c1").await.unwrap();
        db.insert_like("u2", "c1").await.unwrap();
        db.insert_like("u2", "c1").await.unwrap();

        let (summary, likes) = db.find_comment_with_likes("c1").await.unwrap().unwrap();
        assert_eq!(summary.user.id, "u1");
        assert_eq!(likes.len(), 2);
        assert!(db.find_comment_with_likes("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_session_expiry() {
        let db = seeded().await;
        db.insert_session("live", "u1", 10_000).await.unwrap();
        db.insert_session("stale", "u2", 500).await.unwrap();

        assert_eq!(db.resolve_session("live", 1_000).await.unwrap().as_deref(), Some("u1"));
        assert_eq!(db.resolve_session("stale", 1_000).await.unwrap(), None);
        assert_eq!(db.resolve_session("unknown", 1_000).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_database_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            url: format!("sqlite://{}", dir.path().join("comments.db").display()),
            max_connections: 2,
        };

        {
            let db = SqliteDatabase::connect(&config).await.unwrap();
            db.insert_user("u1", Some("Alice")).await.unwrap();
            db.insert_post("p1", "First post", "u1").await.unwrap();
            db.insert_comment(new_comment("c1", None, "u1", 1_000)).await.unwrap();
            db.pool.close().await;
        }

        let db = SqliteDatabase::connect(&config).await.unwrap();
        assert!(db.comment_exists("c1").await.unwrap());
    }
}
