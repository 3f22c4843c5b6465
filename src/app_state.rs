use std::sync::Arc;

use crate::{
    config::Config,
    data_seeder,
    infrastructure::{
        database::SessionProvider, middleware::HasSessionProvider, sqlite_database::SqliteDatabase,
    },
    services::CommentService,
};

#[derive(Clone)]
pub struct AppState {
    pub comments: CommentService,
    pub sessions: Arc<dyn SessionProvider>,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let database = Arc::new(SqliteDatabase::connect(&config.database).await?);

        if config.seed_sample_data {
            let sessions = data_seeder::seed_sample_data(&database).await?;
            tracing::info!(alice = %sessions.alice, bob = %sessions.bob, "sample session tokens");
        }

        Ok(Self::with_database(database))
    }

    /// Wire the service and session provider onto one SQLite database
    pub fn with_database(database: Arc<SqliteDatabase>) -> Self {
        Self {
            comments: CommentService::new(database.clone()),
            sessions: database,
        }
    }
}

impl HasSessionProvider for AppState {
    fn sessions(&self) -> &Arc<dyn SessionProvider> {
        &self.sessions
    }
}
