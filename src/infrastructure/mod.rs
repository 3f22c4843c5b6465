// Core infrastructure modules
pub mod database;        // Store and session provider interfaces
pub mod sqlite_database; // SQLite implementation
pub mod viewer;          // Viewer context
pub mod middleware;      // Viewer context middleware and extractor

pub use database::{CommentStore, SessionProvider};
pub use sqlite_database::SqliteDatabase;
pub use viewer::ViewerContext;
