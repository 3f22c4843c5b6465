// Comment Service - comment CRUD over SQLite with session-based ownership checks

// Infrastructure - store interfaces, SQLite implementation, viewer context and middleware
pub mod infrastructure;

// Domain types
pub mod models;

// Business logic
pub mod services;

// HTTP surface and wiring
pub mod app_state;
pub mod comment_interface;

// Static styling data served alongside the API
pub mod theme;

// Common utilities
pub mod config;
pub mod error;
pub mod data_seeder;

// Re-exports for convenience
pub use error::{AppError, AppResult};
