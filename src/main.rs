// Comment Server

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use comment_service::{app_state::AppState, comment_interface::create_app, config::Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("comment_service=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize application state
    let app_state = AppState::new(&config).await?;
    let app = create_app(app_state);

    let addr = config.server_address();
    tracing::info!("Comment server starting on http://{}", addr);
    tracing::info!("  POST   /api/comments                   - Create comment");
    tracing::info!("  PATCH  /api/comments/{{id}}              - Edit comment");
    tracing::info!("  DELETE /api/comments/{{id}}              - Delete comment");
    tracing::info!("  GET    /api/posts/{{post_id}}/comments    - List comments for a post");
    tracing::info!("  GET    /api/theme                      - Theme configuration");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
