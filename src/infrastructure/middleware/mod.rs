// ViewerContext Middleware - resolves the session before any handler runs
// Handlers only ever see a ViewerContext

pub mod viewer_context_extractor;
pub mod viewer_context_middleware;

pub use viewer_context_extractor::Vc;
pub use viewer_context_middleware::*;
