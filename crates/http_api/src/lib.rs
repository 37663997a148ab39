mod errors;
mod extract;
mod handlers;
mod middleware;
mod state;

use axum::{Router, middleware as axum_middleware, routing::post};

pub use errors::HttpError;
pub use state::HttpState;

/// Builds the API router mounted under the configured path prefix.
pub fn router(state: HttpState) -> Router<()> {
    let prefix = state.context.app_state.config.server.normalized_prefix();
    let api = Router::new()
        .route("/status", post(handlers::status))
        .route("/refresh", post(handlers::refresh))
        .route("/accounts", post(handlers::accounts))
        .route("/timeseries", post(handlers::timeseries))
        .route("/breakdown", post(handlers::breakdown))
        .route("/summary", post(handlers::summary))
        .route("/export", post(handlers::export));

    let app = Router::new().nest("/api", api);
    let app = if prefix.is_empty() {
        app
    } else {
        Router::new().nest(&prefix, app)
    };
    app.fallback(handlers::not_found)
        .layer(axum_middleware::from_fn(middleware::log_request))
        .with_state(state)
}
