// region:    --- Imports
use crate::handlers::{self, AppState};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

// endregion: --- Imports

/// 라우터 설정
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/users", post(handlers::handle_register))
        .route(
            "/listings",
            get(handlers::handle_get_active_listings).post(handlers::handle_create_listing),
        )
        .route("/listings/closed", get(handlers::handle_get_closed_listings))
        .route("/listings/:id", get(handlers::handle_get_listing))
        .route("/listings/:id/bids", post(handlers::handle_bid))
        .route("/listings/:id/close", post(handlers::handle_close))
        .route("/listings/:id/watch", post(handlers::handle_watch))
        .route("/listings/:id/comments", post(handlers::handle_comment))
        .route("/watchlist", get(handlers::handle_get_watchlist))
        .route("/categories", get(handlers::handle_get_categories))
        .route(
            "/categories/:category/listings",
            get(handlers::handle_get_listings_in_category),
        )
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .with_state(state)
}
