use axum::{
    Router, middleware,
    routing::{post, put},
};

use super::controller::{
    create_article, delete_article, list_articles, read_article, update_article,
};
use super::middleware::{article_by_id, validate_article};
use crate::middleware::role::require_user;
use crate::state::AppState;

/// `route_layer` on a method router only wraps the methods added before it,
/// so reads stay public while writes go through the guard.
pub fn init_articles_router(state: AppState) -> Router<AppState> {
    let signed_in = || middleware::from_fn_with_state(state.clone(), require_user);

    Router::new()
        .route(
            "/",
            post(create_article)
                .route_layer(middleware::from_fn(validate_article))
                .route_layer(signed_in())
                .get(list_articles),
        )
        .route(
            "/{article_id}",
            put(update_article)
                .delete(delete_article)
                .route_layer(signed_in())
                .get(read_article)
                .route_layer(middleware::from_fn_with_state(state.clone(), article_by_id)),
        )
}
