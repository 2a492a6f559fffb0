use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::controller::{
    change_password, delete_user, get_me, get_user, list_users, update_me, update_user,
    upload_profile_image,
};
use super::middleware::user_by_id;
use crate::middleware::role::require_admin;
use crate::state::AppState;

pub fn init_users_router(state: AppState) -> Router<AppState> {
    let admin = || middleware::from_fn_with_state(state.clone(), require_admin);

    // Every single-segment route resolves its segment first.
    let by_segment = Router::new()
        .route("/me", get(get_me).put(update_me))
        .route("/password-change", post(change_password))
        .route("/upload", post(upload_profile_image))
        .route(
            "/{user_id}",
            get(get_user)
                .put(update_user)
                .delete(delete_user)
                .route_layer(admin()),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), user_by_id));

    Router::new()
        .route("/", get(list_users).route_layer(admin()))
        .merge(by_segment)
}
