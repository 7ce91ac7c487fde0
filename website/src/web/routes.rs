use axum::routing::{get, post};
use axum::{Router, middleware};

use crate::run::AppState;
use crate::web::{
    delete_org_user_form_handler, index_handler, org_users_page_handler,
    post_delete_org_user_handler, post_role_change_handler, search_org_users_handler,
};

use super::middleware::{auth_middleware, require_auth_middleware};

pub fn all_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .nest("/org/users", org_users_routes(state.clone()))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
}

fn org_users_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(org_users_page_handler))
        .route("/search", get(search_org_users_handler))
        .nest("/{user_id}", org_user_inner_routes(state.clone()))
        .with_state(state)
}

fn org_user_inner_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/role", post(post_role_change_handler))
        .route(
            "/delete",
            get(delete_org_user_form_handler).post(post_delete_org_user_handler),
        )
        .with_state(state)
}
