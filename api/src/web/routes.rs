use axum::{
    Router, middleware,
    routing::{any, get, patch},
};

use crate::{
    state::AppState,
    web::{
        add_org_user_handler, add_org_user_to_org_handler, builtin_roles_handler,
        current_user_handler,
        handler::{
            health_live_handler, health_ready_handler, home_handler, not_found_handler,
        },
        list_org_users_for_org_handler, list_org_users_handler, lookup_org_users_handler,
        middleware::{auth_middleware, org_middleware, require_auth_middleware},
        remove_org_user_from_org_handler, remove_org_user_handler, role_options_handler,
        search_org_users_handler, update_org_user_for_org_handler, update_org_user_handler,
    },
};

pub fn all_routes(state: AppState) -> Router {
    Router::new()
        .merge(public_routes(state.clone()))
        .merge(private_routes(state.clone()))
        .fallback(any(not_found_handler))
        .with_state(state)
}

fn public_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(home_handler))
        .route("/health/liveness", get(health_live_handler))
        .route("/health/readiness", get(health_ready_handler))
        .with_state(state)
}

fn private_routes(state: AppState) -> Router<AppState> {
    let mut api = Router::new()
        .route("/user", get(current_user_handler))
        .nest("/org/users", current_org_users_routes(state.clone()))
        .nest("/orgs/{org_id}/users", org_users_routes(state.clone()));

    // The extended role registry is a capability, absent unless configured
    if state.config.access_control.extended_roles {
        api = api.nest("/access-control", access_control_routes(state.clone()));
    }

    Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
}

fn current_org_users_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_org_users_handler).post(add_org_user_handler),
        )
        .route("/lookup", get(lookup_org_users_handler))
        .route("/search", get(search_org_users_handler))
        .route(
            "/{user_id}",
            patch(update_org_user_handler).delete(remove_org_user_handler),
        )
        .with_state(state)
}

fn org_users_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_org_users_for_org_handler).post(add_org_user_to_org_handler),
        )
        .route(
            "/{user_id}",
            patch(update_org_user_for_org_handler).delete(remove_org_user_from_org_handler),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            org_middleware,
        ))
        .with_state(state)
}

fn access_control_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/roles", get(role_options_handler))
        .route("/builtin-roles", get(builtin_roles_handler))
        .with_state(state)
}
