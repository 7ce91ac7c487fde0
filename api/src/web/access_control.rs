use axum::Extension;
use snafu::ensure;

use crate::{
    Result,
    error::ForbiddenSnafu,
    services::access_control::{builtin_role_bindings, has_access, role_options},
    web::response::JsonResponse,
};
use roster::actor::Actor;
use roster::role::Permission;

pub async fn role_options_handler(actor: Extension<Actor>) -> Result<JsonResponse> {
    ensure!(
        has_access(&actor, Permission::OrgUsersRead),
        ForbiddenSnafu {
            msg: "Insufficient permissions"
        }
    );

    let options = role_options();
    Ok(JsonResponse::json(&options))
}

pub async fn builtin_roles_handler(actor: Extension<Actor>) -> Result<JsonResponse> {
    ensure!(
        has_access(&actor, Permission::OrgUsersRead),
        ForbiddenSnafu {
            msg: "Insufficient permissions"
        }
    );

    let bindings = builtin_role_bindings();
    Ok(JsonResponse::json(&bindings))
}
