use snafu::ResultExt;

use crate::ctx::Ctx;
use crate::error::{HttpClientSnafu, HttpResponseParseSnafu};
use crate::run::AppState;
use crate::services::handle_response_error;
use crate::{Error, Result};
use roster::dto::{BuiltinRoleBindings, RoleOptionDto};

pub async fn fetch_role_options_svc(state: &AppState, ctx: &Ctx) -> Result<Vec<RoleOptionDto>> {
    let token = ctx.token().expect("Token is required");
    let url = format!("{}/api/access-control/roles", &state.config.api_url);

    let response = state
        .client
        .get(url)
        .bearer_auth(token)
        .send()
        .await
        .context(HttpClientSnafu {
            msg: "Unable to fetch role options.".to_string(),
        })?;

    if !response.status().is_success() {
        return Err(handle_response_error(
            response,
            "roles",
            Error::Service {
                msg: "Role options are not available.".to_string(),
            },
        )
        .await);
    }

    response
        .json::<Vec<RoleOptionDto>>()
        .await
        .context(HttpResponseParseSnafu {
            msg: "Unable to parse role options.",
        })
}

pub async fn fetch_builtin_roles_svc(state: &AppState, ctx: &Ctx) -> Result<BuiltinRoleBindings> {
    let token = ctx.token().expect("Token is required");
    let url = format!("{}/api/access-control/builtin-roles", &state.config.api_url);

    let response = state
        .client
        .get(url)
        .bearer_auth(token)
        .send()
        .await
        .context(HttpClientSnafu {
            msg: "Unable to fetch built-in role bindings.".to_string(),
        })?;

    if !response.status().is_success() {
        return Err(handle_response_error(
            response,
            "roles",
            Error::Service {
                msg: "Built-in role bindings are not available.".to_string(),
            },
        )
        .await);
    }

    response
        .json::<BuiltinRoleBindings>()
        .await
        .context(HttpResponseParseSnafu {
            msg: "Unable to parse built-in role bindings.",
        })
}
