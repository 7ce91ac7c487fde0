use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::ctx::Ctx;
use crate::error::{HttpClientSnafu, HttpResponseParseSnafu};
use crate::run::AppState;
use crate::services::handle_response_error;
use crate::{Error, Result};
use roster::dto::{SearchOrgUsersParamsDto, SearchOrgUsersResultDto};

#[derive(Clone, Deserialize, Serialize)]
pub struct UpdateRoleFormData {
    pub role: String,
}

pub async fn search_org_users_svc(
    state: &AppState,
    ctx: &Ctx,
    params: &SearchOrgUsersParamsDto,
) -> Result<SearchOrgUsersResultDto> {
    let token = ctx.token().expect("Token is required");
    let url = format!("{}/api/org/users/search", &state.config.api_url);

    // Always request enrichment, the table gates its controls on it
    let mut query: Vec<(&str, String)> = vec![("accesscontrol", "true".to_string())];
    if let Some(page) = params.page {
        query.push(("page", page.to_string()));
    }
    if let Some(perpage) = params.perpage {
        query.push(("perpage", perpage.to_string()));
    }
    if let Some(keyword) = &params.query {
        query.push(("query", keyword.clone()));
    }

    let response = state
        .client
        .get(url)
        .bearer_auth(token)
        .query(&query)
        .send()
        .await
        .context(HttpClientSnafu {
            msg: "Unable to list organization members. Try again later.".to_string(),
        })?;

    if !response.status().is_success() {
        return Err(handle_response_error(response, "organization members", Error::OrgUserNotFound).await);
    }

    response
        .json::<SearchOrgUsersResultDto>()
        .await
        .context(HttpResponseParseSnafu {
            msg: "Unable to parse organization members.",
        })
}

pub async fn update_org_user_role_svc(
    state: &AppState,
    ctx: &Ctx,
    user_id: i32,
    role: &str,
) -> Result<()> {
    let token = ctx.token().expect("Token is required");
    let url = format!("{}/api/org/users/{}", &state.config.api_url, user_id);

    let response = state
        .client
        .patch(url)
        .bearer_auth(token)
        .json(&UpdateRoleFormData {
            role: role.to_string(),
        })
        .send()
        .await
        .context(HttpClientSnafu {
            msg: "Unable to update the member role. Try again later.".to_string(),
        })?;

    if !response.status().is_success() {
        return Err(handle_response_error(response, "organization members", Error::OrgUserNotFound).await);
    }

    Ok(())
}

pub async fn remove_org_user_svc(state: &AppState, ctx: &Ctx, user_id: i32) -> Result<()> {
    let token = ctx.token().expect("Token is required");
    let url = format!("{}/api/org/users/{}", &state.config.api_url, user_id);

    let response = state
        .client
        .delete(url)
        .bearer_auth(token)
        .send()
        .await
        .context(HttpClientSnafu {
            msg: "Unable to remove the member. Try again later.".to_string(),
        })?;

    if !response.status().is_success() {
        return Err(handle_response_error(response, "organization members", Error::OrgUserNotFound).await);
    }

    Ok(())
}
