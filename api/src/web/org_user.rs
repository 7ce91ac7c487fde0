use axum::{
    Extension,
    extract::{Json, Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use snafu::{OptionExt, ensure};

use crate::{
    Result,
    error::{BadRequestSnafu, ForbiddenSnafu, RequiresAuthSnafu},
    services::org_user::{
        add_org_user_svc, list_org_users_svc, lookup_org_users_svc, remove_org_user_svc,
        search_org_users_svc, update_org_user_svc,
    },
    state::AppState,
    web::{params::OrgUserParams, response::JsonResponse},
};
use roster::actor::Actor;
use roster::dto::{
    AddOrgUserDto, ListOrgUsersParamsDto, MessageDto, OrgDto, OrgUserMessageDto,
    SearchOrgUsersParamsDto, UpdateOrgUserDto,
};
use roster::role::Permission;

// POST /api/org/users
pub async fn add_org_user_handler(
    state: State<AppState>,
    actor: Extension<Actor>,
    payload: Result<Json<AddOrgUserDto>, JsonRejection>,
) -> Result<JsonResponse> {
    let permissions = vec![Permission::OrgUsersAdd];
    ensure!(
        actor.has_permissions(&permissions),
        ForbiddenSnafu {
            msg: "Insufficient permissions"
        }
    );

    let Ok(Json(data)) = payload else {
        return BadRequestSnafu {
            msg: "bad request data".to_string(),
        }
        .fail();
    };

    let org_id = actor.org_id().context(RequiresAuthSnafu)?;
    add_org_user_helper(&state, org_id, data).await
}

// POST /api/orgs/{org_id}/users
pub async fn add_org_user_to_org_handler(
    state: State<AppState>,
    actor: Extension<Actor>,
    org: Extension<OrgDto>,
    payload: Result<Json<AddOrgUserDto>, JsonRejection>,
) -> Result<JsonResponse> {
    let permissions = vec![Permission::OrgUsersAdd];
    ensure!(
        actor.has_permissions(&permissions),
        ForbiddenSnafu {
            msg: "Insufficient permissions"
        }
    );

    let Ok(Json(data)) = payload else {
        return BadRequestSnafu {
            msg: "bad request data".to_string(),
        }
        .fail();
    };

    add_org_user_helper(&state, org.id, data).await
}

async fn add_org_user_helper(
    state: &AppState,
    org_id: i32,
    data: AddOrgUserDto,
) -> Result<JsonResponse> {
    let outcome = add_org_user_svc(state, org_id, data).await?;

    // An existing membership keeps the success-shaped body, only the
    // status differs
    let (status, message) = match outcome.already_member {
        true => (
            StatusCode::CONFLICT,
            "User is already member of this organization",
        ),
        false => (StatusCode::OK, "User added to organization"),
    };

    let body = OrgUserMessageDto {
        message: message.to_string(),
        user_id: outcome.user_id,
    };

    Ok(JsonResponse::json_with_status(status, &body))
}

// GET /api/org/users
pub async fn list_org_users_handler(
    state: State<AppState>,
    actor: Extension<Actor>,
    query: Query<ListOrgUsersParamsDto>,
) -> Result<JsonResponse> {
    let permissions = vec![Permission::OrgUsersRead];
    ensure!(
        actor.has_permissions(&permissions),
        ForbiddenSnafu {
            msg: "Insufficient permissions"
        }
    );

    let org_id = actor.org_id().context(RequiresAuthSnafu)?;
    let result = list_org_users_svc(&state, &actor, org_id, query.0).await?;

    Ok(JsonResponse::json(&result))
}

// GET /api/orgs/{org_id}/users
pub async fn list_org_users_for_org_handler(
    state: State<AppState>,
    actor: Extension<Actor>,
    org: Extension<OrgDto>,
    query: Query<ListOrgUsersParamsDto>,
) -> Result<JsonResponse> {
    let permissions = vec![Permission::OrgUsersRead];
    ensure!(
        actor.has_permissions(&permissions),
        ForbiddenSnafu {
            msg: "Insufficient permissions"
        }
    );

    let result = list_org_users_svc(&state, &actor, org.id, query.0).await?;

    Ok(JsonResponse::json(&result))
}

// GET /api/org/users/lookup
pub async fn lookup_org_users_handler(
    state: State<AppState>,
    actor: Extension<Actor>,
    query: Query<ListOrgUsersParamsDto>,
) -> Result<JsonResponse> {
    let permissions = vec![Permission::OrgUsersRead];
    ensure!(
        actor.has_permissions(&permissions),
        ForbiddenSnafu {
            msg: "Insufficient permissions"
        }
    );

    let org_id = actor.org_id().context(RequiresAuthSnafu)?;
    let result = lookup_org_users_svc(&state, &actor, org_id, query.0).await?;

    Ok(JsonResponse::json(&result))
}

// GET /api/org/users/search
pub async fn search_org_users_handler(
    state: State<AppState>,
    actor: Extension<Actor>,
    query: Query<SearchOrgUsersParamsDto>,
) -> Result<JsonResponse> {
    let permissions = vec![Permission::OrgUsersRead];
    ensure!(
        actor.has_permissions(&permissions),
        ForbiddenSnafu {
            msg: "Insufficient permissions"
        }
    );

    let org_id = actor.org_id().context(RequiresAuthSnafu)?;
    let result = search_org_users_svc(&state, &actor, org_id, query.0).await?;

    Ok(JsonResponse::json(&result))
}

// PATCH /api/org/users/{user_id}
pub async fn update_org_user_handler(
    state: State<AppState>,
    actor: Extension<Actor>,
    params: Path<OrgUserParams>,
    payload: Result<Json<UpdateOrgUserDto>, JsonRejection>,
) -> Result<JsonResponse> {
    let permissions = vec![Permission::OrgUsersWrite];
    ensure!(
        actor.has_permissions(&permissions),
        ForbiddenSnafu {
            msg: "Insufficient permissions"
        }
    );

    let Ok(Json(data)) = payload else {
        return BadRequestSnafu {
            msg: "bad request data".to_string(),
        }
        .fail();
    };

    let org_id = actor.org_id().context(RequiresAuthSnafu)?;
    update_org_user_helper(&state, org_id, params.user_id, data).await
}

// PATCH /api/orgs/{org_id}/users/{user_id}
pub async fn update_org_user_for_org_handler(
    state: State<AppState>,
    actor: Extension<Actor>,
    org: Extension<OrgDto>,
    params: Path<OrgUserParams>,
    payload: Result<Json<UpdateOrgUserDto>, JsonRejection>,
) -> Result<JsonResponse> {
    let permissions = vec![Permission::OrgUsersWrite];
    ensure!(
        actor.has_permissions(&permissions),
        ForbiddenSnafu {
            msg: "Insufficient permissions"
        }
    );

    let Ok(Json(data)) = payload else {
        return BadRequestSnafu {
            msg: "bad request data".to_string(),
        }
        .fail();
    };

    update_org_user_helper(&state, org.id, params.user_id, data).await
}

async fn update_org_user_helper(
    state: &AppState,
    org_id: i32,
    user_id: i32,
    data: UpdateOrgUserDto,
) -> Result<JsonResponse> {
    update_org_user_svc(state, org_id, user_id, data).await?;

    let body = MessageDto {
        message: "Organization user updated".to_string(),
    };

    Ok(JsonResponse::json(&body))
}

// DELETE /api/org/users/{user_id}
//
// Removing from the caller's own org also cleans up the account when this
// was its last membership.
pub async fn remove_org_user_handler(
    state: State<AppState>,
    actor: Extension<Actor>,
    params: Path<OrgUserParams>,
) -> Result<JsonResponse> {
    let permissions = vec![Permission::OrgUsersRemove];
    ensure!(
        actor.has_permissions(&permissions),
        ForbiddenSnafu {
            msg: "Insufficient permissions"
        }
    );

    let org_id = actor.org_id().context(RequiresAuthSnafu)?;
    remove_org_user_helper(&state, org_id, params.user_id, true).await
}

// DELETE /api/orgs/{org_id}/users/{user_id}
pub async fn remove_org_user_from_org_handler(
    state: State<AppState>,
    actor: Extension<Actor>,
    org: Extension<OrgDto>,
    params: Path<OrgUserParams>,
) -> Result<JsonResponse> {
    let permissions = vec![Permission::OrgUsersRemove];
    ensure!(
        actor.has_permissions(&permissions),
        ForbiddenSnafu {
            msg: "Insufficient permissions"
        }
    );

    remove_org_user_helper(&state, org.id, params.user_id, false).await
}

async fn remove_org_user_helper(
    state: &AppState,
    org_id: i32,
    user_id: i32,
    delete_orphan: bool,
) -> Result<JsonResponse> {
    let user_deleted = remove_org_user_svc(state, org_id, user_id, delete_orphan).await?;

    let message = match user_deleted {
        true => "User deleted",
        false => "User removed from organization",
    };

    let body = MessageDto {
        message: message.to_string(),
    };

    Ok(JsonResponse::json(&body))
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::Arc;

    use crate::config::{AccessControlConfig, Config, DbConfig, ServerConfig, UsersConfig};
    use crate::state::AppState;
    use crate::token::create_auth_token;
    use crate::web::server::app;
    use db::org::TEST_ORG_ID;
    use db::user::{
        TEST_ADMIN_USER_ID, TEST_EDITOR_USER_ID, TEST_HIDDEN_USER_LOGIN, TEST_OUTSIDE_USER_ID,
        TEST_VIEWER_USER_ID,
    };
    use roster::actor::ActorPayload;
    use roster::dto::{
        MessageDto, OrgUserDto, OrgUserMessageDto, SearchOrgUsersResultDto, UserLookupDto,
    };
    use roster::role::Role;

    const TEST_JWT_SECRET: &str = "test-secret";

    fn test_config() -> Config {
        Config {
            jwt_secret: TEST_JWT_SECRET.to_string(),
            server: ServerConfig { port: 4000 },
            db: DbConfig {
                url: "postgres://localhost/test".to_string(),
            },
            users: UsersConfig {
                hidden_users: HashSet::from([TEST_HIDDEN_USER_LOGIN.to_string()]),
            },
            access_control: AccessControlConfig {
                enabled: true,
                extended_roles: true,
            },
        }
    }

    fn test_server() -> TestServer {
        let state = AppState {
            config: test_config(),
            db: Arc::new(db::create_test_db_mapper()),
        };
        TestServer::new(app(state)).expect("Test server should start")
    }

    fn token_for(user_id: i32, login: &str, role: Role) -> String {
        create_auth_token(
            &ActorPayload {
                id: user_id,
                org_id: TEST_ORG_ID,
                login: login.to_string(),
                role,
            },
            TEST_JWT_SECRET,
        )
        .expect("Token should be created")
    }

    fn admin_token() -> String {
        token_for(TEST_ADMIN_USER_ID, "admin", Role::Admin)
    }

    fn editor_token() -> String {
        token_for(TEST_EDITOR_USER_ID, "bob", Role::Editor)
    }

    #[tokio::test]
    async fn test_list_requires_auth() {
        let server = test_server();
        let res = server.get("/api/org/users").await;
        assert_eq!(res.status_code(), 401);
    }

    #[tokio::test]
    async fn test_list_hides_hidden_users_from_non_admins() {
        let server = test_server();
        let res = server
            .get("/api/org/users")
            .authorization_bearer(&editor_token())
            .await;

        assert_eq!(res.status_code(), 200);
        let users: Vec<OrgUserDto> = res.json();
        let logins: Vec<&str> = users.iter().map(|u| u.login.as_str()).collect();
        assert!(logins.contains(&"admin"));
        assert!(logins.contains(&"bob"));
        assert!(logins.contains(&"alice"));
        assert!(!logins.contains(&TEST_HIDDEN_USER_LOGIN));
    }

    #[tokio::test]
    async fn test_list_shows_hidden_users_to_admins() {
        let server = test_server();
        let res = server
            .get("/api/org/users")
            .authorization_bearer(&admin_token())
            .await;

        assert_eq!(res.status_code(), 200);
        let users: Vec<OrgUserDto> = res.json();
        let logins: Vec<&str> = users.iter().map(|u| u.login.as_str()).collect();
        assert!(logins.contains(&TEST_HIDDEN_USER_LOGIN));
    }

    #[tokio::test]
    async fn test_list_attaches_avatar_urls() {
        let server = test_server();
        let res = server
            .get("/api/org/users")
            .authorization_bearer(&admin_token())
            .await;

        let users: Vec<OrgUserDto> = res.json();
        assert!(users.iter().all(|u| u.avatar_url.contains("gravatar")));
    }

    #[tokio::test]
    async fn test_list_enriches_when_requested() {
        let server = test_server();
        let res = server
            .get("/api/org/users")
            .add_query_param("accesscontrol", "true")
            .authorization_bearer(&admin_token())
            .await;

        let users: Vec<OrgUserDto> = res.json();
        assert!(users.iter().all(|u| u.access_control.is_some()));
        assert!(users.iter().all(|u| u.can("org.users:write")));
    }

    #[tokio::test]
    async fn test_list_skips_enrichment_by_default() {
        let server = test_server();
        let res = server
            .get("/api/org/users")
            .authorization_bearer(&admin_token())
            .await;

        let users: Vec<OrgUserDto> = res.json();
        assert!(users.iter().all(|u| u.access_control.is_none()));
    }

    #[tokio::test]
    async fn test_lookup_is_a_minimal_projection() {
        let server = test_server();
        let res = server
            .get("/api/org/users/lookup")
            .authorization_bearer(&editor_token())
            .await;

        assert_eq!(res.status_code(), 200);
        let users: Vec<UserLookupDto> = res.json();
        assert!(users.iter().any(|u| u.login == "alice"));
        assert!(users.iter().all(|u| u.avatar_url.contains("gravatar")));
    }

    #[tokio::test]
    async fn test_search_defaults_and_echoes_paging() {
        let server = test_server();
        let res = server
            .get("/api/org/users/search")
            .add_query_param("perpage", "0")
            .add_query_param("page", "0")
            .authorization_bearer(&admin_token())
            .await;

        assert_eq!(res.status_code(), 200);
        let result: SearchOrgUsersResultDto = res.json();
        assert_eq!(result.page, 1);
        assert_eq!(result.per_page, 1000);
        assert_eq!(result.total_count, 4);
        assert_eq!(result.org_users.len(), 4);
    }

    #[tokio::test]
    async fn test_search_filters_hidden_page_contents() {
        let server = test_server();
        let res = server
            .get("/api/org/users/search")
            .authorization_bearer(&editor_token())
            .await;

        let result: SearchOrgUsersResultDto = res.json();
        assert!(
            result
                .org_users
                .iter()
                .all(|u| u.login != TEST_HIDDEN_USER_LOGIN)
        );
    }

    #[tokio::test]
    async fn test_search_enriches_when_requested() {
        let server = test_server();
        let res = server
            .get("/api/org/users/search")
            .add_query_param("accesscontrol", "true")
            .authorization_bearer(&admin_token())
            .await;

        let result: SearchOrgUsersResultDto = res.json();
        assert!(result.org_users.iter().all(|u| u.access_control.is_some()));
    }

    #[tokio::test]
    async fn test_add_org_user() {
        let server = test_server();
        let res = server
            .post("/api/org/users")
            .authorization_bearer(&admin_token())
            .json(&json!({"loginOrEmail": "carol", "role": "Editor"}))
            .await;

        assert_eq!(res.status_code(), 200);
        let body: OrgUserMessageDto = res.json();
        assert_eq!(body.message, "User added to organization");
        assert_eq!(body.user_id, TEST_OUTSIDE_USER_ID);
    }

    #[tokio::test]
    async fn test_add_duplicate_member_conflicts_with_success_shape() {
        let server = test_server();
        let res = server
            .post("/api/org/users")
            .authorization_bearer(&admin_token())
            .json(&json!({"loginOrEmail": "alice", "role": "Viewer"}))
            .await;

        assert_eq!(res.status_code(), 409);
        let body: OrgUserMessageDto = res.json();
        assert_eq!(body.message, "User is already member of this organization");
        assert_eq!(body.user_id, TEST_VIEWER_USER_ID);
    }

    #[tokio::test]
    async fn test_add_with_invalid_role() {
        let server = test_server();
        let res = server
            .post("/api/org/users")
            .authorization_bearer(&admin_token())
            .json(&json!({"loginOrEmail": "carol", "role": "Overlord"}))
            .await;

        assert_eq!(res.status_code(), 400);
        let body: MessageDto = res.json();
        assert_eq!(body.message, "Invalid role specified");
    }

    #[tokio::test]
    async fn test_add_unknown_user() {
        let server = test_server();
        let res = server
            .post("/api/org/users")
            .authorization_bearer(&admin_token())
            .json(&json!({"loginOrEmail": "nobody", "role": "Viewer"}))
            .await;

        assert_eq!(res.status_code(), 404);
        let body: MessageDto = res.json();
        assert_eq!(body.message, "User not found");
    }

    #[tokio::test]
    async fn test_add_requires_permission() {
        let server = test_server();
        let res = server
            .post("/api/org/users")
            .authorization_bearer(&editor_token())
            .json(&json!({"loginOrEmail": "carol", "role": "Viewer"}))
            .await;

        assert_eq!(res.status_code(), 403);
    }

    #[tokio::test]
    async fn test_update_role() {
        let server = test_server();
        let res = server
            .patch(&format!("/api/org/users/{}", TEST_VIEWER_USER_ID))
            .authorization_bearer(&admin_token())
            .json(&json!({"role": "Editor"}))
            .await;

        assert_eq!(res.status_code(), 200);
        let body: MessageDto = res.json();
        assert_eq!(body.message, "Organization user updated");
    }

    #[tokio::test]
    async fn test_update_with_invalid_role() {
        let server = test_server();
        let res = server
            .patch(&format!("/api/org/users/{}", TEST_VIEWER_USER_ID))
            .authorization_bearer(&admin_token())
            .json(&json!({"role": "Overlord"}))
            .await;

        assert_eq!(res.status_code(), 400);
        let body: MessageDto = res.json();
        assert_eq!(body.message, "Invalid role specified");
    }

    #[tokio::test]
    async fn test_update_cannot_demote_last_admin() {
        let server = test_server();
        let res = server
            .patch(&format!("/api/org/users/{}", TEST_ADMIN_USER_ID))
            .authorization_bearer(&admin_token())
            .json(&json!({"role": "Viewer"}))
            .await;

        assert_eq!(res.status_code(), 400);
        let body: MessageDto = res.json();
        assert_eq!(
            body.message,
            "Cannot change role so that there is no organization admin left"
        );
    }

    #[tokio::test]
    async fn test_remove_with_orphan_cleanup() {
        let server = test_server();
        let res = server
            .delete(&format!("/api/org/users/{}", TEST_VIEWER_USER_ID))
            .authorization_bearer(&admin_token())
            .await;

        assert_eq!(res.status_code(), 200);
        let body: MessageDto = res.json();
        assert_eq!(body.message, "User deleted");
    }

    #[tokio::test]
    async fn test_remove_with_other_memberships_only_unlinks() {
        let server = test_server();
        let res = server
            .delete(&format!("/api/org/users/{}", TEST_EDITOR_USER_ID))
            .authorization_bearer(&admin_token())
            .await;

        assert_eq!(res.status_code(), 200);
        let body: MessageDto = res.json();
        assert_eq!(body.message, "User removed from organization");
    }

    #[tokio::test]
    async fn test_remove_via_org_route_never_deletes_account() {
        let server = test_server();
        let res = server
            .delete(&format!(
                "/api/orgs/{}/users/{}",
                TEST_ORG_ID, TEST_VIEWER_USER_ID
            ))
            .authorization_bearer(&admin_token())
            .await;

        assert_eq!(res.status_code(), 200);
        let body: MessageDto = res.json();
        assert_eq!(body.message, "User removed from organization");
    }

    #[tokio::test]
    async fn test_remove_never_deletes_service_accounts() {
        let server = test_server();
        let res = server
            .delete(&format!("/api/org/users/{}", db::user::TEST_HIDDEN_USER_ID))
            .authorization_bearer(&admin_token())
            .await;

        assert_eq!(res.status_code(), 200);
        let body: MessageDto = res.json();
        assert_eq!(body.message, "User removed from organization");
    }

    #[tokio::test]
    async fn test_remove_cannot_remove_last_admin() {
        let server = test_server();
        let res = server
            .delete(&format!("/api/org/users/{}", TEST_ADMIN_USER_ID))
            .authorization_bearer(&admin_token())
            .await;

        assert_eq!(res.status_code(), 400);
        let body: MessageDto = res.json();
        assert_eq!(body.message, "Cannot remove last organization admin");
    }

    #[tokio::test]
    async fn test_org_routes_check_org_exists() {
        let server = test_server();
        let res = server
            .get("/api/orgs/42/users")
            .authorization_bearer(&admin_token())
            .await;

        assert_eq!(res.status_code(), 404);
    }

    #[tokio::test]
    async fn test_role_options_endpoint() {
        let server = test_server();
        let res = server
            .get("/api/access-control/roles")
            .authorization_bearer(&editor_token())
            .await;

        assert_eq!(res.status_code(), 200);
        let options: Vec<roster::dto::RoleOptionDto> = res.json();
        assert!(!options.is_empty());
    }
}
