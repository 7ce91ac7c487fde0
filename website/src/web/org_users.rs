use askama::Template;
use axum::extract::{Path, Query};
use axum::{
    Extension, Form,
    body::Body,
    extract::State,
    response::{Redirect, Response},
};
use snafu::{ResultExt, ensure};
use tracing::warn;
use urlencoding::encode;
use validator::Validate;

use crate::ctx::Ctx;
use crate::error::{ErrorInfo, ResponseBuilderSnafu, TemplateSnafu, ValidationSnafu};
use crate::models::{
    DeleteOrgUserParams, OrgUserParams, PaginationLinks, SelectOption, TemplateData,
};
use crate::run::AppState;
use crate::services::{
    UpdateRoleFormData, fetch_builtin_roles_svc, fetch_role_options_svc, remove_org_user_svc,
    search_org_users_svc, update_org_user_role_svc,
};
use crate::Result;
use roster::dto::{BuiltinRoleBindings, OrgUserDto, RoleOptionDto, SearchOrgUsersParamsDto};
use roster::pagination::PaginatedMeta;
use roster::role::Role;
use roster::validators::flatten_errors;

pub async fn index_handler() -> Redirect {
    Redirect::to("/org/users")
}

#[derive(Template)]
#[template(path = "pages/org_users/index.html")]
struct OrgUsersPageTemplate {
    t: TemplateData,
}

pub async fn org_users_page_handler(
    Extension(ctx): Extension<Ctx>,
) -> Result<Response<Body>> {
    let mut t = TemplateData::new(ctx.actor.clone());
    t.title = String::from("Organization Members");

    let tpl = OrgUsersPageTemplate { t };

    Ok(Response::builder()
        .status(200)
        .body(Body::from(tpl.render().context(TemplateSnafu)?))
        .context(ResponseBuilderSnafu)?)
}

/// One table row, with its picker options and control gates resolved.
struct OrgUserRow {
    user: OrgUserDto,
    role_options: Vec<SelectOption>,
    can_change_role: bool,
    can_remove: bool,
}

#[derive(Template)]
#[template(path = "widgets/org_users/table.html")]
struct OrgUsersTableTemplate {
    rows: Vec<OrgUserRow>,
    role_legend: Vec<RoleOptionDto>,
    pagination: Option<PaginationLinks>,
    error_message: Option<String>,
}

pub async fn search_org_users_handler(
    Extension(ctx): Extension<Ctx>,
    State(state): State<AppState>,
    Query(params): Query<SearchOrgUsersParamsDto>,
) -> Result<Response<Body>> {
    let errors = params.validate();
    ensure!(
        errors.is_ok(),
        ValidationSnafu {
            msg: flatten_errors(&errors.unwrap_err()),
        }
    );

    let mut tpl = OrgUsersTableTemplate {
        rows: Vec::new(),
        role_legend: Vec::new(),
        pagination: None,
        error_message: None,
    };

    match search_org_users_svc(&state, &ctx, &params).await {
        Ok(result) => {
            // Role registry fetches are best-effort, the table stays
            // usable with the plain picker when they fail
            let mut role_options: Vec<RoleOptionDto> = Vec::new();
            let mut bindings = BuiltinRoleBindings::new();
            if state.config.extended_roles {
                match fetch_role_options_svc(&state, &ctx).await {
                    Ok(options) => role_options = options,
                    Err(err) => warn!("Failed to fetch role options: {}", err),
                }
                match fetch_builtin_roles_svc(&state, &ctx).await {
                    Ok(fetched) => bindings = fetched,
                    Err(err) => warn!("Failed to fetch built-in role bindings: {}", err),
                }
            }
            let extended_active = state.config.extended_roles && !role_options.is_empty();

            tpl.rows = result
                .org_users
                .iter()
                .map(|user| build_org_user_row(user, &bindings, extended_active))
                .collect();
            tpl.role_legend = role_options;

            let meta = PaginatedMeta::new(result.page, result.per_page, result.total_count);
            let mut keyword_param = String::new();
            if let Some(keyword) = &params.query {
                keyword_param = format!("&query={}", encode(keyword));
            }
            tpl.pagination = Some(PaginationLinks::new(
                &meta,
                "/org/users/search",
                &keyword_param,
            ));

            Ok(Response::builder()
                .status(200)
                .body(Body::from(tpl.render().context(TemplateSnafu)?))
                .context(ResponseBuilderSnafu)?)
        }
        Err(err) => {
            let error_info = ErrorInfo::from(&err);
            tpl.error_message = Some(error_info.message);

            Ok(Response::builder()
                .status(error_info.status_code)
                .body(Body::from(tpl.render().context(TemplateSnafu)?))
                .context(ResponseBuilderSnafu)?)
        }
    }
}

fn build_org_user_row(
    user: &OrgUserDto,
    bindings: &BuiltinRoleBindings,
    extended_active: bool,
) -> OrgUserRow {
    OrgUserRow {
        user: user.clone(),
        role_options: role_select_options(user.role, bindings, extended_active),
        can_change_role: user.can("org.users:write"),
        can_remove: user.can("org.users:remove"),
    }
}

/// Options for a row's role picker. With the extended registry active,
/// each built-in role is labeled with the registry roles bound to it.
fn role_select_options(
    current: Role,
    bindings: &BuiltinRoleBindings,
    extended_active: bool,
) -> Vec<SelectOption> {
    [Role::Viewer, Role::Editor, Role::Admin]
        .into_iter()
        .map(|role| {
            let mut label = role.to_string();
            if extended_active
                && let Some(bound) = bindings.get(&role.to_string())
                && !bound.is_empty()
            {
                let names: Vec<&str> = bound.iter().map(|r| r.name.as_str()).collect();
                label = format!("{} ({})", label, names.join(", "));
            }

            SelectOption {
                value: role.to_string(),
                label,
                selected: role == current,
            }
        })
        .collect()
}

#[derive(Template)]
#[template(path = "widgets/org_users/delete_form.html")]
struct DeleteOrgUserFormTemplate {
    user_id: i32,
    login: String,
    error_message: Option<String>,
}

pub async fn delete_org_user_form_handler(
    Path(params): Path<OrgUserParams>,
    Query(query): Query<DeleteOrgUserParams>,
) -> Result<Response<Body>> {
    let tpl = DeleteOrgUserFormTemplate {
        user_id: params.user_id,
        login: query.login.unwrap_or_else(|| "this member".to_string()),
        error_message: None,
    };

    Ok(Response::builder()
        .status(200)
        .body(Body::from(tpl.render().context(TemplateSnafu)?))
        .context(ResponseBuilderSnafu)?)
}

pub async fn post_delete_org_user_handler(
    Extension(ctx): Extension<Ctx>,
    State(state): State<AppState>,
    Path(params): Path<OrgUserParams>,
    Query(query): Query<DeleteOrgUserParams>,
) -> Result<Response<Body>> {
    match remove_org_user_svc(&state, &ctx, params.user_id).await {
        Ok(_) => {
            // Swap the dialog away and let the table refresh itself
            Ok(Response::builder()
                .status(200)
                .header("HX-Trigger", "org-users-changed")
                .body(Body::from("".to_string()))
                .context(ResponseBuilderSnafu)?)
        }
        Err(err) => {
            let error_info = ErrorInfo::from(&err);
            let tpl = DeleteOrgUserFormTemplate {
                user_id: params.user_id,
                login: query.login.unwrap_or_else(|| "this member".to_string()),
                error_message: Some(error_info.message),
            };

            Ok(Response::builder()
                .status(error_info.status_code)
                .body(Body::from(tpl.render().context(TemplateSnafu)?))
                .context(ResponseBuilderSnafu)?)
        }
    }
}

pub async fn post_role_change_handler(
    Extension(ctx): Extension<Ctx>,
    State(state): State<AppState>,
    Path(params): Path<OrgUserParams>,
    Form(payload): Form<UpdateRoleFormData>,
) -> Result<Response<Body>> {
    match update_org_user_role_svc(&state, &ctx, params.user_id, &payload.role).await {
        Ok(_) => Ok(Response::builder()
            .status(200)
            .header("HX-Trigger", "org-users-changed")
            .body(Body::from("".to_string()))
            .context(ResponseBuilderSnafu)?),
        Err(err) => {
            let error_info = ErrorInfo::from(&err);

            Ok(Response::builder()
                .status(error_info.status_code)
                .body(Body::from(format!(
                    "<div class=\"error-message\">{}</div>",
                    error_info.message
                )))
                .context(ResponseBuilderSnafu)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn org_user(login: &str, access_control: Option<HashMap<String, bool>>) -> OrgUserDto {
        OrgUserDto {
            org_id: 1000,
            user_id: 2003,
            email: format!("{}@example.com", login),
            name: login.to_string(),
            login: login.to_string(),
            role: Role::Viewer,
            last_seen_at: "2024-06-01T12:00:00.000Z".to_string(),
            last_seen_age: "10m".to_string(),
            avatar_url: "https://secure.gravatar.com/avatar/abc?s=84&d=retro".to_string(),
            access_control,
        }
    }

    fn allow(actions: &[&str]) -> Option<HashMap<String, bool>> {
        Some(
            actions
                .iter()
                .map(|action| (action.to_string(), true))
                .collect(),
        )
    }

    fn render_table(rows: Vec<OrgUserRow>) -> String {
        let tpl = OrgUsersTableTemplate {
            rows,
            role_legend: Vec::new(),
            pagination: None,
            error_message: None,
        };
        tpl.render().unwrap()
    }

    #[test]
    fn test_row_without_metadata_is_permissive() {
        let row = build_org_user_row(&org_user("alice", None), &BuiltinRoleBindings::new(), false);
        assert!(row.can_change_role);
        assert!(row.can_remove);

        let html = render_table(vec![row]);
        assert!(!html.contains("disabled"));
        assert!(html.contains("/org/users/2003/delete"));
    }

    #[test]
    fn test_role_select_disabled_without_write_permission() {
        let user = org_user("alice", allow(&["org.users:read", "org.users:remove"]));
        let row = build_org_user_row(&user, &BuiltinRoleBindings::new(), false);
        assert!(!row.can_change_role);

        let html = render_table(vec![row]);
        assert!(html.contains("disabled"));
    }

    #[test]
    fn test_remove_control_hidden_without_remove_permission() {
        let user = org_user("alice", allow(&["org.users:read", "org.users:write"]));
        let row = build_org_user_row(&user, &BuiltinRoleBindings::new(), false);
        assert!(!row.can_remove);

        let html = render_table(vec![row]);
        assert!(!html.contains("/org/users/2003/delete"));
    }

    #[test]
    fn test_role_picker_selects_current_role() {
        let options = role_select_options(Role::Editor, &BuiltinRoleBindings::new(), false);
        assert_eq!(options.len(), 3);
        let selected: Vec<&SelectOption> = options.iter().filter(|o| o.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].value, "Editor");
    }

    #[test]
    fn test_extended_picker_labels_carry_registry_roles() {
        let mut bindings = BuiltinRoleBindings::new();
        bindings.insert(
            "Admin".to_string(),
            vec![RoleOptionDto {
                uid: "org_users_writer".to_string(),
                name: "fixed:org.users:writer".to_string(),
                description: "".to_string(),
                global: false,
            }],
        );

        let options = role_select_options(Role::Admin, &bindings, true);
        let admin = options.iter().find(|o| o.value == "Admin").unwrap();
        assert!(admin.label.contains("fixed:org.users:writer"));

        // Roles without bindings keep the plain label
        let viewer = options.iter().find(|o| o.value == "Viewer").unwrap();
        assert_eq!(viewer.label, "Viewer");
    }

    #[test]
    fn test_delete_form_names_the_target_login() {
        let tpl = DeleteOrgUserFormTemplate {
            user_id: 2003,
            login: "alice".to_string(),
            error_message: None,
        };
        let html = tpl.render().unwrap();
        assert!(html.contains("alice"));
        assert!(html.contains("/org/users/2003/delete"));
    }

    #[test]
    fn test_delete_form_cancel_is_local_only() {
        let tpl = DeleteOrgUserFormTemplate {
            user_id: 2003,
            login: "alice".to_string(),
            error_message: None,
        };
        let html = tpl.render().unwrap();

        // The cancel control dismisses the dialog client-side, it issues
        // no request of its own
        let cancel = html
            .split("<button")
            .find(|part| part.contains("Cancel"))
            .unwrap();
        assert!(!cancel.contains("hx-post"));
        assert!(!cancel.contains("hx-get"));
    }
}
