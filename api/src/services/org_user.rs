use snafu::{OptionExt, ResultExt, ensure};
use tracing::error;
use validator::Validate;

use crate::Result;
use crate::error::{DbSnafu, LastOrgAdminSnafu, NotFoundSnafu, ValidationSnafu};
use crate::services::access_control::user_access_control_metadata;
use crate::services::visibility::is_hidden_user;
use crate::state::AppState;
use roster::actor::Actor;
use roster::dto::{
    AddOrgUserDto, ListOrgUsersParamsDto, OrgUserDto, SearchOrgUsersParamsDto,
    SearchOrgUsersResultDto, UpdateOrgUserDto, UserLookupDto,
};
use roster::role::Role;
use roster::utils::gravatar_url;
use roster::validators::flatten_errors;

/// When no limit is given, listings are capped at this many rows.
const DEFAULT_LIST_LIMIT: i32 = 1000;

pub struct AddOrgUserOutcome {
    pub user_id: i32,
    pub already_member: bool,
}

pub async fn add_org_user_svc(
    state: &AppState,
    org_id: i32,
    data: AddOrgUserDto,
) -> Result<AddOrgUserOutcome> {
    let Ok(role) = Role::try_from(data.role.as_str()) else {
        return ValidationSnafu {
            msg: "Invalid role specified".to_string(),
        }
        .fail();
    };

    let errors = data.validate();
    ensure!(
        errors.is_ok(),
        ValidationSnafu {
            msg: flatten_errors(&errors.unwrap_err()),
        }
    );

    let user = state
        .db
        .users
        .get_by_login_or_email(&data.login_or_email)
        .await
        .context(DbSnafu)?;

    let user = user.context(NotFoundSnafu {
        msg: "User not found",
    })?;

    match state.db.org_users.add(org_id, user.id, role).await {
        Ok(()) => Ok(AddOrgUserOutcome {
            user_id: user.id,
            already_member: false,
        }),
        // Not a hard failure, the handler reports it with the user id
        Err(db::Error::UserAlreadyMember) => Ok(AddOrgUserOutcome {
            user_id: user.id,
            already_member: true,
        }),
        Err(e) => Err(e).context(DbSnafu),
    }
}

pub async fn list_org_users_svc(
    state: &AppState,
    actor: &Actor,
    org_id: i32,
    params: ListOrgUsersParamsDto,
) -> Result<Vec<OrgUserDto>> {
    let errors = params.validate();
    ensure!(
        errors.is_ok(),
        ValidationSnafu {
            msg: flatten_errors(&errors.unwrap_err()),
        }
    );

    let limit = match params.limit {
        Some(limit) if limit > 0 => limit,
        _ => DEFAULT_LIST_LIMIT,
    };

    let users = state
        .db
        .org_users
        .list(org_id, params.query.clone(), limit)
        .await
        .context(DbSnafu)?;

    let mut filtered = decorate_org_users(users, actor, state);
    enrich_org_users(state, actor, params.accesscontrol.unwrap_or(false), &mut filtered);

    Ok(filtered)
}

/// Drops rows hidden from the actor and attaches avatar URLs.
fn decorate_org_users(
    users: Vec<OrgUserDto>,
    actor: &Actor,
    state: &AppState,
) -> Vec<OrgUserDto> {
    users
        .into_iter()
        .filter(|user| !is_hidden_user(&user.login, actor, &state.config))
        .map(|mut user| {
            user.avatar_url = gravatar_url(&user.email);
            user
        })
        .collect()
}

fn enrich_org_users(state: &AppState, actor: &Actor, requested: bool, users: &mut Vec<OrgUserDto>) {
    let user_ids: Vec<i32> = users.iter().map(|user| user.user_id).collect();

    match user_access_control_metadata(state, actor, requested, &user_ids) {
        Ok(Some(mut metadata)) => {
            for user in users.iter_mut() {
                user.access_control = metadata.remove(&user.user_id);
            }
        }
        Ok(None) => {}
        Err(e) => {
            // Enrichment is best-effort, return the plain list
            error!("Failed to get access control metadata: {}", e);
        }
    }
}

pub async fn lookup_org_users_svc(
    state: &AppState,
    actor: &Actor,
    org_id: i32,
    params: ListOrgUsersParamsDto,
) -> Result<Vec<UserLookupDto>> {
    let users = list_org_users_svc(state, actor, org_id, params).await?;

    Ok(users
        .into_iter()
        .map(|user| UserLookupDto {
            user_id: user.user_id,
            login: user.login,
            avatar_url: user.avatar_url,
        })
        .collect())
}

pub async fn search_org_users_svc(
    state: &AppState,
    actor: &Actor,
    org_id: i32,
    params: SearchOrgUsersParamsDto,
) -> Result<SearchOrgUsersResultDto> {
    let errors = params.validate();
    ensure!(
        errors.is_ok(),
        ValidationSnafu {
            msg: flatten_errors(&errors.unwrap_err()),
        }
    );

    // Zero and negative paging params fall back to the defaults, and the
    // response echoes the effective values
    let mut per_page = params.perpage.unwrap_or(0);
    if per_page <= 0 {
        per_page = DEFAULT_LIST_LIMIT;
    }
    let mut page = params.page.unwrap_or(0);
    if page < 1 {
        page = 1;
    }

    let (users, total_count) = state
        .db
        .org_users
        .search(org_id, params.query.clone(), page, per_page)
        .await
        .context(DbSnafu)?;

    let mut org_users = decorate_org_users(users, actor, state);
    enrich_org_users(
        state,
        actor,
        params.accesscontrol.unwrap_or(false),
        &mut org_users,
    );

    Ok(SearchOrgUsersResultDto {
        total_count,
        org_users,
        page,
        per_page,
    })
}

pub async fn update_org_user_svc(
    state: &AppState,
    org_id: i32,
    user_id: i32,
    data: UpdateOrgUserDto,
) -> Result<()> {
    let Ok(role) = Role::try_from(data.role.as_str()) else {
        return ValidationSnafu {
            msg: "Invalid role specified".to_string(),
        }
        .fail();
    };

    match state.db.org_users.update_role(org_id, user_id, role).await {
        Ok(()) => Ok(()),
        Err(db::Error::LastOrgAdmin) => LastOrgAdminSnafu {
            msg: "Cannot change role so that there is no organization admin left".to_string(),
        }
        .fail(),
        Err(db::Error::NotFound { msg }) => NotFoundSnafu { msg }.fail(),
        Err(e) => Err(e).context(DbSnafu),
    }
}

/// Returns whether the user account itself was deleted as part of the
/// orphan cleanup.
pub async fn remove_org_user_svc(
    state: &AppState,
    org_id: i32,
    user_id: i32,
    delete_orphan: bool,
) -> Result<bool> {
    match state
        .db
        .org_users
        .remove(org_id, user_id, delete_orphan)
        .await
    {
        Ok(user_deleted) => Ok(user_deleted),
        Err(db::Error::LastOrgAdmin) => LastOrgAdminSnafu {
            msg: "Cannot remove last organization admin".to_string(),
        }
        .fail(),
        Err(db::Error::NotFound { msg }) => NotFoundSnafu { msg }.fail(),
        Err(e) => Err(e).context(DbSnafu),
    }
}
