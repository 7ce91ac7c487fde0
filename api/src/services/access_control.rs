use std::collections::HashMap;

use crate::Result;
use crate::state::AppState;
use roster::actor::Actor;
use roster::dto::{BuiltinRoleBindings, RoleOptionDto};
use roster::role::{Permission, Role};

/// Per-user mapping of action name to allowed.
pub type ResourceMetadata = HashMap<i32, HashMap<String, bool>>;

/// Permissions the actor holds on org users.
pub fn user_permissions(actor: &Actor) -> Vec<Permission> {
    match &actor.actor {
        Some(actor) => actor.permissions.clone(),
        None => Vec::new(),
    }
}

/// Explicit capability check, (requester, action) to allowed.
pub fn has_access(actor: &Actor, action: Permission) -> bool {
    actor.has_permissions(&vec![action])
}

pub fn resources_metadata(permissions: &[Permission], user_ids: &[i32]) -> ResourceMetadata {
    let actions: HashMap<String, bool> = permissions
        .iter()
        .map(|permission| (permission.to_string(), true))
        .collect();

    user_ids
        .iter()
        .map(|id| (*id, actions.clone()))
        .collect()
}

/// Metadata for the given users, or `None` when enrichment is disabled or
/// was not requested. Callers treat failures as non-fatal.
pub fn user_access_control_metadata(
    state: &AppState,
    actor: &Actor,
    requested: bool,
    user_ids: &[i32],
) -> Result<Option<ResourceMetadata>> {
    if !state.config.access_control.enabled || !requested {
        return Ok(None);
    }

    let permissions = user_permissions(actor);
    if permissions.is_empty() {
        return Ok(None);
    }

    Ok(Some(resources_metadata(&permissions, user_ids)))
}

/// The extended role registry. Entries are fixed for now but the shape
/// matches what the picker UI consumes per organization.
pub fn role_options() -> Vec<RoleOptionDto> {
    vec![
        RoleOptionDto {
            uid: "org_users_reader".to_string(),
            name: "fixed:org.users:reader".to_string(),
            description: "List and inspect organization members".to_string(),
            global: false,
        },
        RoleOptionDto {
            uid: "org_users_writer".to_string(),
            name: "fixed:org.users:writer".to_string(),
            description: "Add, update and remove organization members".to_string(),
            global: false,
        },
    ]
}

/// Built-in role name to the registry roles it grants.
pub fn builtin_role_bindings() -> BuiltinRoleBindings {
    let options = role_options();
    let bound = |uids: &[&str]| -> Vec<RoleOptionDto> {
        options
            .iter()
            .filter(|option| uids.contains(&option.uid.as_str()))
            .cloned()
            .collect()
    };

    let mut bindings = BuiltinRoleBindings::new();
    bindings.insert(
        Role::Admin.to_string(),
        bound(&["org_users_reader", "org_users_writer"]),
    );
    bindings.insert(Role::Editor.to_string(), bound(&["org_users_reader"]));
    bindings.insert(Role::Viewer.to_string(), bound(&["org_users_reader"]));
    bindings
}
