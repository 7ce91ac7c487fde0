use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A named role from the extended access-control registry.
#[derive(Clone, Serialize, Deserialize)]
pub struct RoleOptionDto {
    pub uid: String,
    pub name: String,
    pub description: String,
    pub global: bool,
}

/// Built-in role name to bound registry roles.
pub type BuiltinRoleBindings = HashMap<String, Vec<RoleOptionDto>>;
