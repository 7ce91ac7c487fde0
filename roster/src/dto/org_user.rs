use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::role::Role;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgUserDto {
    pub org_id: i32,
    pub user_id: i32,
    pub email: String,
    pub name: String,
    pub login: String,
    pub role: Role,
    pub last_seen_at: String,
    pub last_seen_age: String,
    pub avatar_url: String,

    /// Action to allowed mapping for the requesting identity, present only
    /// when access-control enrichment ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_control: Option<HashMap<String, bool>>,
}

impl OrgUserDto {
    /// Whether the requester may perform the action on this row. Rows
    /// without enrichment metadata are treated as permissive.
    pub fn can(&self, action: &str) -> bool {
        match &self.access_control {
            Some(metadata) => metadata.get(action).copied().unwrap_or(false),
            None => true,
        }
    }
}

/// Minimal projection for typeahead and reference pickers.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLookupDto {
    pub user_id: i32,
    pub login: String,
    pub avatar_url: String,
}

#[derive(Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddOrgUserDto {
    #[validate(length(min = 1, max = 250))]
    pub login_or_email: String,

    #[validate(custom(function = "crate::validators::role"))]
    pub role: String,
}

#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct UpdateOrgUserDto {
    #[validate(custom(function = "crate::validators::role"))]
    pub role: String,
}

#[derive(Clone, Default, Deserialize, Validate)]
pub struct ListOrgUsersParamsDto {
    #[validate(length(max = 100))]
    pub query: Option<String>,

    pub limit: Option<i32>,

    /// Explicit opt-in for access-control metadata enrichment.
    pub accesscontrol: Option<bool>,
}

#[derive(Clone, Default, Deserialize, Validate)]
pub struct SearchOrgUsersParamsDto {
    #[validate(length(max = 100))]
    pub query: Option<String>,

    pub perpage: Option<i32>,

    pub page: Option<i32>,

    /// Explicit opt-in for access-control metadata enrichment.
    pub accesscontrol: Option<bool>,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOrgUsersResultDto {
    pub total_count: i64,
    pub org_users: Vec<OrgUserDto>,
    pub page: i32,
    pub per_page: i32,
}
