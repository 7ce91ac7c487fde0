use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct OrgUserParams {
    pub user_id: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteOrgUserParams {
    pub login: Option<String>,
}
