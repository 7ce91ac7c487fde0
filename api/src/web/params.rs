use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct OrgParams {
    pub org_id: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrgUserParams {
    pub user_id: i32,
}
