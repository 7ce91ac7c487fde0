use serde::{Deserialize, Serialize};

#[derive(Clone, Serialize, Deserialize)]
pub struct UserDto {
    pub id: i32,
    pub login: String,
    pub email: String,
    pub name: String,
    pub is_service_account: bool,
    pub last_seen_at: String,
    pub created_at: String,
    pub updated_at: String,
}
