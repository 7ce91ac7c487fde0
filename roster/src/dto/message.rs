use serde::{Deserialize, Serialize};

/// Plain `{message}` envelope used for errors and simple successes.
#[derive(Clone, Serialize, Deserialize)]
pub struct MessageDto {
    pub message: String,
}

/// `{message, userId}` envelope returned by the add-member operation.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgUserMessageDto {
    pub message: String,
    pub user_id: i32,
}
