pub mod access_control;
pub mod org_user;
pub mod visibility;
