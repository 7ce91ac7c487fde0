mod access_control;
mod message;
mod org;
mod org_user;
mod user;

pub use access_control::*;
pub use message::*;
pub use org::*;
pub use org_user::*;
pub use user::*;
