mod db;
mod error;
pub mod org;
pub mod org_user;
pub mod user;

mod schema;

pub use db::{DbMapper, create_db_mapper, create_db_pool};
pub use error::{Error, Result};

#[cfg(feature = "test")]
pub use db::create_test_db_mapper;
