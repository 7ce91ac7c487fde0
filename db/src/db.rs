use deadpool_diesel::postgres::{Manager, Pool, Runtime};

use crate::org::{OrgRepo, OrgStore};
use crate::org_user::{OrgUserRepo, OrgUserStore};
use crate::user::{UserRepo, UserStore};

pub fn create_db_pool(database_url: &str) -> Pool {
    let manager = Manager::new(database_url, Runtime::Tokio1);
    Pool::builder(manager).max_size(8).build().unwrap()
}

pub struct DbMapper {
    pub orgs: Box<dyn OrgStore>,
    pub org_users: Box<dyn OrgUserStore>,
    pub users: Box<dyn UserStore>,
}

pub fn create_db_mapper(database_url: &str) -> DbMapper {
    let pool = create_db_pool(database_url);
    DbMapper {
        orgs: Box::new(OrgRepo::new(pool.clone())),
        org_users: Box::new(OrgUserRepo::new(pool.clone())),
        users: Box::new(UserRepo::new(pool)),
    }
}

#[cfg(feature = "test")]
pub fn create_test_db_mapper() -> DbMapper {
    use crate::org::OrgTestRepo;
    use crate::org_user::OrgUserTestRepo;
    use crate::user::UserTestRepo;

    DbMapper {
        orgs: Box::new(OrgTestRepo {}),
        org_users: Box::new(OrgUserTestRepo {}),
        users: Box::new(UserTestRepo {}),
    }
}
