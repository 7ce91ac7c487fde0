use async_trait::async_trait;

use chrono::{DateTime, Utc};
use deadpool_diesel::postgres::Pool;
use diesel::prelude::*;
use snafu::ResultExt;

use crate::Result;
use crate::error::{DbInteractSnafu, DbPoolSnafu, DbQuerySnafu};
use crate::schema::users::dsl;
use roster::dto::UserDto;
use roster::utils::datetime_str;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i32,
    pub login: String,
    pub email: String,
    pub name: String,
    pub is_service_account: bool,
    pub last_seen_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        UserDto {
            id: user.id,
            login: user.login,
            email: user.email,
            name: user.name,
            is_service_account: user.is_service_account,
            last_seen_at: datetime_str(&user.last_seen_at),
            created_at: datetime_str(&user.created_at),
            updated_at: datetime_str(&user.updated_at),
        }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, id: i32) -> Result<Option<UserDto>>;

    async fn get_by_login_or_email(&self, login_or_email: &str) -> Result<Option<UserDto>>;
}

pub struct UserRepo {
    db_pool: Pool,
}

impl UserRepo {
    pub fn new(db_pool: Pool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UserStore for UserRepo {
    async fn get(&self, id: i32) -> Result<Option<UserDto>> {
        let db = self.db_pool.get().await.context(DbPoolSnafu)?;

        let select_res = db
            .interact(move |conn| {
                dsl::users
                    .find(id)
                    .select(User::as_select())
                    .first::<User>(conn)
                    .optional()
            })
            .await
            .context(DbInteractSnafu)?;

        let user = select_res.context(DbQuerySnafu {
            table: "users".to_string(),
        })?;

        Ok(user.map(|u| u.into()))
    }

    async fn get_by_login_or_email(&self, login_or_email: &str) -> Result<Option<UserDto>> {
        let db = self.db_pool.get().await.context(DbPoolSnafu)?;

        let needle = login_or_email.to_string();
        let select_res = db
            .interact(move |conn| {
                // Try the login first, fall back to the email address
                let by_login = dsl::users
                    .filter(dsl::login.eq(&needle))
                    .select(User::as_select())
                    .first::<User>(conn)
                    .optional()?;

                if by_login.is_some() {
                    return Ok(by_login);
                }

                dsl::users
                    .filter(dsl::email.eq(&needle))
                    .select(User::as_select())
                    .first::<User>(conn)
                    .optional()
            })
            .await
            .context(DbInteractSnafu)?;

        let user = select_res.context(DbQuerySnafu {
            table: "users".to_string(),
        })?;

        Ok(user.map(|u| u.into()))
    }
}

#[cfg(feature = "test")]
pub const TEST_ADMIN_USER_ID: i32 = 2001;

#[cfg(feature = "test")]
pub const TEST_EDITOR_USER_ID: i32 = 2002;

#[cfg(feature = "test")]
pub const TEST_VIEWER_USER_ID: i32 = 2003;

#[cfg(feature = "test")]
pub const TEST_HIDDEN_USER_ID: i32 = 2004;

#[cfg(feature = "test")]
pub const TEST_OUTSIDE_USER_ID: i32 = 2005;

#[cfg(feature = "test")]
pub const TEST_HIDDEN_USER_LOGIN: &str = "sa-metrics";

#[cfg(feature = "test")]
pub fn create_test_users() -> Vec<User> {
    let today = chrono::Utc::now();
    let seen = today - chrono::Duration::minutes(10);

    let user = |id: i32, login: &str, name: &str, is_service_account: bool| User {
        id,
        login: login.to_string(),
        email: format!("{}@example.com", login),
        name: name.to_string(),
        is_service_account,
        last_seen_at: seen,
        created_at: today,
        updated_at: today,
    };

    vec![
        user(TEST_ADMIN_USER_ID, "admin", "Admin", false),
        user(TEST_EDITOR_USER_ID, "bob", "Bob", false),
        user(TEST_VIEWER_USER_ID, "alice", "Alice", false),
        user(TEST_HIDDEN_USER_ID, TEST_HIDDEN_USER_LOGIN, "Metrics", true),
        user(TEST_OUTSIDE_USER_ID, "carol", "Carol", false),
    ]
}

#[cfg(feature = "test")]
pub struct UserTestRepo {}

#[cfg(feature = "test")]
#[async_trait]
impl UserStore for UserTestRepo {
    async fn get(&self, id: i32) -> Result<Option<UserDto>> {
        let found = create_test_users().into_iter().find(|u| u.id == id);
        Ok(found.map(|u| u.into()))
    }

    async fn get_by_login_or_email(&self, login_or_email: &str) -> Result<Option<UserDto>> {
        let found = create_test_users()
            .into_iter()
            .find(|u| u.login == login_or_email || u.email == login_or_email);
        Ok(found.map(|u| u.into()))
    }
}
