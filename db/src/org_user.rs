use async_trait::async_trait;

use chrono::{DateTime, Utc};
use deadpool_diesel::postgres::Pool;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use snafu::ResultExt;

use crate::Result;
use crate::error::{
    DbInteractSnafu, DbPoolSnafu, DbQuerySnafu, LastOrgAdminSnafu, NotFoundSnafu,
    UserAlreadyMemberSnafu,
};
use crate::schema::org_users::{self, dsl};
use crate::schema::users;
use roster::dto::OrgUserDto;
use roster::role::Role;
use roster::utils::{age_string, datetime_str};

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::org_users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct InsertableOrgUser {
    org_id: i32,
    user_id: i32,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Membership row joined with the user it points to.
#[derive(Queryable)]
pub struct OrgUserRecord {
    pub org_id: i32,
    pub user_id: i32,
    pub email: String,
    pub name: String,
    pub login: String,
    pub role: String,
    pub last_seen_at: DateTime<Utc>,
}

impl TryFrom<OrgUserRecord> for OrgUserDto {
    type Error = String;

    fn try_from(record: OrgUserRecord) -> std::result::Result<Self, Self::Error> {
        let Ok(role) = Role::try_from(record.role.as_str()) else {
            return Err("Role should convert back to enum".to_string());
        };

        Ok(OrgUserDto {
            org_id: record.org_id,
            user_id: record.user_id,
            email: record.email,
            name: record.name,
            login: record.login,
            role,
            last_seen_at: datetime_str(&record.last_seen_at),
            last_seen_age: age_string(&record.last_seen_at),
            avatar_url: String::new(),
            access_control: None,
        })
    }
}

enum UpdateOutcome {
    Updated,
    LastAdmin,
    NotFound,
}

enum RemoveOutcome {
    Removed { user_deleted: bool },
    LastAdmin,
    NotFound,
}

#[async_trait]
pub trait OrgUserStore: Send + Sync {
    /// Fails with `Error::UserAlreadyMember` when the membership exists.
    async fn add(&self, org_id: i32, user_id: i32, role: Role) -> Result<()>;

    async fn list(
        &self,
        org_id: i32,
        query: Option<String>,
        limit: i32,
    ) -> Result<Vec<OrgUserDto>>;

    /// Returns the page slice plus the total match count.
    async fn search(
        &self,
        org_id: i32,
        query: Option<String>,
        page: i32,
        per_page: i32,
    ) -> Result<(Vec<OrgUserDto>, i64)>;

    /// Fails with `Error::LastOrgAdmin` when demoting the only admin left.
    async fn update_role(&self, org_id: i32, user_id: i32, role: Role) -> Result<()>;

    /// Unlinks the user from the org. With `delete_orphan`, a user left with
    /// no memberships is deleted outright; the returned flag reports whether
    /// that happened. Fails with `Error::LastOrgAdmin` when removing the only
    /// admin left.
    async fn remove(&self, org_id: i32, user_id: i32, delete_orphan: bool) -> Result<bool>;
}

pub struct OrgUserRepo {
    db_pool: Pool,
}

impl OrgUserRepo {
    pub fn new(db_pool: Pool) -> Self {
        Self { db_pool }
    }

    async fn search_count(&self, org_id: i32, query: Option<String>) -> Result<i64> {
        let db = self.db_pool.get().await.context(DbPoolSnafu)?;

        let count_res = db
            .interact(move |conn| {
                let mut q = dsl::org_users
                    .inner_join(users::table.on(users::id.eq(org_users::user_id)))
                    .filter(dsl::org_id.eq(org_id))
                    .into_boxed();

                if let Some(keyword) = query
                    && !keyword.is_empty()
                {
                    let pattern = format!("%{}%", keyword);
                    q = q.filter(
                        users::login
                            .like(pattern.clone())
                            .or(users::email.like(pattern.clone()))
                            .or(users::name.like(pattern)),
                    );
                }

                q.select(count_star()).get_result::<i64>(conn)
            })
            .await
            .context(DbInteractSnafu)?;

        let count = count_res.context(DbQuerySnafu {
            table: "org_users".to_string(),
        })?;

        Ok(count)
    }
}

/// Admins of the org other than the given user.
fn remaining_admins(conn: &mut PgConnection, org_id: i32, user_id: i32) -> QueryResult<i64> {
    dsl::org_users
        .filter(dsl::org_id.eq(org_id))
        .filter(dsl::role.eq(Role::Admin.to_string()))
        .filter(dsl::user_id.ne(user_id))
        .select(count_star())
        .get_result::<i64>(conn)
}

#[async_trait]
impl OrgUserStore for OrgUserRepo {
    async fn add(&self, org_id: i32, user_id: i32, role: Role) -> Result<()> {
        let db = self.db_pool.get().await.context(DbPoolSnafu)?;

        let today = chrono::Utc::now();
        let new_doc = InsertableOrgUser {
            org_id,
            user_id,
            role: role.to_string(),
            created_at: today,
            updated_at: today,
        };

        let insert_res = db
            .interact(move |conn| {
                diesel::insert_into(org_users::table)
                    .values(&new_doc)
                    .execute(conn)
            })
            .await
            .context(DbInteractSnafu)?;

        // The (org_id, user_id) pair is unique, a violation means the user
        // is already a member
        match insert_res {
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                UserAlreadyMemberSnafu.fail()
            }
            other => {
                let _ = other.context(DbQuerySnafu {
                    table: "org_users".to_string(),
                })?;
                Ok(())
            }
        }
    }

    async fn list(
        &self,
        org_id: i32,
        query: Option<String>,
        limit: i32,
    ) -> Result<Vec<OrgUserDto>> {
        let db = self.db_pool.get().await.context(DbPoolSnafu)?;

        let select_res = db
            .interact(move |conn| {
                let mut q = dsl::org_users
                    .inner_join(users::table.on(users::id.eq(org_users::user_id)))
                    .filter(dsl::org_id.eq(org_id))
                    .into_boxed();

                if let Some(keyword) = query
                    && !keyword.is_empty()
                {
                    let pattern = format!("%{}%", keyword);
                    q = q.filter(
                        users::login
                            .like(pattern.clone())
                            .or(users::email.like(pattern.clone()))
                            .or(users::name.like(pattern)),
                    );
                }

                q.order_by(users::email.asc())
                    .limit(limit as i64)
                    .select((
                        org_users::org_id,
                        org_users::user_id,
                        users::email,
                        users::name,
                        users::login,
                        org_users::role,
                        users::last_seen_at,
                    ))
                    .load::<OrgUserRecord>(conn)
            })
            .await
            .context(DbInteractSnafu)?;

        let items = select_res.context(DbQuerySnafu {
            table: "org_users".to_string(),
        })?;

        let items: std::result::Result<Vec<OrgUserDto>, String> =
            items.into_iter().map(|x| x.try_into()).collect();

        match items {
            Ok(list) => Ok(list),
            Err(e) => Err(e.into()),
        }
    }

    async fn search(
        &self,
        org_id: i32,
        query: Option<String>,
        page: i32,
        per_page: i32,
    ) -> Result<(Vec<OrgUserDto>, i64)> {
        let total_records = self.search_count(org_id, query.clone()).await?;

        // Do not query if we already know there are no records
        if total_records == 0 {
            return Ok((Vec::new(), 0));
        }

        let db = self.db_pool.get().await.context(DbPoolSnafu)?;

        let offset = (page as i64 - 1) * per_page as i64;
        let select_res = db
            .interact(move |conn| {
                let mut q = dsl::org_users
                    .inner_join(users::table.on(users::id.eq(org_users::user_id)))
                    .filter(dsl::org_id.eq(org_id))
                    .into_boxed();

                if let Some(keyword) = query
                    && !keyword.is_empty()
                {
                    let pattern = format!("%{}%", keyword);
                    q = q.filter(
                        users::login
                            .like(pattern.clone())
                            .or(users::email.like(pattern.clone()))
                            .or(users::name.like(pattern)),
                    );
                }

                q.order_by(users::email.asc())
                    .offset(offset)
                    .limit(per_page as i64)
                    .select((
                        org_users::org_id,
                        org_users::user_id,
                        users::email,
                        users::name,
                        users::login,
                        org_users::role,
                        users::last_seen_at,
                    ))
                    .load::<OrgUserRecord>(conn)
            })
            .await
            .context(DbInteractSnafu)?;

        let items = select_res.context(DbQuerySnafu {
            table: "org_users".to_string(),
        })?;

        let items: std::result::Result<Vec<OrgUserDto>, String> =
            items.into_iter().map(|x| x.try_into()).collect();

        match items {
            Ok(list) => Ok((list, total_records)),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_role(&self, org_id: i32, user_id: i32, role: Role) -> Result<()> {
        let db = self.db_pool.get().await.context(DbPoolSnafu)?;

        let role_str = role.to_string();
        let update_res = db
            .interact(move |conn| {
                conn.transaction::<_, DieselError, _>(|conn| {
                    let current: Option<String> = dsl::org_users
                        .filter(dsl::org_id.eq(org_id))
                        .filter(dsl::user_id.eq(user_id))
                        .select(dsl::role)
                        .first::<String>(conn)
                        .optional()?;

                    let Some(current) = current else {
                        return Ok(UpdateOutcome::NotFound);
                    };

                    // Demoting an admin must leave at least one admin behind
                    if current == Role::Admin.to_string()
                        && role_str != Role::Admin.to_string()
                        && remaining_admins(conn, org_id, user_id)? == 0
                    {
                        return Ok(UpdateOutcome::LastAdmin);
                    }

                    diesel::update(
                        dsl::org_users
                            .filter(dsl::org_id.eq(org_id))
                            .filter(dsl::user_id.eq(user_id)),
                    )
                    .set((
                        dsl::role.eq(role_str.clone()),
                        dsl::updated_at.eq(chrono::Utc::now()),
                    ))
                    .execute(conn)?;

                    Ok(UpdateOutcome::Updated)
                })
            })
            .await
            .context(DbInteractSnafu)?;

        let outcome = update_res.context(DbQuerySnafu {
            table: "org_users".to_string(),
        })?;

        match outcome {
            UpdateOutcome::Updated => Ok(()),
            UpdateOutcome::LastAdmin => LastOrgAdminSnafu.fail(),
            UpdateOutcome::NotFound => NotFoundSnafu {
                msg: "Org user not found".to_string(),
            }
            .fail(),
        }
    }

    async fn remove(&self, org_id: i32, user_id: i32, delete_orphan: bool) -> Result<bool> {
        let db = self.db_pool.get().await.context(DbPoolSnafu)?;

        let remove_res = db
            .interact(move |conn| {
                conn.transaction::<_, DieselError, _>(|conn| {
                    let current: Option<String> = dsl::org_users
                        .filter(dsl::org_id.eq(org_id))
                        .filter(dsl::user_id.eq(user_id))
                        .select(dsl::role)
                        .first::<String>(conn)
                        .optional()?;

                    let Some(current) = current else {
                        return Ok(RemoveOutcome::NotFound);
                    };

                    if current == Role::Admin.to_string()
                        && remaining_admins(conn, org_id, user_id)? == 0
                    {
                        return Ok(RemoveOutcome::LastAdmin);
                    }

                    diesel::delete(
                        dsl::org_users
                            .filter(dsl::org_id.eq(org_id))
                            .filter(dsl::user_id.eq(user_id)),
                    )
                    .execute(conn)?;

                    let mut user_deleted = false;
                    if delete_orphan {
                        let memberships: i64 = dsl::org_users
                            .filter(dsl::user_id.eq(user_id))
                            .select(count_star())
                            .get_result::<i64>(conn)?;

                        let is_service: Option<bool> = users::table
                            .find(user_id)
                            .select(users::is_service_account)
                            .first::<bool>(conn)
                            .optional()?;

                        // Service accounts are managed elsewhere, never
                        // cascade into them
                        if memberships == 0 && is_service == Some(false) {
                            diesel::delete(users::table.find(user_id)).execute(conn)?;
                            user_deleted = true;
                        }
                    }

                    Ok(RemoveOutcome::Removed { user_deleted })
                })
            })
            .await
            .context(DbInteractSnafu)?;

        let outcome = remove_res.context(DbQuerySnafu {
            table: "org_users".to_string(),
        })?;

        match outcome {
            RemoveOutcome::Removed { user_deleted } => Ok(user_deleted),
            RemoveOutcome::LastAdmin => LastOrgAdminSnafu.fail(),
            RemoveOutcome::NotFound => NotFoundSnafu {
                msg: "Org user not found".to_string(),
            }
            .fail(),
        }
    }
}

#[cfg(feature = "test")]
pub fn create_test_org_users() -> Vec<OrgUserDto> {
    use crate::org::TEST_ORG_ID;
    use crate::user::create_test_users;
    use crate::user::{TEST_ADMIN_USER_ID, TEST_EDITOR_USER_ID};

    let role_of = |id: i32| {
        if id == TEST_ADMIN_USER_ID {
            Role::Admin
        } else if id == TEST_EDITOR_USER_ID {
            Role::Editor
        } else {
            Role::Viewer
        }
    };

    create_test_users()
        .into_iter()
        .filter(|u| u.id != crate::user::TEST_OUTSIDE_USER_ID)
        .map(|u| OrgUserDto {
            org_id: TEST_ORG_ID,
            user_id: u.id,
            email: u.email,
            name: u.name,
            login: u.login,
            role: role_of(u.id),
            last_seen_at: datetime_str(&u.last_seen_at),
            last_seen_age: age_string(&u.last_seen_at),
            avatar_url: String::new(),
            access_control: None,
        })
        .collect()
}

#[cfg(feature = "test")]
pub struct OrgUserTestRepo {}

#[cfg(feature = "test")]
#[async_trait]
impl OrgUserStore for OrgUserTestRepo {
    async fn add(&self, _org_id: i32, user_id: i32, _role: Role) -> Result<()> {
        let members = create_test_org_users();
        if members.iter().any(|m| m.user_id == user_id) {
            return UserAlreadyMemberSnafu.fail();
        }
        Ok(())
    }

    async fn list(
        &self,
        _org_id: i32,
        query: Option<String>,
        limit: i32,
    ) -> Result<Vec<OrgUserDto>> {
        let keyword = query.unwrap_or_default();
        let members: Vec<OrgUserDto> = create_test_org_users()
            .into_iter()
            .filter(|m| keyword.is_empty() || m.login.contains(&keyword))
            .take(limit as usize)
            .collect();
        Ok(members)
    }

    async fn search(
        &self,
        org_id: i32,
        query: Option<String>,
        page: i32,
        per_page: i32,
    ) -> Result<(Vec<OrgUserDto>, i64)> {
        let members = self.list(org_id, query, i32::MAX).await?;
        let total = members.len() as i64;
        let offset = ((page - 1) * per_page) as usize;
        let slice: Vec<OrgUserDto> = members
            .into_iter()
            .skip(offset)
            .take(per_page as usize)
            .collect();
        Ok((slice, total))
    }

    async fn update_role(&self, _org_id: i32, user_id: i32, role: Role) -> Result<()> {
        use crate::user::TEST_ADMIN_USER_ID;

        let members = create_test_org_users();
        let Some(member) = members.iter().find(|m| m.user_id == user_id) else {
            return NotFoundSnafu {
                msg: "Org user not found".to_string(),
            }
            .fail();
        };

        // The fixture org has a single admin
        if member.user_id == TEST_ADMIN_USER_ID && role != Role::Admin {
            return LastOrgAdminSnafu.fail();
        }
        Ok(())
    }

    async fn remove(&self, _org_id: i32, user_id: i32, delete_orphan: bool) -> Result<bool> {
        use crate::user::{TEST_ADMIN_USER_ID, TEST_EDITOR_USER_ID, TEST_VIEWER_USER_ID};

        let members = create_test_org_users();
        if !members.iter().any(|m| m.user_id == user_id) {
            return NotFoundSnafu {
                msg: "Org user not found".to_string(),
            }
            .fail();
        }

        match user_id {
            id if id == TEST_ADMIN_USER_ID => LastOrgAdminSnafu.fail(),
            // alice has no other memberships, bob does
            id if id == TEST_VIEWER_USER_ID => Ok(delete_orphan),
            id if id == TEST_EDITOR_USER_ID => Ok(false),
            _ => Ok(false),
        }
    }
}
