use async_trait::async_trait;

use chrono::{DateTime, Utc};
use deadpool_diesel::postgres::Pool;
use diesel::dsl::count_star;
use diesel::prelude::*;
use snafu::ResultExt;

use crate::Result;
use crate::error::{DbInteractSnafu, DbPoolSnafu, DbQuerySnafu};
use crate::schema::orgs::dsl;
use roster::dto::OrgDto;
use roster::utils::datetime_str;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::orgs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Org {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Org> for OrgDto {
    fn from(org: Org) -> Self {
        OrgDto {
            id: org.id,
            name: org.name,
            created_at: datetime_str(&org.created_at),
            updated_at: datetime_str(&org.updated_at),
        }
    }
}

#[async_trait]
pub trait OrgStore: Send + Sync {
    async fn get(&self, id: i32) -> Result<Option<OrgDto>>;

    /// Cheap read used by the readiness probe.
    async fn test_read(&self) -> Result<i64>;
}

pub struct OrgRepo {
    db_pool: Pool,
}

impl OrgRepo {
    pub fn new(db_pool: Pool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl OrgStore for OrgRepo {
    async fn get(&self, id: i32) -> Result<Option<OrgDto>> {
        let db = self.db_pool.get().await.context(DbPoolSnafu)?;

        let select_res = db
            .interact(move |conn| {
                dsl::orgs
                    .find(id)
                    .select(Org::as_select())
                    .first::<Org>(conn)
                    .optional()
            })
            .await
            .context(DbInteractSnafu)?;

        let org = select_res.context(DbQuerySnafu {
            table: "orgs".to_string(),
        })?;

        Ok(org.map(|o| o.into()))
    }

    async fn test_read(&self) -> Result<i64> {
        let db = self.db_pool.get().await.context(DbPoolSnafu)?;

        let count_res = db
            .interact(move |conn| dsl::orgs.select(count_star()).get_result::<i64>(conn))
            .await
            .context(DbInteractSnafu)?;

        let count = count_res.context(DbQuerySnafu {
            table: "orgs".to_string(),
        })?;

        Ok(count)
    }
}

#[cfg(feature = "test")]
pub const TEST_ORG_ID: i32 = 1000;

#[cfg(feature = "test")]
pub fn create_test_org() -> Org {
    let today = chrono::Utc::now();

    Org {
        id: TEST_ORG_ID,
        name: "Acme".to_string(),
        created_at: today,
        updated_at: today,
    }
}

#[cfg(feature = "test")]
pub struct OrgTestRepo {}

#[cfg(feature = "test")]
#[async_trait]
impl OrgStore for OrgTestRepo {
    async fn get(&self, id: i32) -> Result<Option<OrgDto>> {
        let org = create_test_org();
        if org.id == id {
            return Ok(Some(org.into()));
        }
        Ok(None)
    }

    async fn test_read(&self) -> Result<i64> {
        Ok(1)
    }
}
