//! NFG 资料仓储（PostgreSQL）
//!
//! 基于 person、person_meurs、nfg_profile 三张表提供资料查询与计数

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use badges_control::Person;
use badges_shared::error::{BadgeError, Result};

use super::traits::{NfgProfileCounter, PersonProfileLookup};
use crate::models::{AccessLevel, NfgProfile, PersonMeuRs};

/// MeuRS 记录与 NFG 资料的联表行
#[derive(Debug, sqlx::FromRow)]
struct PersonMeuRsRow {
    id: i64,
    person_id: i64,
    nfg_profile_id: Option<i64>,
    access_lvl: Option<i16>,
    voter_registration_sit: Option<i32>,
}

impl TryFrom<PersonMeuRsRow> for PersonMeuRs {
    type Error = BadgeError;

    fn try_from(row: PersonMeuRsRow) -> Result<Self> {
        let nfg_profile = match (row.nfg_profile_id, row.access_lvl) {
            (Some(id), Some(level)) => Some(NfgProfile {
                id,
                access_lvl: AccessLevel::try_from(level)?,
                voter_registration_sit: row.voter_registration_sit,
            }),
            (Some(id), None) => {
                return Err(BadgeError::Internal(format!(
                    "nfg_profile {} 缺少访问等级",
                    id
                )));
            }
            (None, _) => None,
        };

        Ok(PersonMeuRs {
            id: row.id,
            person_id: row.person_id,
            nfg_profile,
        })
    }
}

/// NFG 资料仓储
pub struct PgNfgRepository {
    pool: PgPool,
}

impl PgNfgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PersonProfileLookup for PgNfgRepository {
    #[instrument(skip(self), fields(person_id = person.id))]
    async fn get_person_meurs(&self, person: &Person) -> Result<Option<PersonMeuRs>> {
        let row = sqlx::query_as::<_, PersonMeuRsRow>(
            r#"
            SELECT m.id, m.person_id, n.id AS nfg_profile_id,
                   n.access_lvl, n.voter_registration_sit
            FROM person_meurs m
            LEFT JOIN nfg_profile n ON m.nfg_profile_id = n.id
            WHERE m.person_id = $1
            "#,
        )
        .bind(person.id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(PersonMeuRs::try_from).transpose()
    }
}

#[async_trait]
impl NfgProfileCounter for PgNfgRepository {
    #[instrument(skip(self))]
    async fn count_by_access_level(&self, filter: Option<AccessLevel>) -> Result<Vec<(i16, i64)>> {
        let rows = sqlx::query_as::<_, (i16, i64)>(
            r#"
            SELECT n.access_lvl, COUNT(n.id) AS total
            FROM person_meurs m
            JOIN nfg_profile n ON m.nfg_profile_id = n.id
            WHERE ($1::smallint IS NULL OR n.access_lvl = $1)
            GROUP BY n.access_lvl
            ORDER BY n.access_lvl
            "#,
        )
        .bind(filter.map(AccessLevel::as_i16))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn count_voter_registrations(&self) -> Result<i64> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(p.id)
            FROM person_meurs m
            JOIN nfg_profile n ON m.nfg_profile_id = n.id
            JOIN person p ON m.person_id = p.id
            WHERE n.voter_registration_sit > 0
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }
}
