//! NFG 资料内存仓储
//!
//! 使用 DashMap 按人员 ID 存储 MeuRS 记录，适用于测试和本地运行。
//! 计数语义与 PostgreSQL 仓储一致。

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use badges_control::Person;
use badges_shared::error::Result;

use super::traits::{NfgProfileCounter, PersonProfileLookup};
use crate::models::{AccessLevel, PersonMeuRs};

/// 内存仓储
#[derive(Debug, Clone, Default)]
pub struct MemoryNfgRepository {
    records: Arc<DashMap<i64, PersonMeuRs>>,
}

impl MemoryNfgRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入或更新记录，以 person_id 为 key
    pub fn insert(&self, meurs: PersonMeuRs) {
        self.records.insert(meurs.person_id, meurs);
    }

    /// 删除人员记录
    pub fn remove(&self, person_id: i64) -> Option<PersonMeuRs> {
        self.records.remove(&person_id).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl PersonProfileLookup for MemoryNfgRepository {
    async fn get_person_meurs(&self, person: &Person) -> Result<Option<PersonMeuRs>> {
        Ok(self.records.get(&person.id).map(|entry| entry.value().clone()))
    }
}

#[async_trait]
impl NfgProfileCounter for MemoryNfgRepository {
    async fn count_by_access_level(&self, filter: Option<AccessLevel>) -> Result<Vec<(i16, i64)>> {
        let mut totals: BTreeMap<i16, i64> = BTreeMap::new();

        for entry in self.records.iter() {
            let Some(profile) = &entry.value().nfg_profile else {
                continue;
            };
            if filter.is_some_and(|level| level != profile.access_lvl) {
                continue;
            }
            *totals.entry(profile.access_lvl.as_i16()).or_insert(0) += 1;
        }

        Ok(totals.into_iter().collect())
    }

    async fn count_voter_registrations(&self) -> Result<i64> {
        let total = self
            .records
            .iter()
            .filter(|entry| {
                entry
                    .value()
                    .nfg_profile
                    .as_ref()
                    .is_some_and(|profile| profile.counts_as_voter_registration())
            })
            .count();

        Ok(total as i64)
    }
}
