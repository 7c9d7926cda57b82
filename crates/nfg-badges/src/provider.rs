//! NFG 徽章提供者
//!
//! 根据人员关联的 NFG 资料授予徽章，并为管理端统计持有者数量。
//!
//! ## 徽章
//!
//! - `nfg_access_lvl`: 已关联 NFG 资料即授予，数据为访问等级；统计按等级分组
//! - `voter_registration`: 选民登记状态恰好为 1 时授予，数据为 `true`；
//!   统计口径为状态大于 0
//!
//! 两个徽章的授予条件与统计口径不同，保持原样，不要合并。

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

use badges_control::{
    Badge, BadgeDescription, BadgeProvider, BadgeRegistry, BearerCount, Person, Translator,
    BADGES_DOMAIN, description_key,
};
use badges_shared::error::{BadgeError, Result};
use badges_shared::observability::metrics::record_bearer_count;

use crate::models::AccessLevel;
use crate::repository::{NfgProfileCounter, PersonProfileLookup};

/// 命名空间
pub const NAMESPACE: &str = "nfg";
/// 访问等级徽章
pub const ACCESS_LEVEL_BADGE: &str = "nfg_access_lvl";
/// 选民登记徽章
pub const VOTER_REGISTRATION_BADGE: &str = "voter_registration";

/// 计数器选择器
///
/// 注册徽章时绑定，统计时直接按变体分派
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NfgCounter {
    AccessLevel,
    VoterRegistration,
}

/// NFG 徽章提供者
pub struct NfgBadgesProvider<L, S>
where
    L: PersonProfileLookup,
    S: NfgProfileCounter,
{
    registry: BadgeRegistry<NfgCounter>,
    lookup: Arc<L>,
    store: Arc<S>,
}

impl<L, S> NfgBadgesProvider<L, S>
where
    L: PersonProfileLookup,
    S: NfgProfileCounter,
{
    /// 创建提供者并注册徽章，描述通过翻译服务获取
    pub fn new(translator: &dyn Translator, lookup: Arc<L>, store: Arc<S>) -> Result<Self> {
        let mut registry = BadgeRegistry::new(NAMESPACE);
        registry
            .register(
                ACCESS_LEVEL_BADGE,
                translator.trans(&description_key(NAMESPACE, ACCESS_LEVEL_BADGE), BADGES_DOMAIN),
                NfgCounter::AccessLevel,
            )?
            .register(
                VOTER_REGISTRATION_BADGE,
                translator.trans(
                    &description_key(NAMESPACE, VOTER_REGISTRATION_BADGE),
                    BADGES_DOMAIN,
                ),
                NfgCounter::VoterRegistration,
            )?;

        Ok(Self {
            registry,
            lookup,
            store,
        })
    }

    pub fn registry(&self) -> &BadgeRegistry<NfgCounter> {
        &self.registry
    }

    /// 评估人员的 NFG 徽章
    ///
    /// 没有 MeuRS 记录或未关联 NFG 资料时返回空列表
    #[instrument(skip(self), fields(person_id = person.id))]
    pub async fn check_nfg(&self, person: &Person) -> Result<Vec<Badge>> {
        let Some(meurs) = self.lookup.get_person_meurs(person).await? else {
            debug!("No MeuRS record for person");
            return Ok(Vec::new());
        };
        let Some(profile) = meurs.nfg_profile else {
            debug!(meurs_id = meurs.id, "MeuRS record has no NFG profile");
            return Ok(Vec::new());
        };

        let mut badges = vec![
            self.registry
                .badge(ACCESS_LEVEL_BADGE, profile.access_lvl.as_i16())?,
        ];
        if profile.has_voter_registration() {
            badges.push(self.registry.badge(VOTER_REGISTRATION_BADGE, true)?);
        }

        debug!(
            access_lvl = %profile.access_lvl,
            voter_registration_sit = ?profile.voter_registration_sit,
            granted = badges.len(),
            "NFG badges evaluated"
        );
        Ok(badges)
    }

    /// 按访问等级统计持有者
    ///
    /// 结果总是包含 1、2、3 三个等级，存储未返回的等级计为 0
    #[instrument(skip(self))]
    pub async fn count_access_level(
        &self,
        filter: Option<AccessLevel>,
    ) -> Result<BTreeMap<AccessLevel, i64>> {
        let mut counts: BTreeMap<AccessLevel, i64> =
            AccessLevel::ALL.iter().map(|level| (*level, 0)).collect();

        for (level, total) in self.store.count_by_access_level(filter).await? {
            counts.insert(AccessLevel::try_from(level)?, total);
        }

        Ok(counts)
    }

    /// 统计选民登记状态大于 0 的持有者
    #[instrument(skip(self))]
    pub async fn count_voter_registration(&self) -> Result<i64> {
        self.store.count_voter_registrations().await
    }

    /// 按计数器选择器分派统计
    async fn count(&self, badge: &str, counter: NfgCounter, data: Option<&Value>) -> Result<BearerCount> {
        let started = Instant::now();

        let count = match counter {
            NfgCounter::AccessLevel => {
                let filter = parse_access_level_filter(badge, data)?;
                let counts = self.count_access_level(filter).await?;
                BearerCount::Grouped(
                    counts
                        .into_iter()
                        .map(|(level, total)| (level.to_string(), total))
                        .collect(),
                )
            }
            // 选民登记统计不接受过滤条件
            NfgCounter::VoterRegistration => {
                BearerCount::Total(self.count_voter_registration().await?)
            }
        };

        record_bearer_count(NAMESPACE, badge, started.elapsed().as_secs_f64());
        Ok(count)
    }
}

/// 解析访问等级过滤条件
///
/// 接受 1..=3 的整数或数字字符串，空值表示不过滤
fn parse_access_level_filter(badge: &str, data: Option<&Value>) -> Result<Option<AccessLevel>> {
    let invalid = |reason: String| BadgeError::InvalidFilter {
        badge: badge.to_string(),
        reason,
    };

    let raw = match data {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| invalid(format!("访问等级必须是整数: {}", n)))?,
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid(format!("访问等级必须是整数: {}", s)))?,
        Some(other) => return Err(invalid(format!("不支持的过滤值: {}", other))),
    };

    AccessLevel::try_from(raw)
        .map(Some)
        .map_err(|e| invalid(e.to_string()))
}

#[async_trait]
impl<L, S> BadgeProvider for NfgBadgesProvider<L, S>
where
    L: PersonProfileLookup,
    S: NfgProfileCounter,
{
    fn name(&self) -> &str {
        self.registry.namespace()
    }

    fn describe(&self) -> Vec<BadgeDescription> {
        self.registry.descriptions()
    }

    async fn evaluate(&self, person: &Person) -> Result<Vec<Badge>> {
        self.check_nfg(person).await
    }

    async fn list_bearer_counts(&self, filter: Option<&Badge>) -> Result<Vec<(Badge, BearerCount)>> {
        if let Some(filter_badge) = filter {
            if filter_badge.namespace != self.registry.namespace() {
                return Err(BadgeError::badge_not_found(
                    &filter_badge.namespace,
                    &filter_badge.name,
                ));
            }
            let definition = self.registry.lookup(&filter_badge.name)?;
            let count = self
                .count(&definition.name, definition.counter, filter_badge.data.as_ref())
                .await?;
            return Ok(vec![(filter_badge.clone(), count)]);
        }

        let mut counts = Vec::with_capacity(self.registry.len());
        for definition in self.registry.iter() {
            let count = self.count(&definition.name, definition.counter, None).await?;
            counts.push((Badge::new(NAMESPACE, &definition.name), count));
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NfgProfile, PersonMeuRs};
    use crate::repository::{MockNfgProfileCounter, MockPersonProfileLookup};
    use badges_control::CatalogTranslator;
    use serde_json::json;

    fn translator() -> CatalogTranslator {
        CatalogTranslator::new()
            .with_message(BADGES_DOMAIN, "nfg.nfg_access_lvl.description", "Nível de acesso NFG")
            .with_message(
                BADGES_DOMAIN,
                "nfg.voter_registration.description",
                "Título de eleitor",
            )
    }

    fn provider_with(
        lookup: MockPersonProfileLookup,
        store: MockNfgProfileCounter,
    ) -> NfgBadgesProvider<MockPersonProfileLookup, MockNfgProfileCounter> {
        NfgBadgesProvider::new(&translator(), Arc::new(lookup), Arc::new(store)).unwrap()
    }

    fn lookup_returning(meurs: Option<PersonMeuRs>) -> MockPersonProfileLookup {
        let mut lookup = MockPersonProfileLookup::new();
        lookup
            .expect_get_person_meurs()
            .returning(move |_| Ok(meurs.clone()));
        lookup
    }

    fn linked(level: AccessLevel, sit: Option<i32>) -> Option<PersonMeuRs> {
        let mut profile = NfgProfile::new(1, level);
        profile.voter_registration_sit = sit;
        Some(PersonMeuRs::new(1, 1).with_nfg_profile(profile))
    }

    #[test]
    fn test_provider_registers_translated_badges() {
        let provider = provider_with(MockPersonProfileLookup::new(), MockNfgProfileCounter::new());
        assert_eq!(provider.name(), "nfg");

        let described = provider.describe();
        assert_eq!(described.len(), 2);
        assert_eq!(described[0].name, ACCESS_LEVEL_BADGE);
        assert_eq!(described[0].description, "Nível de acesso NFG");
        assert_eq!(described[1].name, VOTER_REGISTRATION_BADGE);
        assert_eq!(
            provider.registry().lookup(VOTER_REGISTRATION_BADGE).unwrap().counter,
            NfgCounter::VoterRegistration
        );
    }

    #[test]
    fn test_provider_description_falls_back_to_key() {
        let provider = NfgBadgesProvider::new(
            &CatalogTranslator::new(),
            Arc::new(MockPersonProfileLookup::new()),
            Arc::new(MockNfgProfileCounter::new()),
        )
        .unwrap();
        assert_eq!(provider.describe()[0].description, "nfg.nfg_access_lvl.description");
    }

    #[tokio::test]
    async fn test_evaluate_without_meurs_record() {
        let provider = provider_with(lookup_returning(None), MockNfgProfileCounter::new());
        let badges = provider.evaluate(&Person::new(1)).await.unwrap();
        assert!(badges.is_empty());
    }

    #[tokio::test]
    async fn test_evaluate_without_nfg_profile() {
        let provider = provider_with(
            lookup_returning(Some(PersonMeuRs::new(1, 1))),
            MockNfgProfileCounter::new(),
        );
        let badges = provider.evaluate(&Person::new(1)).await.unwrap();
        assert!(badges.is_empty());
    }

    #[tokio::test]
    async fn test_evaluate_grants_access_level_only() {
        for sit in [None, Some(0), Some(2), Some(-1)] {
            let provider = provider_with(
                lookup_returning(linked(AccessLevel::Intermediate, sit)),
                MockNfgProfileCounter::new(),
            );
            let badges = provider.evaluate(&Person::new(1)).await.unwrap();
            assert_eq!(badges.len(), 1, "voter_registration_sit={:?}", sit);
            assert_eq!(badges[0].namespace, NAMESPACE);
            assert_eq!(badges[0].name, ACCESS_LEVEL_BADGE);
            assert_eq!(badges[0].data, Some(json!(2)));
        }
    }

    #[tokio::test]
    async fn test_evaluate_grants_voter_registration_on_exact_one() {
        let provider = provider_with(
            lookup_returning(linked(AccessLevel::Full, Some(1))),
            MockNfgProfileCounter::new(),
        );
        let badges = provider.evaluate(&Person::new(1)).await.unwrap();
        assert_eq!(badges.len(), 2);
        assert_eq!(badges[0].data, Some(json!(3)));
        assert_eq!(badges[1].name, VOTER_REGISTRATION_BADGE);
        assert_eq!(badges[1].data, Some(json!(true)));
    }

    #[tokio::test]
    async fn test_evaluate_propagates_lookup_errors() {
        let mut lookup = MockPersonProfileLookup::new();
        lookup
            .expect_get_person_meurs()
            .returning(|_| Err(BadgeError::Database(sqlx::Error::PoolTimedOut)));
        let provider = provider_with(lookup, MockNfgProfileCounter::new());

        let result = provider.evaluate(&Person::new(1)).await;
        assert!(matches!(result, Err(BadgeError::Database(_))));
    }

    #[tokio::test]
    async fn test_count_access_level_zero_fills() {
        let mut store = MockNfgProfileCounter::new();
        store
            .expect_count_by_access_level()
            .returning(|_| Ok(vec![]));
        let provider = provider_with(MockPersonProfileLookup::new(), store);

        let counts = provider.count_access_level(None).await.unwrap();
        assert_eq!(counts.len(), 3);
        assert!(counts.values().all(|c| *c == 0));
    }

    #[tokio::test]
    async fn test_count_access_level_passes_filter() {
        let mut store = MockNfgProfileCounter::new();
        store
            .expect_count_by_access_level()
            .withf(|filter| *filter == Some(AccessLevel::Intermediate))
            .times(1)
            .returning(|_| Ok(vec![(2, 4)]));
        let provider = provider_with(MockPersonProfileLookup::new(), store);

        let counts = provider
            .count_access_level(Some(AccessLevel::Intermediate))
            .await
            .unwrap();
        assert_eq!(counts[&AccessLevel::Basic], 0);
        assert_eq!(counts[&AccessLevel::Intermediate], 4);
        assert_eq!(counts[&AccessLevel::Full], 0);
    }

    #[tokio::test]
    async fn test_count_access_level_rejects_unknown_level_from_store() {
        let mut store = MockNfgProfileCounter::new();
        store
            .expect_count_by_access_level()
            .returning(|_| Ok(vec![(1, 2), (7, 1)]));
        let provider = provider_with(MockPersonProfileLookup::new(), store);

        let result = provider.count_access_level(None).await;
        assert!(matches!(result, Err(BadgeError::InvalidAccessLevel(7))));
    }

    #[tokio::test]
    async fn test_list_bearer_counts_all_in_registration_order() {
        let mut store = MockNfgProfileCounter::new();
        store
            .expect_count_by_access_level()
            .withf(|filter| filter.is_none())
            .returning(|_| Ok(vec![(1, 2), (2, 1), (3, 3)]));
        store
            .expect_count_voter_registrations()
            .returning(|| Ok(0));
        let provider = provider_with(MockPersonProfileLookup::new(), store);

        let counts = provider.list_bearer_counts(None).await.unwrap();
        assert_eq!(counts.len(), 2);

        assert_eq!(counts[0].0, Badge::new(NAMESPACE, ACCESS_LEVEL_BADGE));
        assert_eq!(
            counts[0].1,
            BearerCount::Grouped(BTreeMap::from([
                ("1".to_string(), 2),
                ("2".to_string(), 1),
                ("3".to_string(), 3),
            ]))
        );
        assert_eq!(counts[1].0, Badge::new(NAMESPACE, VOTER_REGISTRATION_BADGE));
        assert_eq!(counts[1].1, BearerCount::Total(0));
    }

    #[tokio::test]
    async fn test_list_bearer_counts_with_filter_badge() {
        let mut store = MockNfgProfileCounter::new();
        store
            .expect_count_by_access_level()
            .withf(|filter| *filter == Some(AccessLevel::Full))
            .returning(|_| Ok(vec![(3, 5)]));
        let provider = provider_with(MockPersonProfileLookup::new(), store);

        let filter = Badge::new(NAMESPACE, ACCESS_LEVEL_BADGE).with_data("3");
        let counts = provider.list_bearer_counts(Some(&filter)).await.unwrap();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].0, filter);
        assert_eq!(counts[0].1.group("3"), Some(5));
        assert_eq!(counts[0].1.total(), 5);
    }

    #[tokio::test]
    async fn test_list_bearer_counts_voter_ignores_filter_data() {
        let mut store = MockNfgProfileCounter::new();
        store
            .expect_count_voter_registrations()
            .times(1)
            .returning(|| Ok(12));
        let provider = provider_with(MockPersonProfileLookup::new(), store);

        let filter = Badge::new(NAMESPACE, VOTER_REGISTRATION_BADGE).with_data(true);
        let counts = provider.list_bearer_counts(Some(&filter)).await.unwrap();
        assert_eq!(counts[0].1, BearerCount::Total(12));
    }

    #[tokio::test]
    async fn test_list_bearer_counts_unknown_badge() {
        let provider = provider_with(MockPersonProfileLookup::new(), MockNfgProfileCounter::new());

        let filter = Badge::new(NAMESPACE, "gold_member");
        let err = provider.list_bearer_counts(Some(&filter)).await.unwrap_err();
        assert_eq!(err.to_string(), "Badge gold_member not found in namespace nfg.");

        let foreign = Badge::new("login", ACCESS_LEVEL_BADGE);
        let err = provider.list_bearer_counts(Some(&foreign)).await.unwrap_err();
        assert!(matches!(err, BadgeError::BadgeNotFound { namespace, .. } if namespace == "login"));
    }

    #[test]
    fn test_parse_access_level_filter() {
        assert_eq!(parse_access_level_filter("b", None).unwrap(), None);
        assert_eq!(parse_access_level_filter("b", Some(&Value::Null)).unwrap(), None);
        assert_eq!(
            parse_access_level_filter("b", Some(&json!(1))).unwrap(),
            Some(AccessLevel::Basic)
        );
        assert_eq!(
            parse_access_level_filter("b", Some(&json!(" 2 "))).unwrap(),
            Some(AccessLevel::Intermediate)
        );

        for bad in [json!(4), json!(1.5), json!("x"), json!(true), json!([1])] {
            let result = parse_access_level_filter("b", Some(&bad));
            assert!(
                matches!(result, Err(BadgeError::InvalidFilter { .. })),
                "filter {} should be rejected",
                bad
            );
        }
    }
}
