//! 徽章提供者调度器
//!
//! 管理所有 BadgeProvider 实例，按命名空间索引，
//! 将评估与统计请求分发给对应的提供者。
//!
//! ## 使用示例
//!
//! ```ignore
//! let mut handler = BadgesHandler::new();
//! handler.register(Arc::new(nfg_provider))?;
//!
//! let event = handler.evaluate(Person::new(1)).await?;
//! let bearers = handler.list_bearers(None).await?;
//! ```

use std::sync::Arc;

use tracing::{debug, info, instrument};

use badges_shared::observability::metrics::record_badge_evaluation;

use crate::error::{BadgeError, Result};
use crate::event::{EvaluateBadgesEvent, ListBearersEvent};
use crate::models::{Badge, BadgeDescription, Person};
use crate::provider::BadgeProvider;

/// 提供者调度器
///
/// 提供者按注册顺序保存，评估与全量统计也按此顺序执行
#[derive(Default)]
pub struct BadgesHandler {
    providers: Vec<Arc<dyn BadgeProvider>>,
}

impl BadgesHandler {
    /// 创建空的调度器
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// 注册提供者
    ///
    /// 命名空间重复时拒绝注册
    pub fn register(&mut self, provider: Arc<dyn BadgeProvider>) -> Result<&mut Self> {
        let namespace = provider.name().to_string();
        if self.provider(&namespace).is_some() {
            return Err(BadgeError::DuplicateProvider(namespace));
        }

        debug!(
            namespace = %namespace,
            badges = provider.describe().len(),
            "注册徽章提供者"
        );
        self.providers.push(provider);
        Ok(self)
    }

    /// 获取指定命名空间的提供者
    pub fn provider(&self, namespace: &str) -> Option<Arc<dyn BadgeProvider>> {
        self.providers
            .iter()
            .find(|p| p.name() == namespace)
            .cloned()
    }

    /// 已注册的命名空间
    pub fn namespaces(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// 所有可用徽章（命名空间 -> 徽章描述）
    pub fn available_badges(&self) -> Vec<(String, Vec<BadgeDescription>)> {
        self.providers
            .iter()
            .map(|p| (p.name().to_string(), p.describe()))
            .collect()
    }

    /// 评估人员在所有提供者下可获得的徽章
    #[instrument(skip(self), fields(person_id = person.id))]
    pub async fn evaluate(&self, person: Person) -> Result<EvaluateBadgesEvent> {
        let mut event = EvaluateBadgesEvent::new(person);

        for provider in &self.providers {
            let badges = provider.evaluate(event.person()).await?;
            record_badge_evaluation(provider.name(), badges.len());
            for badge in badges {
                event.register_badge(badge);
            }
        }

        info!(
            granted = event.badges().len(),
            "Badge evaluation completed"
        );
        Ok(event)
    }

    /// 统计徽章持有者
    ///
    /// 指定徽章时只询问其命名空间对应的提供者
    #[instrument(skip(self, filter), fields(filter = ?filter.as_ref().map(|b| b.full_name())))]
    pub async fn list_bearers(&self, filter: Option<Badge>) -> Result<ListBearersEvent> {
        let mut event = ListBearersEvent::new(filter);

        match event.badge().cloned() {
            Some(badge) => {
                let provider = self
                    .provider(&badge.namespace)
                    .ok_or_else(|| BadgeError::ProviderNotFound(badge.namespace.clone()))?;
                for (badge, count) in provider.list_bearer_counts(Some(&badge)).await? {
                    event.set_count(badge, count);
                }
            }
            None => {
                for provider in &self.providers {
                    for (badge, count) in provider.list_bearer_counts(None).await? {
                        event.set_count(badge, count);
                    }
                }
            }
        }

        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BearerCount;
    use async_trait::async_trait;

    /// 测试用的 Mock Provider
    struct MockProvider {
        namespace: &'static str,
    }

    impl MockProvider {
        fn new(namespace: &'static str) -> Self {
            Self { namespace }
        }
    }

    #[async_trait]
    impl BadgeProvider for MockProvider {
        fn name(&self) -> &str {
            self.namespace
        }

        fn describe(&self) -> Vec<BadgeDescription> {
            vec![BadgeDescription {
                name: "member".to_string(),
                description: format!("{} member", self.namespace),
            }]
        }

        async fn evaluate(&self, person: &Person) -> Result<Vec<Badge>> {
            if person.id % 2 == 0 {
                Ok(vec![Badge::new(self.namespace, "member").with_data(true)])
            } else {
                Ok(vec![])
            }
        }

        async fn list_bearer_counts(
            &self,
            filter: Option<&Badge>,
        ) -> Result<Vec<(Badge, BearerCount)>> {
            let badge = filter
                .cloned()
                .unwrap_or_else(|| Badge::new(self.namespace, "member"));
            Ok(vec![(badge, BearerCount::Total(10))])
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl BadgeProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        fn describe(&self) -> Vec<BadgeDescription> {
            vec![]
        }

        async fn evaluate(&self, _person: &Person) -> Result<Vec<Badge>> {
            Err(BadgeError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn list_bearer_counts(
            &self,
            _filter: Option<&Badge>,
        ) -> Result<Vec<(Badge, BearerCount)>> {
            Err(BadgeError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    fn handler_with(namespaces: &[&'static str]) -> BadgesHandler {
        let mut handler = BadgesHandler::new();
        for ns in namespaces {
            handler.register(Arc::new(MockProvider::new(*ns))).unwrap();
        }
        handler
    }

    #[test]
    fn test_handler_new() {
        let handler = BadgesHandler::new();
        assert!(handler.is_empty());
        assert!(handler.provider("nfg").is_none());
    }

    #[test]
    fn test_handler_rejects_duplicate_namespace() {
        let mut handler = handler_with(&["nfg"]);
        let result = handler.register(Arc::new(MockProvider::new("nfg")));
        assert!(matches!(result, Err(BadgeError::DuplicateProvider(_))));
        assert_eq!(handler.len(), 1);
    }

    #[test]
    fn test_handler_available_badges_in_order() {
        let handler = handler_with(&["nfg", "login"]);
        assert_eq!(handler.namespaces(), vec!["nfg", "login"]);

        let available = handler.available_badges();
        assert_eq!(available[0].0, "nfg");
        assert_eq!(available[1].1[0].description, "login member");
    }

    #[tokio::test]
    async fn test_handler_evaluate_dispatches_to_all_providers() {
        let handler = handler_with(&["nfg", "login"]);

        let event = handler.evaluate(Person::new(2)).await.unwrap();
        let names: Vec<_> = event.badges().iter().map(|b| b.full_name()).collect();
        assert_eq!(names, vec!["nfg.member", "login.member"]);

        let event = handler.evaluate(Person::new(3)).await.unwrap();
        assert!(event.badges().is_empty());
    }

    #[tokio::test]
    async fn test_handler_list_bearers_all() {
        let handler = handler_with(&["nfg", "login"]);
        let event = handler.list_bearers(None).await.unwrap();
        assert_eq!(event.counts().len(), 2);
        assert_eq!(event.count_of("login", "member"), Some(&BearerCount::Total(10)));
    }

    #[tokio::test]
    async fn test_handler_list_bearers_filtered_asks_one_provider() {
        let mut handler = handler_with(&["nfg"]);
        handler.register(Arc::new(FailingProvider)).unwrap();

        // 只询问 nfg，失败的提供者不会被调用
        let filter = Badge::new("nfg", "member").with_data(1);
        let event = handler.list_bearers(Some(filter.clone())).await.unwrap();
        assert_eq!(event.counts().len(), 1);
        assert_eq!(event.counts()[0].0, filter);
    }

    #[tokio::test]
    async fn test_handler_list_bearers_unknown_namespace() {
        let handler = handler_with(&["nfg"]);
        let result = handler.list_bearers(Some(Badge::new("ghost", "member"))).await;
        assert!(matches!(result, Err(BadgeError::ProviderNotFound(ns)) if ns == "ghost"));
    }

    #[tokio::test]
    async fn test_handler_propagates_provider_errors() {
        let mut handler = handler_with(&["nfg"]);
        handler.register(Arc::new(FailingProvider)).unwrap();

        let result = handler.evaluate(Person::new(2)).await;
        assert!(matches!(result, Err(BadgeError::Database(_))));

        let result = handler.list_bearers(None).await;
        assert!(result.is_err());
    }
}
