//! 宿主事件
//!
//! 宿主框架分发给提供者的两类事件：徽章评估与持有者统计。

use crate::models::{Badge, BearerCount, Person};

/// 徽章评估事件
///
/// 提供者通过 `register_badge` 登记授予的徽章
#[derive(Debug, Clone)]
pub struct EvaluateBadgesEvent {
    person: Person,
    badges: Vec<Badge>,
}

impl EvaluateBadgesEvent {
    pub fn new(person: Person) -> Self {
        Self {
            person,
            badges: Vec::new(),
        }
    }

    pub fn person(&self) -> &Person {
        &self.person
    }

    pub fn register_badge(&mut self, badge: Badge) {
        self.badges.push(badge);
    }

    pub fn badges(&self) -> &[Badge] {
        &self.badges
    }

    pub fn into_badges(self) -> Vec<Badge> {
        self.badges
    }
}

/// 持有者统计事件
///
/// `badge` 为空时统计所有提供者的所有徽章
#[derive(Debug, Clone, Default)]
pub struct ListBearersEvent {
    badge: Option<Badge>,
    counts: Vec<(Badge, BearerCount)>,
}

impl ListBearersEvent {
    pub fn new(badge: Option<Badge>) -> Self {
        Self {
            badge,
            counts: Vec::new(),
        }
    }

    pub fn badge(&self) -> Option<&Badge> {
        self.badge.as_ref()
    }

    /// 登记统计结果，同一徽章重复登记时覆盖
    pub fn set_count(&mut self, badge: Badge, count: BearerCount) {
        if let Some(entry) = self
            .counts
            .iter_mut()
            .find(|(b, _)| b.namespace == badge.namespace && b.name == badge.name)
        {
            *entry = (badge, count);
            return;
        }
        self.counts.push((badge, count));
    }

    pub fn counts(&self) -> &[(Badge, BearerCount)] {
        &self.counts
    }

    /// 按 `namespace.name` 查找统计结果
    pub fn count_of(&self, namespace: &str, name: &str) -> Option<&BearerCount> {
        self.counts
            .iter()
            .find(|(b, _)| b.namespace == namespace && b.name == name)
            .map(|(_, c)| c)
    }

    pub fn into_counts(self) -> Vec<(Badge, BearerCount)> {
        self.counts
    }
}
