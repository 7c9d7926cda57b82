//! 徽章定义注册表
//!
//! 每个提供者持有一个注册表，记录其命名空间下的徽章定义。
//!
//! ## 设计说明
//!
//! - 计数器选择器 `C` 由提供者定义（通常是一个枚举），注册时即完成绑定，
//!   统计时直接按选择器分派，不做运行时名称解析
//! - 定义按注册顺序保存，无筛选的持有者统计按此顺序输出
//! - 同名重复注册返回 `DuplicateBadge`
//!
//! ## 使用示例
//!
//! ```ignore
//! let mut registry = BadgeRegistry::new("nfg");
//! registry.register("voter_registration", "Título de eleitor", NfgCounter::VoterRegistration)?;
//!
//! let badge = registry.badge("voter_registration", true)?;
//! ```

use serde_json::Value;
use tracing::debug;

use crate::error::{BadgeError, Result};
use crate::models::{Badge, BadgeDescription};

/// 徽章定义
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeDefinition<C> {
    pub name: String,
    pub description: String,
    pub counter: C,
}

/// 徽章注册表
///
/// 启动时写入一次，之后只读，可在多个请求间共享
#[derive(Debug, Clone)]
pub struct BadgeRegistry<C> {
    namespace: String,
    definitions: Vec<BadgeDefinition<C>>,
}

impl<C> BadgeRegistry<C> {
    /// 创建指定命名空间的空注册表
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            definitions: Vec::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// 注册一个徽章定义
    pub fn register(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        counter: C,
    ) -> Result<&mut Self> {
        let name = name.into();
        if self.contains(&name) {
            return Err(BadgeError::DuplicateBadge {
                namespace: self.namespace.clone(),
                name,
            });
        }

        let description = description.into();
        debug!(
            namespace = %self.namespace,
            badge = %name,
            description = %description,
            "注册徽章定义"
        );
        self.definitions.push(BadgeDefinition {
            name,
            description,
            counter,
        });
        Ok(self)
    }

    /// 查找徽章定义
    pub fn lookup(&self, name: &str) -> Result<&BadgeDefinition<C>> {
        self.definitions
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| BadgeError::badge_not_found(&self.namespace, name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.iter().any(|d| d.name == name)
    }

    /// 创建本命名空间下的徽章实例
    ///
    /// 名称未注册属于编程错误，直接返回 `BadgeNotFound`
    pub fn badge(&self, name: &str, data: impl Into<Value>) -> Result<Badge> {
        let definition = self.lookup(name)?;
        Ok(Badge::new(&self.namespace, &definition.name).with_data(data))
    }

    /// 按注册顺序遍历定义
    pub fn iter(&self) -> impl Iterator<Item = &BadgeDefinition<C>> {
        self.definitions.iter()
    }

    /// 所有徽章的名称与描述
    pub fn descriptions(&self) -> Vec<BadgeDescription> {
        self.definitions
            .iter()
            .map(|d| BadgeDescription {
                name: d.name.clone(),
                description: d.description.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
