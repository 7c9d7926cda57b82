//! 徽章提供者 Trait 定义
//!
//! 宿主框架持有提供者实例并通过此接口完成评估与统计，
//! 提供者之间互不感知，按命名空间区分。

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Badge, BadgeDescription, BearerCount, Person};

/// 徽章提供者
///
/// # 设计说明
///
/// - `name`: 命名空间，全局唯一
/// - `describe`: 管理端展示的徽章列表，按注册顺序
/// - `evaluate`: 根据人员资料计算应授予的徽章，资料缺失时返回空列表
/// - `list_bearer_counts`: 统计持有者数量，传入徽章时只统计该徽章
///
/// # 示例
///
/// ```ignore
/// struct StaticProvider;
///
/// #[async_trait]
/// impl BadgeProvider for StaticProvider {
///     fn name(&self) -> &str {
///         "static"
///     }
///
///     fn describe(&self) -> Vec<BadgeDescription> {
///         vec![]
///     }
///
///     async fn evaluate(&self, _person: &Person) -> Result<Vec<Badge>> {
///         Ok(vec![])
///     }
///
///     async fn list_bearer_counts(&self, _filter: Option<&Badge>) -> Result<Vec<(Badge, BearerCount)>> {
///         Ok(vec![])
///     }
/// }
/// ```
#[async_trait]
pub trait BadgeProvider: Send + Sync {
    /// 命名空间
    fn name(&self) -> &str;

    /// 已注册徽章的名称与描述
    fn describe(&self) -> Vec<BadgeDescription>;

    /// 评估人员可获得的徽章
    ///
    /// 不修改人员或资料；外部存储错误原样向上传播
    async fn evaluate(&self, person: &Person) -> Result<Vec<Badge>>;

    /// 统计持有者数量
    ///
    /// - `Some(badge)`: 只统计该徽章，`badge.data` 作为过滤条件，返回一项
    /// - `None`: 按注册顺序统计全部徽章
    async fn list_bearer_counts(&self, filter: Option<&Badge>) -> Result<Vec<(Badge, BearerCount)>>;
}
