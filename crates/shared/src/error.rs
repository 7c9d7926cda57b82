//! 统一错误处理模块
//!
//! 定义徽章子系统共享的错误类型，使用 thiserror 提供良好的错误信息。

use thiserror::Error;

/// 徽章子系统错误类型
#[derive(Debug, Error)]
pub enum BadgeError {
    // ==================== 注册表错误 ====================
    #[error("Badge {name} not found in namespace {namespace}.")]
    BadgeNotFound { namespace: String, name: String },

    #[error("徽章重复注册: namespace={namespace} name={name}")]
    DuplicateBadge { namespace: String, name: String },

    #[error("徽章提供者不存在: namespace={0}")]
    ProviderNotFound(String),

    #[error("徽章提供者重复注册: namespace={0}")]
    DuplicateProvider(String),

    // ==================== 数据错误 ====================
    #[error("无效的访问等级: {0}")]
    InvalidAccessLevel(i64),

    #[error("无效的统计过滤条件: badge={badge} - {reason}")]
    InvalidFilter { badge: String, reason: String },

    // ==================== 基础设施错误 ====================
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("配置错误: {0}")]
    Config(#[from] config::ConfigError),

    #[error("JSON 序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("翻译目录错误: {0}")]
    Translation(String),

    // ==================== 通用错误 ====================
    #[error("内部错误: {0}")]
    Internal(String),
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, BadgeError>;

impl BadgeError {
    /// 构造徽章未找到错误
    pub fn badge_not_found(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::BadgeNotFound {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadgeNotFound { .. } => "BADGE_NOT_FOUND",
            Self::DuplicateBadge { .. } => "DUPLICATE_BADGE",
            Self::ProviderNotFound(_) => "PROVIDER_NOT_FOUND",
            Self::DuplicateProvider(_) => "DUPLICATE_PROVIDER",
            Self::InvalidAccessLevel(_) => "INVALID_ACCESS_LEVEL",
            Self::InvalidFilter { .. } => "INVALID_FILTER",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Translation(_) => "TRANSLATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 是否为可重试错误
    ///
    /// 本子系统自身不做重试，此标记供宿主框架决定是否重放请求
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_))
    }

    /// 是否为编程/配置错误（注册表相关），应立即暴露而非恢复
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            Self::BadgeNotFound { .. }
                | Self::DuplicateBadge { .. }
                | Self::ProviderNotFound(_)
                | Self::DuplicateProvider(_)
        )
    }
}
