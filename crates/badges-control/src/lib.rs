//! 徽章控制框架
//!
//! 宿主应用与各徽章提供者之间的契约层。
//!
//! ## 模块结构
//!
//! - `models`: 徽章、持有者统计、人员标识
//! - `registry`: 提供者内部的徽章定义注册表
//! - `provider`: 提供者接口
//! - `event`: 宿主分发的评估与统计事件
//! - `handler`: 按命名空间调度提供者
//! - `translator`: 徽章描述翻译

pub mod event;
pub mod handler;
pub mod models;
pub mod provider;
pub mod registry;
pub mod translator;

pub mod error {
    pub use badges_shared::error::{BadgeError, Result};
}

pub use error::{BadgeError, Result};
pub use event::{EvaluateBadgesEvent, ListBearersEvent};
pub use handler::BadgesHandler;
pub use models::{Badge, BadgeDescription, BearerCount, Person};
pub use provider::BadgeProvider;
pub use registry::{BadgeDefinition, BadgeRegistry};
pub use translator::{BADGES_DOMAIN, CatalogTranslator, Translator, description_key};
