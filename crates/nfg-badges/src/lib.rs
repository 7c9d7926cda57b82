//! NFG 徽章提供者
//!
//! 根据人员在 NFG 系统中的资料（访问等级、选民登记状态）授予徽章，
//! 并为管理端统计各徽章的持有者数量。
//!
//! ## 模块结构
//!
//! - `models`: NFG 资料与 MeuRS 人员记录
//! - `repository`: 资料查询与计数仓储
//! - `provider`: 徽章评估与统计

pub mod models;
pub mod provider;
pub mod repository;

pub use models::{AccessLevel, NfgProfile, PersonMeuRs};
pub use provider::{
    ACCESS_LEVEL_BADGE, NAMESPACE, NfgBadgesProvider, NfgCounter, VOTER_REGISTRATION_BADGE,
};
pub use repository::{
    MemoryNfgRepository, NfgProfileCounter, PersonProfileLookup, PgNfgRepository,
};
