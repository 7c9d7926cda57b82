//! NFG 资料仓储层
//!
//! 提供人员资料查询与按条件计数的接口及其实现。
//!
//! - `PgNfgRepository`: 基于 SQLx 的 PostgreSQL 实现
//! - `MemoryNfgRepository`: 基于 DashMap 的内存实现

mod memory_repo;
mod pg_repo;
mod traits;

pub use memory_repo::MemoryNfgRepository;
pub use pg_repo::PgNfgRepository;
pub use traits::*;
