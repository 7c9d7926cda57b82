//! 仓储 Trait 定义
//!
//! 提供者依赖抽象而非具体实现，便于 mock 测试和替换存储

use async_trait::async_trait;

use badges_control::Person;
use badges_shared::error::Result;

use crate::models::{AccessLevel, PersonMeuRs};

/// 人员资料查询接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PersonProfileLookup: Send + Sync {
    /// 查询人员对应的 MeuRS 记录，不存在时返回 None
    async fn get_person_meurs(&self, person: &Person) -> Result<Option<PersonMeuRs>>;
}

/// NFG 资料计数接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NfgProfileCounter: Send + Sync {
    /// 按访问等级分组计数，只统计已关联 NFG 资料的人员
    ///
    /// 返回 (access_lvl, total) 原始行，未出现的等级不返回
    async fn count_by_access_level(&self, filter: Option<AccessLevel>) -> Result<Vec<(i16, i64)>>;

    /// 选民登记状态大于 0 的人员数量
    async fn count_voter_registrations(&self) -> Result<i64>;
}
