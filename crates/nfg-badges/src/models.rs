//! NFG 资料领域模型
//!
//! 外部系统（NFG）为人员维护的资料，仅供本模块只读使用

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use badges_shared::error::{BadgeError, Result};

/// NFG 访问等级
///
/// 取值只有 1、2、3，数据库中以 smallint 存储
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AccessLevel {
    Basic = 1,
    Intermediate = 2,
    Full = 3,
}

impl AccessLevel {
    /// 所有等级，按数值升序
    pub const ALL: [AccessLevel; 3] = [Self::Basic, Self::Intermediate, Self::Full];

    pub fn as_i16(self) -> i16 {
        self as i16
    }
}

impl TryFrom<i64> for AccessLevel {
    type Error = BadgeError;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            1 => Ok(Self::Basic),
            2 => Ok(Self::Intermediate),
            3 => Ok(Self::Full),
            other => Err(BadgeError::InvalidAccessLevel(other)),
        }
    }
}

impl TryFrom<i16> for AccessLevel {
    type Error = BadgeError;

    fn try_from(value: i16) -> Result<Self> {
        Self::try_from(i64::from(value))
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i16())
    }
}

// 序列化为数字，与徽章数据和数据库中的表示一致
impl Serialize for AccessLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i16(self.as_i16())
    }
}

impl<'de> Deserialize<'de> for AccessLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = i64::deserialize(deserializer)?;
        Self::try_from(value).map_err(serde::de::Error::custom)
    }
}

/// NFG 资料
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NfgProfile {
    pub id: i64,
    /// 访问等级
    pub access_lvl: AccessLevel,
    /// 选民登记状态，1 表示登记正常
    #[serde(default)]
    pub voter_registration_sit: Option<i32>,
}

impl NfgProfile {
    pub fn new(id: i64, access_lvl: AccessLevel) -> Self {
        Self {
            id,
            access_lvl,
            voter_registration_sit: None,
        }
    }

    pub fn with_voter_registration_sit(mut self, sit: i32) -> Self {
        self.voter_registration_sit = Some(sit);
        self
    }

    /// 选民登记状态是否恰好为 1
    ///
    /// 评估徽章时使用精确相等；持有者统计使用 `> 0`，两者不要合并
    pub fn has_voter_registration(&self) -> bool {
        self.voter_registration_sit == Some(1)
    }

    /// 是否计入选民登记持有者统计（状态大于 0）
    pub fn counts_as_voter_registration(&self) -> bool {
        self.voter_registration_sit.is_some_and(|sit| sit > 0)
    }
}

/// MeuRS 人员记录
///
/// 宿主人员与 NFG 资料之间的关联，`nfg_profile` 为空表示尚未关联
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonMeuRs {
    pub id: i64,
    pub person_id: i64,
    #[serde(default)]
    pub nfg_profile: Option<NfgProfile>,
}

impl PersonMeuRs {
    pub fn new(id: i64, person_id: i64) -> Self {
        Self {
            id,
            person_id,
            nfg_profile: None,
        }
    }

    pub fn with_nfg_profile(mut self, profile: NfgProfile) -> Self {
        self.nfg_profile = Some(profile);
        self
    }
}
