//! 徽章框架领域模型
//!
//! 徽章实例、持有者统计结果以及宿主提供的人员标识

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 宿主应用中的人员
///
/// 对徽章框架而言只是一个不透明的标识，资料由各提供者自行查询
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Person {
    pub id: i64,
}

impl Person {
    pub fn new(id: i64) -> Self {
        Self { id }
    }
}

/// 徽章实例
///
/// 每次评估时创建，不持久化。`data` 携带徽章关联值（如等级、布尔标记）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    pub namespace: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Badge {
    /// 创建不带数据的徽章（用于持有者统计的键）
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            data: None,
        }
    }

    /// 附带徽章数据
    pub fn with_data(mut self, data: impl Into<Value>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// 完整名称：`namespace.name`
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            Some(data) => write!(f, "{}.{}({})", self.namespace, self.name, data),
            None => write!(f, "{}.{}", self.namespace, self.name),
        }
    }
}

/// 徽章描述（供管理端列表展示）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeDescription {
    pub name: String,
    pub description: String,
}

/// 持有者数量
///
/// 部分徽章按类别分组统计（如访问等级），其余返回单一总数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BearerCount {
    Total(i64),
    Grouped(BTreeMap<String, i64>),
}

impl BearerCount {
    /// 所有分组之和
    pub fn total(&self) -> i64 {
        match self {
            Self::Total(n) => *n,
            Self::Grouped(groups) => groups.values().sum(),
        }
    }

    /// 获取分组计数，单一总数时返回 None
    pub fn group(&self, key: &str) -> Option<i64> {
        match self {
            Self::Total(_) => None,
            Self::Grouped(groups) => groups.get(key).copied(),
        }
    }
}
