//! 徽章描述翻译
//!
//! 提供者在构造时通过 `Translator` 查询徽章描述，
//! key 形如 `{namespace}.{badge}.description`，翻译域为 `badges`。

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{BadgeError, Result};

/// 徽章描述所在的翻译域
pub const BADGES_DOMAIN: &str = "badges";

/// 翻译服务
pub trait Translator: Send + Sync {
    /// 查询翻译，未命中时返回 key 本身
    fn trans(&self, key: &str, domain: &str) -> String;
}

/// 徽章描述翻译 key
pub fn description_key(namespace: &str, badge: &str) -> String {
    format!("{}.{}.description", namespace, badge)
}

/// 基于内存目录的翻译服务
///
/// 目录结构：翻译域 -> key -> 文本。可从 JSON 文件加载：
///
/// ```json
/// { "badges": { "nfg.voter_registration.description": "Título de eleitor" } }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CatalogTranslator {
    catalog: HashMap<String, HashMap<String, String>>,
}

impl CatalogTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加一条翻译
    pub fn with_message(
        mut self,
        domain: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.catalog
            .entry(domain.into())
            .or_default()
            .insert(key.into(), message.into());
        self
    }

    /// 从 JSON 字符串解析目录
    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: HashMap<String, HashMap<String, String>> = serde_json::from_str(json)?;
        Ok(Self { catalog })
    }

    /// 从 JSON 文件加载目录
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BadgeError::Translation(format!("无法读取翻译目录 {}: {}", path.display(), e))
        })?;
        let translator = Self::from_json(&content)?;
        debug!(
            path = %path.display(),
            domains = translator.catalog.len(),
            "翻译目录已加载"
        );
        Ok(translator)
    }
}

impl Translator for CatalogTranslator {
    fn trans(&self, key: &str, domain: &str) -> String {
        match self.catalog.get(domain).and_then(|messages| messages.get(key)) {
            Some(message) => message.clone(),
            None => {
                warn!(key = %key, domain = %domain, "Missing translation");
                key.to_string()
            }
        }
    }
}
