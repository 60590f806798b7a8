//! ライフサイクル設定のモデル

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};

/// リソースファミリーごとのポーリング／リトライ上書き設定
///
/// ```yaml
/// database:
///   poll_interval_secs: 30
///   poll_timeout_secs: 7200
/// container:
///   delete_attempts: 10
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LifecycleConfig {
    pub database: FamilyOverrides,
    pub middleware: FamilyOverrides,
    pub container: FamilyOverrides,
    pub access_rule: FamilyOverrides,
}

/// 1ファミリー分の上書き値。未指定または 0 はファミリーのデフォルトを使う
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FamilyOverrides {
    pub poll_interval_secs: Option<u64>,
    pub poll_timeout_secs: Option<u64>,
    pub delete_attempts: Option<u32>,
    pub delete_backoff_secs: Option<u64>,
}

impl FamilyOverrides {
    /// 何も上書きしていないか
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    fn validate(&self, family: &str) -> Result<()> {
        match (self.poll_interval_secs, self.poll_timeout_secs) {
            (Some(interval), Some(timeout))
                if interval > 0 && timeout > 0 && timeout <= interval =>
            {
                Err(ConfigError::InvalidValue {
                    field: format!("{}.poll_timeout_secs", family),
                    message: format!(
                        "タイムアウト ({}秒) はポーリング間隔 ({}秒) より長くしてください",
                        timeout, interval
                    ),
                })
            }
            _ => Ok(()),
        }
    }
}

impl LifecycleConfig {
    /// YAML 文字列から読み込む
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: LifecycleConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.database.validate("database")?;
        self.middleware.validate("middleware")?;
        self.container.validate("container")?;
        self.access_rule.validate("access_rule")?;
        Ok(())
    }
}
