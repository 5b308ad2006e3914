//! 作成後の安定化ポーリング設定

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};

/// 再呼び出し間隔のデフォルト（秒）
pub const DEFAULT_CALLBACK_DELAY_SECONDS: u32 = 30;

/// 安定化を待つ最大時間のデフォルト（秒）
pub const DEFAULT_STABILIZATION_TIMEOUT_SECONDS: u32 = 10 * 60;

/// 安定化ポーリングの設定
///
/// ポーリング回数の上限は保持せず、常に `stabilization_timeout_seconds` と
/// `callback_delay_seconds` から導出する。間隔を変えれば上限も一緒に変わる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilizationConfig {
    /// 再呼び出しまでの待機秒数
    pub callback_delay_seconds: u32,
    /// 安定化を待つ最大秒数
    pub stabilization_timeout_seconds: u32,
}

impl Default for StabilizationConfig {
    fn default() -> Self {
        Self {
            callback_delay_seconds: DEFAULT_CALLBACK_DELAY_SECONDS,
            stabilization_timeout_seconds: DEFAULT_STABILIZATION_TIMEOUT_SECONDS,
        }
    }
}

impl StabilizationConfig {
    pub fn new(callback_delay_seconds: u32, stabilization_timeout_seconds: u32) -> Result<Self> {
        let config = Self {
            callback_delay_seconds,
            stabilization_timeout_seconds,
        };
        config.validate()?;
        Ok(config)
    }

    /// ポーリング回数の上限（タイムアウト ÷ 間隔）
    pub fn poll_budget(&self) -> u32 {
        self.stabilization_timeout_seconds
            .checked_div(self.callback_delay_seconds)
            .unwrap_or(0)
    }

    /// 間隔が 0 でないこと、上限が 1 回以上になることを検証
    pub fn validate(&self) -> Result<()> {
        if self.callback_delay_seconds == 0 {
            return Err(ConfigError::InvalidStabilization(
                "callback_delay_seconds は 1 以上である必要があります".to_string(),
            ));
        }

        if self.poll_budget() == 0 {
            return Err(ConfigError::InvalidStabilization(format!(
                "stabilization_timeout_seconds ({}) が callback_delay_seconds ({}) より短いため、一度もポーリングできません",
                self.stabilization_timeout_seconds, self.callback_delay_seconds
            )));
        }

        Ok(())
    }
}
