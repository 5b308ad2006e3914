pub mod error;
pub mod stabilization;

pub use error::*;
pub use stabilization::StabilizationConfig;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ENV_CONFIG_PATH: &str = "DOCFLOW_CONFIG_PATH";
const ENV_CALLBACK_DELAY: &str = "DOCFLOW_CALLBACK_DELAY_SECONDS";
const ENV_STABILIZATION_TIMEOUT: &str = "DOCFLOW_STABILIZATION_TIMEOUT_SECONDS";

/// docflow の設定全体
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocflowConfig {
    pub stabilization: StabilizationConfig,
}

/// docflow の設定ファイルを探す
///
/// 以下の優先順位で設定ファイルを検索:
/// 1. 環境変数 DOCFLOW_CONFIG_PATH (直接パス指定)
/// 2. カレントディレクトリ: docflow.local.yaml, docflow.yaml
/// 3. ./.docflow/ ディレクトリ内: config.yaml
/// 4. ~/.config/docflow/config.yaml (グローバル設定)
///
/// 見つからない場合は `None`（デフォルト設定を使う）
pub fn find_config_file() -> Result<Option<PathBuf>> {
    // 1. 環境変数で直接指定
    if let Ok(config_path) = std::env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
        tracing::warn!("{} が指すファイルが存在しません: {}", ENV_CONFIG_PATH, path.display());
    }

    let current_dir = std::env::current_dir()?;

    // 2. カレントディレクトリで検索
    for filename in ["docflow.local.yaml", "docflow.yaml"] {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    // 3. ./.docflow/ ディレクトリで検索
    let project_config = current_dir.join(".docflow").join("config.yaml");
    if project_config.exists() {
        return Ok(Some(project_config));
    }

    // 4. グローバル設定ファイル
    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("docflow").join("config.yaml");
        if global_config.exists() {
            return Ok(Some(global_config));
        }
    }

    Ok(None)
}

/// 設定ファイルを読み込む（環境変数の上書きは行わない）
pub fn load_from_path(path: &Path) -> Result<DocflowConfig> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// 設定を読み込み、環境変数で上書きし、検証する
pub fn load_config() -> Result<DocflowConfig> {
    let mut config = match find_config_file()? {
        Some(path) => {
            tracing::debug!("設定ファイルを読み込みます: {}", path.display());
            load_from_path(&path)?
        }
        None => DocflowConfig::default(),
    };

    apply_env_overrides(&mut config)?;
    config.stabilization.validate()?;
    Ok(config)
}

fn apply_env_overrides(config: &mut DocflowConfig) -> Result<()> {
    if let Some(value) = read_env_u32(ENV_CALLBACK_DELAY)? {
        config.stabilization.callback_delay_seconds = value;
    }
    if let Some(value) = read_env_u32(ENV_STABILIZATION_TIMEOUT)? {
        config.stabilization.stabilization_timeout_seconds = value;
    }
    Ok(())
}

fn read_env_u32(name: &str) -> Result<Option<u32>> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv {
                name: name.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    fn test_load_from_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("docflow.yaml");
        fs::write(
            &path,
            "stabilization:\n  callback_delay_seconds: 15\n  stabilization_timeout_seconds: 300\n",
        )
        .unwrap();

        let config = load_from_path(&path).unwrap();
        assert_eq!(config.stabilization.callback_delay_seconds, 15);
        assert_eq!(config.stabilization.poll_budget(), 20);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("docflow.yaml");
        fs::write(&path, "stabilization:\n  callback_delay_seconds: 60\n").unwrap();

        let config = load_from_path(&path).unwrap();
        assert_eq!(config.stabilization.callback_delay_seconds, 60);
        assert_eq!(config.stabilization.stabilization_timeout_seconds, 600);
        assert_eq!(config.stabilization.poll_budget(), 10);
    }

    #[test]
    fn test_invalid_yaml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("docflow.yaml");
        fs::write(&path, "stabilization: [1, 2").unwrap();

        assert!(matches!(
            load_from_path(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    #[serial]
    fn test_find_config_file_env_var() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.yaml");
        fs::write(&config_path, "stabilization: {}\n").unwrap();

        temp_env::with_var(ENV_CONFIG_PATH, Some(config_path.as_os_str()), || {
            let result = find_config_file().unwrap();
            assert_eq!(result, Some(config_path.clone()));
        });
    }

    #[test]
    #[serial]
    fn test_find_config_file_local_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        fs::write(temp_dir.path().join("docflow.yaml"), "# shared").unwrap();
        fs::write(temp_dir.path().join("docflow.local.yaml"), "# local").unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();

        let result = temp_env::with_var_unset(ENV_CONFIG_PATH, find_config_file);

        // 元のディレクトリに戻る
        std::env::set_current_dir(original_dir).unwrap();

        // docflow.local.yaml が優先される
        assert!(result.unwrap().unwrap().ends_with("docflow.local.yaml"));
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.yaml");
        fs::write(
            &config_path,
            "stabilization:\n  callback_delay_seconds: 15\n",
        )
        .unwrap();

        temp_env::with_vars(
            [
                (ENV_CONFIG_PATH, Some(config_path.to_str().unwrap())),
                (ENV_CALLBACK_DELAY, Some("20")),
                (ENV_STABILIZATION_TIMEOUT, Some("200")),
            ],
            || {
                let config = load_config().unwrap();
                assert_eq!(config.stabilization.callback_delay_seconds, 20);
                assert_eq!(config.stabilization.poll_budget(), 10);
            },
        );
    }

    #[test]
    #[serial]
    fn test_invalid_env_value() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.yaml");
        fs::write(&config_path, "stabilization: {}\n").unwrap();

        temp_env::with_vars(
            [
                (ENV_CONFIG_PATH, Some(config_path.to_str().unwrap())),
                (ENV_CALLBACK_DELAY, Some("thirty")),
            ],
            || {
                assert!(matches!(
                    load_config(),
                    Err(ConfigError::InvalidEnv { .. })
                ));
            },
        );
    }

    #[test]
    #[serial]
    fn test_overrides_are_validated() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.yaml");
        fs::write(&config_path, "stabilization: {}\n").unwrap();

        temp_env::with_vars(
            [
                (ENV_CONFIG_PATH, Some(config_path.to_str().unwrap())),
                (ENV_CALLBACK_DELAY, Some("0")),
            ],
            || {
                assert!(matches!(
                    load_config(),
                    Err(ConfigError::InvalidStabilization(_))
                ));
            },
        );
    }
}
