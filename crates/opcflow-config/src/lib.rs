pub mod error;
pub mod model;

pub use error::*;
pub use model::{FamilyOverrides, LifecycleConfig};

use std::path::{Path, PathBuf};

/// opcflow の設定ディレクトリ (~/.config/opcflow) を取得
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("opcflow");

    Ok(config_dir)
}

/// 環境変数で直接指定するときの変数名
pub const CONFIG_PATH_ENV: &str = "OPCFLOW_CONFIG_PATH";

const FILE_NAMES: [&str; 2] = ["opcflow.local.yaml", "opcflow.yaml"];
const GLOBAL_FILE_NAME: &str = "lifecycle.yaml";

/// 検索対象のパスを優先順に並べる (存在確認はしない)
///
/// 1. `dir` 直下: opcflow.local.yaml, opcflow.yaml
/// 2. `dir/.opcflow/` 内: 同様の順序
/// 3. `global_dir/lifecycle.yaml` (グローバル設定)
fn search_paths(dir: &Path, global_dir: Option<&Path>) -> Vec<PathBuf> {
    [dir.to_path_buf(), dir.join(".opcflow")]
        .iter()
        .flat_map(|base| FILE_NAMES.iter().map(move |name| base.join(name)))
        .chain(global_dir.map(|global| global.join(GLOBAL_FILE_NAME)))
        .collect()
}

/// ライフサイクル設定ファイルを探す
///
/// 環境変数 `OPCFLOW_CONFIG_PATH` が既存ファイルを指していればそれを優先し、
/// 無ければカレントディレクトリ、`./.opcflow/`、`~/.config/opcflow/` の順に探す。
pub fn find_lifecycle_file() -> Result<PathBuf> {
    let from_env = std::env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| path.is_file());
    if let Some(path) = from_env {
        return Ok(path);
    }

    let current_dir = std::env::current_dir()?;
    let global_dir = get_config_dir().ok();

    search_paths(&current_dir, global_dir.as_deref())
        .into_iter()
        .find(|path| path.is_file())
        .ok_or(ConfigError::LifecycleFileNotFound)
}

/// ライフサイクル設定を読み込む。ファイルが無ければ全ファミリーがデフォルト
pub fn load_lifecycle_config() -> Result<LifecycleConfig> {
    match find_lifecycle_file() {
        Ok(path) => {
            let content = std::fs::read_to_string(&path)?;
            LifecycleConfig::from_yaml(&content)
        }
        Err(ConfigError::LifecycleFileNotFound) => Ok(LifecycleConfig::default()),
        Err(e) => Err(e),
    }
}
