use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("設定ディレクトリが見つかりません")]
    ConfigDirNotFound,

    #[error(
        "ライフサイクル設定ファイルが見つかりません。以下の場所を確認してください:\n\
        - カレントディレクトリ: opcflow.local.yaml, opcflow.yaml\n\
        - ./.opcflow/ ディレクトリ\n\
        - ~/.config/opcflow/lifecycle.yaml\n\
        または OPCFLOW_CONFIG_PATH 環境変数で直接指定できます"
    )]
    LifecycleFileNotFound,

    #[error("設定値が不正です ({field}): {message}")]
    InvalidValue { field: String, message: String },

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML パースエラー: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
