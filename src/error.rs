use thiserror::Error;

pub type Result<T> = std::result::Result<T, TimeQueryError>;

#[derive(Debug, Error)]
pub enum TimeQueryError {
    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("正则表达式错误: {pattern} - {reason}")]
    RegexError { pattern: String, reason: String },

    #[error("无效请求: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
