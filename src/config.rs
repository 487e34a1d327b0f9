use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TimeQueryError};
use crate::model::Language;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerMode {
    #[default]
    Stdio,
    Http,
    Both,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub mode: ServerMode,
    pub http_addr: Option<String>,
    pub http_port: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeConfig {
    /// 生成 range 子句时使用的时间字段。
    #[serde(default = "default_timestamp_field")]
    pub timestamp_field: String,
    /// 固定描述语言；不填则按查询内容判断。
    #[serde(default)]
    pub language: Option<Language>,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            timestamp_field: default_timestamp_field(),
            language: None,
        }
    }
}

fn default_timestamp_field() -> String {
    "@timestamp".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub time: TimeConfig,
}

impl Config {
    /// 按扩展名选择 JSON 或 YAML，空文件得到默认配置。
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            TimeQueryError::ConfigError(format!("read {} failed: {e}", path.display()))
        })?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            serde_json::from_str(&raw)
                .map_err(|e| TimeQueryError::ConfigError(format!("invalid json config: {e}")))
        } else {
            serde_yaml::from_str(&raw)
                .map_err(|e| TimeQueryError::ConfigError(format!("invalid yaml config: {e}")))
        }
    }

    pub fn http_bind_addr(&self) -> String {
        format!(
            "{}:{}",
            self.server.http_addr.as_deref().unwrap_or("0.0.0.0"),
            self.server.http_port.unwrap_or(3000)
        )
    }
}
