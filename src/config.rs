use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use tracing::warn;

use crate::error::{AppError, AppResult, ConfigError};

/// 生成服务后端
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorBackend {
    /// 兼容 OpenAI API 的聊天接口
    OpenAi,
    /// 简单 JSON HTTP 接口: `{prompt, system?, response_format}` → `{text}` / `{error}`
    Http,
}

impl FromStr for GeneratorBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" | "open_ai" => Ok(GeneratorBackend::OpenAi),
            "http" => Ok(GeneratorBackend::Http),
            _ => Err(ConfigError::UnknownBackend {
                value: s.to_string(),
            }),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- LLM 配置 ---
    /// API 密钥，缺失时直接使用兜底题目
    pub llm_api_key: Option<String>,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub temperature: f32,
    pub max_tokens: u32,
    // --- 生成后端 ---
    pub generator_backend: GeneratorBackend,
    /// HTTP 后端地址
    pub generator_endpoint: Option<String>,
    /// 单次生成请求的超时时间（秒）
    pub request_timeout_secs: u64,
    // --- 校验 ---
    /// 拖拽题是否要求每个拖拽项都有匹配目标
    pub require_full_coverage: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: None,
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 1024,
            generator_backend: GeneratorBackend::OpenAi,
            generator_endpoint: None,
            request_timeout_secs: 30,
            require_full_coverage: false,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 从环境变量加载配置，未设置或无法解析的变量使用默认值
    pub fn from_env() -> Self {
        Self::default().with_env_overrides().with_checked_values()
    }

    /// 从 TOML 文件加载配置，随后再用环境变量覆盖
    pub fn from_toml_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| AppError::toml_parse_failed(path.display().to_string(), e))?;
        Ok(config.with_env_overrides().with_checked_values())
    }

    /// 解析 TOML 文本（不读取环境变量）
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content).map(Self::with_checked_values)
    }

    /// 是否提供了可用的 API 密钥
    pub fn has_credential(&self) -> bool {
        self.llm_api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }

    fn with_env_overrides(self) -> Self {
        Self {
            llm_api_key: std::env::var("LLM_API_KEY").ok().or(self.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(self.llm_model_name),
            temperature: env_parse("LLM_TEMPERATURE", "f32").unwrap_or(self.temperature),
            max_tokens: env_parse("LLM_MAX_TOKENS", "u32").unwrap_or(self.max_tokens),
            generator_backend: env_parse("GENERATOR_BACKEND", "openai|http")
                .unwrap_or(self.generator_backend),
            generator_endpoint: std::env::var("GENERATOR_ENDPOINT")
                .ok()
                .or(self.generator_endpoint),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", "u64")
                .unwrap_or(self.request_timeout_secs),
            require_full_coverage: env_parse("REQUIRE_FULL_COVERAGE", "bool")
                .unwrap_or(self.require_full_coverage),
            verbose_logging: env_parse("VERBOSE_LOGGING", "bool").unwrap_or(self.verbose_logging),
        }
    }
}

impl Config {
    /// 超时为 0 会让每次调用立即超时，记录警告并恢复默认值
    fn with_checked_values(self) -> Self {
        if self.request_timeout_secs > 0 {
            return self;
        }
        let err = ConfigError::InvalidValue {
            field: "request_timeout_secs".to_string(),
            value: self.request_timeout_secs.to_string(),
            reason: "必须大于 0".to_string(),
        };
        let request_timeout_secs = Self::default().request_timeout_secs;
        warn!("⚠️ {}，使用默认值 {}", err, request_timeout_secs);
        Self {
            request_timeout_secs,
            ..self
        }
    }
}

/// 读取并解析环境变量，解析失败时记录警告并返回 None
fn env_parse<T: FromStr>(var_name: &str, expected_type: &str) -> Option<T> {
    let value = std::env::var(var_name).ok()?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            let err = ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            };
            warn!("⚠️ {}，使用默认值", err);
            None
        }
    }
}
