//! 生成服务客户端
//!
//! 核心流程只依赖 [`GenerationClient`] 这个边界，具体实现：
//! - [`OpenAiGenerationClient`] - 兼容 OpenAI API 的聊天接口（async-openai）
//! - [`HttpGenerationClient`] - 简单 JSON HTTP 接口（reqwest）

pub mod http_client;
pub mod openai_client;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::{Config, GeneratorBackend};
use crate::error::{AppResult, ConfigError, TransportError};

pub use http_client::HttpGenerationClient;
pub use openai_client::OpenAiGenerationClient;

/// 期望的返回格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    Json,
}

/// 一次生成请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub system_message: Option<String>,
    pub response_format: ResponseFormat,
}

impl GenerationRequest {
    /// 创建要求 JSON 返回的请求
    pub fn json(prompt: impl Into<String>, system_message: Option<&str>) -> Self {
        Self {
            prompt: prompt.into(),
            system_message: system_message.map(str::to_string),
            response_format: ResponseFormat::Json,
        }
    }
}

/// 生成服务边界
///
/// 返回原始文本；任何传输、额度或服务错误都以 [`TransportError`] 表示。
/// 限流、排队等策略属于具体实现，不属于核心流程。
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, TransportError>;
}

/// 根据配置创建客户端
pub fn build_client(config: &Config) -> AppResult<Arc<dyn GenerationClient>> {
    match config.generator_backend {
        GeneratorBackend::OpenAi => Ok(Arc::new(OpenAiGenerationClient::new(config))),
        GeneratorBackend::Http => {
            let endpoint = config
                .generator_endpoint
                .clone()
                .filter(|e| !e.trim().is_empty())
                .ok_or(ConfigError::MissingEndpoint)?;
            Ok(Arc::new(HttpGenerationClient::new(
                endpoint,
                config.llm_api_key.clone(),
            )))
        }
    }
}
