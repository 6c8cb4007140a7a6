//! 简单 JSON HTTP 生成服务客户端
//!
//! 请求: `POST {endpoint}`，body 为 `{"prompt": ..., "system": ..., "response_format": "json"}`
//! 响应: 成功时 `{"text": ...}`，失败时 `{"error": ...}`

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::clients::{GenerationClient, GenerationRequest, ResponseFormat};
use crate::error::TransportError;

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    response_format: ResponseFormat,
}

#[derive(Debug, Default, Deserialize)]
struct WireResponse {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<Value>,
}

/// HTTP 生成服务客户端
pub struct HttpGenerationClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpGenerationClient {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }
}

#[async_trait]
impl GenerationClient for HttpGenerationClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, TransportError> {
        debug!("调用生成服务: {}", self.endpoint);

        let body = WireRequest {
            prompt: &request.prompt,
            system: request.system_message.as_deref(),
            response_format: request.response_format,
        };

        let mut builder = self.http.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            warn!("生成服务请求失败: {}", e);
            TransportError::request(e)
        })?;

        let status = response.status();
        let text = response.text().await.map_err(TransportError::request)?;
        classify_response(status, &text)
    }
}

/// 把 HTTP 状态码和响应体转换为生成文本或传输错误
fn classify_response(status: StatusCode, body: &str) -> Result<String, TransportError> {
    let parsed: WireResponse = serde_json::from_str(body).unwrap_or_default();

    if let Some(error) = parsed.error {
        let code = error_code(&error);
        if status == StatusCode::TOO_MANY_REQUESTS || is_rate_limit_code(&code) {
            return Err(TransportError::RateLimited(code));
        }
        return Err(TransportError::Service { code });
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(TransportError::RateLimited(status.to_string()));
    }
    if !status.is_success() {
        return Err(TransportError::Status {
            status: status.as_u16(),
        });
    }

    parsed
        .text
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(TransportError::EmptyResponse)
}

/// `error` 字段可能是字符串，也可能是带 `code` / `message` 的对象
fn error_code(error: &Value) -> String {
    match error {
        Value::String(s) => s.clone(),
        Value::Object(map) => map
            .get("code")
            .or_else(|| map.get("type"))
            .or_else(|| map.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
        other => other.to_string(),
    }
}

fn is_rate_limit_code(code: &str) -> bool {
    let code = code.to_lowercase();
    code.contains("rate") || code.contains("quota") || code.contains("resource_exhausted")
}
