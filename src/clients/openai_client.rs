//! OpenAI 兼容客户端
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
        ResponseFormat as ChatResponseFormat,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::clients::{GenerationClient, GenerationRequest, ResponseFormat};
use crate::config::Config;
use crate::error::TransportError;

/// OpenAI 兼容的生成客户端
pub struct OpenAiGenerationClient {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiGenerationClient {
    /// 创建新的客户端
    ///
    /// 没有密钥时仍可创建；流程会在调用前检查密钥并直接兜底。
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.llm_api_key.as_deref().unwrap_or_default())
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    fn build_messages(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<ChatCompletionRequestMessage>, TransportError> {
        let mut messages = Vec::new();

        // 添加系统消息（如果提供）
        if let Some(sys_msg) = &request.system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg.as_str())
                .build()
                .map_err(TransportError::request)?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(request.prompt.as_str())
            .build()
            .map_err(TransportError::request)?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        Ok(messages)
    }
}

#[async_trait]
impl GenerationClient for OpenAiGenerationClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, TransportError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", request.prompt.len());

        let messages = self.build_messages(request)?;

        let response_format = match request.response_format {
            ResponseFormat::Json => ChatResponseFormat::JsonObject,
        };

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .response_format(response_format)
            .build()
            .map_err(TransportError::request)?;

        // 调用 API
        let response = self.client.chat().create(chat_request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            TransportError::request(e)
        })?;

        debug!("LLM API 调用成功");

        // 提取响应内容
        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|content| !content.trim().is_empty())
            .ok_or(TransportError::EmptyResponse)?;

        Ok(content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionType;
    use crate::services::{PromptBuilder, SYSTEM_MESSAGE};

    fn create_test_client() -> OpenAiGenerationClient {
        OpenAiGenerationClient::new(&Config::from_env())
    }

    #[test]
    fn test_build_messages_with_system() {
        let client = create_test_client();
        let request = GenerationRequest::json("hello", Some(SYSTEM_MESSAGE));
        let messages = client.build_messages(&request).unwrap();
        assert_eq!(messages.len(), 2);
        assert!(matches!(messages[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(messages[1], ChatCompletionRequestMessage::User(_)));
    }

    #[test]
    fn test_build_messages_without_system() {
        let client = create_test_client();
        let request = GenerationRequest::json("hello", None);
        assert_eq!(client.build_messages(&request).unwrap().len(), 1);
    }

    /// 测试真实 API 调用
    ///
    /// 运行方式：
    /// ```bash
    /// LLM_API_KEY=... cargo test test_generate_real_question -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_generate_real_question() {
        let _ = tracing_subscriber::fmt::try_init();

        let client = create_test_client();
        let prompt = PromptBuilder::default().build("Python Basics", QuestionType::Mcq);
        let request = GenerationRequest::json(prompt, Some(SYSTEM_MESSAGE));

        match client.generate(&request).await {
            Ok(response) => {
                println!("\n========== LLM 响应 ==========");
                println!("{}", response);
                println!("==============================\n");
                assert!(!response.is_empty());
            }
            Err(e) => panic!("LLM 调用失败: {}", e),
        }
    }
}
