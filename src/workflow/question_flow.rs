//! 题目生成流程 - 流程层
//!
//! 核心职责：定义"生成一道题"的完整流程
//!
//! 状态顺序：
//! 1. START → RESOLVE_TYPE → CHECK_CREDENTIAL（无密钥 → 兜底）
//! 2. BUILD_PROMPT → CALL_GENERATOR（调用失败或超时 → 兜底）
//! 3. PARSE_AND_VALIDATE（校验失败 → 兜底）
//! 4. NORMALIZE_IDENTITY → DONE
//!
//! 任何分支都恰好产出一道题目，错误不会向调用方传播。

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::clients::{build_client, GenerationClient, GenerationRequest};
use crate::config::Config;
use crate::error::{AppResult, GenerationError, TransportError};
use crate::models::{
    FailureCategory, FlowState, Generation, GenerationOutcome, PreferredType, Question,
    QuestionSource, QuestionType, SchemaRules,
};
use crate::services::{
    FallbackProvider, PromptBuilder, TypeSelector, Validator, DEFAULT_TOPIC, SYSTEM_MESSAGE,
};
use crate::utils::logging::log_outcome;
use crate::utils::{has_expected_prefix, question_id, truncate_text};
use crate::workflow::question_ctx::QuestionCtx;

/// 日志中原始返回的最大显示长度
const RAW_PREVIEW_LEN: usize = 300;

/// 流程在某个状态失败
struct FlowFailure {
    state: FlowState,
    error: GenerationError,
}

impl FlowFailure {
    fn new(state: FlowState, error: impl Into<GenerationError>) -> Self {
        Self {
            state,
            error: error.into(),
        }
    }
}

/// 题目生成流程
///
/// - 编排完整的生成流程
/// - 决定何时调用生成服务、何时兜底
/// - 只持有不可变数据，可以通过 `Arc` 在多个任务间共享
pub struct QuestionAssembler {
    client: Arc<dyn GenerationClient>,
    selector: TypeSelector,
    prompt_builder: PromptBuilder,
    validator: Validator,
    fallback: FallbackProvider,
    credential_present: bool,
    timeout_secs: u64,
    verbose_logging: bool,
}

impl QuestionAssembler {
    /// 使用指定的生成服务客户端创建流程
    ///
    /// 内置兜底题目在这里完成校验，失败时返回错误。
    pub fn new(config: &Config, client: Arc<dyn GenerationClient>) -> AppResult<Self> {
        let rules = SchemaRules::new(config.require_full_coverage);
        Ok(Self {
            client,
            selector: TypeSelector::new(),
            prompt_builder: PromptBuilder::new(rules),
            validator: Validator::new(rules),
            fallback: FallbackProvider::new()?,
            credential_present: config.has_credential(),
            timeout_secs: config.request_timeout_secs,
            verbose_logging: config.verbose_logging,
        })
    }

    /// 根据配置选择客户端并创建流程
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let client = build_client(config)?;
        Self::new(config, client)
    }

    /// 生成一道题目，永不失败
    pub async fn generate(&self, topic: &str, preferred: impl Into<PreferredType>) -> Question {
        self.generate_with_outcome(topic, preferred).await.question
    }

    /// 生成一道题目，同时返回结构化的生成结果
    pub async fn generate_with_outcome(
        &self,
        topic: &str,
        preferred: impl Into<PreferredType>,
    ) -> Generation {
        let preferred = preferred.into();
        let question_type = self.selector.resolve(&preferred, &mut rand::thread_rng());
        self.run(topic, preferred, question_type).await
    }

    /// 使用外部随机源生成（测试中可复现）
    pub async fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        topic: &str,
        preferred: impl Into<PreferredType>,
        rng: &mut R,
    ) -> Generation {
        let preferred = preferred.into();
        let question_type = self.selector.resolve(&preferred, rng);
        self.run(topic, preferred, question_type).await
    }

    async fn run(
        &self,
        topic: &str,
        preferred: PreferredType,
        question_type: QuestionType,
    ) -> Generation {
        let ctx = QuestionCtx::new(resolve_topic(topic), preferred, question_type);
        debug!("{} 状态: {:?} → {:?}", ctx, FlowState::Start, FlowState::ResolveType);
        info!("{} 📝 开始生成题目 (偏好: {})", ctx, ctx.preferred);

        let (question, source, terminal_state, error) = match self.attempt(&ctx).await {
            Ok(question) => (
                question,
                QuestionSource::Generated,
                FlowState::NormalizeIdentity,
                None,
            ),
            Err(FlowFailure { state, error }) => {
                let category = FailureCategory::from(&error);
                let question = self.fallback.fallback(&ctx.topic, ctx.question_type, category);
                (question, QuestionSource::Fallback(category), state, Some(error))
            }
        };
        debug!("{} 状态: {:?} → {:?}", ctx, terminal_state, FlowState::Done);

        let outcome = GenerationOutcome {
            question_type: ctx.question_type,
            source,
            terminal_state,
            error,
            finished_at: Local::now(),
        };
        log_outcome(&outcome);

        Generation { question, outcome }
    }

    async fn attempt(&self, ctx: &QuestionCtx) -> Result<Question, FlowFailure> {
        self.transition(ctx, FlowState::CheckCredential);
        if !self.credential_present {
            warn!("{} ⚠️ 未配置 API 密钥，跳过生成服务", ctx);
            return Err(FlowFailure::new(
                FlowState::NoCredential,
                GenerationError::CredentialMissing,
            ));
        }

        self.transition(ctx, FlowState::BuildPrompt);
        let prompt = self.prompt_builder.build(&ctx.topic, ctx.question_type);
        let request = GenerationRequest::json(prompt, Some(SYSTEM_MESSAGE));

        self.transition(ctx, FlowState::CallGenerator);
        let raw = self
            .call_generator(&request)
            .await
            .map_err(|e| FlowFailure::new(FlowState::CallFailed, e))?;

        if self.verbose_logging {
            debug!("{} 原始返回:\n{}", ctx, raw);
        } else {
            debug!("{} 原始返回: {}", ctx, truncate_text(&raw, RAW_PREVIEW_LEN));
        }

        self.transition(ctx, FlowState::ParseAndValidate);
        let question = self
            .validator
            .validate(&raw, ctx.question_type, &ctx.topic)
            .map_err(|e| FlowFailure::new(FlowState::Invalid, e))?;

        self.transition(ctx, FlowState::NormalizeIdentity);
        Ok(self.normalize_identity(ctx, question))
    }

    /// 在超时限制内调用生成服务
    async fn call_generator(&self, request: &GenerationRequest) -> Result<String, TransportError> {
        let limit = Duration::from_secs(self.timeout_secs);
        match tokio::time::timeout(limit, self.client.generate(request)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout {
                secs: self.timeout_secs,
            }),
        }
    }

    /// 主题总是替换为请求的主题；ID 前缀不符时按内容重新计算
    fn normalize_identity(&self, ctx: &QuestionCtx, question: Question) -> Question {
        let id = if has_expected_prefix(question.id(), &ctx.topic, ctx.question_type) {
            question.id().to_string()
        } else {
            let id = question_id(&ctx.topic, &question);
            debug!("{} 替换 ID: {} → {}", ctx, question.id(), id);
            id
        };
        question.with_identity(ctx.topic.clone(), id)
    }

    fn transition(&self, ctx: &QuestionCtx, state: FlowState) {
        debug!("{} 状态: {:?}", ctx, state);
    }
}

fn resolve_topic(topic: &str) -> String {
    if topic.trim().is_empty() {
        warn!("⚠️ 主题为空，使用默认主题: {}", DEFAULT_TOPIC);
        DEFAULT_TOPIC.to_string()
    } else {
        topic.to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::models::QuestionBody;

    /// 返回固定结果的生成服务，并记录调用次数
    struct ScriptedClient {
        reply: Result<String, TransportError>,
        delay: Option<Duration>,
        calls: AtomicUsize,
        last_prompt: std::sync::Mutex<Option<String>>,
    }

    impl ScriptedClient {
        fn replying(reply: Result<String, TransportError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                delay: None,
                calls: AtomicUsize::new(0),
                last_prompt: std::sync::Mutex::new(None),
            })
        }

        fn slow(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok("{}".to_string()),
                delay: Some(delay),
                calls: AtomicUsize::new(0),
                last_prompt: std::sync::Mutex::new(None),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerationClient for ScriptedClient {
        async fn generate(&self, request: &GenerationRequest) -> Result<String, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = Some(request.prompt.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.reply.clone()
        }
    }

    fn config_with_key() -> Config {
        Config {
            llm_api_key: Some("test-key".to_string()),
            ..Default::default()
        }
    }

    fn assembler(config: &Config, client: Arc<ScriptedClient>) -> QuestionAssembler {
        QuestionAssembler::new(config, client).unwrap()
    }

    const VALID_MCQ: &str = r#"{
        "id": "q_addition_mcq_001",
        "question_type": "MCQ",
        "topic": "Something Else",
        "question_text": "What is 2 + 2?",
        "options": ["3", "4", "5"],
        "correct_answer": "4",
        "explanation": "2 + 2 = 4."
    }"#;

    #[tokio::test]
    async fn test_no_credential_skips_client() {
        let client = ScriptedClient::replying(Ok(VALID_MCQ.to_string()));
        let assembler = assembler(&Config::default(), client.clone());

        let generation = assembler.generate_with_outcome("Addition", QuestionType::Mcq).await;
        assert_eq!(client.calls(), 0);
        assert_eq!(generation.outcome.terminal_state, FlowState::NoCredential);
        assert_eq!(
            generation.outcome.failure_category(),
            Some(FailureCategory::NoCredential)
        );
        assert_eq!(generation.outcome.error, Some(GenerationError::CredentialMissing));
        assert!(generation.question.question_text().starts_with("[offline] "));
        assert_eq!(generation.question.topic(), "Addition");
    }

    #[tokio::test]
    async fn test_valid_output_keeps_matching_id_and_overwrites_topic() {
        let client = ScriptedClient::replying(Ok(VALID_MCQ.to_string()));
        let assembler = assembler(&config_with_key(), client.clone());

        let generation = assembler.generate_with_outcome("Addition", "MCQ").await;
        assert_eq!(client.calls(), 1);
        assert_eq!(generation.outcome.source, QuestionSource::Generated);
        assert_eq!(generation.outcome.terminal_state, FlowState::NormalizeIdentity);

        let question = generation.question;
        assert_eq!(question.id(), "q_addition_mcq_001");
        assert_eq!(question.topic(), "Addition");
        assert_eq!(question.question_text(), "What is 2 + 2?");
        assert_eq!(question.explanation(), Some("2 + 2 = 4."));
    }

    #[tokio::test]
    async fn test_mismatched_id_is_replaced() {
        let raw = VALID_MCQ.replace("q_addition_mcq_001", "question-1");
        let client = ScriptedClient::replying(Ok(raw));
        let assembler = assembler(&config_with_key(), client);

        let question = assembler.generate("Addition", QuestionType::Mcq).await;
        assert!(question.id().starts_with("q_addition_mcq_"));
        assert_eq!(question.id().len(), "q_addition_mcq_".len() + 12);
    }

    #[tokio::test]
    async fn test_template_placeholder_id_is_replaced() {
        let raw = VALID_MCQ.replace("q_addition_mcq_001", "q_addition_mcq_<suffix>");
        let client = ScriptedClient::replying(Ok(raw));
        let assembler = assembler(&config_with_key(), client);

        let question = assembler.generate("Addition", QuestionType::Mcq).await;
        assert_ne!(question.id(), "q_addition_mcq_<suffix>");
        assert_eq!(question.id().len(), "q_addition_mcq_".len() + 12);
    }

    #[tokio::test]
    async fn test_prompt_mentions_topic() {
        let client = ScriptedClient::replying(Ok(VALID_MCQ.to_string()));
        let assembler = assembler(&config_with_key(), client.clone());
        assembler.generate("Roman History", QuestionType::Mcq).await;

        let prompt = client.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("Roman History"));
        assert!(prompt.contains("q_roman_history_mcq_"));
    }

    #[tokio::test]
    async fn test_invalid_output_falls_back() {
        let raw = r#"{"id":"q_addition_mcq_1","question_type":"MCQ","topic":"Addition",
            "question_text":"What is 5 + 7?","options":["10","11"],"correct_answer":"12"}"#;
        let client = ScriptedClient::replying(Ok(raw.to_string()));
        let assembler = assembler(&config_with_key(), client);

        let generation = assembler.generate_with_outcome("Addition", QuestionType::Mcq).await;
        assert_eq!(generation.outcome.terminal_state, FlowState::Invalid);
        assert!(matches!(
            generation.outcome.error,
            Some(GenerationError::SchemaViolation(_))
        ));
        assert!(generation
            .question
            .question_text()
            .starts_with("[invalid generator output] "));
    }

    #[tokio::test]
    async fn test_wrong_variant_is_rejected() {
        let client = ScriptedClient::replying(Ok(VALID_MCQ.to_string()));
        let assembler = assembler(&config_with_key(), client);

        let generation = assembler
            .generate_with_outcome("Addition", QuestionType::DragAndDrop)
            .await;
        assert_eq!(
            generation.outcome.failure_category(),
            Some(FailureCategory::ValidationFailure)
        );
        assert!(matches!(
            generation.question.body(),
            QuestionBody::DragAndDrop(_)
        ));
    }

    #[tokio::test]
    async fn test_transport_error_falls_back() {
        let client = ScriptedClient::replying(Err(TransportError::Status { status: 503 }));
        let assembler = assembler(&config_with_key(), client.clone());

        let generation = assembler.generate_with_outcome("Addition", QuestionType::Mcq).await;
        assert_eq!(client.calls(), 1);
        assert_eq!(generation.outcome.terminal_state, FlowState::CallFailed);
        assert!(generation
            .question
            .question_text()
            .starts_with("[generator unavailable] "));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_falls_back() {
        let config = Config {
            request_timeout_secs: 1,
            ..config_with_key()
        };
        let client = ScriptedClient::slow(Duration::from_secs(5));
        let assembler = assembler(&config, client);

        let generation = assembler.generate_with_outcome("Addition", QuestionType::Mcq).await;
        assert_eq!(
            generation.outcome.error,
            Some(GenerationError::Transport(TransportError::Timeout { secs: 1 }))
        );
        assert_eq!(
            generation.outcome.failure_category(),
            Some(FailureCategory::CallFailure)
        );
    }

    #[tokio::test]
    async fn test_blank_topic_uses_default() {
        let client = ScriptedClient::replying(Ok(VALID_MCQ.to_string()));
        let assembler = assembler(&Config::default(), client);

        let question = assembler.generate("  ", QuestionType::Mcq).await;
        assert_eq!(question.topic(), DEFAULT_TOPIC);
    }

    #[tokio::test]
    async fn test_seeded_rng_is_reproducible() {
        let client = ScriptedClient::replying(Ok(VALID_MCQ.to_string()));
        let assembler = assembler(&Config::default(), client);

        let mut first_rng = StdRng::seed_from_u64(7);
        let mut second_rng = StdRng::seed_from_u64(7);
        for _ in 0..10 {
            let first = assembler
                .generate_with_rng("Addition", PreferredType::Any, &mut first_rng)
                .await;
            let second = assembler
                .generate_with_rng("Addition", PreferredType::Any, &mut second_rng)
                .await;
            assert_eq!(first.question, second.question);
        }
    }
}
