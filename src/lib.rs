//! # Quiz Generator
//!
//! 按主题生成单选题或拖拽匹配题的 Rust 库
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 模型层（Models）
//! - `models/` - 题目、题型、校验规则和生成结果
//! - `Question` - 只能通过校验规则构造，构造后不可修改
//! - `SchemaRules` - 按固定顺序执行的结构校验
//!
//! ### ② 客户端层（Clients）
//! - `clients/` - 生成服务边界 `GenerationClient`
//! - `OpenAiGenerationClient` / `HttpGenerationClient` - 具体实现
//!
//! ### ③ 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个能力互不依赖
//! - `TypeSelector` - 题型选择
//! - `PromptBuilder` - 构建提示词
//! - `Validator` - 解析并校验生成结果
//! - `FallbackProvider` - 兜底题目
//! - `AnswerGrader` - 判题
//!
//! ### ④ 流程层（Workflow）
//! - `workflow/` - 定义"生成一道题"的完整流程
//! - `QuestionCtx` - 上下文封装（主题 + 题型）
//! - `QuestionAssembler` - 流程编排（选题型 → 提示词 → 调用 → 校验 → 兜底）
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{build_client, GenerationClient, GenerationRequest, ResponseFormat};
pub use config::{Config, GeneratorBackend};
pub use error::{AppError, AppResult, GenerationError, TransportError, ValidationError};
pub use models::{
    AnswerSubmission, FailureCategory, Feedback, FlowState, Generation, GenerationOutcome,
    PreferredType, Question, QuestionBody, QuestionType, SchemaRules,
};
pub use services::{AnswerGrader, FallbackProvider, DEFAULT_TOPIC};
pub use workflow::{QuestionAssembler, QuestionCtx};
