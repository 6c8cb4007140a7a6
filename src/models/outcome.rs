use std::fmt;

use chrono::{DateTime, Local};

use crate::error::GenerationError;
use crate::models::question::Question;
use crate::models::question_type::QuestionType;

/// 兜底原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureCategory {
    /// 没有 API 密钥
    NoCredential,
    /// 调用生成服务失败（含超时）
    CallFailure,
    /// 返回内容解析或校验失败
    ValidationFailure,
}

impl FailureCategory {
    /// 插入到兜底题目 question_text 前的诊断前缀
    pub fn marker(self) -> &'static str {
        match self {
            FailureCategory::NoCredential => "[offline] ",
            FailureCategory::CallFailure => "[generator unavailable] ",
            FailureCategory::ValidationFailure => "[invalid generator output] ",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FailureCategory::NoCredential => "no_credential",
            FailureCategory::CallFailure => "call_failure",
            FailureCategory::ValidationFailure => "validation_failure",
        }
    }
}

impl From<&GenerationError> for FailureCategory {
    fn from(err: &GenerationError) -> Self {
        match err {
            GenerationError::CredentialMissing => FailureCategory::NoCredential,
            GenerationError::Transport(_) => FailureCategory::CallFailure,
            GenerationError::Parse(_) | GenerationError::SchemaViolation(_) => {
                FailureCategory::ValidationFailure
            }
        }
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 生成流程的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Start,
    ResolveType,
    CheckCredential,
    NoCredential,
    BuildPrompt,
    CallGenerator,
    CallFailed,
    ParseAndValidate,
    Invalid,
    NormalizeIdentity,
    Done,
}

/// 题目来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionSource {
    /// 生成服务返回并通过校验
    Generated,
    /// 使用兜底题目
    Fallback(FailureCategory),
}

/// 一次生成的结构化结果，独立于 question_text 中的诊断前缀
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub question_type: QuestionType,
    pub source: QuestionSource,
    /// 进入 DONE 之前的最后一个状态
    pub terminal_state: FlowState,
    pub error: Option<GenerationError>,
    pub finished_at: DateTime<Local>,
}

impl GenerationOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, QuestionSource::Fallback(_))
    }

    pub fn failure_category(&self) -> Option<FailureCategory> {
        match self.source {
            QuestionSource::Generated => None,
            QuestionSource::Fallback(category) => Some(category),
        }
    }
}

impl fmt::Display for GenerationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.source, &self.error) {
            (QuestionSource::Generated, _) => write!(
                f,
                "{} 生成成功 ({})",
                self.question_type,
                self.finished_at.format("%Y-%m-%d %H:%M:%S")
            ),
            (QuestionSource::Fallback(category), Some(err)) => write!(
                f,
                "{} 使用兜底题目 [{}]: {} ({})",
                self.question_type,
                category,
                err,
                self.finished_at.format("%Y-%m-%d %H:%M:%S")
            ),
            (QuestionSource::Fallback(category), None) => write!(
                f,
                "{} 使用兜底题目 [{}] ({})",
                self.question_type,
                category,
                self.finished_at.format("%Y-%m-%d %H:%M:%S")
            ),
        }
    }
}

/// 题目及其生成结果
#[derive(Debug, Clone)]
pub struct Generation {
    pub question: Question,
    pub outcome: GenerationOutcome,
}
