//! 结构校验服务 - 业务能力层
//!
//! 只负责"把生成服务返回的文本变成合法题目"，不关心流程。
//!
//! 校验顺序固定：
//! 0. 去掉代码块包裹，严格解析 JSON（失败即 `Parse`）
//! 1. 题型标签匹配
//! 2. 必填字段存在且类型正确
//! 3. 数量范围与去重
//! 4. 跨字段引用（由 [`Question::new`] 中的规则列表完成）

use std::collections::BTreeMap;

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::models::{
    DragAndDropBody, McqBody, Question, QuestionBody, QuestionDraft, QuestionType, SchemaRules,
};

const FENCE_PATTERN: &str = r"(?s)^\s*```[\w-]*\s*(.*?)\s*```\s*$";

type JsonObject = Map<String, Value>;

/// 结构校验器
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    rules: SchemaRules,
}

impl Validator {
    pub fn new(rules: SchemaRules) -> Self {
        Self { rules }
    }

    /// 校验原始文本并构造指定题型、指定主题的题目
    ///
    /// 生成方回显的 `topic` 只检查存在和类型，内容以请求的 `topic` 为准。
    /// 纯函数：同样的输入总是得到同样的结果（包括同样的第一个错误）。
    pub fn validate(
        &self,
        raw: &str,
        expected: QuestionType,
        topic: &str,
    ) -> Result<Question, ValidationError> {
        let text = strip_code_fence(raw);
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(object) = value else {
            return Err(ValidationError::Parse("顶层不是 JSON 对象".to_string()));
        };

        check_tag(&object, expected)?;

        let id = required_str(&object, "id")?;
        required_str(&object, "topic")?;
        let draft = QuestionDraft {
            id,
            topic: topic.to_string(),
            question_text: required_str(&object, "question_text")?,
            explanation: optional_str(&object, "explanation")?,
            body: match expected {
                QuestionType::Mcq => QuestionBody::Mcq(McqBody::new(
                    required_str_list(&object, "options")?,
                    required_str(&object, "correct_answer")?,
                )),
                QuestionType::DragAndDrop => QuestionBody::DragAndDrop(DragAndDropBody::new(
                    required_str_list(&object, "draggable_items")?,
                    required_str_list(&object, "drop_targets")?,
                    required_str_map(&object, "correct_matches")?,
                )),
            },
        };

        Question::new(draft, &self.rules)
    }
}

/// 去掉 ```json ... ``` 包裹，没有包裹时只去掉首尾空白
pub fn strip_code_fence(raw: &str) -> &str {
    if let Ok(re) = Regex::new(FENCE_PATTERN) {
        if let Some(inner) = re.captures(raw).and_then(|caps| caps.get(1)) {
            return inner.as_str();
        }
    }
    raw.trim()
}

fn check_tag(object: &JsonObject, expected: QuestionType) -> Result<(), ValidationError> {
    let found = match object.get("question_type") {
        Some(Value::String(tag)) => tag.clone(),
        Some(Value::Null) | None => "<missing>".to_string(),
        Some(other) => other.to_string(),
    };
    if QuestionType::from_tag(&found) == Some(expected) {
        Ok(())
    } else {
        Err(ValidationError::TagMismatch { expected, found })
    }
}

fn present<'a>(object: &'a JsonObject, field: &'static str) -> Option<&'a Value> {
    object.get(field).filter(|v| !v.is_null())
}

fn required_str(object: &JsonObject, field: &'static str) -> Result<String, ValidationError> {
    match present(object, field) {
        None => Err(ValidationError::MissingField { field }),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ValidationError::WrongType {
            field,
            expected: "string",
        }),
    }
}

fn optional_str(
    object: &JsonObject,
    field: &'static str,
) -> Result<Option<String>, ValidationError> {
    match present(object, field) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ValidationError::WrongType {
            field,
            expected: "string",
        }),
    }
}

fn required_str_list(
    object: &JsonObject,
    field: &'static str,
) -> Result<Vec<String>, ValidationError> {
    let wrong_type = ValidationError::WrongType {
        field,
        expected: "array of strings",
    };
    match present(object, field) {
        None => Err(ValidationError::MissingField { field }),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or(wrong_type.clone()))
            .collect(),
        Some(_) => Err(wrong_type),
    }
}

fn required_str_map(
    object: &JsonObject,
    field: &'static str,
) -> Result<BTreeMap<String, String>, ValidationError> {
    let wrong_type = ValidationError::WrongType {
        field,
        expected: "object of strings",
    };
    match present(object, field) {
        None => Err(ValidationError::MissingField { field }),
        Some(Value::Object(entries)) => entries
            .iter()
            .map(|(k, v)| {
                v.as_str()
                    .map(|target| (k.clone(), target.to_string()))
                    .ok_or(wrong_type.clone())
            })
            .collect(),
        Some(_) => Err(wrong_type),
    }
}
