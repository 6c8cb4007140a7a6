use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use crate::error::ValidationError;
use crate::models::question_type::QuestionType;
use crate::models::schema::SchemaRules;

/// 单选题内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct McqBody {
    options: Vec<String>,
    correct_answer: String,
}

impl McqBody {
    pub fn new(options: Vec<String>, correct_answer: impl Into<String>) -> Self {
        Self {
            options,
            correct_answer: correct_answer.into(),
        }
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }
}

/// 拖拽匹配题内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DragAndDropBody {
    draggable_items: Vec<String>,
    drop_targets: Vec<String>,
    correct_matches: BTreeMap<String, String>,
}

impl DragAndDropBody {
    pub fn new(
        draggable_items: Vec<String>,
        drop_targets: Vec<String>,
        correct_matches: BTreeMap<String, String>,
    ) -> Self {
        Self {
            draggable_items,
            drop_targets,
            correct_matches,
        }
    }

    pub fn draggable_items(&self) -> &[String] {
        &self.draggable_items
    }

    pub fn drop_targets(&self) -> &[String] {
        &self.drop_targets
    }

    /// 拖拽项 → 放置目标
    pub fn correct_matches(&self) -> &BTreeMap<String, String> {
        &self.correct_matches
    }
}

/// 各题型特有的内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QuestionBody {
    Mcq(McqBody),
    DragAndDrop(DragAndDropBody),
}

impl QuestionBody {
    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionBody::Mcq(_) => QuestionType::Mcq,
            QuestionBody::DragAndDrop(_) => QuestionType::DragAndDrop,
        }
    }
}

/// 构造题目所需的字段（尚未校验）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub id: String,
    pub topic: String,
    pub question_text: String,
    pub explanation: Option<String>,
    pub body: QuestionBody,
}

/// 题目
///
/// 字段全部私有，唯一的公开构造入口是 [`Question::new`]，
/// 它会按顺序执行全部校验规则。因此只要拿到一个 `Question`，它就是合法的。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: String,
    topic: String,
    question_text: String,
    explanation: Option<String>,
    body: QuestionBody,
}

impl Question {
    /// 校验并构造题目
    pub fn new(draft: QuestionDraft, rules: &SchemaRules) -> Result<Self, ValidationError> {
        rules.check(&draft)?;
        Ok(Self {
            id: draft.id,
            topic: draft.topic,
            question_text: draft.question_text,
            explanation: draft.explanation,
            body: draft.body,
        })
    }

    /// 替换主题和 ID，其余内容保持不变
    ///
    /// 调用方保证 `topic` 非空。
    pub(crate) fn with_identity(self, topic: String, id: String) -> Self {
        debug_assert!(!topic.trim().is_empty());
        Self { id, topic, ..self }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn question_text(&self) -> &str {
        &self.question_text
    }

    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    pub fn body(&self) -> &QuestionBody {
        &self.body
    }

    pub fn question_type(&self) -> QuestionType {
        self.body.question_type()
    }

    /// 拆回草稿，便于在其基础上构造新题目
    pub fn into_draft(self) -> QuestionDraft {
        QuestionDraft {
            id: self.id,
            topic: self.topic,
            question_text: self.question_text,
            explanation: self.explanation,
            body: self.body,
        }
    }

    /// 参与内容指纹计算的部分（不含 id 和 topic）
    pub(crate) fn content_view(&self) -> impl Serialize + '_ {
        ContentView {
            question_type: self.question_type(),
            question_text: &self.question_text,
            explanation: self.explanation.as_deref(),
            body: &self.body,
        }
    }
}

#[derive(Serialize)]
struct ContentView<'a> {
    question_type: QuestionType,
    question_text: &'a str,
    explanation: Option<&'a str>,
    #[serde(flatten)]
    body: &'a QuestionBody,
}

#[derive(Serialize)]
struct QuestionView<'a> {
    id: &'a str,
    topic: &'a str,
    question_type: QuestionType,
    question_text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    explanation: Option<&'a str>,
    #[serde(flatten)]
    body: &'a QuestionBody,
}

impl Serialize for Question {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        QuestionView {
            id: &self.id,
            topic: &self.topic,
            question_type: self.question_type(),
            question_text: &self.question_text,
            explanation: self.explanation.as_deref(),
            body: &self.body,
        }
        .serialize(serializer)
    }
}
