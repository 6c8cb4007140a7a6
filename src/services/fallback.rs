//! 兜底题目 - 业务能力层
//!
//! 每个题型持有一道固定的合法题目。生成流程任何一步失败时，
//! 以它为模板替换主题、ID，并在题干前加上失败原因的诊断前缀。

use std::collections::BTreeMap;

use tracing::error;

use crate::error::ValidationError;
use crate::models::{
    DragAndDropBody, FailureCategory, McqBody, Question, QuestionBody, QuestionDraft,
    QuestionType, SchemaRules,
};
use crate::utils::question_id;

/// 主题为空时使用的主题
pub const DEFAULT_TOPIC: &str = "General Knowledge";

/// 兜底题目提供者
///
/// 内置题目和加了诊断前缀的副本都经过 [`Question::new`]，按最严格的规则
/// （拖拽题要求完整覆盖）校验。
#[derive(Debug, Clone)]
pub struct FallbackProvider {
    rules: SchemaRules,
    mcq: Question,
    drag_and_drop: Question,
}

impl FallbackProvider {
    pub fn new() -> Result<Self, ValidationError> {
        let rules = SchemaRules::new(true);
        Ok(Self {
            mcq: Question::new(canonical_mcq(), &rules)?,
            drag_and_drop: Question::new(canonical_drag_and_drop(), &rules)?,
            rules,
        })
    }

    /// 题型对应的固定题目（未替换主题）
    pub fn canonical(&self, question_type: QuestionType) -> &Question {
        match question_type {
            QuestionType::Mcq => &self.mcq,
            QuestionType::DragAndDrop => &self.drag_and_drop,
        }
    }

    /// 生成指定主题、题型和失败原因的兜底题目
    ///
    /// 相同输入总是得到完全相同的题目（ID 后缀由内容决定）。
    pub fn fallback(
        &self,
        topic: &str,
        question_type: QuestionType,
        category: FailureCategory,
    ) -> Question {
        let topic = if topic.trim().is_empty() {
            DEFAULT_TOPIC
        } else {
            topic
        };

        let canonical = self.canonical(question_type);
        let mut draft = canonical.clone().into_draft();
        draft.question_text = format!("{}{}", category.marker(), draft.question_text);
        let question = match Question::new(draft, &self.rules) {
            Ok(question) => question,
            Err(err) => {
                error!("❌ 兜底题目加前缀后校验失败: {}，改用原题", err);
                canonical.clone()
            }
        };

        let id = question_id(topic, &question);
        question.with_identity(topic.to_string(), id)
    }
}

fn canonical_mcq() -> QuestionDraft {
    QuestionDraft {
        id: "q_fallback_mcq".to_string(),
        topic: DEFAULT_TOPIC.to_string(),
        question_text: "What is 5 + 7?".to_string(),
        explanation: Some("Adding 5 and 7 results in 12.".to_string()),
        body: QuestionBody::Mcq(McqBody::new(
            vec!["10".into(), "11".into(), "12".into(), "13".into()],
            "12",
        )),
    }
}

fn canonical_drag_and_drop() -> QuestionDraft {
    let correct_matches: BTreeMap<String, String> = [
        ("2", "Even"),
        ("7", "Odd"),
        ("10", "Even"),
        ("15", "Odd"),
    ]
    .into_iter()
    .map(|(item, target)| (item.to_string(), target.to_string()))
    .collect();

    QuestionDraft {
        id: "q_fallback_drag_and_drop".to_string(),
        topic: DEFAULT_TOPIC.to_string(),
        question_text: "Drag each number onto the box that describes it.".to_string(),
        explanation: Some(
            "Even numbers are divisible by 2; odd numbers leave a remainder of 1.".to_string(),
        ),
        body: QuestionBody::DragAndDrop(DragAndDropBody::new(
            vec!["2".into(), "7".into(), "10".into(), "15".into()],
            vec!["Even".into(), "Odd".into()],
            correct_matches,
        )),
    }
}
