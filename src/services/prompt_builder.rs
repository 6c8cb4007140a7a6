//! 提示词构建 - 业务能力层
//!
//! 把主题和题型渲染成发给生成服务的指令。纯函数，无副作用。

use crate::models::{QuestionType, SchemaRules};
use crate::utils::slugify;

/// 随每次请求发送的系统消息
pub const SYSTEM_MESSAGE: &str = "You are a quiz question generator for an educational app. \
You always answer with exactly one JSON object that follows the requested structure, \
with no Markdown, no code fences and no commentary.";

/// 提示词构建器
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder {
    rules: SchemaRules,
}

impl PromptBuilder {
    pub fn new(rules: SchemaRules) -> Self {
        Self { rules }
    }

    /// 构建用户消息
    pub fn build(&self, topic: &str, question_type: QuestionType) -> String {
        let id_template = format!("q_{}_{}_<suffix>", slugify(topic), question_type.slug());
        let example = self.rules.example_shape(question_type, &id_template, topic);
        let example_json = serde_json::to_string_pretty(&example).unwrap_or_default();

        let requirements: String = self
            .rules
            .describe(question_type)
            .into_iter()
            .map(|line| format!("- {}\n", line))
            .collect();

        format!(
            r#"Create one {kind} quiz question about the topic "{topic}".

Requirements:
- `question_type` must be exactly "{tag}".
- `topic` must be exactly "{topic}".
- `id` must follow the template `{id_template}`, where <suffix> is a short lowercase alphanumeric string unique to this question.
{requirements}
Respond with exactly one JSON object of this shape:
{example_json}

Return only the JSON text. Do not wrap it in Markdown code fences and do not add any commentary before or after it."#,
            kind = kind_label(question_type),
            topic = topic,
            tag = question_type.tag(),
            id_template = id_template,
            requirements = requirements,
            example_json = example_json,
        )
    }
}

fn kind_label(question_type: QuestionType) -> &'static str {
    match question_type {
        QuestionType::Mcq => "multiple-choice",
        QuestionType::DragAndDrop => "drag-and-drop matching",
    }
}
