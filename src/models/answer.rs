use std::collections::BTreeMap;
use std::fmt;

/// 学生提交的答案
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerSubmission {
    /// 单选题选中的选项
    Choice(String),
    /// 拖拽题的放置结果：拖拽项 → 放置目标
    Matches(BTreeMap<String, String>),
}

impl AnswerSubmission {
    /// 从表单原始值解析
    ///
    /// JSON 对象（拖拽页面提交的 `{"item": "target"}`）解析为 `Matches`，
    /// 其余非空文本原样作为 `Choice`（选项文本可能带首尾空白），空值返回 None。
    pub fn from_form_value(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.starts_with('{') {
            if let Ok(matches) = serde_json::from_str::<BTreeMap<String, String>>(trimmed) {
                return Some(AnswerSubmission::Matches(matches));
            }
        }
        Some(AnswerSubmission::Choice(raw.to_string()))
    }
}

/// 拖拽题中放错的一项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchMistake {
    pub item: String,
    /// 学生放置的位置，None 表示未放置
    pub placed: Option<String>,
    /// 正确位置，None 表示该项是干扰项，不应放置
    pub expected: Option<String>,
}

/// 判题反馈
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Correct,
    Incorrect {
        correct_answer: String,
        explanation: String,
        mistakes: Vec<MatchMistake>,
    },
    /// 没有选择答案
    Empty,
    /// 提交的题目 ID 与当前题目不一致
    StaleQuestion,
    /// 答案形式与题型不符
    Unanswerable,
}

impl Feedback {
    pub fn is_correct(&self) -> bool {
        matches!(self, Feedback::Correct)
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feedback::Correct => f.write_str("Correct!"),
            Feedback::Incorrect {
                correct_answer,
                explanation,
                ..
            } => write!(
                f,
                "Incorrect. The correct answer was: {}. Explanation: {}",
                correct_answer, explanation
            ),
            Feedback::Empty => f.write_str("Please select an answer."),
            Feedback::StaleQuestion => {
                f.write_str("There was an issue with the question. Please try the current one.")
            }
            Feedback::Unanswerable => f.write_str("This answer does not fit the question type."),
        }
    }
}
