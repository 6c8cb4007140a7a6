//! 题目生成上下文
//!
//! 封装"我正在为哪个主题生成哪种题型"这一信息

use std::fmt::Display;

use crate::models::{PreferredType, QuestionType};

/// 题目生成上下文
#[derive(Debug, Clone)]
pub struct QuestionCtx {
    /// 请求的主题（空白主题已替换为默认主题）
    pub topic: String,

    /// 调用方给出的题型偏好
    pub preferred: PreferredType,

    /// 实际使用的题型
    pub question_type: QuestionType,
}

impl QuestionCtx {
    pub fn new(topic: String, preferred: PreferredType, question_type: QuestionType) -> Self {
        Self {
            topic,
            preferred,
            question_type,
        }
    }
}

impl Display for QuestionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[主题 {} | 题型 {}]", self.topic, self.question_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let ctx = QuestionCtx::new(
            "Addition".to_string(),
            PreferredType::Any,
            QuestionType::DragAndDrop,
        );
        assert_eq!(ctx.to_string(), "[主题 Addition | 题型 DRAG_AND_DROP]");
    }
}
