/// 题目 ID 工具
///
/// ID 格式：`q_<slug(topic)>_<题型>_<内容指纹>`
use sha2::{Digest, Sha256};

use crate::models::{Question, QuestionType};

/// 内容指纹的十六进制长度
const SUFFIX_LEN: usize = 12;

/// 主题转为 slug：小写，空白字符替换为下划线
pub fn slugify(topic: &str) -> String {
    topic
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect::<String>()
        .to_lowercase()
}

/// 期望的 ID 前缀（含结尾下划线）
pub fn id_prefix(topic: &str, question_type: QuestionType) -> String {
    format!("q_{}_{}_", slugify(topic), question_type.slug())
}

/// 生成方给出的 ID 是否符合期望前缀，且后缀为非空的小写字母或数字
pub fn has_expected_prefix(id: &str, topic: &str, question_type: QuestionType) -> bool {
    id.strip_prefix(&id_prefix(topic, question_type))
        .is_some_and(|suffix| {
            !suffix.is_empty()
                && suffix
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        })
}

/// 根据题目内容计算 ID 后缀（不含 id 和 topic）
pub fn content_suffix(question: &Question) -> String {
    let bytes = serde_json::to_vec(&question.content_view()).unwrap_or_default();
    let digest = Sha256::digest(&bytes);
    digest
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<String>()
        .chars()
        .take(SUFFIX_LEN)
        .collect()
}

/// 为题目计算完整 ID
pub fn question_id(topic: &str, question: &Question) -> String {
    format!(
        "{}{}",
        id_prefix(topic, question.question_type()),
        content_suffix(question)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Python Basics"), "python_basics");
        assert_eq!(slugify("Addition"), "addition");
        assert_eq!(slugify("World  War\tII"), "world__war_ii");
    }

    #[test]
    fn test_prefix_check() {
        assert!(has_expected_prefix(
            "q_python_basics_mcq_01",
            "Python Basics",
            QuestionType::Mcq
        ));
        assert!(!has_expected_prefix(
            "q_python_basics_mcq_",
            "Python Basics",
            QuestionType::Mcq
        ));
        assert!(!has_expected_prefix(
            "q_python_basics_drag_and_drop_01",
            "Python Basics",
            QuestionType::Mcq
        ));
        assert!(!has_expected_prefix("question-1", "Python Basics", QuestionType::Mcq));
    }

    #[test]
    fn test_placeholder_suffix_is_rejected() {
        assert!(!has_expected_prefix(
            "q_addition_mcq_<suffix>",
            "Addition",
            QuestionType::Mcq
        ));
        assert!(!has_expected_prefix("q_addition_mcq_A1", "Addition", QuestionType::Mcq));
        assert!(!has_expected_prefix("q_addition_mcq_a-1", "Addition", QuestionType::Mcq));
        assert!(has_expected_prefix("q_addition_mcq_a1b2", "Addition", QuestionType::Mcq));
    }
}
