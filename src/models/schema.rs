//! 题型结构约束（SchemaRegistry）
//!
//! 每个题型的约束都以纯函数规则列表的形式给出，
//! [`SchemaRules::check`] 按固定顺序执行，遇到第一个失败立即返回。

use std::collections::HashSet;

use serde_json::json;

use crate::error::ValidationError;
use crate::models::question::{QuestionBody, QuestionDraft};
use crate::models::question_type::QuestionType;

pub const MCQ_MIN_OPTIONS: usize = 2;
pub const MCQ_MAX_OPTIONS: usize = 5;
pub const DND_MIN_ITEMS: usize = 2;
pub const DND_MIN_TARGETS: usize = 2;

type Rule = fn(&QuestionDraft, &SchemaRules) -> Result<(), ValidationError>;

/// 校验规则，顺序即报告顺序：先数量与去重，再跨字段引用
const RULES: &[Rule] = &[
    check_text_fields,
    check_arity,
    check_distinct,
    check_references,
    check_coverage,
];

/// 结构约束配置
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchemaRules {
    /// 拖拽题是否要求每个拖拽项都出现在 correct_matches 中
    pub require_full_coverage: bool,
}

impl SchemaRules {
    pub fn new(require_full_coverage: bool) -> Self {
        Self {
            require_full_coverage,
        }
    }

    /// 按顺序执行全部规则
    pub fn check(&self, draft: &QuestionDraft) -> Result<(), ValidationError> {
        RULES.iter().try_for_each(|rule| rule(draft, self))
    }

    /// 用自然语言描述某个题型的约束，供提示词使用
    pub fn describe(&self, question_type: QuestionType) -> Vec<String> {
        let mut lines = vec![
            "`topic` and `question_text` must be non-empty strings.".to_string(),
            "`explanation` is optional; when present it must be a string.".to_string(),
        ];
        match question_type {
            QuestionType::Mcq => {
                lines.push(format!(
                    "`options` must be a list of between {} and {} strings, all different from each other.",
                    MCQ_MIN_OPTIONS, MCQ_MAX_OPTIONS
                ));
                lines.push(
                    "`correct_answer` must be exactly equal to one of the strings in `options`."
                        .to_string(),
                );
            }
            QuestionType::DragAndDrop => {
                lines.push(format!(
                    "`draggable_items` must be a list of at least {} distinct strings.",
                    DND_MIN_ITEMS
                ));
                lines.push(format!(
                    "`drop_targets` must be a list of at least {} distinct strings.",
                    DND_MIN_TARGETS
                ));
                lines.push(
                    "`correct_matches` must be a non-empty object mapping a draggable item to a drop target."
                        .to_string(),
                );
                lines.push(
                    "Every key of `correct_matches` must appear in `draggable_items` and every value must appear in `drop_targets`."
                        .to_string(),
                );
                if self.require_full_coverage {
                    lines.push(
                        "Every entry of `draggable_items` must appear as a key of `correct_matches`."
                            .to_string(),
                    );
                } else {
                    lines.push(
                        "Draggable items without a match are allowed and act as distractors."
                            .to_string(),
                    );
                }
            }
        }
        lines
    }

    /// 期望的 JSON 结构示例
    pub fn example_shape(&self, question_type: QuestionType, id: &str, topic: &str) -> serde_json::Value {
        match question_type {
            QuestionType::Mcq => json!({
                "id": id,
                "topic": topic,
                "question_type": question_type.tag(),
                "question_text": "<question>",
                "options": ["<option 1>", "<option 2>", "<option 3>", "<option 4>"],
                "correct_answer": "<one of the options>",
                "explanation": "<why the answer is correct>",
            }),
            QuestionType::DragAndDrop => json!({
                "id": id,
                "topic": topic,
                "question_type": question_type.tag(),
                "question_text": "<instruction>",
                "draggable_items": ["<item 1>", "<item 2>", "<item 3>"],
                "drop_targets": ["<target 1>", "<target 2>"],
                "correct_matches": {"<item 1>": "<target 1>", "<item 2>": "<target 2>"},
                "explanation": "<why these matches are correct>",
            }),
        }
    }
}

fn check_text_fields(draft: &QuestionDraft, _: &SchemaRules) -> Result<(), ValidationError> {
    if draft.topic.trim().is_empty() {
        return Err(ValidationError::EmptyField { field: "topic" });
    }
    if draft.question_text.trim().is_empty() {
        return Err(ValidationError::EmptyField {
            field: "question_text",
        });
    }
    Ok(())
}

fn check_arity(draft: &QuestionDraft, _: &SchemaRules) -> Result<(), ValidationError> {
    match &draft.body {
        QuestionBody::Mcq(mcq) => {
            bounded("options", mcq.options().len(), MCQ_MIN_OPTIONS, Some(MCQ_MAX_OPTIONS))
        }
        QuestionBody::DragAndDrop(dnd) => {
            bounded("draggable_items", dnd.draggable_items().len(), DND_MIN_ITEMS, None)?;
            bounded("drop_targets", dnd.drop_targets().len(), DND_MIN_TARGETS, None)?;
            bounded("correct_matches", dnd.correct_matches().len(), 1, None)
        }
    }
}

fn check_distinct(draft: &QuestionDraft, _: &SchemaRules) -> Result<(), ValidationError> {
    match &draft.body {
        QuestionBody::Mcq(mcq) => distinct("options", mcq.options()),
        QuestionBody::DragAndDrop(dnd) => {
            distinct("draggable_items", dnd.draggable_items())?;
            distinct("drop_targets", dnd.drop_targets())
        }
    }
}

fn check_references(draft: &QuestionDraft, _: &SchemaRules) -> Result<(), ValidationError> {
    match &draft.body {
        QuestionBody::Mcq(mcq) => {
            if mcq.options().iter().any(|o| o == mcq.correct_answer()) {
                Ok(())
            } else {
                Err(ValidationError::AnswerNotInOptions {
                    answer: mcq.correct_answer().to_string(),
                })
            }
        }
        QuestionBody::DragAndDrop(dnd) => {
            for (item, target) in dnd.correct_matches() {
                if !dnd.draggable_items().contains(item) {
                    return Err(ValidationError::UnknownDraggable { item: item.clone() });
                }
                if !dnd.drop_targets().contains(target) {
                    return Err(ValidationError::UnknownDropTarget {
                        target: target.clone(),
                    });
                }
            }
            Ok(())
        }
    }
}

fn check_coverage(draft: &QuestionDraft, rules: &SchemaRules) -> Result<(), ValidationError> {
    let QuestionBody::DragAndDrop(dnd) = &draft.body else {
        return Ok(());
    };
    if !rules.require_full_coverage {
        return Ok(());
    }
    match dnd
        .draggable_items()
        .iter()
        .find(|item| !dnd.correct_matches().contains_key(*item))
    {
        Some(item) => Err(ValidationError::UncoveredDraggable { item: item.clone() }),
        None => Ok(()),
    }
}

fn bounded(
    field: &'static str,
    actual: usize,
    min: usize,
    max: Option<usize>,
) -> Result<(), ValidationError> {
    if actual < min || max.is_some_and(|m| actual > m) {
        return Err(ValidationError::Arity {
            field,
            min,
            max,
            actual,
        });
    }
    Ok(())
}

fn distinct(field: &'static str, values: &[String]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(value.as_str()) {
            return Err(ValidationError::Duplicate {
                field,
                value: value.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::models::question::{DragAndDropBody, McqBody};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn mcq(options: &[&str], answer: &str) -> QuestionDraft {
        QuestionDraft {
            id: "q".to_string(),
            topic: "Addition".to_string(),
            question_text: "What is 5 + 7?".to_string(),
            explanation: None,
            body: QuestionBody::Mcq(McqBody::new(strings(options), answer)),
        }
    }

    fn dnd(items: &[&str], targets: &[&str], matches: &[(&str, &str)]) -> QuestionDraft {
        let matches: BTreeMap<String, String> = matches
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        QuestionDraft {
            id: "q".to_string(),
            topic: "Parity".to_string(),
            question_text: "Match each number".to_string(),
            explanation: None,
            body: QuestionBody::DragAndDrop(DragAndDropBody::new(
                strings(items),
                strings(targets),
                matches,
            )),
        }
    }

    #[test]
    fn test_mcq_option_bounds() {
        let rules = SchemaRules::default();
        assert!(matches!(
            rules.check(&mcq(&["a"], "a")),
            Err(ValidationError::Arity { field: "options", actual: 1, .. })
        ));
        assert!(matches!(
            rules.check(&mcq(&["a", "b", "c", "d", "e", "f"], "a")),
            Err(ValidationError::Arity { field: "options", actual: 6, .. })
        ));
        assert!(rules.check(&mcq(&["a", "b", "c", "d", "e"], "e")).is_ok());
    }

    #[test]
    fn test_mcq_duplicates_reported_before_answer_check() {
        let err = SchemaRules::default()
            .check(&mcq(&["a", "a", "b"], "z"))
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::Duplicate {
                field: "options",
                value: "a".to_string()
            }
        );
    }

    #[test]
    fn test_empty_text_reported_first() {
        let mut draft = mcq(&["a"], "z");
        draft.question_text = "  ".to_string();
        assert_eq!(
            SchemaRules::default().check(&draft).unwrap_err(),
            ValidationError::EmptyField {
                field: "question_text"
            }
        );
    }

    #[test]
    fn test_dnd_references() {
        let rules = SchemaRules::default();
        let unknown_item = dnd(&["2", "7"], &["Even", "Odd"], &[("3", "Odd")]);
        assert_eq!(
            rules.check(&unknown_item).unwrap_err(),
            ValidationError::UnknownDraggable {
                item: "3".to_string()
            }
        );

        let unknown_target = dnd(&["2", "7"], &["Even", "Odd"], &[("2", "Prime")]);
        assert_eq!(
            rules.check(&unknown_target).unwrap_err(),
            ValidationError::UnknownDropTarget {
                target: "Prime".to_string()
            }
        );
    }

    #[test]
    fn test_dnd_duplicates_rejected() {
        let rules = SchemaRules::default();
        let repeated_item = dnd(&["2", "7", "2"], &["Even", "Odd"], &[("2", "Even")]);
        assert_eq!(
            rules.check(&repeated_item).unwrap_err(),
            ValidationError::Duplicate {
                field: "draggable_items",
                value: "2".to_string()
            }
        );

        let repeated_target = dnd(&["2", "7"], &["Odd", "Even", "Odd"], &[("7", "Odd")]);
        assert_eq!(
            rules.check(&repeated_target).unwrap_err(),
            ValidationError::Duplicate {
                field: "drop_targets",
                value: "Odd".to_string()
            }
        );
    }

    #[test]
    fn test_dnd_empty_matches_rejected() {
        let draft = dnd(&["2", "7"], &["Even", "Odd"], &[]);
        assert!(matches!(
            SchemaRules::default().check(&draft),
            Err(ValidationError::Arity {
                field: "correct_matches",
                ..
            })
        ));
    }

    #[test]
    fn test_dnd_distractors_depend_on_coverage_mode() {
        let draft = dnd(&["2", "7", "9"], &["Even", "Odd"], &[("2", "Even"), ("7", "Odd")]);
        assert!(SchemaRules::new(false).check(&draft).is_ok());
        assert_eq!(
            SchemaRules::new(true).check(&draft).unwrap_err(),
            ValidationError::UncoveredDraggable {
                item: "9".to_string()
            }
        );
    }

    #[test]
    fn test_describe_mentions_bounds() {
        let lines = SchemaRules::default().describe(QuestionType::Mcq);
        assert!(lines.iter().any(|l| l.contains("between 2 and 5")));
        let dnd_lines = SchemaRules::new(true).describe(QuestionType::DragAndDrop);
        assert!(dnd_lines.iter().any(|l| l.contains("must appear as a key")));
    }
}
