//! 判题服务 - 业务能力层
//!
//! 只负责比较学生答案和题目的正确答案，不关心答案从哪里来。

use tracing::debug;

use crate::models::{
    AnswerSubmission, DragAndDropBody, Feedback, MatchMistake, Question, QuestionBody,
};

const NO_EXPLANATION: &str = "No explanation provided.";

/// 判题服务
#[derive(Debug, Clone, Copy, Default)]
pub struct AnswerGrader;

impl AnswerGrader {
    pub fn new() -> Self {
        Self
    }

    /// 按表单提交的原始值判题
    ///
    /// - 答案或题目 ID 为空 → `Empty`
    /// - 题目 ID 与当前题目不一致 → `StaleQuestion`
    pub fn grade_form(&self, question: &Question, question_id: &str, raw_answer: &str) -> Feedback {
        let Some(submission) = AnswerSubmission::from_form_value(raw_answer) else {
            return Feedback::Empty;
        };
        if question_id.trim().is_empty() {
            return Feedback::Empty;
        }
        if question_id != question.id() {
            debug!("题目 ID 不一致: 提交 {} / 当前 {}", question_id, question.id());
            return Feedback::StaleQuestion;
        }
        self.grade(question, &submission)
    }

    /// 判题
    pub fn grade(&self, question: &Question, submission: &AnswerSubmission) -> Feedback {
        let explanation = question.explanation().unwrap_or(NO_EXPLANATION).to_string();
        match (question.body(), submission) {
            (QuestionBody::Mcq(body), AnswerSubmission::Choice(choice)) => {
                if choice == body.correct_answer() {
                    Feedback::Correct
                } else {
                    Feedback::Incorrect {
                        correct_answer: body.correct_answer().to_string(),
                        explanation,
                        mistakes: Vec::new(),
                    }
                }
            }
            (QuestionBody::DragAndDrop(body), AnswerSubmission::Matches(placed)) => {
                let mistakes = match_mistakes(body, placed);
                if mistakes.is_empty() {
                    Feedback::Correct
                } else {
                    Feedback::Incorrect {
                        correct_answer: describe_matches(body),
                        explanation,
                        mistakes,
                    }
                }
            }
            _ => Feedback::Unanswerable,
        }
    }
}

/// 找出所有放错、漏放或多放的拖拽项
fn match_mistakes(
    body: &DragAndDropBody,
    placed: &std::collections::BTreeMap<String, String>,
) -> Vec<MatchMistake> {
    let mut mistakes: Vec<MatchMistake> = body
        .draggable_items()
        .iter()
        .filter_map(|item| {
            let expected = body.correct_matches().get(item);
            let actual = placed.get(item);
            (expected != actual).then(|| MatchMistake {
                item: item.clone(),
                placed: actual.cloned(),
                expected: expected.cloned(),
            })
        })
        .collect();

    // 提交了题目中不存在的拖拽项
    mistakes.extend(
        placed
            .iter()
            .filter(|(item, _)| !body.draggable_items().contains(*item))
            .map(|(item, target)| MatchMistake {
                item: item.clone(),
                placed: Some(target.clone()),
                expected: None,
            }),
    );
    mistakes
}

fn describe_matches(body: &DragAndDropBody) -> String {
    body.correct_matches()
        .iter()
        .map(|(item, target)| format!("{} → {}", item, target))
        .collect::<Vec<_>>()
        .join(", ")
}
