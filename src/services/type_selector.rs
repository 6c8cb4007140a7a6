//! 题型选择 - 业务能力层
//!
//! 每次请求只解析一次偏好，结果决定后续使用的约束、提示词和兜底题目。

use rand::Rng;
use tracing::{debug, warn};

use crate::models::{PreferredType, QuestionType};

/// 题型选择器
///
/// 随机源由调用方注入，测试时可传入固定种子的 RNG。
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeSelector;

impl TypeSelector {
    pub fn new() -> Self {
        Self
    }

    /// 把偏好解析为具体题型
    ///
    /// - `Any` 在两种题型之间等概率随机
    /// - 无法识别的值默认单选题，并记录警告
    pub fn resolve<R: Rng + ?Sized>(&self, preferred: &PreferredType, rng: &mut R) -> QuestionType {
        let resolved = match preferred {
            PreferredType::Mcq => QuestionType::Mcq,
            PreferredType::DragAndDrop => QuestionType::DragAndDrop,
            PreferredType::Any => {
                if rng.gen_bool(0.5) {
                    QuestionType::Mcq
                } else {
                    QuestionType::DragAndDrop
                }
            }
            PreferredType::Unrecognized(raw) => {
                warn!(
                    preferred_type = %raw,
                    "⚠️ 无法识别的题型偏好 {:?}，默认使用单选题",
                    raw
                );
                QuestionType::Mcq
            }
        };
        debug!("题型偏好 {} → {}", preferred, resolved);
        resolved
    }
}
