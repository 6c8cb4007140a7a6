use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use phf::phf_map;
use serde::Serialize;

/// 题型别名表（键为归一化后的小写形式）
static QUESTION_TYPE_ALIASES: phf::Map<&'static str, QuestionType> = phf_map! {
    "mcq" => QuestionType::Mcq,
    "multiple_choice" => QuestionType::Mcq,
    "multiplechoice" => QuestionType::Mcq,
    "drag_and_drop" => QuestionType::DragAndDrop,
    "draganddrop" => QuestionType::DragAndDrop,
    "drag_drop" => QuestionType::DragAndDrop,
    "dnd" => QuestionType::DragAndDrop,
};

/// 题型枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QuestionType {
    /// 单选题
    #[serde(rename = "MCQ")]
    Mcq,
    /// 拖拽匹配题
    #[serde(rename = "DRAG_AND_DROP")]
    DragAndDrop,
}

impl QuestionType {
    pub const ALL: [QuestionType; 2] = [QuestionType::Mcq, QuestionType::DragAndDrop];

    /// 获取结构化数据中的题型标签
    pub fn tag(self) -> &'static str {
        match self {
            QuestionType::Mcq => "MCQ",
            QuestionType::DragAndDrop => "DRAG_AND_DROP",
        }
    }

    /// 获取用于题目 ID 的片段
    pub fn slug(self) -> &'static str {
        match self {
            QuestionType::Mcq => "mcq",
            QuestionType::DragAndDrop => "drag_and_drop",
        }
    }

    /// 从题型标签解析（大小写不敏感，支持常见别名）
    pub fn from_tag(tag: &str) -> Option<Self> {
        QUESTION_TYPE_ALIASES.get(normalize_key(tag).as_str()).copied()
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// 请求中的题型偏好
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferredType {
    Mcq,
    DragAndDrop,
    /// 随机选择
    Any,
    /// 无法识别的值，保留原文用于日志
    Unrecognized(String),
}

impl FromStr for PreferredType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize_key(s);
        if key == "any" || key == "random" {
            return Ok(PreferredType::Any);
        }
        Ok(match QUESTION_TYPE_ALIASES.get(key.as_str()) {
            Some(QuestionType::Mcq) => PreferredType::Mcq,
            Some(QuestionType::DragAndDrop) => PreferredType::DragAndDrop,
            None => PreferredType::Unrecognized(s.to_string()),
        })
    }
}

impl From<QuestionType> for PreferredType {
    fn from(question_type: QuestionType) -> Self {
        match question_type {
            QuestionType::Mcq => PreferredType::Mcq,
            QuestionType::DragAndDrop => PreferredType::DragAndDrop,
        }
    }
}

impl From<&str> for PreferredType {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(preferred) => preferred,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for PreferredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreferredType::Mcq => f.write_str("MCQ"),
            PreferredType::DragAndDrop => f.write_str("DRAG_AND_DROP"),
            PreferredType::Any => f.write_str("ANY"),
            PreferredType::Unrecognized(raw) => write!(f, "{:?}", raw),
        }
    }
}

fn normalize_key(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}
