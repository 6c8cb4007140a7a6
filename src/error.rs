use thiserror::Error;

use crate::models::QuestionType;

/// 应用程序错误类型
///
/// 只出现在核心流程之外（配置加载、创建流程、演示程序）。
/// 核心的 `generate` 永远不会向调用方返回错误。
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 内置兜底题目未通过校验
    #[error("兜底题目校验失败: {0}")]
    Fallback(#[from] ValidationError),
}

/// 题目结构校验错误
///
/// 每个变体对应一条校验规则，校验按固定顺序执行，
/// 因此同一份错误输入总是报告同一个“第一个失败”。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// 文本无法解析为 JSON 对象
    #[error("无法解析生成结果: {0}")]
    Parse(String),
    /// question_type 与期望题型不一致
    #[error("题型不匹配: 期望 {expected}, 实际 {found}")]
    TagMismatch {
        expected: QuestionType,
        found: String,
    },
    /// 缺少必填字段
    #[error("缺少必填字段: {field}")]
    MissingField { field: &'static str },
    /// 字段类型错误
    #[error("字段 {field} 类型错误, 期望 {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
    /// 字段为空
    #[error("字段 {field} 不能为空")]
    EmptyField { field: &'static str },
    /// 元素数量超出范围
    #[error("字段 {field} 元素数量 {actual} 超出范围 [{min}, {}]", .max.map_or("∞".to_string(), |m| m.to_string()))]
    Arity {
        field: &'static str,
        min: usize,
        max: Option<usize>,
        actual: usize,
    },
    /// 元素重复
    #[error("字段 {field} 存在重复元素: {value}")]
    Duplicate { field: &'static str, value: String },
    /// 正确答案不在选项中
    #[error("correct_answer '{answer}' 不在 options 中")]
    AnswerNotInOptions { answer: String },
    /// 匹配关系引用了不存在的拖拽项
    #[error("correct_matches 引用了未定义的拖拽项: {item}")]
    UnknownDraggable { item: String },
    /// 匹配关系引用了不存在的目标
    #[error("correct_matches 引用了未定义的放置目标: {target}")]
    UnknownDropTarget { target: String },
    /// 完整覆盖模式下存在未匹配的拖拽项
    #[error("拖拽项 {item} 没有对应的放置目标")]
    UncoveredDraggable { item: String },
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        ValidationError::Parse(err.to_string())
    }
}

/// 生成服务调用失败（传输层）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// 请求超时
    #[error("请求超时 ({secs} 秒)")]
    Timeout { secs: u64 },
    /// 网络请求失败
    #[error("请求失败: {0}")]
    Request(String),
    /// HTTP 状态码错误
    #[error("HTTP 状态码错误: {status}")]
    Status { status: u16 },
    /// 请求频率或额度限制
    #[error("请求频率或额度限制: {0}")]
    RateLimited(String),
    /// 服务端返回错误码
    #[error("服务返回错误码: {code}")]
    Service { code: String },
    /// 返回内容为空
    #[error("返回内容为空")]
    EmptyResponse,
}

/// 一次生成流程中可能出现的全部失败
///
/// 所有变体都会在流程内部被兜底题目消化，不会传播给调用方。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// 没有提供 API 密钥
    #[error("未提供 API 密钥")]
    CredentialMissing,
    /// 调用生成服务失败
    #[error("调用生成服务失败: {0}")]
    Transport(#[from] TransportError),
    /// 返回文本无法解析
    #[error("解析失败: {0}")]
    Parse(String),
    /// 返回内容违反题型约束
    #[error("结构校验失败: {0}")]
    SchemaViolation(ValidationError),
}

impl From<ValidationError> for GenerationError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::Parse(msg) => GenerationError::Parse(msg),
            other => GenerationError::SchemaViolation(other),
        }
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 未知的生成后端
    #[error("未知的生成后端: {value}")]
    UnknownBackend { value: String },
    /// HTTP 后端缺少地址
    #[error("HTTP 生成后端需要设置 generator_endpoint")]
    MissingEndpoint,
    /// 配置值超出允许范围
    #[error("配置项 {field} 的值 {value} 无效: {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建 TOML 解析错误
    pub fn toml_parse_failed(path: impl Into<String>, source: toml::de::Error) -> Self {
        AppError::File(FileError::TomlParseFailed {
            path: path.into(),
            source,
        })
    }
}

impl TransportError {
    /// 包装任意第三方请求错误
    pub fn request(source: impl std::fmt::Display) -> Self {
        TransportError::Request(source.to_string())
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_maps_to_parse_category() {
        let err: GenerationError = ValidationError::Parse("EOF".to_string()).into();
        assert_eq!(err, GenerationError::Parse("EOF".to_string()));
    }

    #[test]
    fn test_schema_error_maps_to_schema_violation() {
        let violation = ValidationError::AnswerNotInOptions {
            answer: "12".to_string(),
        };
        let err: GenerationError = violation.clone().into();
        assert_eq!(err, GenerationError::SchemaViolation(violation));
    }

    #[test]
    fn test_arity_message_without_upper_bound() {
        let err = ValidationError::Arity {
            field: "draggable_items",
            min: 2,
            max: None,
            actual: 1,
        };
        assert_eq!(
            err.to_string(),
            "字段 draggable_items 元素数量 1 超出范围 [2, ∞]"
        );
    }

    #[test]
    fn test_serde_error_becomes_parse_error() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(ValidationError::from(err), ValidationError::Parse(_)));
    }
}
