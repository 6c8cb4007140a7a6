/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::{GenerationOutcome, QuestionSource};

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 debug / info。
/// 重复调用不会报错（测试中会多次初始化）。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 题目生成启动 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🤖 生成后端: {:?} | 模型: {}", config.generator_backend, config.llm_model_name);
    info!(
        "🔑 API 密钥: {}",
        if config.has_credential() { "已配置" } else { "未配置（将使用兜底题目）" }
    );
    info!("⏱️ 请求超时: {} 秒", config.request_timeout_secs);
    info!("{}", "=".repeat(60));
}

/// 记录一次生成的结果
pub fn log_outcome(outcome: &GenerationOutcome) {
    match outcome.source {
        QuestionSource::Generated => info!(
            question_type = %outcome.question_type,
            "✓ 题目生成成功"
        ),
        QuestionSource::Fallback(category) => warn!(
            question_type = %outcome.question_type,
            category = category.name(),
            "⚠️ 使用兜底题目: {}",
            outcome
                .error
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_default()
        ),
    }
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
