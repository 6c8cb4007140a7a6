use std::env;

use anyhow::{Context, Result};
use quiz_generator::config::Config;
use quiz_generator::utils::logging;
use quiz_generator::workflow::QuestionAssembler;
use quiz_generator::PreferredType;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志（配置加载过程中的警告也需要输出）
    let verbose = env::var("VERBOSE_LOGGING").is_ok_and(|v| v.eq_ignore_ascii_case("true"));
    logging::init(verbose);

    // 加载配置：QUIZ_CONFIG 指定 TOML 文件，否则只读环境变量
    let config = match env::var("QUIZ_CONFIG") {
        Ok(path) => {
            Config::from_toml_file(&path).with_context(|| format!("无法加载配置: {}", path))?
        }
        Err(_) => Config::from_env(),
    };
    logging::log_startup(&config);

    let assembler = QuestionAssembler::from_config(&config)?;

    let mut args = env::args().skip(1);
    let topic = args.next().unwrap_or_else(|| "Addition".to_string());
    let preferred = PreferredType::from(args.next().as_deref().unwrap_or("ANY"));

    let generation = assembler.generate_with_outcome(&topic, preferred).await;

    println!("{}", serde_json::to_string_pretty(&generation.question)?);
    println!("{}", generation.outcome);

    Ok(())
}
