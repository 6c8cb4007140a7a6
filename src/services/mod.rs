pub mod fallback;
pub mod grader;
pub mod prompt_builder;
pub mod type_selector;
pub mod validator;

pub use fallback::{FallbackProvider, DEFAULT_TOPIC};
pub use grader::AnswerGrader;
pub use prompt_builder::{PromptBuilder, SYSTEM_MESSAGE};
pub use type_selector::TypeSelector;
pub use validator::{strip_code_fence, Validator};
