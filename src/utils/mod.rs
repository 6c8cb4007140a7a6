pub mod ident;
pub mod logging;

pub use ident::{content_suffix, has_expected_prefix, id_prefix, question_id, slugify};
pub use logging::truncate_text;
