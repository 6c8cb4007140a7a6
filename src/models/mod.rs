pub mod answer;
pub mod outcome;
pub mod question;
pub mod question_type;
pub mod schema;

pub use answer::{AnswerSubmission, Feedback, MatchMistake};
pub use outcome::{FailureCategory, FlowState, Generation, GenerationOutcome, QuestionSource};
pub use question::{DragAndDropBody, McqBody, Question, QuestionBody, QuestionDraft};
pub use question_type::{PreferredType, QuestionType};
pub use schema::SchemaRules;
