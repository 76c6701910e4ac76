pub mod code_state;
pub mod language;
pub mod loaders;
pub mod question;

pub use code_state::{CodeState, LanguageTable, StoredCodeState};
pub use language::Language;
pub use loaders::{load_questions, load_questions_from_file, validate as validate_questions};
pub use question::{BuggyCode, Question};
