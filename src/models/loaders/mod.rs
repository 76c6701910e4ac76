pub mod question_loader;

pub use question_loader::{load_questions, load_questions_from_file, validate};
