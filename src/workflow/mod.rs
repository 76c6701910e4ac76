pub mod evaluation;
pub mod question_session;

pub use evaluation::{
    EvaluationController, EvaluationState, MessageKind, RunResolution, RunTicket,
    StatusMessage, SubmissionLedger, SubmitOutcome, OUTPUT_PLACEHOLDER, OUTPUT_RUNNING,
};
pub use question_session::QuestionSession;
