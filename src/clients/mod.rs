pub mod judge_client;

pub use judge_client::{Judge, Judge0Client, JudgeOutput, JudgeRequest};
