pub mod code_cache;
pub mod countdown;
pub mod proctor;

pub use code_cache::CodeStateCache;
pub use countdown::{format_clock, Countdown};
pub use proctor::{ClipboardAction, KeyPress, ProctorMonitor, ProctorState, Violation};
