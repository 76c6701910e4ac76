//! 展示层
//!
//! 只做状态投影，不参与任何状态转换

pub mod view;

pub use view::{SessionView, SwitcherEntry};
