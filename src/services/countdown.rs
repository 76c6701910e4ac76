//! 考试倒计时
//!
//! 每秒由外部驱动 `tick` 一次，到零后停在零

/// 倒计时
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
}

impl Countdown {
    pub fn new(seconds: u32) -> Self {
        Self { remaining: seconds }
    }

    /// 减少一秒，返回剩余秒数
    pub fn tick(&mut self) -> u32 {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    /// `MM:SS` 格式
    pub fn display(&self) -> String {
        format_clock(self.remaining)
    }
}

/// 把秒数格式化为 `MM:SS`，分钟数超过 99 时照常增长
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
