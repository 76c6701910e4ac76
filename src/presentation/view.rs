//! 会话视图
//!
//! 会话状态的纯投影，供界面渲染；不持有也不修改任何状态

use std::fmt::Write as _;

use serde::Serialize;

use crate::models::Language;
use crate::services::{format_clock, ProctorMonitor};
use crate::workflow::{EvaluationController, MessageKind, QuestionSession, StatusMessage};

/// 题目切换按钮
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitcherEntry {
    pub label: String,
    pub active: bool,
    pub submitted: bool,
}

/// 会话快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub question_id: String,
    pub title: String,
    pub input: String,
    pub expected_output: String,
    pub language: Language,
    pub output: String,
    pub message: StatusMessage,
    pub run_enabled: bool,
    pub submit_enabled: bool,
    /// 违规提示，锁定后常驻
    pub alert_visible: bool,
    pub timer: String,
    pub switcher: Vec<SwitcherEntry>,
}

impl SessionView {
    /// 从各组件投影出快照
    pub fn project(
        questions: &QuestionSession,
        evaluation: &EvaluationController,
        proctor: &ProctorMonitor,
        remaining_secs: u32,
    ) -> Self {
        let q = questions.current_question();
        let switcher = questions
            .questions()
            .iter()
            .enumerate()
            .map(|(idx, item)| SwitcherEntry {
                label: format!("Q{}", idx + 1),
                active: idx == questions.current_index(),
                submitted: evaluation.ledger().contains(&item.id),
            })
            .collect();

        Self {
            question_id: q.id.clone(),
            title: q.title.clone(),
            input: q.input.clone(),
            expected_output: q.expected_output.clone(),
            language: questions.language(),
            output: evaluation.output().to_string(),
            message: evaluation.message().clone(),
            run_enabled: evaluation.run_enabled(),
            submit_enabled: evaluation.submit_enabled(&q.id),
            alert_visible: proctor.is_locked(),
            timer: format_clock(remaining_secs),
            switcher,
        }
    }

    /// 渲染为终端文本
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let tabs: Vec<String> = self
            .switcher
            .iter()
            .map(|e| {
                let mark = if e.submitted { "✓" } else { "" };
                if e.active {
                    format!("[{}{}]", e.label, mark)
                } else {
                    format!(" {}{} ", e.label, mark)
                }
            })
            .collect();

        let _ = writeln!(out, "{}    ⏱ {}", tabs.join(""), self.timer);
        if self.alert_visible {
            let _ = writeln!(out, "🚫 检测到违规操作，会话已锁定");
        }
        let _ = writeln!(out, "{} ({})", self.title, self.language);
        let _ = writeln!(out, "输入:\n{}", self.input);
        let _ = writeln!(out, "预期输出:\n{}", self.expected_output);
        let _ = writeln!(out, "实际输出:\n{}", self.output);
        if self.message.kind != MessageKind::None {
            let _ = writeln!(out, "{}", self.message.text);
        }
        let _ = write!(
            out,
            "运行: {}  提交: {}",
            enabled(self.run_enabled),
            enabled(self.submit_enabled)
        );
        out
    }
}

fn enabled(flag: bool) -> &'static str {
    if flag {
        "可用"
    } else {
        "禁用"
    }
}
