use serde::{Deserialize, Serialize};

use crate::services::{ClipboardAction, KeyPress};
use crate::workflow::EvaluationState;

/// 宿主送入会话的事件
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// 编辑器内容变化
    ContentChanged,
    /// 编辑器内粘贴
    EditorPaste,
    /// 页面失去焦点
    FocusLost,
    /// 文档级剪贴板事件
    Clipboard { action: ClipboardAction },
    /// 编辑器获得焦点时的按键
    KeyDown { press: KeyPress },
}

/// 事件处理结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventDisposition {
    /// 宿主应取消事件的默认行为（阻止复制粘贴）
    pub prevent_default: bool,
    /// 本事件触发了锁定
    pub locked_now: bool,
}

/// 会话向展示层发布的信号
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionSignal {
    Locked {
        reason: String,
    },
    RunFinished {
        question_id: String,
        state: EvaluationState,
    },
    Submitted {
        question_id: String,
    },
    /// 全部题目提交完成，每次会话至多一次
    Completed {
        submitted: usize,
        finished_at: String,
    },
}
