//! 监考器 - 业务能力层
//!
//! 检测失焦、剪贴板事件和剪贴板快捷键，首次违规即把会话永久锁定，
//! 并把违规标记写入存储，刷新页面也无法恢复。
//!
//! 这是启发式的检测器，只能作为提示，不是安全边界：
//! 客户端完全可以绕过这些事件。

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::infrastructure::StoreAdapter;

/// 监考状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProctorState {
    Clean,
    /// 终态，只有管理员清除才能离开
    Locked,
}

/// 剪贴板动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipboardAction {
    Copy,
    Cut,
    Paste,
}

/// 违规类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// 页面失去焦点
    FocusLost,
    /// 文档级剪贴板事件
    Clipboard { action: ClipboardAction },
    /// 编辑器内粘贴
    EditorPaste,
    /// 编辑器获得焦点时按下剪贴板快捷键
    Shortcut { combo: KeyPress },
    /// 刷新前已记录的违规
    Persisted,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::FocusLost => write!(f, "页面失去焦点"),
            Violation::Clipboard { action } => write!(f, "剪贴板操作 ({:?})", action),
            Violation::EditorPaste => write!(f, "编辑器内粘贴"),
            Violation::Shortcut { combo } => write!(f, "剪贴板快捷键 {}", combo),
            Violation::Persisted => write!(f, "此前已记录违规"),
        }
    }
}

/// 一次按键（含修饰键）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPress {
    /// 单字符键（如 "v"）或具名键（如 "Insert"）
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub meta: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub alt: bool,
}

impl KeyPress {
    /// 解析形如 `ctrl+v`、`cmd+x`、`shift+insert` 的组合键
    pub fn parse(combo: &str) -> Option<Self> {
        let mut press = KeyPress::default();
        for part in combo.split('+').map(str::trim) {
            match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => press.ctrl = true,
                "cmd" | "meta" | "super" => press.meta = true,
                "shift" => press.shift = true,
                "alt" | "option" => press.alt = true,
                "" => return None,
                _ if press.key.is_empty() => press.key = part.to_string(),
                _ => return None,
            }
        }
        if press.key.is_empty() {
            None
        } else {
            Some(press)
        }
    }

    /// 这个组合键对应的剪贴板动作
    ///
    /// Ctrl/Cmd + C/X/V，Shift+Insert（粘贴），Shift+Delete（剪切），Ctrl+Insert（复制）
    pub fn clipboard_action(&self) -> Option<ClipboardAction> {
        let command = self.ctrl || self.meta;
        match self.key.to_ascii_lowercase().as_str() {
            "c" if command => Some(ClipboardAction::Copy),
            "x" if command => Some(ClipboardAction::Cut),
            "v" if command => Some(ClipboardAction::Paste),
            "insert" if self.shift => Some(ClipboardAction::Paste),
            "insert" if self.ctrl => Some(ClipboardAction::Copy),
            "delete" if self.shift => Some(ClipboardAction::Cut),
            _ => None,
        }
    }
}

impl fmt::Display for KeyPress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            write!(f, "Ctrl+")?;
        }
        if self.meta {
            write!(f, "Cmd+")?;
        }
        if self.alt {
            write!(f, "Alt+")?;
        }
        if self.shift {
            write!(f, "Shift+")?;
        }
        write!(f, "{}", self.key)
    }
}

/// 监考器
pub struct ProctorMonitor {
    state: ProctorState,
    store: StoreAdapter,
    /// 本次会话中是否出现过锁定，管理员清除也不会重置
    ever_locked: bool,
    cause: Option<Violation>,
    locked_at: Option<DateTime<Local>>,
}

impl ProctorMonitor {
    /// 根据存储中的违规标记恢复状态
    ///
    /// 必须在其他初始化之前调用：已有标记时直接进入锁定
    pub fn restore(store: StoreAdapter) -> Self {
        let flagged = store.cheating_flag();
        let mut monitor = Self {
            state: ProctorState::Clean,
            store,
            ever_locked: false,
            cause: None,
            locked_at: None,
        };
        if flagged {
            warn!("🚫 检测到此前的违规记录，会话直接锁定");
            monitor.enter_locked(Violation::Persisted);
        }
        monitor
    }

    /// 上报一次违规
    ///
    /// # 返回
    /// 本次是否触发了 CLEAN → LOCKED 转换；已锁定时为 `false`
    pub fn report(&mut self, violation: Violation) -> bool {
        if self.is_locked() {
            debug!("已锁定，忽略违规: {}", violation);
            return false;
        }
        warn!("🚫 检测到违规: {}，会话锁定", violation);
        self.store.set_cheating_flag();
        self.enter_locked(violation);
        true
    }

    fn enter_locked(&mut self, violation: Violation) {
        self.state = ProctorState::Locked;
        self.ever_locked = true;
        self.cause = Some(violation);
        self.locked_at = Some(Local::now());
    }

    /// 管理员清除违规标记
    ///
    /// 正常流程从不调用
    pub fn admin_reset(&mut self) {
        info!("管理员清除违规标记");
        self.store.clear_cheating_flag();
        self.state = ProctorState::Clean;
        self.cause = None;
        self.locked_at = None;
    }

    pub fn state(&self) -> ProctorState {
        self.state
    }

    pub fn is_locked(&self) -> bool {
        self.state == ProctorState::Locked
    }

    /// 本次会话中是否出现过锁定
    pub fn ever_locked(&self) -> bool {
        self.ever_locked
    }

    /// 导致锁定的违规
    pub fn cause(&self) -> Option<&Violation> {
        self.cause.as_ref()
    }

    pub fn locked_at(&self) -> Option<DateTime<Local>> {
        self.locked_at
    }
}
