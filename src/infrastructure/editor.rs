//! 代码编辑器能力 - 基础设施层
//!
//! 编辑器控件对会话来说是不透明的：只能读写文本、切换语言模式和只读状态。
//! 内容变更与粘贴事件由宿主转成 `SessionEvent` 送入会话。

use tracing::debug;

use crate::models::Language;

/// 编辑器能力
pub trait CodeEditor: Send {
    fn text(&self) -> String;
    /// 程序化设置文本，只读状态下同样生效
    fn set_text(&mut self, text: &str);
    fn set_language_mode(&mut self, lang: Language);
    fn set_read_only(&mut self, read_only: bool);
    fn is_read_only(&self) -> bool;
}

/// 纯内存编辑器，用于无界面驱动和测试
#[derive(Debug, Clone, Default)]
pub struct BufferEditor {
    text: String,
    mode: Option<Language>,
    read_only: bool,
}

impl BufferEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前语言模式
    pub fn language_mode(&self) -> Option<Language> {
        self.mode
    }

    /// 模拟用户输入：只读时拒绝，返回是否生效
    pub fn user_replace(&mut self, text: &str) -> bool {
        if self.read_only {
            debug!("编辑器只读，忽略用户输入");
            return false;
        }
        self.text = text.to_string();
        true
    }
}

impl CodeEditor for BufferEditor {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    fn set_language_mode(&mut self, lang: Language) {
        self.mode = Some(lang);
    }

    fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }
}
