//! 持久化适配器 - 基础设施层
//!
//! 持有唯一的 `KvStore`，只暴露三个逻辑键的读写能力：
//! 代码状态、最后使用的语言、违规标记。
//! 所有存储错误在这里被吞掉并记录日志，调用方看到的永远是默认值或 `false`。

use std::sync::Arc;

use tracing::{debug, warn};

use super::store::KvStore;
use crate::error::StoreError;
use crate::models::{CodeState, Language, StoredCodeState};

/// 违规标记的存储值
const CHEATING_FLAG_VALUE: &str = "1";

/// 持久化适配器
///
/// 克隆开销很小，各组件各持有一份
#[derive(Clone)]
pub struct StoreAdapter {
    store: Arc<dyn KvStore>,
    code_state_key: String,
    last_language_key: String,
    cheating_key: String,
}

impl StoreAdapter {
    /// 创建适配器
    ///
    /// # 参数
    /// - `store`: 底层键值存储
    /// - `prefix`: 键前缀
    pub fn new(store: Arc<dyn KvStore>, prefix: &str) -> Self {
        Self {
            store,
            code_state_key: format!("{}_codeStates", prefix),
            last_language_key: format!("{}_lastLanguage", prefix),
            cheating_key: format!("{}_cheating", prefix),
        }
    }

    /// 读取代码状态，缺失或损坏时返回空表
    pub fn load_code_state(&self) -> StoredCodeState {
        let raw = match self.store.get(&self.code_state_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return StoredCodeState::new(),
            Err(e) => {
                warn!("⚠️ 读取代码状态失败: {}，使用空状态", e);
                return StoredCodeState::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("⚠️ 存储中的代码状态已损坏: {}，使用空状态", e);
            StoredCodeState::new()
        })
    }

    /// 写入完整代码状态，返回是否写入成功
    pub fn save_code_state(&self, state: &CodeState) -> bool {
        let result = serde_json::to_string(state)
            .map_err(StoreError::from)
            .and_then(|json| self.store.set(&self.code_state_key, &json));
        match result {
            Ok(()) => {
                debug!("代码状态已写入存储 ({} 道题)", state.len());
                true
            }
            Err(e) => {
                warn!("⚠️ 写入代码状态失败: {}，仅保留内存状态", e);
                false
            }
        }
    }

    /// 读取最后使用的语言
    pub fn load_last_language(&self) -> Option<Language> {
        match self.store.get(&self.last_language_key) {
            Ok(Some(tag)) => {
                let lang = Language::from_tag(&tag);
                if lang.is_none() {
                    warn!("⚠️ 存储中的语言标签无效: {}", tag);
                }
                lang
            }
            Ok(None) => None,
            Err(e) => {
                warn!("⚠️ 读取最后使用的语言失败: {}", e);
                None
            }
        }
    }

    /// 写入最后使用的语言
    pub fn save_last_language(&self, lang: Language) -> bool {
        self.store
            .set(&self.last_language_key, lang.tag())
            .map_err(|e| warn!("⚠️ 写入最后使用的语言失败: {}", e))
            .is_ok()
    }

    /// 违规标记是否已设置
    ///
    /// 存储不可用时视为未设置
    pub fn cheating_flag(&self) -> bool {
        match self.store.get(&self.cheating_key) {
            Ok(value) => value.as_deref() == Some(CHEATING_FLAG_VALUE),
            Err(e) => {
                warn!("⚠️ 读取违规标记失败: {}", e);
                false
            }
        }
    }

    /// 设置违规标记
    pub fn set_cheating_flag(&self) -> bool {
        self.store
            .set(&self.cheating_key, CHEATING_FLAG_VALUE)
            .map_err(|e| warn!("⚠️ 写入违规标记失败: {}", e))
            .is_ok()
    }

    /// 清除违规标记
    pub fn clear_cheating_flag(&self) -> bool {
        self.store
            .remove(&self.cheating_key)
            .map_err(|e| warn!("⚠️ 清除违规标记失败: {}", e))
            .is_ok()
    }
}
