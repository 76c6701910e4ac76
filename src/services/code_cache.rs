//! 代码状态缓存 - 业务能力层
//!
//! 内存中的 题目 → 语言 → 代码 映射。启动时从存储水合并补齐默认模板，
//! 之后每次修改都整体写回存储。写回失败只记录日志，内存状态保持正确。

use std::collections::HashMap;

use tracing::{debug, info};

use crate::infrastructure::StoreAdapter;
use crate::models::{CodeState, Language, LanguageTable, Question};

/// 代码状态缓存
pub struct CodeStateCache {
    state: CodeState,
    store: StoreAdapter,
    /// 上次写回失败，内存状态领先于存储
    dirty: bool,
}

impl CodeStateCache {
    /// 创建空缓存，需要调用 `hydrate` 才会读取存储
    pub fn new(store: StoreAdapter) -> Self {
        Self {
            state: CodeState::new(),
            store,
            dirty: false,
        }
    }

    /// 从存储水合并为每道题的每种语言补齐代码
    ///
    /// 已有内容（内存或存储中）一律保留，只为缺失的条目写入起始代码。
    /// 重复调用结果不变。
    pub fn hydrate(&mut self, questions: &[Question]) {
        let mut merged = self.store.load_code_state();

        // 内存中的编辑优先于存储
        for (id, table) in &self.state {
            let slot = merged.entry(id.clone()).or_default();
            for lang in Language::ALL {
                *slot.get_mut(lang) = Some(table.get(lang).clone());
            }
        }

        let by_id: HashMap<&str, &Question> =
            questions.iter().map(|q| (q.id.as_str(), q)).collect();
        let mut seeded = 0usize;

        let mut state: CodeState = merged
            .into_iter()
            .map(|(id, stored)| {
                let question = by_id.get(id.as_str()).copied();
                let table = LanguageTable::from_fn(|lang| match stored.get(lang) {
                    Some(code) => code.clone(),
                    None => {
                        seeded += 1;
                        seed(question, lang)
                    }
                });
                (id, table)
            })
            .collect();

        for q in questions {
            state.entry(q.id.clone()).or_insert_with(|| {
                seeded += Language::ALL.len();
                LanguageTable::from_fn(|lang| q.seed_code(lang).to_string())
            });
        }

        self.state = state;
        info!(
            "✓ 代码状态水合完成: {} 道题, 补齐 {} 个条目",
            self.state.len(),
            seeded
        );
        self.flush();
    }

    /// 读取代码，条目不存在时返回语言默认模板
    pub fn get(&self, question_id: &str, lang: Language) -> String {
        self.state
            .get(question_id)
            .map(|table| table.get(lang).clone())
            .unwrap_or_else(|| lang.default_template().to_string())
    }

    /// 覆盖代码并写回存储，返回写回是否成功
    pub fn set(&mut self, question_id: &str, lang: Language, text: &str) -> bool {
        let table = self
            .state
            .entry(question_id.to_string())
            .or_insert_with(|| LanguageTable::from_fn(|l| l.default_template().to_string()));
        let slot = table.get_mut(lang);
        if slot.as_str() == text && !self.dirty {
            debug!("代码未变化，跳过写回: {} / {}", question_id, lang);
            return true;
        }
        *slot = text.to_string();
        self.flush()
    }

    /// 整体写回存储
    ///
    /// 失败时标记为脏，下一次 `set` 即使内容未变也会重试写回
    pub fn flush(&mut self) -> bool {
        let saved = self.store.save_code_state(&self.state);
        self.dirty = !saved;
        saved
    }

    /// 内存状态是否尚未写入存储
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// 当前完整状态
    pub fn snapshot(&self) -> &CodeState {
        &self.state
    }
}

fn seed(question: Option<&Question>, lang: Language) -> String {
    match question {
        Some(q) => q.seed_code(lang).to_string(),
        None => lang.default_template().to_string(),
    }
}
