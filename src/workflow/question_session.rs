//! 题目会话 - 流程层
//!
//! 持有有序题目列表和当前游标（题目索引 + 语言），
//! 决定编辑器里显示哪道题的哪种语言。
//! 任何切换之前都先把编辑器里的文本存回缓存，切换永远不会丢失编辑。

use tracing::{debug, info, warn};

use crate::error::{LoadError, SessionError};
use crate::infrastructure::{CodeEditor, StoreAdapter};
use crate::models::{Language, Question};
use crate::services::CodeStateCache;

/// 题目会话
pub struct QuestionSession {
    questions: Vec<Question>,
    current: usize,
    language: Language,
    store: StoreAdapter,
}

impl QuestionSession {
    /// 创建题目会话，游标指向第一题
    pub fn new(
        questions: Vec<Question>,
        language: Language,
        store: StoreAdapter,
    ) -> Result<Self, LoadError> {
        if questions.is_empty() {
            return Err(LoadError::Empty);
        }
        Ok(Self {
            questions,
            current: 0,
            language,
            store,
        })
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// 把当前题目/语言的代码载入编辑器
    pub fn render(&self, cache: &CodeStateCache, editor: &mut dyn CodeEditor) {
        let q = self.current_question();
        editor.set_text(&cache.get(&q.id, self.language));
        editor.set_language_mode(self.language);
        debug!("显示题目 {} ({})，语言 {}", self.current + 1, q.id, self.language);
    }

    /// 把编辑器文本存到当前 题目/语言 下
    pub fn save_editor(&self, cache: &mut CodeStateCache, editor: &dyn CodeEditor) -> bool {
        let q = self.current_question();
        cache.set(&q.id, self.language, &editor.text())
    }

    /// 切换题目
    ///
    /// 先保存当前编辑，再移动游标并载入目标题目在当前语言下的代码
    pub fn switch_question(
        &mut self,
        index: usize,
        cache: &mut CodeStateCache,
        editor: &mut dyn CodeEditor,
    ) -> Result<(), SessionError> {
        if index >= self.questions.len() {
            warn!("⚠️ 切换到不存在的题目: {}", index);
            return Err(SessionError::QuestionOutOfRange {
                index,
                count: self.questions.len(),
            });
        }

        self.save_editor(cache, editor);
        self.current = index;
        self.render(cache, editor);
        self.store.save_last_language(self.language);
        info!("📄 切换到第 {} 题: {}", index + 1, self.current_question().title);
        Ok(())
    }

    /// 切换语言
    ///
    /// 先把文本存到旧语言下，再载入新语言的代码并切换编辑器模式
    pub fn switch_language(
        &mut self,
        lang: Language,
        cache: &mut CodeStateCache,
        editor: &mut dyn CodeEditor,
    ) {
        self.save_editor(cache, editor);
        let previous = self.language;
        self.language = lang;
        self.render(cache, editor);
        self.store.save_last_language(lang);
        info!("🔤 语言切换: {} → {}", previous, lang);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{BufferEditor, MemoryStore};
    use crate::models::BuggyCode;
    use std::sync::Arc;

    fn question(id: &str) -> Question {
        Question {
            id: id.to_string(),
            title: id.to_uppercase(),
            input: String::new(),
            expected_output: "ok".to_string(),
            language: Language::Python,
            buggy_code: BuggyCode::Single(format!("# {}", id)),
        }
    }

    fn setup() -> (QuestionSession, CodeStateCache, BufferEditor, StoreAdapter) {
        let store = StoreAdapter::new(Arc::new(MemoryStore::new()), "test");
        let questions = vec![question("a"), question("b")];
        let mut cache = CodeStateCache::new(store.clone());
        cache.hydrate(&questions);
        let session = QuestionSession::new(questions, Language::Python, store.clone()).unwrap();
        let mut editor = BufferEditor::new();
        session.render(&cache, &mut editor);
        (session, cache, editor, store)
    }

    #[test]
    fn test_new_rejects_empty_list() {
        let store = StoreAdapter::new(Arc::new(MemoryStore::new()), "test");
        assert!(matches!(
            QuestionSession::new(Vec::new(), Language::C, store),
            Err(LoadError::Empty)
        ));
    }

    #[test]
    fn test_switch_question_keeps_unsaved_edit() {
        let (mut session, mut cache, mut editor, _) = setup();
        assert_eq!(editor.text(), "# a");
        editor.user_replace("# a edited");

        session.switch_question(1, &mut cache, &mut editor).unwrap();
        assert_eq!(editor.text(), "# b");
        assert_eq!(cache.get("a", Language::Python), "# a edited");

        session.switch_question(0, &mut cache, &mut editor).unwrap();
        assert_eq!(editor.text(), "# a edited");
    }

    #[test]
    fn test_switch_language_saves_under_old_language() {
        let (mut session, mut cache, mut editor, store) = setup();
        editor.user_replace("print('py')");

        session.switch_language(Language::Java, &mut cache, &mut editor);
        assert_eq!(editor.text(), Language::Java.default_template());
        assert_eq!(editor.language_mode(), Some(Language::Java));
        assert_eq!(cache.get("a", Language::Python), "print('py')");
        assert_eq!(store.load_last_language(), Some(Language::Java));

        session.switch_language(Language::Python, &mut cache, &mut editor);
        assert_eq!(editor.text(), "print('py')");
    }

    #[test]
    fn test_out_of_range_switch_changes_nothing() {
        let (mut session, mut cache, mut editor, _) = setup();
        let err = session.switch_question(7, &mut cache, &mut editor).unwrap_err();
        assert_eq!(err, SessionError::QuestionOutOfRange { index: 7, count: 2 });
        assert_eq!(session.current_index(), 0);
        assert_eq!(editor.text(), "# a");
    }
}
