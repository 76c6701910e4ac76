//! 考试会话 - 编排层
//!
//! 显式的会话上下文，持有全部组件并规定初始化顺序：
//! 打开存储 → 恢复监考状态（已有违规时立即锁定编辑器）→ 等待题目加载
//! → 水合代码缓存 → 显示第一题。
//! `start` 返回即表示初始化完成，下游无需轮询编辑器是否就绪。

use std::future::Future;
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, error, info};

use super::events::{EventDisposition, SessionEvent, SessionSignal};
use crate::clients::{Judge, JudgeOutput};
use crate::config::Config;
use crate::error::{AppError, JudgeError, LoadError, SessionError};
use crate::infrastructure::{CodeEditor, KvStore, StoreAdapter};
use crate::models::{validate_questions, Language, Question};
use crate::presentation::SessionView;
use crate::services::{
    ClipboardAction, CodeStateCache, Countdown, ProctorMonitor, ProctorState, Violation,
};
use crate::workflow::{
    EvaluationController, QuestionSession, RunResolution, RunTicket, SubmitOutcome,
};

/// 信号通道容量
const SIGNAL_CAPACITY: usize = 32;

/// 会话参数
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub storage_prefix: String,
    pub exam_duration_secs: u32,
}

impl SessionOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            storage_prefix: config.storage_prefix.clone(),
            exam_duration_secs: config.exam_duration_secs,
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// 考试会话
pub struct ExamSession<E: CodeEditor> {
    store: StoreAdapter,
    proctor: ProctorMonitor,
    cache: CodeStateCache,
    questions: QuestionSession,
    evaluation: EvaluationController,
    editor: E,
    judge: Arc<dyn Judge>,
    timer: Countdown,
    signals: broadcast::Sender<SessionSignal>,
}

impl<E: CodeEditor> ExamSession<E> {
    /// 初始化会话
    ///
    /// # 参数
    /// - `options`: 会话参数
    /// - `store`: 键值存储
    /// - `editor`: 编辑器
    /// - `judge`: 评测服务
    /// - `load`: 题目加载；加载失败、列表为空或 id 重复都会使初始化失败
    pub async fn start<F>(
        options: SessionOptions,
        store: Arc<dyn KvStore>,
        mut editor: E,
        judge: Arc<dyn Judge>,
        load: F,
    ) -> Result<Self, AppError>
    where
        F: Future<Output = Result<Vec<Question>, LoadError>>,
    {
        let store = StoreAdapter::new(store, &options.storage_prefix);

        // 监考状态必须先于其他初始化恢复
        let proctor = ProctorMonitor::restore(store.clone());
        if proctor.is_locked() {
            editor.set_read_only(true);
        }

        let questions = load
            .await
            .and_then(|questions| validate_questions(&questions).map(|()| questions))
            .map_err(|e| {
                error!("❌ 题目加载失败，会话不可用: {}", e);
                e
            })?;

        let mut cache = CodeStateCache::new(store.clone());
        cache.hydrate(&questions);

        let language = store
            .load_last_language()
            .unwrap_or_else(|| questions[0].language);
        let question_count = questions.len();
        let questions = QuestionSession::new(questions, language, store.clone())?;

        let mut evaluation = EvaluationController::new(question_count);
        evaluation.set_locked(proctor.is_locked());
        evaluation.reset_for(&questions.current_question().id);
        questions.render(&cache, &mut editor);

        let (signals, _) = broadcast::channel(SIGNAL_CAPACITY);
        info!(
            "✓ 会话初始化完成: {} 道题, 语言 {}, 监考状态 {:?}",
            question_count,
            language,
            proctor.state()
        );

        Ok(Self {
            store,
            proctor,
            cache,
            questions,
            evaluation,
            editor,
            judge,
            timer: Countdown::new(options.exam_duration_secs),
            signals,
        })
    }

    /// 订阅会话信号
    pub fn subscribe(&self) -> broadcast::Receiver<SessionSignal> {
        self.signals.subscribe()
    }

    fn emit(&self, signal: SessionSignal) {
        // 没有订阅者时发送失败，忽略即可
        let _ = self.signals.send(signal);
    }

    // ========== 事件 ==========

    /// 处理宿主事件
    pub fn handle_event(&mut self, event: SessionEvent) -> EventDisposition {
        debug!("收到事件: {:?}", event);
        let violation = match event {
            SessionEvent::ContentChanged => {
                self.questions.save_editor(&mut self.cache, &self.editor);
                return EventDisposition::default();
            }
            SessionEvent::EditorPaste => Violation::EditorPaste,
            SessionEvent::FocusLost => Violation::FocusLost,
            SessionEvent::Clipboard { action } => Violation::Clipboard { action },
            SessionEvent::KeyDown { press } => match press.clipboard_action() {
                Some(_) => Violation::Shortcut { combo: press },
                None => return EventDisposition::default(),
            },
        };

        // 焦点丢失无法阻止，其余剪贴板类事件都要求宿主取消默认行为
        let prevent_default = !matches!(violation, Violation::FocusLost);
        let locked_now = self.report_violation(violation);
        EventDisposition {
            prevent_default,
            locked_now,
        }
    }

    /// 上报违规，首次违规时执行锁定
    pub fn report_violation(&mut self, violation: Violation) -> bool {
        let reason = violation.to_string();
        if !self.proctor.report(violation) {
            return false;
        }
        self.apply_lock();
        self.emit(SessionSignal::Locked { reason });
        true
    }

    /// 快捷方法：文档级剪贴板事件
    pub fn clipboard(&mut self, action: ClipboardAction) -> EventDisposition {
        self.handle_event(SessionEvent::Clipboard { action })
    }

    fn apply_lock(&mut self) {
        self.editor.set_read_only(true);
        self.evaluation.set_locked(true);
    }

    /// 管理员清除违规标记
    ///
    /// 恢复编辑与运行；本次会话仍不会触发完成信号
    pub fn admin_clear_violation(&mut self) {
        self.proctor.admin_reset();
        self.editor.set_read_only(false);
        self.evaluation.set_locked(false);
    }

    // ========== 切换 ==========

    /// 切换题目，锁定状态下仍可切换查看
    pub fn switch_question(&mut self, index: usize) -> Result<(), SessionError> {
        self.questions
            .switch_question(index, &mut self.cache, &mut self.editor)?;
        self.evaluation
            .reset_for(&self.questions.current_question().id);
        Ok(())
    }

    /// 切换语言
    pub fn switch_language(&mut self, lang: Language) {
        self.questions
            .switch_language(lang, &mut self.cache, &mut self.editor);
    }

    // ========== 运行与提交 ==========

    /// 开始运行当前题目，返回在途凭据
    pub fn begin_run(&mut self) -> Result<RunTicket, SessionError> {
        if self.proctor.is_locked() {
            return Err(SessionError::Locked);
        }
        self.questions.save_editor(&mut self.cache, &self.editor);
        let language = self.questions.language();
        self.evaluation.begin_run(
            self.questions.current_question(),
            language,
            self.editor.text(),
        )
    }

    /// 应用运行结果，过期结果会被丢弃
    pub fn complete_run(
        &mut self,
        ticket: RunTicket,
        result: Result<JudgeOutput, JudgeError>,
    ) -> RunResolution {
        let question_id = ticket.question_id().to_string();
        let resolution = self.evaluation.complete_run(ticket, result);
        if let RunResolution::Applied { state, .. } = &resolution {
            self.emit(SessionSignal::RunFinished {
                question_id,
                state: *state,
            });
        }
        resolution
    }

    /// 运行当前题目并等待结果
    pub async fn run(&mut self) -> Result<RunResolution, SessionError> {
        let ticket = self.begin_run()?;
        let result = self.judge.evaluate(ticket.request().clone()).await;
        Ok(self.complete_run(ticket, result))
    }

    /// 提交当前题目
    pub fn submit(&mut self) -> Result<SubmitOutcome, SessionError> {
        if self.proctor.is_locked() {
            return Err(SessionError::Locked);
        }
        let question_id = self.questions.current_question().id.clone();
        let outcome = self
            .evaluation
            .submit(&question_id, !self.proctor.ever_locked())?;

        self.emit(SessionSignal::Submitted {
            question_id: question_id.clone(),
        });
        if outcome.completed {
            self.emit(SessionSignal::Completed {
                submitted: self.evaluation.ledger().len(),
                finished_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            });
        }
        Ok(outcome)
    }

    // ========== 计时与视图 ==========

    /// 倒计时走一秒
    pub fn tick(&mut self) -> u32 {
        let before = self.timer.remaining();
        let remaining = self.timer.tick();
        if before > 0 && remaining == 0 {
            info!("⏰ 考试时间到");
        }
        remaining
    }

    pub fn timer(&self) -> &Countdown {
        &self.timer
    }

    /// 当前视图快照
    pub fn view(&self) -> SessionView {
        SessionView::project(
            &self.questions,
            &self.evaluation,
            &self.proctor,
            self.timer.remaining(),
        )
    }

    // ========== 访问器 ==========

    pub fn proctor_state(&self) -> ProctorState {
        self.proctor.state()
    }

    pub fn proctor(&self) -> &ProctorMonitor {
        &self.proctor
    }

    pub fn cache(&self) -> &CodeStateCache {
        &self.cache
    }

    pub fn questions(&self) -> &QuestionSession {
        &self.questions
    }

    pub fn evaluation(&self) -> &EvaluationController {
        &self.evaluation
    }

    pub fn editor(&self) -> &E {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut E {
        &mut self.editor
    }

    pub fn judge(&self) -> Arc<dyn Judge> {
        self.judge.clone()
    }

    pub fn store(&self) -> &StoreAdapter {
        &self.store
    }
}
