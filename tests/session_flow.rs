use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use futures::future::{self, BoxFuture, FutureExt};

use proctored_exam::clients::{Judge, JudgeOutput, JudgeRequest};
use proctored_exam::error::{AppError, JudgeError, LoadError, SessionError};
use proctored_exam::infrastructure::{BufferEditor, CodeEditor, KvStore, MemoryStore};
use proctored_exam::models::{BuggyCode, Language, Question};
use proctored_exam::orchestrator::{ExamSession, SessionEvent, SessionOptions, SessionSignal};
use proctored_exam::services::{ClipboardAction, KeyPress, ProctorState};
use proctored_exam::workflow::{EvaluationState, RunResolution, OUTPUT_PLACEHOLDER};

/// 按顺序返回预设结果的评测服务，并记录收到的请求
#[derive(Default)]
struct ScriptedJudge {
    replies: Mutex<VecDeque<Result<JudgeOutput, JudgeError>>>,
    requests: Mutex<Vec<JudgeRequest>>,
}

impl ScriptedJudge {
    fn replying(replies: Vec<Result<JudgeOutput, JudgeError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<JudgeRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Judge for ScriptedJudge {
    fn evaluate(&self, request: JudgeRequest) -> BoxFuture<'_, Result<JudgeOutput, JudgeError>> {
        self.requests.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(JudgeError::Other("没有预设结果".to_string())));
        async move { reply }.boxed()
    }
}

fn question(id: &str) -> Question {
    Question {
        id: id.to_string(),
        title: format!("平方 {}", id),
        input: "5\n".to_string(),
        expected_output: "25".to_string(),
        language: Language::Python,
        buggy_code: BuggyCode::Single("n = int(input())\nprint(n * 2)".to_string()),
    }
}

fn three_questions() -> Vec<Question> {
    vec![question("q1"), question("q2"), question("q3")]
}

fn loaded() -> future::Ready<Result<Vec<Question>, LoadError>> {
    future::ready(Ok(three_questions()))
}

async fn start(
    store: Arc<MemoryStore>,
    judge: Arc<ScriptedJudge>,
) -> ExamSession<BufferEditor> {
    ExamSession::start(
        SessionOptions::default(),
        store,
        BufferEditor::new(),
        judge,
        loaded(),
    )
    .await
    .expect("会话初始化失败")
}

fn matched() -> Result<JudgeOutput, JudgeError> {
    Ok(JudgeOutput::from_stdout("25\n"))
}

#[tokio::test]
async fn test_start_renders_first_question_with_seed_code() {
    let session = start(Arc::new(MemoryStore::new()), ScriptedJudge::replying(vec![])).await;

    assert_eq!(session.questions().current_index(), 0);
    assert_eq!(session.questions().language(), Language::Python);
    assert_eq!(session.editor().text(), "n = int(input())\nprint(n * 2)");
    assert_eq!(session.editor().language_mode(), Some(Language::Python));
    assert!(!session.editor().is_read_only());
    assert_eq!(session.proctor_state(), ProctorState::Clean);
    assert_eq!(session.evaluation().output(), OUTPUT_PLACEHOLDER);

    // 其他语言使用默认模板
    assert_eq!(
        session.cache().get("q2", Language::C),
        Language::C.default_template()
    );
}

#[tokio::test]
async fn test_load_failure_is_fatal() {
    let result = ExamSession::start(
        SessionOptions::default(),
        Arc::new(MemoryStore::new()),
        BufferEditor::new(),
        ScriptedJudge::replying(vec![]),
        future::ready(Err::<Vec<Question>, _>(LoadError::Empty)),
    )
    .await;

    assert!(matches!(result, Err(AppError::Load(LoadError::Empty))));
}

#[tokio::test]
async fn test_empty_question_list_fails_start_even_with_stored_language() {
    let store = Arc::new(MemoryStore::new());
    store.set("automatafix_lastLanguage", "java").unwrap();

    let result = ExamSession::start(
        SessionOptions::default(),
        store,
        BufferEditor::new(),
        ScriptedJudge::replying(vec![]),
        future::ready(Ok::<_, LoadError>(Vec::new())),
    )
    .await;

    assert!(matches!(result, Err(AppError::Load(LoadError::Empty))));
}

#[tokio::test]
async fn test_duplicate_question_ids_fail_start() {
    let result = ExamSession::start(
        SessionOptions::default(),
        Arc::new(MemoryStore::new()),
        BufferEditor::new(),
        ScriptedJudge::replying(vec![]),
        future::ready(Ok::<_, LoadError>(vec![question("q1"), question("q1")])),
    )
    .await;

    assert!(matches!(
        result,
        Err(AppError::Load(LoadError::DuplicateId { ref id })) if id == "q1"
    ));
}

#[tokio::test]
async fn test_match_then_submit_all_fires_completion_once() {
    let judge = ScriptedJudge::replying(vec![
        Ok(JudgeOutput::from_stdout("24\n")),
        matched(),
        matched(),
        matched(),
    ]);
    let mut session = start(Arc::new(MemoryStore::new()), judge.clone()).await;
    let mut signals = session.subscribe();

    // 错误输出不能提交
    let resolution = session.run().await.unwrap();
    assert_eq!(
        resolution,
        RunResolution::Applied {
            state: EvaluationState::Mismatched,
            observed: "24".to_string(),
        }
    );
    assert_eq!(session.submit(), Err(SessionError::SubmitNotEnabled));

    // 修复后重新运行
    assert!(session.editor_mut().user_replace("print(int(input()) ** 2)"));
    session.handle_event(SessionEvent::ContentChanged);
    session.run().await.unwrap();
    assert!(session.view().submit_enabled);
    assert!(!session.submit().unwrap().completed);

    for idx in 1..3 {
        session.switch_question(idx).unwrap();
        session.run().await.unwrap();
        let outcome = session.submit().unwrap();
        assert_eq!(outcome.completed, idx == 2);
    }

    let requests = judge.requests();
    assert_eq!(requests.len(), 4);
    assert_eq!(requests[1].source_code, "print(int(input()) ** 2)");
    assert_eq!(requests[1].stdin, "5\n");
    assert_eq!(requests[1].language, Language::Python);

    let mut completed = 0;
    let mut submitted = 0;
    while let Ok(signal) = signals.try_recv() {
        match signal {
            SessionSignal::Completed { submitted: n, .. } => {
                assert_eq!(n, 3);
                completed += 1;
            }
            SessionSignal::Submitted { .. } => submitted += 1,
            _ => {}
        }
    }
    assert_eq!(submitted, 3);
    assert_eq!(completed, 1);
    assert!(session.evaluation().completion_fired());
}

#[tokio::test]
async fn test_focus_lost_locks_and_persists_across_reload() {
    let store = Arc::new(MemoryStore::new());
    let mut session = start(store.clone(), ScriptedJudge::replying(vec![])).await;
    let mut signals = session.subscribe();

    let disposition = session.handle_event(SessionEvent::FocusLost);
    assert!(disposition.locked_now);
    assert!(!disposition.prevent_default);
    assert_eq!(session.proctor_state(), ProctorState::Locked);
    assert!(session.editor().is_read_only());
    assert!(!session.editor_mut().user_replace("print(25)"));
    assert_eq!(session.begin_run().unwrap_err(), SessionError::Locked);
    assert_eq!(session.submit(), Err(SessionError::Locked));
    assert!(matches!(
        signals.try_recv(),
        Ok(SessionSignal::Locked { .. })
    ));

    // 第二次违规不再重复锁定
    assert!(!session.handle_event(SessionEvent::FocusLost).locked_now);
    assert_eq!(store.get("automatafix_cheating").unwrap().as_deref(), Some("1"));

    // 重新加载后立即锁定
    let reloaded = start(store, ScriptedJudge::replying(vec![])).await;
    assert_eq!(reloaded.proctor_state(), ProctorState::Locked);
    assert!(reloaded.editor().is_read_only());
    let view = reloaded.view();
    assert!(view.alert_visible);
    assert!(!view.run_enabled);
    assert!(!view.submit_enabled);
}

#[tokio::test]
async fn test_switching_is_allowed_while_locked() {
    let mut session = start(Arc::new(MemoryStore::new()), ScriptedJudge::replying(vec![])).await;
    session.handle_event(SessionEvent::EditorPaste);

    session.switch_question(2).unwrap();
    assert_eq!(session.questions().current_question().id, "q3");
    session.switch_language(Language::Java);
    assert_eq!(session.editor().text(), Language::Java.default_template());
    assert!(session.editor().is_read_only());
}

#[tokio::test]
async fn test_clipboard_events_are_blocked() {
    let mut session = start(Arc::new(MemoryStore::new()), ScriptedJudge::replying(vec![])).await;

    // 普通按键不算违规
    let plain = session.handle_event(SessionEvent::KeyDown {
        press: KeyPress::parse("a").unwrap(),
    });
    assert!(!plain.prevent_default);
    assert_eq!(session.proctor_state(), ProctorState::Clean);

    let first = session.handle_event(SessionEvent::KeyDown {
        press: KeyPress::parse("ctrl+v").unwrap(),
    });
    assert!(first.prevent_default);
    assert!(first.locked_now);

    let second = session.clipboard(ClipboardAction::Copy);
    assert!(second.prevent_default);
    assert!(!second.locked_now);
}

#[tokio::test]
async fn test_admin_clear_restores_editing_without_completion() {
    let mut session = start(
        Arc::new(MemoryStore::new()),
        ScriptedJudge::replying(vec![matched(), matched(), matched()]),
    )
    .await;
    session.handle_event(SessionEvent::FocusLost);
    session.admin_clear_violation();

    assert_eq!(session.proctor_state(), ProctorState::Clean);
    assert!(!session.editor().is_read_only());

    for idx in 0..3 {
        session.switch_question(idx).unwrap();
        session.run().await.unwrap();
        assert!(!session.submit().unwrap().completed);
    }
    assert_eq!(session.evaluation().ledger().len(), 3);
    assert!(!session.evaluation().completion_fired());
}

#[tokio::test]
async fn test_edits_survive_switches_and_reload() {
    let store = Arc::new(MemoryStore::new());
    let mut session = start(store.clone(), ScriptedJudge::replying(vec![])).await;

    session.editor_mut().user_replace("print(25)");
    session.handle_event(SessionEvent::ContentChanged);
    session.switch_language(Language::Cpp);
    session.editor_mut().user_replace("int main() { return 0; }");
    session.handle_event(SessionEvent::ContentChanged);
    session.switch_question(1).unwrap();
    session.switch_question(0).unwrap();

    assert_eq!(session.editor().text(), "int main() { return 0; }");
    session.switch_language(Language::Python);
    assert_eq!(session.editor().text(), "print(25)");

    // 重新加载：上次语言与代码都恢复，水合不覆盖已有内容
    let before = store.get("automatafix_codeStates").unwrap();
    let reloaded = start(store.clone(), ScriptedJudge::replying(vec![])).await;
    assert_eq!(reloaded.questions().language(), Language::Python);
    assert_eq!(reloaded.editor().text(), "print(25)");
    assert_eq!(reloaded.cache().get("q1", Language::Cpp), "int main() { return 0; }");
    assert_eq!(store.get("automatafix_codeStates").unwrap(), before);
}

#[tokio::test]
async fn test_stale_run_is_discarded_after_switch() {
    let mut session = start(Arc::new(MemoryStore::new()), ScriptedJudge::replying(vec![])).await;
    let mut signals = session.subscribe();

    let ticket = session.begin_run().unwrap();
    assert_eq!(ticket.question_id(), "q1");
    session.switch_question(1).unwrap();

    assert_eq!(session.complete_run(ticket, matched()), RunResolution::Discarded);
    assert_eq!(session.evaluation().state("q1"), EvaluationState::Unevaluated);
    assert_eq!(session.evaluation().output(), OUTPUT_PLACEHOLDER);
    assert!(signals.try_recv().is_err());
}

#[tokio::test]
async fn test_only_latest_run_applies() {
    let mut session = start(Arc::new(MemoryStore::new()), ScriptedJudge::replying(vec![])).await;

    let first = session.begin_run().unwrap();
    let second = session.begin_run().unwrap();
    assert_eq!(
        session.complete_run(first, Ok(JudgeOutput::from_stdout("24"))),
        RunResolution::Discarded
    );
    assert!(matches!(
        session.complete_run(second, matched()),
        RunResolution::Applied {
            state: EvaluationState::Matched,
            ..
        }
    ));
}

#[tokio::test]
async fn test_judge_failure_shows_error() {
    let mut session = start(
        Arc::new(MemoryStore::new()),
        ScriptedJudge::replying(vec![Err(JudgeError::BadStatus { status: 429 })]),
    )
    .await;

    let resolution = session.run().await.unwrap();
    assert!(matches!(
        resolution,
        RunResolution::Applied {
            state: EvaluationState::RunFailed,
            ..
        }
    ));
    let view = session.view();
    assert_eq!(view.output, "HTTP error! status: 429");
    assert!(view.message.text.contains("429"));
    assert!(!view.submit_enabled);
    assert!(view.run_enabled);
}

#[tokio::test]
async fn test_timer_counts_down_and_floors_at_zero() {
    let mut session = ExamSession::start(
        SessionOptions {
            exam_duration_secs: 2,
            ..SessionOptions::default()
        },
        Arc::new(MemoryStore::new()),
        BufferEditor::new(),
        ScriptedJudge::replying(vec![]),
        loaded(),
    )
    .await
    .unwrap();

    assert_eq!(session.view().timer, "00:02");
    assert_eq!(session.tick(), 1);
    assert_eq!(session.tick(), 0);
    assert_eq!(session.tick(), 0);
    assert!(session.timer().is_expired());
    assert_eq!(session.view().timer, "00:00");
}

#[tokio::test]
async fn test_view_marks_submitted_questions() {
    let mut session = start(
        Arc::new(MemoryStore::new()),
        ScriptedJudge::replying(vec![matched()]),
    )
    .await;
    session.run().await.unwrap();
    session.submit().unwrap();
    session.switch_question(1).unwrap();

    let view = session.view();
    assert_eq!(view.question_id, "q2");
    let marks: Vec<(bool, bool)> = view
        .switcher
        .iter()
        .map(|e| (e.active, e.submitted))
        .collect();
    assert_eq!(marks, vec![(false, true), (true, false), (false, false)]);
    assert!(view.render_text().contains("[Q2]"));

    // 已提交的题目回来后仍保持提交状态
    session.switch_question(0).unwrap();
    assert_eq!(session.evaluation().state("q1"), EvaluationState::Submitted);
    assert!(!session.view().submit_enabled);
}

#[tokio::test]
async fn test_out_of_range_switch_is_rejected() {
    let mut session = start(Arc::new(MemoryStore::new()), ScriptedJudge::replying(vec![])).await;
    assert_eq!(
        session.switch_question(3),
        Err(SessionError::QuestionOutOfRange { index: 3, count: 3 })
    );
    assert_eq!(session.questions().current_index(), 0);
}
