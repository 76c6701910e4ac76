//! 评测流程 - 流程层
//!
//! 流程顺序：
//! 1. 运行：保存代码 → RUN_PENDING → 评测服务 → 比对输出
//! 2. 比对一致 → MATCHED，开放提交；不一致 → MISMATCHED；评测失败 → RUN_FAILED
//! 3. 提交：MATCHED → SUBMITTED，记入提交台账
//! 4. 台账覆盖全部题目且本次会话从未锁定 → 触发一次完成信号
//!
//! 评测是唯一的异步步骤，且不可取消。每次运行拿到一个带纪元号的 `RunTicket`，
//! 切题或重新运行都会推进纪元，过期的结果到达时直接丢弃。

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::clients::{JudgeOutput, JudgeRequest};
use crate::error::{JudgeError, SessionError};
use crate::models::{Language, Question};

/// 输出区占位文本
pub const OUTPUT_PLACEHOLDER: &str = "// Output will appear here";
/// 运行中的输出区文本
pub const OUTPUT_RUNNING: &str = "// Running...";

/// 单道题的评测状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationState {
    Unevaluated,
    RunPending,
    Matched,
    Mismatched,
    RunFailed,
    Submitted,
}

/// 提示消息类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    None,
    Success,
    Error,
}

/// 提示消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub text: String,
    pub kind: MessageKind,
}

impl StatusMessage {
    pub fn none() -> Self {
        Self {
            text: String::new(),
            kind: MessageKind::None,
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: MessageKind::Success,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: MessageKind::Error,
        }
    }
}

/// 一次在途运行的凭据
#[derive(Debug, Clone)]
pub struct RunTicket {
    epoch: u64,
    question_id: String,
    expected_output: String,
    request: JudgeRequest,
}

impl RunTicket {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn question_id(&self) -> &str {
        &self.question_id
    }

    /// 发给评测服务的请求
    pub fn request(&self) -> &JudgeRequest {
        &self.request
    }
}

/// 运行结果的处理方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunResolution {
    /// 结果已应用到当前题目
    Applied {
        state: EvaluationState,
        observed: String,
    },
    /// 会话已离开该次运行（切题或重新运行），结果被丢弃
    Discarded,
}

/// 提交结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub question_id: String,
    /// 本次提交是否触发了完成信号
    pub completed: bool,
}

/// 提交台账：已成功提交的题目 ID
///
/// 只存在于内存中，刷新后丢失
#[derive(Debug, Clone, Default)]
pub struct SubmissionLedger {
    submitted: HashSet<String>,
}

impl SubmissionLedger {
    pub fn record(&mut self, question_id: &str) -> bool {
        self.submitted.insert(question_id.to_string())
    }

    pub fn contains(&self, question_id: &str) -> bool {
        self.submitted.contains(question_id)
    }

    pub fn len(&self) -> usize {
        self.submitted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.submitted.is_empty()
    }
}

/// 评测控制器
pub struct EvaluationController {
    states: HashMap<String, EvaluationState>,
    ledger: SubmissionLedger,
    question_count: usize,
    epoch: u64,
    locked: bool,
    completion_fired: bool,
    output: String,
    message: StatusMessage,
}

impl EvaluationController {
    pub fn new(question_count: usize) -> Self {
        Self {
            states: HashMap::new(),
            ledger: SubmissionLedger::default(),
            question_count,
            epoch: 0,
            locked: false,
            completion_fired: false,
            output: OUTPUT_PLACEHOLDER.to_string(),
            message: StatusMessage::none(),
        }
    }

    /// 切换到某道题时重置显示状态
    ///
    /// 在途运行全部作废，等待中的题目回到 UNEVALUATED；
    /// 目标题目未提交时同样回到 UNEVALUATED，需要重新运行才能提交
    pub fn reset_for(&mut self, question_id: &str) {
        self.epoch += 1;
        self.output = OUTPUT_PLACEHOLDER.to_string();
        self.message = StatusMessage::none();
        for state in self.states.values_mut() {
            if *state == EvaluationState::RunPending {
                *state = EvaluationState::Unevaluated;
            }
        }
        let state = self
            .states
            .entry(question_id.to_string())
            .or_insert(EvaluationState::Unevaluated);
        if *state != EvaluationState::Submitted {
            *state = EvaluationState::Unevaluated;
        }
    }

    /// 开始一次运行
    ///
    /// 锁定时拒绝。已提交的题目仍可运行查看输出，但状态保持 SUBMITTED。
    pub fn begin_run(
        &mut self,
        question: &Question,
        language: Language,
        source_code: String,
    ) -> Result<RunTicket, SessionError> {
        if self.locked {
            return Err(SessionError::Locked);
        }

        self.epoch += 1;
        let state = self
            .states
            .entry(question.id.clone())
            .or_insert(EvaluationState::Unevaluated);
        if *state != EvaluationState::Submitted {
            *state = EvaluationState::RunPending;
        }
        self.output = OUTPUT_RUNNING.to_string();
        self.message = StatusMessage::none();

        info!("▶️ 运行题目 {} ({}) #{}", question.id, language, self.epoch);
        Ok(RunTicket {
            epoch: self.epoch,
            question_id: question.id.clone(),
            expected_output: question.expected_output.clone(),
            request: JudgeRequest {
                source_code,
                language,
                stdin: question.input.clone(),
            },
        })
    }

    /// 处理评测结果
    pub fn complete_run(
        &mut self,
        ticket: RunTicket,
        result: Result<JudgeOutput, JudgeError>,
    ) -> RunResolution {
        if ticket.epoch != self.epoch {
            debug!(
                "丢弃过期的运行结果: 题目 {} #{} (当前 #{})",
                ticket.question_id, ticket.epoch, self.epoch
            );
            return RunResolution::Discarded;
        }

        let (next, observed, message) = match result {
            Ok(output) => {
                let observed = output.observed();
                if observed == ticket.expected_output.trim() {
                    (
                        EvaluationState::Matched,
                        observed,
                        StatusMessage::success("✅ 输出与预期一致！"),
                    )
                } else {
                    (
                        EvaluationState::Mismatched,
                        observed,
                        StatusMessage::error("❌ 输出与预期不一致。"),
                    )
                }
            }
            Err(e) => {
                warn!("⚠️ 评测失败: {}", e);
                let text = e.to_string();
                let message = StatusMessage::error(format!("⚠️ 评测服务错误: {}", text));
                (EvaluationState::RunFailed, text, message)
            }
        };

        let state = self
            .states
            .entry(ticket.question_id.clone())
            .or_insert(EvaluationState::Unevaluated);
        if *state != EvaluationState::Submitted {
            *state = next;
        }
        let state = *state;

        info!("题目 {} 运行结束: {:?}", ticket.question_id, next);
        self.output = observed.clone();
        self.message = message;
        RunResolution::Applied { state, observed }
    }

    /// 提交当前题目
    ///
    /// # 参数
    /// - `question_id`: 当前题目
    /// - `clean_session`: 本次会话是否从未锁定过
    pub fn submit(
        &mut self,
        question_id: &str,
        clean_session: bool,
    ) -> Result<SubmitOutcome, SessionError> {
        if self.locked {
            return Err(SessionError::Locked);
        }
        let state = self
            .states
            .get_mut(question_id)
            .filter(|s| **s == EvaluationState::Matched)
            .ok_or(SessionError::SubmitNotEnabled)?;
        *state = EvaluationState::Submitted;
        self.ledger.record(question_id);
        self.message = StatusMessage::success("🎉 代码已提交！");
        info!(
            "📤 题目 {} 已提交 ({}/{})",
            question_id,
            self.ledger.len(),
            self.question_count
        );

        let completed = !self.completion_fired
            && clean_session
            && self.ledger.len() == self.question_count;
        if completed {
            self.completion_fired = true;
            info!("🎉 全部题目提交完成");
        }

        Ok(SubmitOutcome {
            question_id: question_id.to_string(),
            completed,
        })
    }

    /// 锁定或解除锁定运行与提交
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn state(&self, question_id: &str) -> EvaluationState {
        self.states
            .get(question_id)
            .copied()
            .unwrap_or(EvaluationState::Unevaluated)
    }

    pub fn run_enabled(&self) -> bool {
        !self.locked
    }

    pub fn submit_enabled(&self, question_id: &str) -> bool {
        !self.locked && self.state(question_id) == EvaluationState::Matched
    }

    pub fn ledger(&self) -> &SubmissionLedger {
        &self.ledger
    }

    pub fn completion_fired(&self) -> bool {
        self.completion_fired
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn message(&self) -> &StatusMessage {
        &self.message
    }
}
