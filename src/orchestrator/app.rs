//! 无界面驱动
//!
//! 把配置、文件存储、Judge0 客户端和内存编辑器组装成会话，
//! 从标准输入读取命令。倒计时每秒走一次，评测请求在后台并发完成，
//! 结果回到会话时由会话判断是否已过期。

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;
use tokio::time::{Instant, Interval};
use tracing::{error, info, warn};

use super::events::{SessionEvent, SessionSignal};
use super::exam_session::{ExamSession, SessionOptions};
use crate::clients::{Judge0Client, JudgeOutput};
use crate::config::Config;
use crate::error::JudgeError;
use crate::infrastructure::{BufferEditor, JsonFileStore};
use crate::models::{load_questions, Language};
use crate::services::{ClipboardAction, KeyPress};
use crate::utils::logging;
use crate::workflow::{RunResolution, RunTicket};

const HELP: &str = "\
命令:
  q N          切换到第 N 题
  lang TAG     切换语言 (python / c / cpp / java / javascript)
  load PATH    用文件内容替换编辑器文本
  show         显示当前状态
  run          运行当前代码
  submit       提交当前题目
  time         显示剩余时间
  blur         模拟页面失去焦点
  copy|cut|paste  模拟剪贴板事件
  key COMBO    模拟编辑器按键，如 ctrl+v
  help         显示本帮助
  quit         退出";

/// 驱动命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 题号（从 1 开始）
    Question(usize),
    Lang(Language),
    Load(PathBuf),
    Show,
    Run,
    Submit,
    Time,
    Blur,
    Clipboard(ClipboardAction),
    Key(KeyPress),
    Help,
    Quit,
}

impl Command {
    /// 解析一行输入
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (line, ""),
        };

        let need_arg = |what: &str| -> Result<&str, String> {
            if arg.is_empty() {
                Err(format!("{} 需要参数", what))
            } else {
                Ok(arg)
            }
        };

        match name.to_ascii_lowercase().as_str() {
            "q" => {
                let n: usize = need_arg("q")?
                    .parse()
                    .map_err(|_| format!("无效的题号: {}", arg))?;
                if n == 0 {
                    return Err("题号从 1 开始".to_string());
                }
                Ok(Command::Question(n))
            }
            "lang" => need_arg("lang")?
                .parse::<Language>()
                .map(Command::Lang)
                .map_err(|e| e.to_string()),
            "load" => Ok(Command::Load(PathBuf::from(need_arg("load")?))),
            "show" => Ok(Command::Show),
            "run" => Ok(Command::Run),
            "submit" => Ok(Command::Submit),
            "time" => Ok(Command::Time),
            "blur" => Ok(Command::Blur),
            "copy" => Ok(Command::Clipboard(ClipboardAction::Copy)),
            "cut" => Ok(Command::Clipboard(ClipboardAction::Cut)),
            "paste" => Ok(Command::Clipboard(ClipboardAction::Paste)),
            "key" => KeyPress::parse(need_arg("key")?)
                .map(Command::Key)
                .ok_or_else(|| format!("无效的组合键: {}", arg)),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            "" => Err(String::new()),
            other => Err(format!("未知命令: {}", other)),
        }
    }
}

type RunResult = (RunTicket, Result<JudgeOutput, JudgeError>);

/// 倒计时节拍：第一拍在一秒后才到
fn countdown_ticker() -> Interval {
    let period = Duration::from_secs(1);
    tokio::time::interval_at(Instant::now() + period, period)
}

/// 应用主结构
pub struct App {
    config: Config,
    session: ExamSession<BufferEditor>,
    runs: JoinSet<RunResult>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        logging::log_startup(&config);

        let store = Arc::new(JsonFileStore::open(&config.store_path));
        let judge = Arc::new(Judge0Client::new(&config).context("无法创建评测客户端")?);

        let session = ExamSession::start(
            SessionOptions::from_config(&config),
            store,
            BufferEditor::new(),
            judge,
            load_questions(&config.questions_source),
        )
        .await
        .context("会话初始化失败")?;

        logging::log_questions_loaded(session.questions().len(), &config.questions_source);

        Ok(Self {
            config,
            session,
            runs: JoinSet::new(),
        })
    }

    /// 运行命令循环，直到 quit 或输入结束
    pub async fn run(mut self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut ticker = countdown_ticker();
        let mut signals = self.session.subscribe();

        println!("{}\n", HELP);
        println!("{}", self.session.view().render_text());

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.session.tick();
                }
                Some(joined) = self.runs.join_next(), if !self.runs.is_empty() => {
                    match joined {
                        Ok((ticket, result)) => self.finish_run(ticket, result),
                        Err(e) => error!("评测任务异常退出: {}", e),
                    }
                }
                Ok(signal) = signals.recv() => {
                    log_signal(&signal);
                }
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    match Command::parse(&line) {
                        Ok(Command::Quit) => break,
                        Ok(command) => self.execute(command).await,
                        Err(msg) if msg.is_empty() => {}
                        Err(msg) => println!("{}", msg),
                    }
                }
            }
        }

        self.runs.abort_all();
        let view = self.session.view();
        logging::log_final_summary(
            self.session.evaluation().ledger().len(),
            self.session.questions().len(),
            self.session.proctor().is_locked(),
            &view.timer,
            &self.config.store_path,
        );
        Ok(())
    }

    async fn execute(&mut self, command: Command) {
        match command {
            Command::Question(n) => match self.session.switch_question(n - 1) {
                Ok(()) => self.show(),
                Err(e) => println!("{}", e),
            },
            Command::Lang(lang) => {
                self.session.switch_language(lang);
                self.show();
            }
            Command::Load(path) => self.load_file(path).await,
            Command::Show => self.show(),
            Command::Run => match self.session.begin_run() {
                Ok(ticket) => {
                    let judge = self.session.judge();
                    let request = ticket.request().clone();
                    self.runs.spawn(async move {
                        let result = judge.evaluate(request).await;
                        (ticket, result)
                    });
                    self.show();
                }
                Err(e) => println!("{}", e),
            },
            Command::Submit => match self.session.submit() {
                Ok(_) => self.show(),
                Err(e) => println!("{}", e),
            },
            Command::Time => println!("⏱ {}", self.session.timer().display()),
            Command::Blur => self.dispatch(SessionEvent::FocusLost),
            Command::Clipboard(action) => self.dispatch(SessionEvent::Clipboard { action }),
            Command::Key(press) => self.dispatch(SessionEvent::KeyDown { press }),
            Command::Help => println!("{}", HELP),
            Command::Quit => {}
        }
    }

    async fn load_file(&mut self, path: PathBuf) {
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) => {
                println!("无法读取 {}: {}", path.display(), e);
                return;
            }
        };
        if self.session.editor_mut().user_replace(&content) {
            self.session.handle_event(SessionEvent::ContentChanged);
            info!(
                "已载入 {} ({} 字节): {}",
                path.display(),
                content.len(),
                logging::truncate_text(content.trim(), 40)
            );
        } else {
            println!("编辑器为只读状态");
        }
    }

    fn dispatch(&mut self, event: SessionEvent) {
        let disposition = self.session.handle_event(event);
        if disposition.locked_now {
            self.show();
        }
    }

    fn finish_run(&mut self, ticket: RunTicket, result: Result<JudgeOutput, JudgeError>) {
        match self.session.complete_run(ticket, result) {
            RunResolution::Applied { .. } => self.show(),
            RunResolution::Discarded => info!("评测结果已过期，忽略"),
        }
    }

    fn show(&self) {
        println!("\n{}", self.session.view().render_text());
    }
}

fn log_signal(signal: &SessionSignal) {
    match signal {
        SessionSignal::Locked { reason } => warn!("🚫 会话已锁定: {}", reason),
        SessionSignal::RunFinished { question_id, state } => {
            info!("题目 {} 运行完成: {:?}", question_id, state)
        }
        SessionSignal::Submitted { question_id } => info!("题目 {} 已提交", question_id),
        SessionSignal::Completed {
            submitted,
            finished_at,
        } => info!("🎉 全部 {} 道题已完成 ({})", submitted, finished_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("q 2"), Ok(Command::Question(2)));
        assert_eq!(Command::parse("  LANG  c++ "), Ok(Command::Lang(Language::Cpp)));
        assert_eq!(
            Command::parse("load ./answer.py"),
            Ok(Command::Load(PathBuf::from("./answer.py")))
        );
        assert_eq!(
            Command::parse("paste"),
            Ok(Command::Clipboard(ClipboardAction::Paste))
        );
        assert_eq!(
            Command::parse("key ctrl+v"),
            Ok(Command::Key(KeyPress::parse("ctrl+v").unwrap()))
        );
        assert_eq!(Command::parse("exit"), Ok(Command::Quit));
    }

    #[tokio::test]
    async fn test_countdown_ticker_does_not_fire_immediately() {
        let mut ticker = countdown_ticker();
        let mut first = tokio_test::task::spawn(ticker.tick());
        tokio_test::assert_pending!(first.poll());
    }

    #[test]
    fn test_parse_errors() {
        assert!(Command::parse("q 0").is_err());
        assert!(Command::parse("q x").is_err());
        assert!(Command::parse("q").is_err());
        assert!(Command::parse("lang cobol").is_err());
        assert!(Command::parse("key ctrl+").is_err());
        assert!(Command::parse("dance").is_err());
        assert_eq!(Command::parse("   "), Err(String::new()));
    }
}
