//! # Proctored Exam
//!
//! 限时、受监考的编程练习客户端会话引擎
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源，只暴露能力
//! - `KvStore` - 键值存储（内存 / JSON 文件）
//! - `StoreAdapter` - 唯一的存储访问入口，负责键名与容错
//! - `CodeEditor` - 编辑器能力（文本、语言模式、只读）
//!
//! ### ② 客户端层（Clients）
//! - `clients/` - 外部服务
//! - `Judge0Client` - 远程代码执行
//!
//! ### ③ 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `CodeStateCache` - 每题每语言的代码缓存
//! - `ProctorMonitor` - 违规检测与锁定
//! - `Countdown` - 考试倒计时
//!
//! ### ④ 流程层（Workflow）
//! - `workflow/` - 定义"一道题"的作答流程
//! - `QuestionSession` - 当前题目与语言的切换
//! - `EvaluationController` - 运行、比对、提交
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator/exam_session` - 会话上下文与初始化顺序
//! - `orchestrator/app` - 无界面命令驱动
//!
//! ### ⑥ 展示层（Presentation）
//! - `presentation/` - 会话状态的纯投影
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod presentation;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{Judge, Judge0Client};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{BufferEditor, CodeEditor, JsonFileStore, KvStore, MemoryStore};
pub use models::{Language, Question};
pub use orchestrator::{App, ExamSession, SessionEvent, SessionOptions, SessionSignal};
pub use presentation::SessionView;
