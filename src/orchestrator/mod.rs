//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层持有整场考试的全部组件，规定初始化顺序，并把宿主事件路由到各组件。
//!
//! ## 模块划分
//!
//! ### `exam_session` - 考试会话
//! - 显式的会话上下文（存储、监考、代码缓存、题目、评测、编辑器、计时）
//! - 初始化顺序：存储 → 监考恢复 → 题目加载 → 缓存水合 → 显示
//! - 锁定时同时关闭编辑器与运行/提交
//! - 通过 broadcast 通道发布会话信号
//!
//! ### `events` - 事件与信号
//! - `SessionEvent`：宿主送入的编辑器/剪贴板/焦点事件
//! - `SessionSignal`：会话发布给展示层的锁定、运行、提交、完成信号
//!
//! ### `app` - 无界面驱动
//! - 组装文件存储与 Judge0 客户端
//! - 标准输入命令、每秒计时、后台并发评测
//!
//! ## 层次关系
//!
//! ```text
//! app (命令循环)
//!     ↓
//! exam_session (会话上下文)
//!     ↓
//! workflow (QuestionSession / EvaluationController)
//!     ↓
//! services (CodeStateCache / ProctorMonitor / Countdown)
//!     ↓
//! infrastructure (KvStore / CodeEditor)
//! ```

pub mod app;
pub mod events;
pub mod exam_session;

// 重新导出主要类型
pub use app::{App, Command};
pub use events::{EventDisposition, SessionEvent, SessionSignal};
pub use exam_session::{ExamSession, SessionOptions};
