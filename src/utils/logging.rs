/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 初始化全局日志
///
/// 优先使用 `RUST_LOG`；未设置时按 `VERBOSE_LOGGING` 选择 debug 或 info。
/// 重复调用是安全的，测试中可以随意调用。
pub fn init() {
    let verbose = crate::config::parse_env::<bool>("VERBOSE_LOGGING")
        .ok()
        .flatten()
        .unwrap_or(false);
    init_with_verbose(verbose);
}

/// 按指定详细程度初始化日志
pub fn init_with_verbose(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `config`: 当前配置
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 限时编程考试");
    info!("📄 题目来源: {}", config.questions_source);
    info!("💾 存储文件: {}", config.store_path);
    info!("🌐 评测服务: {}", config.judge_api_url);
    info!("⏱  考试时长: {}", crate::services::format_clock(config.exam_duration_secs));
    if config.judge_api_key.is_empty() {
        info!("⚠️ 未配置 JUDGE_API_KEY，评测请求可能被拒绝");
    }
    info!("{}", "=".repeat(60));
}

/// 记录题目加载信息
///
/// # 参数
/// - `total`: 题目总数
/// - `source`: 题目来源
pub fn log_questions_loaded(total: usize, source: &str) {
    info!("✓ 从 {} 加载了 {} 道题", source, total);
    info!("💡 输入 help 查看可用命令\n");
}

/// 打印最终统计信息
///
/// # 参数
/// - `submitted`: 已提交题数
/// - `total`: 题目总数
/// - `locked`: 是否处于锁定状态
/// - `remaining`: 剩余时间
/// - `store_path`: 存储文件路径
pub fn log_final_summary(
    submitted: usize,
    total: usize,
    locked: bool,
    remaining: &str,
    store_path: &str,
) {
    info!("\n{}", "=".repeat(60));
    info!("📊 会话结束统计");
    info!(
        "结束时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 已提交: {}/{}", submitted, total);
    if locked {
        info!("🚫 会话处于锁定状态");
    }
    info!("⏱  剩余时间: {}", remaining);
    info!("{}", "=".repeat(60));
    info!("\n代码已保存至: {}", store_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
