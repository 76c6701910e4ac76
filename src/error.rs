use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 存储相关错误
    #[error("存储错误: {0}")]
    Store(#[from] StoreError),
    /// 评测服务错误
    #[error("评测错误: {0}")]
    Judge(#[from] JudgeError),
    /// 题目加载错误
    #[error("题目加载错误: {0}")]
    Load(#[from] LoadError),
    /// 会话操作错误
    #[error("会话错误: {0}")]
    Session(#[from] SessionError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 键值存储错误
///
/// 只在 `KvStore` 实现内部产生，`StoreAdapter` 负责吞掉它们
#[derive(Debug, Error)]
pub enum StoreError {
    /// 存储不可用
    #[error("存储不可用: {reason}")]
    Unavailable { reason: String },
    /// 超出存储配额
    #[error("超出存储配额: 需要 {needed} 字节, 上限 {limit} 字节")]
    QuotaExceeded { needed: usize, limit: usize },
    /// 读写文件失败
    #[error("读写存储文件失败 ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 序列化失败
    #[error("存储序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// 评测服务错误
#[derive(Debug, Error)]
pub enum JudgeError {
    /// 网络请求失败
    #[error("评测请求失败: {0}")]
    Transport(#[from] reqwest::Error),
    /// 评测服务返回非 2xx 状态码
    #[error("HTTP error! status: {status}")]
    BadStatus { status: u16 },
    /// 其他评测失败（测试替身等使用）
    #[error("{0}")]
    Other(String),
}

/// 题目加载错误
///
/// 题目加载失败时整个会话不可用
#[derive(Debug, Error)]
pub enum LoadError {
    /// 读取题目文件失败
    #[error("无法读取题目文件 ({path}): {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 获取远程题目失败
    #[error("无法获取题目 ({url}): {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// JSON 解析失败
    #[error("题目 JSON 解析失败: {0}")]
    Json(#[from] serde_json::Error),
    /// TOML 解析失败
    #[error("题目 TOML 解析失败: {0}")]
    Toml(#[from] toml::de::Error),
    /// 题目列表为空
    #[error("题目列表为空")]
    Empty,
    /// 题目 ID 重复
    #[error("题目 ID 重复: {id}")]
    DuplicateId { id: String },
}

/// 会话操作错误
///
/// 被拒绝的操作不改变任何状态
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// 会话已因违规被锁定
    #[error("会话已锁定，无法继续操作")]
    Locked,
    /// 当前题目不允许提交
    #[error("当前题目尚未通过运行校验，无法提交")]
    SubmitNotEnabled,
    /// 题目索引越界
    #[error("题目索引 {index} 超出范围 [0, {count})")]
    QuestionOutOfRange { index: usize, count: usize },
    /// 未知语言标签
    #[error("不支持的语言: {0}")]
    UnknownLanguage(String),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
