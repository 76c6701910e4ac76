use std::str::FromStr;

use tracing::warn;

use crate::error::ConfigError;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 题目来源（本地路径或 http(s) URL）
    pub questions_source: String,
    /// 本地键值存储文件
    pub store_path: String,
    /// 存储键前缀
    pub storage_prefix: String,
    // --- 评测服务配置 ---
    pub judge_api_url: String,
    pub judge_api_key: String,
    pub judge_api_host: String,
    /// 评测请求超时（秒）
    pub judge_timeout_secs: u64,
    /// 考试时长（秒）
    pub exam_duration_secs: u32,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            questions_source: "questions.json".to_string(),
            store_path: "exam_store.json".to_string(),
            storage_prefix: "automatafix".to_string(),
            judge_api_url: "https://judge0-ce.p.rapidapi.com".to_string(),
            judge_api_key: String::new(),
            judge_api_host: "judge0-ce.p.rapidapi.com".to_string(),
            judge_timeout_secs: 30,
            exam_duration_secs: 1800,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 从环境变量读取配置，缺失或无法解析的值使用默认值
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            questions_source: std::env::var("QUESTIONS_SOURCE").unwrap_or(default.questions_source),
            store_path: std::env::var("STORE_PATH").unwrap_or(default.store_path),
            storage_prefix: std::env::var("STORAGE_PREFIX").unwrap_or(default.storage_prefix),
            judge_api_url: std::env::var("JUDGE_API_URL").unwrap_or(default.judge_api_url),
            judge_api_key: std::env::var("JUDGE_API_KEY").unwrap_or(default.judge_api_key),
            judge_api_host: std::env::var("JUDGE_API_HOST").unwrap_or(default.judge_api_host),
            judge_timeout_secs: env_or("JUDGE_TIMEOUT_SECS", default.judge_timeout_secs),
            exam_duration_secs: env_or("EXAM_DURATION_SECS", default.exam_duration_secs),
            verbose_logging: env_or("VERBOSE_LOGGING", default.verbose_logging),
        }
    }
}

/// 解析单个环境变量，未设置时返回 `Ok(None)`
pub fn parse_env<T: FromStr>(var_name: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value.trim().parse::<T>().map(Some).map_err(|_| {
            ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: std::any::type_name::<T>().to_string(),
            }
        }),
        Err(_) => Ok(None),
    }
}

fn env_or<T: FromStr>(var_name: &str, default: T) -> T {
    match parse_env(var_name) {
        Ok(Some(value)) => value,
        Ok(None) => default,
        Err(e) => {
            warn!("⚠️ {}，使用默认值", e);
            default
        }
    }
}
