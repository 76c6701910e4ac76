/// 评测服务客户端
///
/// 把代码、语言和标准输入交给远程评测服务执行，取回输出
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::JudgeError;
use crate::models::Language;

/// 一次评测请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JudgeRequest {
    pub source_code: String,
    pub language: Language,
    pub stdin: String,
}

/// 评测服务返回的输出，字段均可能缺失
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct JudgeOutput {
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub compile_output: Option<String>,
}

impl JudgeOutput {
    pub fn from_stdout(stdout: impl Into<String>) -> Self {
        Self {
            stdout: Some(stdout.into()),
            ..Default::default()
        }
    }

    /// 用于比对的输出：stdout，其次编译输出，其次 stderr，去除首尾空白
    pub fn observed(&self) -> String {
        self.stdout
            .as_deref()
            .or(self.compile_output.as_deref())
            .or(self.stderr.as_deref())
            .unwrap_or("")
            .trim()
            .to_string()
    }
}

/// 评测能力
///
/// 异步、可能失败；失败由调用方转成运行失败状态
pub trait Judge: Send + Sync {
    fn evaluate(&self, request: JudgeRequest) -> BoxFuture<'_, Result<JudgeOutput, JudgeError>>;
}

/// Judge0 请求体
#[derive(Debug, Serialize)]
struct SubmissionBody<'a> {
    source_code: &'a str,
    language_id: u32,
    stdin: &'a str,
}

/// Judge0 客户端（RapidAPI 托管）
pub struct Judge0Client {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    api_host: String,
}

impl Judge0Client {
    /// 创建新的评测客户端
    pub fn new(config: &Config) -> Result<Self, JudgeError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.judge_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.judge_api_url.trim_end_matches('/').to_string(),
            api_key: config.judge_api_key.clone(),
            api_host: config.judge_api_host.clone(),
        })
    }

    fn submissions_url(&self) -> String {
        format!("{}/submissions?base64_encoded=false&wait=true", self.base_url)
    }

    /// 提交代码并同步等待结果
    pub async fn submit(&self, request: &JudgeRequest) -> Result<JudgeOutput, JudgeError> {
        let body = SubmissionBody {
            source_code: &request.source_code,
            language_id: request.language.judge0_id(),
            stdin: &request.stdin,
        };
        debug!(
            "提交评测: 语言 {} (id {}), 代码长度 {} 字符",
            request.language,
            body.language_id,
            request.source_code.len()
        );

        let response = self
            .http
            .post(self.submissions_url())
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", &self.api_host)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("评测服务返回错误状态: {}", status);
            return Err(JudgeError::BadStatus {
                status: status.as_u16(),
            });
        }

        let output: JudgeOutput = response.json().await?;
        debug!("评测结果: {:?}", output);
        Ok(output)
    }
}

impl Judge for Judge0Client {
    fn evaluate(&self, request: JudgeRequest) -> BoxFuture<'_, Result<JudgeOutput, JudgeError>> {
        async move { self.submit(&request).await }.boxed()
    }
}
