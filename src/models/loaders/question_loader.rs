use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tokio::fs;
use tracing::info;

use crate::error::LoadError;
use crate::models::question::Question;

/// TOML 题目文件结构：`[[questions]]` 数组
#[derive(Debug, Deserialize)]
struct QuestionFile {
    questions: Vec<Question>,
}

/// 加载题目列表
///
/// `source` 以 `http://` 或 `https://` 开头时通过网络获取，否则按本地文件读取。
/// 本地文件扩展名为 `.toml` 时按 TOML 解析，其余按 JSON 数组解析。
pub async fn load_questions(source: &str) -> Result<Vec<Question>, LoadError> {
    let questions = if source.starts_with("http://") || source.starts_with("https://") {
        fetch_questions(source).await?
    } else {
        load_questions_from_file(Path::new(source)).await?
    };

    validate(&questions)?;
    info!("✓ 成功加载 {} 道题目", questions.len());
    Ok(questions)
}

/// 从本地文件读取题目
pub async fn load_questions_from_file(path: &Path) -> Result<Vec<Question>, LoadError> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|source| LoadError::Read {
            path: path.display().to_string(),
            source,
        })?;

    if path.extension().and_then(|s| s.to_str()) == Some("toml") {
        parse_toml(&content)
    } else {
        parse_json(&content)
    }
}

/// 通过 HTTP 获取题目 JSON
pub async fn fetch_questions(url: &str) -> Result<Vec<Question>, LoadError> {
    let to_err = |source: reqwest::Error| LoadError::Fetch {
        url: url.to_string(),
        source,
    };
    let response = reqwest::get(url)
        .await
        .and_then(|r| r.error_for_status())
        .map_err(to_err)?;
    let body = response.text().await.map_err(to_err)?;
    parse_json(&body)
}

pub fn parse_json(content: &str) -> Result<Vec<Question>, LoadError> {
    Ok(serde_json::from_str(content)?)
}

pub fn parse_toml(content: &str) -> Result<Vec<Question>, LoadError> {
    let file: QuestionFile = toml::from_str(content)?;
    Ok(file.questions)
}

/// 校验题目列表：非空且 ID 唯一
/// 校验题目列表：不能为空，id 不能重复
pub fn validate(questions: &[Question]) -> Result<(), LoadError> {
    if questions.is_empty() {
        return Err(LoadError::Empty);
    }
    let mut seen = HashSet::new();
    for q in questions {
        if !seen.insert(q.id.as_str()) {
            return Err(LoadError::DuplicateId { id: q.id.clone() });
        }
    }
    Ok(())
}
