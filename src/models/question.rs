use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::Language;

/// 单道练习题
///
/// 加载后不可变
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub title: String,
    /// 运行时作为 stdin 传给评测服务
    pub input: String,
    pub expected_output: String,
    /// 题目声明的默认语言
    pub language: Language,
    #[serde(default)]
    pub buggy_code: BuggyCode,
}

/// 起始代码：单一字符串（对应题目声明的语言）或按语言标签区分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BuggyCode {
    Single(String),
    PerLanguage(HashMap<String, String>),
}

impl Default for BuggyCode {
    fn default() -> Self {
        BuggyCode::PerLanguage(HashMap::new())
    }
}

impl Question {
    /// 题目为指定语言提供的起始代码
    ///
    /// 空字符串视为未提供
    pub fn starter_code(&self, lang: Language) -> Option<&str> {
        let code = match &self.buggy_code {
            BuggyCode::Single(code) if lang == self.language => Some(code.as_str()),
            BuggyCode::Single(_) => None,
            BuggyCode::PerLanguage(map) => map
                .iter()
                .find(|(tag, _)| Language::from_tag(tag) == Some(lang))
                .map(|(_, code)| code.as_str()),
        };
        code.filter(|c| !c.is_empty())
    }

    /// 起始代码，缺失时退回语言默认模板
    pub fn seed_code(&self, lang: Language) -> &str {
        self.starter_code(lang)
            .unwrap_or_else(|| lang.default_template())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(buggy_code: BuggyCode) -> Question {
        Question {
            id: "q1".to_string(),
            title: "Square".to_string(),
            input: "5\n".to_string(),
            expected_output: "25".to_string(),
            language: Language::Python,
            buggy_code,
        }
    }

    #[test]
    fn test_single_string_only_seeds_declared_language() {
        let q = question(BuggyCode::Single("print(int(input())**3)".to_string()));
        assert_eq!(q.seed_code(Language::Python), "print(int(input())**3)");
        assert_eq!(q.seed_code(Language::C), Language::C.default_template());
    }

    #[test]
    fn test_per_language_map() {
        let mut map = HashMap::new();
        map.insert("cpp".to_string(), "int main(){}".to_string());
        map.insert("java".to_string(), String::new());
        let q = question(BuggyCode::PerLanguage(map));
        assert_eq!(q.seed_code(Language::Cpp), "int main(){}");
        assert_eq!(q.seed_code(Language::Java), Language::Java.default_template());
        assert_eq!(q.seed_code(Language::Python), Language::Python.default_template());
    }

    #[test]
    fn test_deserialize_both_forms() {
        let single: Question = serde_json::from_str(
            r#"{"id":"a","title":"t","input":"","expected_output":"1","language":"c","buggy_code":"int x;"}"#,
        )
        .unwrap();
        assert_eq!(single.buggy_code, BuggyCode::Single("int x;".to_string()));

        let keyed: Question = serde_json::from_str(
            r#"{"id":"b","title":"t","input":"","expected_output":"1","language":"python","buggy_code":{"python":"x=1"}}"#,
        )
        .unwrap();
        assert_eq!(keyed.starter_code(Language::Python), Some("x=1"));

        let missing: Question = serde_json::from_str(
            r#"{"id":"c","title":"t","input":"","expected_output":"1","language":"java"}"#,
        )
        .unwrap();
        assert_eq!(missing.starter_code(Language::Java), None);
    }
}
