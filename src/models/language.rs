use std::fmt;
use std::str::FromStr;

use phf::phf_map;
use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// 支持的编程语言（封闭集合）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Language {
    Python,
    C,
    Cpp,
    Java,
    Javascript,
}

/// 语言标签别名表
static LANGUAGE_ALIASES: phf::Map<&'static str, Language> = phf_map! {
    "python" => Language::Python,
    "python3" => Language::Python,
    "py" => Language::Python,
    "c" => Language::C,
    "cpp" => Language::Cpp,
    "c++" => Language::Cpp,
    "cxx" => Language::Cpp,
    "java" => Language::Java,
    "javascript" => Language::Javascript,
    "js" => Language::Javascript,
    "node" => Language::Javascript,
};

impl Language {
    /// 全部语言，顺序即界面上的显示顺序
    pub const ALL: [Language; 5] = [
        Language::Python,
        Language::C,
        Language::Cpp,
        Language::Java,
        Language::Javascript,
    ];

    /// 标准标签
    pub fn tag(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Java => "java",
            Language::Javascript => "javascript",
        }
    }

    /// Judge0 语言 ID
    pub fn judge0_id(self) -> u32 {
        match self {
            Language::Python => 71,
            Language::C => 50,
            Language::Cpp => 54,
            Language::Java => 62,
            Language::Javascript => 63,
        }
    }

    /// 编辑器语言模式
    pub fn editor_mode(self) -> &'static str {
        self.tag()
    }

    /// 默认代码模板
    pub fn default_template(self) -> &'static str {
        match self {
            Language::Python => "# Write your Python code here\n",
            Language::C => {
                "#include <stdio.h>\nint main() {\n    // Write your C code here\n    return 0;\n}"
            }
            Language::Cpp => {
                "#include <iostream>\nint main() {\n    // Write your C++ code here\n    return 0;\n}"
            }
            Language::Java => {
                "public class Main {\n    public static void main(String[] args) {\n        // Write your Java code here\n    }\n}"
            }
            Language::Javascript => "// Write your JavaScript code here\n",
        }
    }

    /// 从标签或别名解析（忽略大小写和首尾空白）
    pub fn from_tag(s: &str) -> Option<Self> {
        LANGUAGE_ALIASES
            .get(s.trim().to_ascii_lowercase().as_str())
            .copied()
    }
}

impl FromStr for Language {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| SessionError::UnknownLanguage(s.to_string()))
    }
}

impl TryFrom<String> for Language {
    type Error = SessionError;

    fn try_from(tag: String) -> Result<Self, Self::Error> {
        tag.parse()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}
