//! 代码状态数据结构
//!
//! `LanguageTable` 对每种语言各有一个字段，按语言取值时使用穷尽匹配，
//! 新增语言而遗漏某张表会在编译期报错。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Language;

/// 按语言索引的完整映射
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageTable<T> {
    pub python: T,
    pub c: T,
    pub cpp: T,
    pub java: T,
    pub javascript: T,
}

impl<T> LanguageTable<T> {
    /// 对每种语言调用 `f` 构造表
    pub fn from_fn(mut f: impl FnMut(Language) -> T) -> Self {
        Self {
            python: f(Language::Python),
            c: f(Language::C),
            cpp: f(Language::Cpp),
            java: f(Language::Java),
            javascript: f(Language::Javascript),
        }
    }

    pub fn get(&self, lang: Language) -> &T {
        match lang {
            Language::Python => &self.python,
            Language::C => &self.c,
            Language::Cpp => &self.cpp,
            Language::Java => &self.java,
            Language::Javascript => &self.javascript,
        }
    }

    pub fn get_mut(&mut self, lang: Language) -> &mut T {
        match lang {
            Language::Python => &mut self.python,
            Language::C => &mut self.c,
            Language::Cpp => &mut self.cpp,
            Language::Java => &mut self.java,
            Language::Javascript => &mut self.javascript,
        }
    }
}

/// 题目 ID → 每种语言的源代码
pub type CodeState = BTreeMap<String, LanguageTable<String>>;

/// 存储中读出的代码状态，允许缺项
pub type StoredCodeState = BTreeMap<String, LanguageTable<Option<String>>>;
