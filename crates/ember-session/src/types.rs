//! # Session Types
//!
//! 会话摘要以及标题推导。

use chrono::{DateTime, Utc};
use ember_core::Message;
use serde::{Deserialize, Serialize};

/// 标题最多取的单词数
const TITLE_MAX_WORDS: usize = 12;

/// 标题最多保留的字符数（超出部分以省略号结尾）
const TITLE_MAX_CHARS: usize = 16;

/// 会话摘要，仅用于列表展示
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub title: String,
    pub updated_at: DateTime<Utc>,
}

/// 从第一条用户消息推导标题
///
/// 没有用户消息时返回空字符串。
pub fn derive_title(messages: &[Message]) -> String {
    messages
        .iter()
        .find(|m| m.is_user())
        .map(|m| clip(&first_words(&m.content, TITLE_MAX_WORDS), TITLE_MAX_CHARS))
        .unwrap_or_default()
}

fn first_words(s: &str, n: usize) -> String {
    let s = s.trim();
    let words: Vec<&str> = s.split_whitespace().collect();
    if words.len() <= n {
        return s.to_string();
    }
    words[..n].join(" ")
}

fn clip(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars).collect();
    out.push('…');
    out
}
