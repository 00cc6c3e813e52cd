//! Search result schema / 搜索结果结构定义

use serde::{Deserialize, Serialize};

/// Row as returned by the index, content still unparsed / 索引返回的原始行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub id: i64,
    pub title: String,
    /// Structured content payload as stored (JSON text) / 原始 JSON 内容
    pub content_payload: String,
    /// Relevance weight reported by the index / 相关性权重
    pub weight: i64,
}

/// Structured content stored with each document / 文档的结构化内容
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredContent {
    pub text: String,
    pub tags: Vec<String>,
}

/// Normalized search result / 规范化后的搜索结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultRecord {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub tags: Vec<String>,
    /// Higher is more relevant / 越大越相关
    pub weight: i64,
}
