//! Search module - multilingual full-text query pipeline / 多语言全文检索模块
//!
//! Flow / 流程：
//! raw query → tokenizer → match expression → executor → raw rows → normalizer
//!
//! - Tokenizer: jieba segmentation, CJK runs split into words / 中文分词
//! - Query: every token quoted and escaped, implicit AND / 查询转义
//! - Executor: MySQL protocol or HTTP JSON against the index / 索引访问
//! - Normalizer: JSON content parsed, malformed rows degraded not dropped / 结果规范化

pub mod executor;
pub mod http_backend;
pub mod normalizer;
pub mod pipeline;
pub mod query;
pub mod schema;
pub mod sql_backend;
pub mod tokenizer;

pub use executor::{ExecutorError, SearchBackend, SearchExecutor};
pub use pipeline::{ErrorKind, Pipeline, PipelineError, Stage};
pub use query::MatchExpression;
pub use schema::{RawRow, SearchResultRecord};
pub use tokenizer::Tokenizer;
