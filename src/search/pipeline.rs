//! Search pipeline - tokenize, build, execute, normalize / 检索流水线
//!
//! Stages run strictly in order and the first failure ends the run. Each
//! request owns its tokens, expression and connection; the pipeline itself
//! only holds read-only components and can be shared across tasks.

use std::sync::Arc;

use serde::Serialize;

use super::executor::{ExecutorError, SearchExecutor};
use super::normalizer;
use super::query;
use super::schema::SearchResultRecord;
use super::tokenizer::Tokenizer;
use crate::config::IndexConfig;

/// Pipeline state / 流水线状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    Tokenizing,
    Building,
    Executing,
    Normalizing,
    Done,
    Failed,
}

/// Request-level failure kinds / 请求级错误类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// Query text is not valid UTF-8 / 查询文本编码错误
    SegmentationFailure,
    /// Index unreachable, auth refused or timed out / 索引不可用
    SearchUnavailable,
    /// Index refused the built expression / 索引拒绝查询表达式
    QueryRejected,
}

/// Structured failure naming the stage that failed / 带阶段信息的错误
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{kind:?} while {stage:?}: {message}")]
pub struct PipelineError {
    pub stage: Stage,
    pub kind: ErrorKind,
    pub message: String,
}

/// Per-request state tracking / 单次请求状态
struct Run {
    stage: Stage,
}

impl Run {
    fn new() -> Self {
        Self { stage: Stage::Idle }
    }

    fn enter(&mut self, next: Stage) {
        tracing::debug!("search pipeline: {:?} -> {:?}", self.stage, next);
        self.stage = next;
    }

    fn fail(&mut self, kind: ErrorKind, message: String) -> PipelineError {
        let err = PipelineError {
            stage: self.stage,
            kind,
            message,
        };
        tracing::warn!("search pipeline failed: {}", err);
        self.stage = Stage::Failed;
        err
    }
}

/// Search pipeline / 检索流水线
pub struct Pipeline {
    tokenizer: Arc<Tokenizer>,
    executor: SearchExecutor,
    index: IndexConfig,
}

impl Pipeline {
    pub fn new(tokenizer: Arc<Tokenizer>, executor: SearchExecutor, index: IndexConfig) -> Self {
        Self {
            tokenizer,
            executor,
            index,
        }
    }

    pub fn backend_name(&self) -> &str {
        self.executor.backend_name()
    }

    /// Run with the configured limit / 使用默认 limit 检索
    pub async fn run(&self, query: &str) -> Result<Vec<SearchResultRecord>, PipelineError> {
        self.run_with_limit(query, None).await
    }

    /// Run on raw bytes, rejecting malformed UTF-8 / 对原始字节检索
    pub async fn run_bytes(
        &self,
        query: &[u8],
        limit: Option<usize>,
    ) -> Result<Vec<SearchResultRecord>, PipelineError> {
        match std::str::from_utf8(query) {
            Ok(text) => self.run_with_limit(text, limit).await,
            Err(e) => {
                let mut run = Run::new();
                run.enter(Stage::Tokenizing);
                Err(run.fail(
                    ErrorKind::SegmentationFailure,
                    format!("query is not valid UTF-8: {}", e),
                ))
            }
        }
    }

    pub async fn run_with_limit(
        &self,
        query: &str,
        limit: Option<usize>,
    ) -> Result<Vec<SearchResultRecord>, PipelineError> {
        let mut run = Run::new();

        if query.is_empty() {
            run.enter(Stage::Done);
            return Ok(Vec::new());
        }

        run.enter(Stage::Tokenizing);
        let tokens = self.tokenizer.tokenize(query);
        tracing::debug!("tokens: {:?}", tokens);

        run.enter(Stage::Building);
        let expr = query::build(&tokens);
        if expr.is_empty() {
            run.enter(Stage::Done);
            return Ok(Vec::new());
        }

        run.enter(Stage::Executing);
        let limit = self.index.effective_limit(limit);
        let rows = match self.executor.execute(&expr, limit).await {
            Ok(rows) => rows,
            Err(e) => {
                let kind = match e {
                    ExecutorError::Rejected(_) => ErrorKind::QueryRejected,
                    ExecutorError::Unavailable(_) | ExecutorError::Timeout(_) => {
                        ErrorKind::SearchUnavailable
                    }
                };
                return Err(run.fail(kind, e.to_string()));
            }
        };

        run.enter(Stage::Normalizing);
        let records = normalizer::normalize(rows);

        run.enter(Stage::Done);
        tracing::debug!("query {:?} returned {} records", query, records.len());
        Ok(records)
    }
}
