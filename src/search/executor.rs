//! Search executor - runs a match expression against the full-text index / 检索执行器
//!
//! Backends only provide the primitive round-trip; the executor adds the
//! request-level timeout. Dropping the timed-out future drops the backend's
//! connection with it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::http_backend::HttpBackend;
use super::query::MatchExpression;
use super::schema::RawRow;
use super::sql_backend::SqlBackend;
use crate::config::{IndexConfig, Transport};

#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    /// Cannot reach or authenticate to the index / 无法连接或认证
    #[error("search index unavailable: {0}")]
    Unavailable(String),
    /// The index refused the query / 索引拒绝了查询
    #[error("search index rejected query: {0}")]
    Rejected(String),
    #[error("search index did not answer within {0:?}")]
    Timeout(Duration),
}

/// Full-text index access (provides only the primitive query) / 全文索引访问接口
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Backend name for logs / 后端名称
    fn name(&self) -> &str;

    /// Run one match query, rows ordered by descending weight / 执行一次检索
    ///
    /// Any connection opened here must be released before returning, on
    /// success and on error alike.
    async fn execute(
        &self,
        expr: &MatchExpression,
        limit: usize,
    ) -> Result<Vec<RawRow>, ExecutorError>;
}

/// Backend plus request timeout / 带超时的检索执行器
#[derive(Clone)]
pub struct SearchExecutor {
    backend: Arc<dyn SearchBackend>,
    timeout: Duration,
}

impl SearchExecutor {
    pub fn new(backend: Arc<dyn SearchBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    /// Pick the backend for the configured transport / 按配置选择后端
    pub fn from_config(config: &IndexConfig) -> Result<Self, ExecutorError> {
        let backend: Arc<dyn SearchBackend> = match config.transport {
            Transport::Mysql => Arc::new(SqlBackend::new(config)),
            Transport::Http => Arc::new(HttpBackend::new(config)?),
        };
        tracing::info!(
            "Search backend: {} at {}:{} (index {})",
            backend.name(),
            config.host,
            config.port,
            config.index
        );
        Ok(Self::new(backend, config.timeout()))
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub async fn execute(
        &self,
        expr: &MatchExpression,
        limit: usize,
    ) -> Result<Vec<RawRow>, ExecutorError> {
        match tokio::time::timeout(self.timeout, self.backend.execute(expr, limit)).await {
            Ok(result) => result,
            Err(_) => Err(ExecutorError::Timeout(self.timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stalled;

    #[async_trait]
    impl SearchBackend for Stalled {
        fn name(&self) -> &str {
            "stalled"
        }

        async fn execute(
            &self,
            _expr: &MatchExpression,
            _limit: usize,
        ) -> Result<Vec<RawRow>, ExecutorError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_stalled_index_times_out() {
        let executor = SearchExecutor::new(Arc::new(Stalled), Duration::from_millis(20));
        let expr = super::super::query::build(&["x"]);
        let err = executor.execute(&expr, 10).await.unwrap_err();
        assert!(matches!(err, ExecutorError::Timeout(_)));
    }

    #[test]
    fn test_from_config_picks_transport() {
        let mut config = IndexConfig::default();
        let executor = SearchExecutor::from_config(&config).unwrap();
        assert_eq!(executor.backend_name(), "mysql");

        config.transport = Transport::Http;
        let executor = SearchExecutor::from_config(&config).unwrap();
        assert_eq!(executor.backend_name(), "http");
    }
}
