//! MySQL-protocol backend (SphinxQL) / MySQL 协议检索后端
//!
//! One connection per request, no pool. The statement is a plain `&str` with
//! no arguments, which sqlx sends as COM_QUERY (text protocol): the index
//! does not support server-side prepared statements, so the expression goes
//! through `sql_string_literal` instead of a bind.

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlDatabaseError, MySqlRow};
use sqlx::{ConnectOptions, Connection, Executor, Row};

use super::executor::{ExecutorError, SearchBackend};
use super::query::{sql_string_literal, MatchExpression};
use super::schema::RawRow;
use crate::config::IndexConfig;

/// MySQL error numbers meaning "credentials refused" / 认证失败的错误码
const ACCESS_DENIED: [u16; 2] = [1044, 1045];

pub struct SqlBackend {
    options: MySqlConnectOptions,
    index: String,
    content_column: String,
}

impl SqlBackend {
    /// `config` must have passed `AppConfig::validate` (identifiers checked there)
    pub fn new(config: &IndexConfig) -> Self {
        // The index rejects the session SETs sqlx issues against real MySQL
        let mut options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .pipes_as_concat(false)
            .no_engine_substitution(false)
            .timezone(None)
            .set_names(false);
        if let Some(user) = &config.user {
            options = options.username(user);
        }
        if let Some(password) = &config.password {
            options = options.password(password);
        }

        Self {
            options,
            index: config.index.clone(),
            content_column: config.content_column.clone(),
        }
    }

    /// Statement text for one query / 生成查询语句
    pub fn select_sql(&self, expr: &MatchExpression, limit: usize) -> String {
        format!(
            "SELECT id, title, {} AS content, WEIGHT() AS weight FROM {} WHERE MATCH({}) ORDER BY weight DESC LIMIT {}",
            self.content_column,
            self.index,
            sql_string_literal(expr),
            limit
        )
    }

    async fn query(
        &self,
        conn: &mut MySqlConnection,
        sql: &str,
    ) -> Result<Vec<RawRow>, sqlx::Error> {
        let rows = Executor::fetch_all(&mut *conn, sql).await?;
        rows.iter().map(decode_row).collect()
    }
}

#[async_trait]
impl SearchBackend for SqlBackend {
    fn name(&self) -> &str {
        "mysql"
    }

    async fn execute(
        &self,
        expr: &MatchExpression,
        limit: usize,
    ) -> Result<Vec<RawRow>, ExecutorError> {
        let sql = self.select_sql(expr, limit);
        tracing::debug!("SphinxQL: {}", sql);

        let mut conn = self.options.connect().await.map_err(classify)?;
        let result = self.query(&mut conn, &sql).await;

        // Release on both paths; a failed close still drops the socket
        if let Err(e) = conn.close().await {
            tracing::debug!("Closing index connection failed: {}", e);
        }

        result.map_err(classify)
    }
}

/// Column types are reported loosely by the index (unsigned ids, string
/// attributes as blobs), so decode without the type check.
fn decode_row(row: &MySqlRow) -> Result<RawRow, sqlx::Error> {
    Ok(RawRow {
        id: row.try_get_unchecked::<i64, _>("id")?,
        title: row
            .try_get_unchecked::<Option<String>, _>("title")?
            .unwrap_or_default(),
        content_payload: row
            .try_get_unchecked::<Option<String>, _>("content")?
            .unwrap_or_default(),
        weight: row.try_get_unchecked::<i64, _>("weight")?,
    })
}

fn classify(err: sqlx::Error) -> ExecutorError {
    match err {
        sqlx::Error::Database(db) => {
            let denied = db
                .try_downcast_ref::<MySqlDatabaseError>()
                .map(|e| ACCESS_DENIED.contains(&e.number()))
                .unwrap_or(false);
            if denied {
                ExecutorError::Unavailable(db.message().to_string())
            } else {
                ExecutorError::Rejected(db.message().to_string())
            }
        }
        // Result shape does not match the configured columns
        e @ (sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::Decode(_)) => ExecutorError::Rejected(e.to_string()),
        e => ExecutorError::Unavailable(e.to_string()),
    }
}
