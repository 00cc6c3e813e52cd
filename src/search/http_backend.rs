//! HTTP JSON backend / HTTP JSON 检索后端
//!
//! POSTs to the index's `/search` endpoint. The expression travels as a JSON
//! string value, so only query-grammar escaping applies.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::executor::{ExecutorError, SearchBackend};
use super::query::MatchExpression;
use super::schema::RawRow;
use crate::config::IndexConfig;

pub struct HttpBackend {
    client: reqwest::Client,
    url: String,
    index: String,
    content_column: String,
    user: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Hits,
}

#[derive(Debug, Deserialize)]
struct Hits {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_id")]
    id: Value,
    #[serde(rename = "_score", default)]
    score: Value,
    #[serde(rename = "_source", default)]
    source: Map<String, Value>,
}

impl HttpBackend {
    pub fn new(config: &IndexConfig) -> Result<Self, ExecutorError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ExecutorError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            url: format!("http://{}:{}/search", config.host, config.port),
            index: config.index.clone(),
            content_column: config.content_column.clone(),
            user: config.user.clone(),
            password: config.password.clone(),
        })
    }

    fn request_body(&self, expr: &MatchExpression, limit: usize) -> Value {
        json!({
            "index": self.index,
            "query": { "query_string": expr.as_str() },
            "limit": limit,
            "sort": [{ "_score": "desc" }],
            "_source": ["title", self.content_column],
        })
    }

    fn decode_hit(&self, hit: Hit) -> Result<RawRow, ExecutorError> {
        let id = match &hit.id {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
        .ok_or_else(|| ExecutorError::Rejected(format!("unexpected _id {}", hit.id)))?;

        let weight = hit
            .score
            .as_i64()
            .or_else(|| hit.score.as_f64().map(|f| f.round() as i64))
            .unwrap_or(0);

        let title = match hit.source.get("title") {
            Some(Value::String(s)) => s.clone(),
            _ => String::new(),
        };

        // JSON attributes come back as objects, string attributes as text
        let content_payload = match hit.source.get(&self.content_column) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };

        Ok(RawRow {
            id,
            title,
            content_payload,
            weight,
        })
    }
}

#[async_trait]
impl SearchBackend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn execute(
        &self,
        expr: &MatchExpression,
        limit: usize,
    ) -> Result<Vec<RawRow>, ExecutorError> {
        let mut request = self
            .client
            .post(&self.url)
            .json(&self.request_body(expr, limit));
        if let Some(user) = &self.user {
            request = request.basic_auth(user, self.password.as_ref());
        }

        let response = request
            .send()
            .await
            .map_err(|e| ExecutorError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| ExecutorError::Rejected(format!("unexpected response: {}", e)))?;

        parsed
            .hits
            .hits
            .into_iter()
            .map(|hit| self.decode_hit(hit))
            .collect()
    }
}

fn classify_status(status: StatusCode, body: &str) -> ExecutorError {
    let message = error_message(body).unwrap_or_else(|| format!("HTTP {}", status));
    match status {
        StatusCode::UNAUTHORIZED
        | StatusCode::FORBIDDEN
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => ExecutorError::Unavailable(message),
        _ => ExecutorError::Rejected(message),
    }
}

/// `{"error": "..."}` or `{"error": {"reason": "..."}}` / 提取错误信息
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("error")? {
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => obj
            .get("reason")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| Some(Value::Object(obj.clone()).to_string())),
        other => Some(other.to_string()),
    }
}
