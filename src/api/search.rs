use axum::{
    extract::{RawQuery, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use super::ApiError;
use crate::state::AppState;
use mlsearch::search::SearchResultRecord;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Decoded `q` / `limit` from a raw query string / 解析查询参数
#[derive(Debug, Default, PartialEq)]
struct SearchParams {
    q: Vec<u8>,
    limit: Option<usize>,
}

/// Form-decode to bytes; UTF-8 is checked by the pipeline, not here
fn decode_component(raw: &str) -> Vec<u8> {
    let plus_as_space = raw.replace('+', " ");
    urlencoding::decode_binary(plus_as_space.as_bytes()).into_owned()
}

fn parse_params(raw: &str) -> SearchParams {
    let mut params = SearchParams::default();
    for pair in raw.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        match decode_component(key).as_slice() {
            b"q" => params.q = decode_component(value),
            b"limit" => {
                params.limit = std::str::from_utf8(&decode_component(value))
                    .ok()
                    .and_then(|s| s.trim().parse().ok());
            }
            _ => {}
        }
    }
    params
}

/// GET /search?q=... - 搜索
pub async fn search_get(
    State(state): State<Arc<AppState>>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Vec<SearchResultRecord>>, ApiError> {
    let params = parse_params(raw.as_deref().unwrap_or(""));
    let records = state.pipeline.run_bytes(&params.q, params.limit).await?;
    Ok(Json(records))
}

/// POST /search {"query": "..."} - 搜索
pub async fn search_post(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<Vec<SearchResultRecord>>, ApiError> {
    let records = state
        .pipeline
        .run_with_limit(&req.query, req.limit)
        .await?;
    Ok(Json(records))
}
