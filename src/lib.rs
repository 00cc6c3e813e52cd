pub mod config;
pub mod search;

use std::sync::Arc;

use config::AppConfig;
use search::{Pipeline, SearchExecutor, Tokenizer};

/// Build the search pipeline from a validated config / 根据配置构建检索流水线
pub fn build_pipeline(config: &AppConfig) -> anyhow::Result<Pipeline> {
    let tokenizer = Tokenizer::from_config(&config.tokenizer)?;
    let executor = SearchExecutor::from_config(&config.index)?;
    Ok(Pipeline::new(
        Arc::new(tokenizer),
        executor,
        config.index.clone(),
    ))
}
