//! Query tokenizer - uses jieba-rs for Chinese word segmentation / 查询分词器
//!
//! Supports / 支持：
//! - Chinese word segmentation (jieba) / 中文分词
//! - Latin-script words kept whole / 英文单词保持完整
//! - Mixed text processing / 混合文本处理

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use jieba_rs::Jieba;

use crate::config::{TokenizeMode, TokenizerConfig};

#[derive(Debug, thiserror::Error)]
pub enum TokenizerError {
    #[error("failed to open dictionary {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to load dictionary {path}: {message}")]
    Load { path: String, message: String },
}

/// Segmenter built once at startup, shared read-only afterwards / 启动时构建的分词器
pub struct Tokenizer {
    jieba: Jieba,
    mode: TokenizeMode,
}

impl Tokenizer {
    /// Built-in dictionary, accurate mode / 内置词典，精确模式
    pub fn new() -> Self {
        Self {
            jieba: Jieba::new(),
            mode: TokenizeMode::Accurate,
        }
    }

    /// Build from config, loading dictionaries from disk / 按配置加载词典
    pub fn from_config(config: &TokenizerConfig) -> Result<Self, TokenizerError> {
        let mut jieba = match &config.dict_path {
            Some(path) => {
                let mut reader = open_dict(path)?;
                let jieba = Jieba::with_dict(&mut reader).map_err(|e| TokenizerError::Load {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
                tracing::info!("Loaded jieba dictionary from {}", path);
                jieba
            }
            None => Jieba::new(),
        };

        if let Some(path) = &config.user_dict_path {
            let mut reader = open_dict(path)?;
            jieba.load_dict(&mut reader).map_err(|e| TokenizerError::Load {
                path: path.clone(),
                message: e.to_string(),
            })?;
            tracing::info!("Loaded jieba user dictionary from {}", path);
        }

        Ok(Self {
            jieba,
            mode: config.mode,
        })
    }

    /// Tokenize a search query / 对搜索查询进行分词
    ///
    /// Order follows the input; whitespace-only segments are dropped and every
    /// token is trimmed. Case is preserved.
    pub fn tokenize(&self, query: &str) -> Vec<String> {
        let words = match self.mode {
            TokenizeMode::Accurate => self.jieba.cut(query, true),
            TokenizeMode::Search => self.jieba.cut_for_search(query, true),
        };

        words
            .into_iter()
            .map(str::trim)
            .filter(|word| !word.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

fn open_dict(path: &str) -> Result<BufReader<File>, TokenizerError> {
    File::open(Path::new(path))
        .map(BufReader::new)
        .map_err(|source| TokenizerError::Open {
            path: path.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_tokenize_chinese_splits_words() {
        let tokenizer = Tokenizer::new();
        let tokens = tokenizer.tokenize("中文测试");
        assert!(tokens.len() >= 2, "expected word split, got {:?}", tokens);
        assert!(!tokens.contains(&"中文测试".to_string()));
        assert_eq!(tokens.concat(), "中文测试");
    }

    #[test]
    fn test_tokenize_english_keeps_words() {
        let tokenizer = Tokenizer::new();
        let tokens = tokenizer.tokenize("Hello World");
        assert_eq!(tokens, vec!["Hello", "World"]);
    }

    #[test]
    fn test_whitespace_only_yields_nothing() {
        let tokenizer = Tokenizer::new();
        assert!(tokenizer.tokenize("").is_empty());
        assert!(tokenizer.tokenize("   \t\n  ").is_empty());
        assert!(tokenizer.tokenize("\u{3000}").is_empty());
    }

    #[test]
    fn test_mixed_order_preserved() {
        let tokenizer = Tokenizer::new();
        let tokens = tokenizer.tokenize("search 中文 engine");
        let search = tokens.iter().position(|t| t == "search").unwrap();
        let engine = tokens.iter().position(|t| t == "engine").unwrap();
        let chinese = tokens.iter().position(|t| t == "中文").unwrap();
        assert!(search < chinese && chinese < engine);
        assert!(tokens.iter().all(|t| t.trim() == t && !t.is_empty()));
    }

    #[test]
    fn test_search_mode_adds_sub_words() {
        let config = TokenizerConfig {
            mode: TokenizeMode::Search,
            ..Default::default()
        };
        let tokenizer = Tokenizer::from_config(&config).unwrap();
        let accurate = Tokenizer::new().tokenize("中华人民共和国");
        let search = tokenizer.tokenize("中华人民共和国");
        assert!(search.len() >= accurate.len());
    }

    #[test]
    fn test_user_dictionary_keeps_custom_word() {
        let dir = std::env::temp_dir().join(format!("mlsearch-dict-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("user.txt");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "曼提科搜索 1000 n").unwrap();

        let config = TokenizerConfig {
            user_dict_path: Some(path.to_string_lossy().into_owned()),
            ..Default::default()
        };
        let tokenizer = Tokenizer::from_config(&config).unwrap();
        assert!(tokenizer.tokenize("曼提科搜索").contains(&"曼提科搜索".to_string()));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_dictionary_is_an_error() {
        let config = TokenizerConfig {
            dict_path: Some("/nonexistent/dict.txt.big".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            Tokenizer::from_config(&config),
            Err(TokenizerError::Open { .. })
        ));
    }
}
