//! Match expression builder / 全文检索表达式构建
//!
//! Every token becomes its own quoted phrase, tokens are space-joined
//! (implicit AND in the index query language). Inside a phrase every
//! character the query grammar treats as syntax is backslash-escaped, so
//! user text can never leave its phrase.

/// Characters with meaning in the full-text query grammar / 查询语法中的特殊字符
const SPECIAL_CHARS: &[char] = &[
    '\\', '"', '\'', '!', '$', '(', ')', '-', '/', '<', '>', '@', '^', '|', '~', '&', '=', '*',
    '?', '[', ']', '{', '}', ':',
];

/// Escaped, structured expression ready for `MATCH(...)` / 已转义的检索表达式
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchExpression(String);

impl MatchExpression {
    /// Expression that matches nothing / 不匹配任何文档
    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Build a conjunctive match expression from tokens / 由分词结果构建检索表达式
pub fn build<S: AsRef<str>>(tokens: &[S]) -> MatchExpression {
    let phrases: Vec<String> = tokens
        .iter()
        .map(AsRef::as_ref)
        .filter(|token| is_searchable(token))
        .map(quote_token)
        .collect();

    if phrases.is_empty() {
        return MatchExpression::empty();
    }
    MatchExpression(phrases.join(" "))
}

/// Tokens without letters or digits never match an indexed keyword / 纯标点不参与检索
fn is_searchable(token: &str) -> bool {
    token.chars().any(char::is_alphanumeric)
}

/// Quote one token as a phrase / 将单个词转义并加引号
pub fn quote_token(token: &str) -> String {
    let mut out = String::with_capacity(token.len() + 2);
    out.push('"');
    for c in token.chars() {
        if SPECIAL_CHARS.contains(&c) {
            out.push('\\');
            out.push(c);
        } else if c.is_control() {
            // Control characters act as separators in the index; keep the phrase on one line
            out.push(' ');
        } else {
            out.push(c);
        }
    }
    out.push('"');
    out
}

/// Render an expression as a single-quoted SQL string literal / 转为 SQL 字符串字面量
///
/// SphinxQL unescapes backslashes in string literals before the full-text
/// parser runs, so both `\` and `'` need a second level of escaping.
pub fn sql_string_literal(expr: &MatchExpression) -> String {
    let mut out = String::with_capacity(expr.0.len() + 2);
    out.push('\'');
    for c in expr.0.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\0' => out.push_str("\\0"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Split an expression back into the literal text of its phrases.
///
/// Mirrors the index's phrase parsing; returns `None` for anything outside a
/// well-formed phrase (an operator, a bare word, an unterminated quote).
#[cfg(test)]
pub fn parse_phrases(expr: &str) -> Option<Vec<String>> {
    let mut phrases = Vec::new();
    let mut chars = expr.chars().peekable();

    loop {
        while chars.peek() == Some(&' ') {
            chars.next();
        }
        match chars.next() {
            None => return Some(phrases),
            Some('"') => {}
            Some(_) => return None,
        }

        let mut phrase = String::new();
        loop {
            match chars.next()? {
                '\\' => phrase.push(chars.next()?),
                '"' => break,
                c => phrase.push(c),
            }
        }
        // A phrase must be followed by a separator or the end, not a modifier like ~3 or /2
        match chars.peek() {
            None | Some(' ') => phrases.push(phrase),
            Some(_) => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_each_token_quoted_independently() {
        let expr = build(&["中文", "测试"]);
        assert_eq!(expr.as_str(), "\"中文\" \"测试\"");
    }

    #[test]
    fn test_empty_tokens_match_nothing() {
        let none: [&str; 0] = [];
        assert!(build(&none).is_empty());
        assert!(build(&["，", "?", "..."]).is_empty());
    }

    #[test]
    fn test_punctuation_tokens_skipped() {
        let expr = build(&["测试", "，", "test"]);
        assert_eq!(expr.as_str(), "\"测试\" \"test\"");
    }

    #[test]
    fn test_quote_cannot_close_phrase() {
        let expr = build(&["a\" | @title secret \""]);
        assert_eq!(expr.as_str(), r#""a\" \| \@title secret \"""#);
        assert_eq!(
            parse_phrases(expr.as_str()),
            Some(vec!["a\" | @title secret \"".to_string()])
        );
    }

    #[test]
    fn test_operators_escaped() {
        let expr = build(&["-foo", "bar*", "x~3", "(a|b)"]);
        assert_eq!(
            parse_phrases(expr.as_str()),
            Some(vec!["-foo".into(), "bar*".into(), "x~3".into(), "(a|b)".into()])
        );
        assert!(expr.as_str().contains(r"\-foo"));
        assert!(expr.as_str().contains(r"bar\*"));
    }

    #[test]
    fn test_trailing_backslash_stays_inside() {
        let expr = build(&["path\\"]);
        assert_eq!(expr.as_str(), r#""path\\""#);
        assert_eq!(parse_phrases(expr.as_str()), Some(vec!["path\\".to_string()]));
    }

    #[test]
    fn test_sql_literal_escapes_both_levels() {
        let expr = build(&["it's"]);
        // phrase: "it\'s"  ->  SQL: '"it\\\'s"'
        assert_eq!(sql_string_literal(&expr), r#"'"it\\\'s"'"#);
    }

    #[test]
    fn test_parse_phrases_rejects_bare_syntax() {
        assert_eq!(parse_phrases(r#""a" | "b""#), None);
        assert_eq!(parse_phrases(r#""a b"~3"#), None);
        assert_eq!(parse_phrases(r#""unterminated"#), None);
        assert_eq!(parse_phrases(r#"@title "x""#), None);
    }

    proptest! {
        #[test]
        fn prop_tokens_stay_literal(tokens in proptest::collection::vec(".{1,12}", 0..6)) {
            let expr = build(&tokens);
            let searchable: Vec<String> = tokens
                .iter()
                .filter(|t| t.chars().any(char::is_alphanumeric))
                .map(|t| t.chars().map(|c| if c.is_control() { ' ' } else { c }).collect())
                .collect();
            prop_assert_eq!(parse_phrases(expr.as_str()), Some(searchable));
        }

        #[test]
        fn prop_sql_literal_has_no_bare_quote(token in ".{1,16}") {
            let literal = sql_string_literal(&build(&[token]));
            let inner = &literal[1..literal.len() - 1];
            let mut escaped = false;
            for c in inner.chars() {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else {
                    prop_assert_ne!(c, '\'');
                }
            }
            prop_assert!(!escaped);
        }
    }
}
