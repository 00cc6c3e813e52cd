use axum::response::Html;

/// Search page, compiled into the binary / 搜索页面（编译时嵌入）
const INDEX_HTML: &str = include_str!("../../static/index.html");

/// GET / - 搜索页面
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
