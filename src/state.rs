use mlsearch::search::Pipeline;

/// Shared, read-only application state / 应用共享状态
///
/// Nothing here is mutated after startup, so handlers need no locks.
pub struct AppState {
    pub pipeline: Pipeline,
    /// Backend name for the health endpoint / 检索后端名称
    pub backend: String,
}

impl AppState {
    pub fn new(pipeline: Pipeline, backend: impl Into<String>) -> Self {
        Self {
            pipeline,
            backend: backend.into(),
        }
    }
}
