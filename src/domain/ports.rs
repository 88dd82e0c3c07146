use crate::utils::error::StoreResult;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
pub struct ViewOptions {
    pub reduce: bool,
    pub include_docs: bool,
}

impl ViewOptions {
    /// Full documents, reduction disabled. What the spec loaders use.
    pub fn documents() -> Self {
        Self {
            reduce: false,
            include_docs: true,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ViewResponse {
    pub rows: Vec<ViewRow>,
    #[serde(default)]
    pub total_rows: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct ViewRow {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub key: Value,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub doc: Option<Value>,
}

/// Capability over the document store itself: database-level operations
/// plus handles for document-level access.
#[async_trait]
pub trait SpecStore: Send + Sync {
    async fn database_info(&self, name: &str) -> StoreResult<Value>;

    async fn create_database(&self, name: &str) -> StoreResult<()>;

    fn database(&self, name: &str) -> Arc<dyn SpecDatabase>;
}

/// A handle bound to one logical database.
#[async_trait]
pub trait SpecDatabase: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    async fn get(&self, id: &str) -> StoreResult<Value>;

    /// Inserts a document. With `id` of `None` the store takes the id from
    /// the document body, or assigns one.
    async fn insert(&self, doc: &Value, id: Option<&str>) -> StoreResult<()>;

    async fn view(
        &self,
        design: &str,
        view: &str,
        options: ViewOptions,
    ) -> StoreResult<ViewResponse>;
}

/// Bundled default specification documents. A missing or malformed
/// document is a recoverable condition; each loader applies its own
/// terminal fallback.
pub trait DefaultSpecSource: Send + Sync {
    fn domain_spec(&self) -> Option<Value>;

    fn tag_spec(&self) -> Option<Value>;

    fn score_spec(&self) -> Option<Value>;
}
