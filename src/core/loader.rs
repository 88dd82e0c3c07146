use crate::core::provision::METADATA_DESIGN;
use crate::domain::docs::{DomainDocument, ScoresDocument, TagsDocument};
use crate::domain::model::{DomainSpec, ScoreSpec, TagSet};
use crate::domain::ports::{DefaultSpecSource, SpecDatabase, ViewOptions};
use crate::utils::error::{BootstrapError, Result, StoreError};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

pub const SCORE_SPEC_DOC_ID: &str = "score_spec";

/// Strategy for one specification kind in the fallback chain: custom
/// documents in the store, then the bundled default, then the kind's own
/// terminal fallback.
#[async_trait]
pub trait SpecKind {
    type Spec;

    /// Kind label used in log messages.
    const LABEL: &'static str;

    /// Tier 1: fetch and validate custom documents. `Ok(None)` means no
    /// usable custom documents were found and moves the chain to the
    /// default tier. An error is a store-availability failure and fatal.
    async fn fetch_custom(&self, db: &dyn SpecDatabase) -> Result<Option<Self::Spec>>;

    /// The bundled default document for this kind, if the source has one.
    fn default_document(&self, source: &dyn DefaultSpecSource) -> Option<Value>;

    /// Validates and converts the default document. `None` marks it
    /// unusable.
    fn parse_default(&self, doc: &Value) -> Option<Self::Spec>;

    /// Tier 3: the terminal result when no default is usable.
    fn fall_back(&self) -> Result<Self::Spec>;
}

/// Runs the three-tier chain for one specification kind. When the default
/// tier is used, the default document is persisted back into the store so
/// the next start finds it as a custom document; that write is best-effort
/// and never fails the load.
pub async fn load_with_fallback<K: SpecKind>(
    kind: &K,
    db: &dyn SpecDatabase,
    defaults: &dyn DefaultSpecSource,
) -> Result<K::Spec> {
    if let Some(spec) = kind.fetch_custom(db).await? {
        return Ok(spec);
    }

    debug!(
        "no custom {} specification was found, trying application defaults",
        K::LABEL
    );

    let doc = match kind.default_document(defaults) {
        Some(doc) => doc,
        None => {
            warn!("default {} specification could not be loaded", K::LABEL);
            return kind.fall_back();
        }
    };

    let spec = match kind.parse_default(&doc) {
        Some(spec) => spec,
        None => return kind.fall_back(),
    };

    if let Err(err) = db.insert(&doc, None).await {
        warn!(
            "default {} specification could not be saved in the repository database: {}",
            K::LABEL,
            err
        );
    }

    Ok(spec)
}

pub struct DomainSpecs;

#[async_trait]
impl SpecKind for DomainSpecs {
    type Spec = DomainSpec;

    const LABEL: &'static str = "domain";

    async fn fetch_custom(&self, db: &dyn SpecDatabase) -> Result<Option<DomainSpec>> {
        debug!("fetching documents using \"domains_spec\" view");
        let response = db
            .view(METADATA_DESIGN, "domains_spec", ViewOptions::documents())
            .await
            .map_err(|err| {
                BootstrapError::load(format!("Fetch for \"domains_spec\" view failed: {}", err))
            })?;

        let mut spec = DomainSpec::default();
        for row in response.rows {
            let doc = match row.doc {
                Some(doc) => doc,
                None => continue,
            };
            match DomainDocument::parse(&doc) {
                Ok(parsed) => spec.add_domain(parsed.into()),
                Err(err) => warn!("ignoring invalid domain document {:?}: {}", row.id, err),
            }
        }

        Ok(if spec.is_empty() { None } else { Some(spec) })
    }

    fn default_document(&self, source: &dyn DefaultSpecSource) -> Option<Value> {
        source.domain_spec()
    }

    fn parse_default(&self, doc: &Value) -> Option<DomainSpec> {
        match DomainDocument::parse(doc) {
            Ok(parsed) => {
                let mut spec = DomainSpec::default();
                spec.add_domain(parsed.into());
                Some(spec)
            }
            Err(err) => {
                warn!("default domain specification document is invalid: {}", err);
                None
            }
        }
    }

    fn fall_back(&self) -> Result<DomainSpec> {
        // Nothing can be served without a domain taxonomy.
        Err(BootstrapError::load(
            "no valid domain specification available",
        ))
    }
}

pub struct TagSpecs;

#[async_trait]
impl SpecKind for TagSpecs {
    type Spec = Vec<TagSet>;

    const LABEL: &'static str = "tag";

    async fn fetch_custom(&self, db: &dyn SpecDatabase) -> Result<Option<Vec<TagSet>>> {
        debug!("fetching documents using \"tag_spec\" view");
        let response = db
            .view(METADATA_DESIGN, "tag_spec", ViewOptions::documents())
            .await
            .map_err(|err| {
                BootstrapError::load(format!("Fetch for \"tag_spec\" view failed: {}", err))
            })?;

        let mut sets = Vec::new();
        for row in response.rows {
            let doc = match row.doc {
                Some(doc) => doc,
                None => continue,
            };
            match TagsDocument::parse(&doc) {
                Ok(parsed) => sets.push(parsed.into()),
                Err(err) => warn!("ignoring invalid tags document {:?}: {}", row.id, err),
            }
        }

        Ok(if sets.is_empty() { None } else { Some(sets) })
    }

    fn default_document(&self, source: &dyn DefaultSpecSource) -> Option<Value> {
        source.tag_spec()
    }

    fn parse_default(&self, doc: &Value) -> Option<Vec<TagSet>> {
        match TagsDocument::parse(doc) {
            Ok(parsed) => Some(vec![parsed.into()]),
            Err(err) => {
                warn!("default tag specification document is invalid: {}", err);
                None
            }
        }
    }

    fn fall_back(&self) -> Result<Vec<TagSet>> {
        // Tags are optional decoration; no tags will be used.
        Ok(Vec::new())
    }
}

pub struct ScoreSpecs;

#[async_trait]
impl SpecKind for ScoreSpecs {
    type Spec = ScoreSpec;

    const LABEL: &'static str = "score";

    async fn fetch_custom(&self, db: &dyn SpecDatabase) -> Result<Option<ScoreSpec>> {
        debug!("fetching score specification document \"{}\"", SCORE_SPEC_DOC_ID);
        match db.get(SCORE_SPEC_DOC_ID).await {
            Ok(doc) => match ScoresDocument::parse(&doc) {
                Ok(parsed) => Ok(Some(parsed.into())),
                Err(err) => {
                    warn!("ignoring invalid score specification document: {}", err);
                    Ok(None)
                }
            },
            Err(StoreError::NotFound) => Ok(None),
            Err(err) => Err(BootstrapError::load(format!(
                "Fetch of custom score specification failed: {}",
                err
            ))),
        }
    }

    fn default_document(&self, source: &dyn DefaultSpecSource) -> Option<Value> {
        source.score_spec()
    }

    fn parse_default(&self, doc: &Value) -> Option<ScoreSpec> {
        match ScoresDocument::parse(doc) {
            Ok(parsed) => Some(parsed.into()),
            Err(err) => {
                warn!("default score specification document is invalid: {}", err);
                None
            }
        }
    }

    fn fall_back(&self) -> Result<ScoreSpec> {
        Ok(ScoreSpec::built_in())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::defaults::StaticSpecSource;
    use crate::domain::ports::ViewResponse;
    use crate::utils::error::StoreResult;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default, Debug)]
    struct MockDatabase {
        documents: HashMap<String, Value>,
        views: HashMap<String, Value>,
        fail_views: bool,
        fail_get: bool,
        fail_insert: bool,
        inserted: Mutex<Vec<Value>>,
    }

    impl MockDatabase {
        fn with_view_rows(mut self, view: &str, docs: Vec<Value>) -> Self {
            let rows: Vec<Value> = docs
                .iter()
                .enumerate()
                .map(|(i, doc)| json!({"id": format!("doc{}", i), "key": null, "value": null, "doc": doc}))
                .collect();
            self.views.insert(
                view.to_string(),
                json!({"total_rows": rows.len(), "rows": rows}),
            );
            self
        }

        fn with_document(mut self, id: &str, doc: Value) -> Self {
            self.documents.insert(id.to_string(), doc);
            self
        }

        fn fail_views(mut self) -> Self {
            self.fail_views = true;
            self
        }

        fn fail_get(mut self) -> Self {
            self.fail_get = true;
            self
        }

        fn fail_insert(mut self) -> Self {
            self.fail_insert = true;
            self
        }

        fn inserted(&self) -> Vec<Value> {
            self.inserted.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SpecDatabase for MockDatabase {
        fn name(&self) -> &str {
            "pulse-meta"
        }

        async fn get(&self, id: &str) -> StoreResult<Value> {
            if self.fail_get {
                return Err(StoreError::Unexpected { status: 500 });
            }
            self.documents.get(id).cloned().ok_or(StoreError::NotFound)
        }

        async fn insert(&self, doc: &Value, _id: Option<&str>) -> StoreResult<()> {
            if self.fail_insert {
                return Err(StoreError::Unexpected { status: 500 });
            }
            self.inserted.lock().unwrap().push(doc.clone());
            Ok(())
        }

        async fn view(
            &self,
            _design: &str,
            view: &str,
            _options: ViewOptions,
        ) -> StoreResult<ViewResponse> {
            if self.fail_views {
                return Err(StoreError::Unexpected { status: 500 });
            }
            let body = self
                .views
                .get(view)
                .cloned()
                .unwrap_or_else(|| json!({"total_rows": 0, "rows": []}));
            Ok(serde_json::from_value(body).unwrap())
        }
    }

    fn domain_doc(domain_id: &str, names: &[&str]) -> Value {
        let entities: Vec<Value> = names
            .iter()
            .enumerate()
            .map(|(i, name)| json!({"id": format!("{}_{}", domain_id, i), "name": name}))
            .collect();
        json!({"type": "domain", "domain_id": domain_id, "entities": entities})
    }

    fn defaults_with_all() -> StaticSpecSource {
        StaticSpecSource {
            domains: Some(domain_doc("products", &["Web Portal", "mobile app"])),
            tags: Some(json!({
                "type": "tags",
                "set_name": "default",
                "tags": [{"id": "t1", "name": "Performance"}]
            })),
            scores: Some(json!({
                "_id": "score_spec",
                "scores": [
                    {"name": "low", "value": 0, "sentiment": "negative"},
                    {"name": "high", "value": 10, "sentiment": "positive"}
                ]
            })),
        }
    }

    #[tokio::test]
    async fn test_domains_loaded_from_custom_documents() {
        let db = MockDatabase::default().with_view_rows(
            "domains_spec",
            vec![
                domain_doc("products", &["zeta", "Alpha", "beta"]),
                json!({"type": "domain", "domain_id": "", "entities": []}),
                domain_doc("services", &["Support"]),
            ],
        );

        let spec = load_with_fallback(&DomainSpecs, &db, &StaticSpecSource::empty())
            .await
            .unwrap();

        assert_eq!(spec.domains().count(), 2);
        let names: Vec<&str> = spec
            .domain("products")
            .unwrap()
            .offerings()
            .iter()
            .map(|o| o.name.as_str())
            .collect();
        assert_eq!(names, vec!["Alpha", "beta", "zeta"]);
        // tier 1 succeeded, nothing is written back
        assert!(db.inserted().is_empty());
    }

    #[tokio::test]
    async fn test_domains_fall_back_to_default_and_persist_it() {
        let db = MockDatabase::default();
        let defaults = defaults_with_all();

        let spec = load_with_fallback(&DomainSpecs, &db, &defaults)
            .await
            .unwrap();

        assert!(!spec.is_empty());
        let offerings: Vec<&str> = spec
            .domain("products")
            .unwrap()
            .offerings()
            .iter()
            .map(|o| o.name.as_str())
            .collect();
        assert_eq!(offerings, vec!["mobile app", "Web Portal"]);

        let inserted = db.inserted();
        assert_eq!(inserted.len(), 1);
        assert_eq!(inserted[0]["domain_id"], "products");
    }

    #[tokio::test]
    async fn test_domains_all_rows_invalid_fall_back_to_default() {
        let db = MockDatabase::default().with_view_rows(
            "domains_spec",
            vec![json!({"type": "domain", "domain_id": "broken", "entities": []})],
        );

        let spec = load_with_fallback(&DomainSpecs, &db, &defaults_with_all())
            .await
            .unwrap();

        assert!(spec.domain("products").is_some());
    }

    #[tokio::test]
    async fn test_domains_without_default_fail() {
        let db = MockDatabase::default();

        let err = load_with_fallback(&DomainSpecs, &db, &StaticSpecSource::empty())
            .await
            .unwrap_err();

        assert!(matches!(err, BootstrapError::LoadError { .. }));
    }

    #[tokio::test]
    async fn test_domains_view_failure_is_fatal_even_with_default() {
        let db = MockDatabase::default().fail_views();

        let err = load_with_fallback(&DomainSpecs, &db, &defaults_with_all())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("domains_spec"));
    }

    #[tokio::test]
    async fn test_domains_persist_failure_does_not_fail_the_load() {
        let db = MockDatabase::default().fail_insert();

        let spec = load_with_fallback(&DomainSpecs, &db, &defaults_with_all())
            .await
            .unwrap();

        assert!(!spec.is_empty());
    }

    #[tokio::test]
    async fn test_tags_loaded_from_custom_documents() {
        let db = MockDatabase::default().with_view_rows(
            "tag_spec",
            vec![
                json!({"type": "tags", "set_name": "defects", "tags": [
                    {"id": "t2", "name": "slow"},
                    {"id": "t1", "name": "crash"}
                ]}),
                json!({"type": "tags", "set_name": "empty", "tags": []}),
            ],
        );

        let sets = load_with_fallback(&TagSpecs, &db, &StaticSpecSource::empty())
            .await
            .unwrap();

        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].name(), "defects");
        assert_eq!(sets[0].tags()[0].name, "crash");
    }

    #[tokio::test]
    async fn test_tags_degrade_to_empty_without_default() {
        let db = MockDatabase::default();

        let sets = load_with_fallback(&TagSpecs, &db, &StaticSpecSource::empty())
            .await
            .unwrap();

        assert!(sets.is_empty());
        assert!(db.inserted().is_empty());
    }

    #[tokio::test]
    async fn test_tags_view_failure_is_fatal() {
        let db = MockDatabase::default().fail_views();

        let err = load_with_fallback(&TagSpecs, &db, &StaticSpecSource::empty())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("tag_spec"));
    }

    #[tokio::test]
    async fn test_scores_loaded_from_custom_document() {
        let db = MockDatabase::default().with_document(
            SCORE_SPEC_DOC_ID,
            json!({"scores": [
                {"name": "bad", "value": 1, "sentiment": "negative"},
                {"name": "good", "value": 5, "sentiment": "positive"},
                {"name": "good again", "value": 5, "sentiment": "positive"}
            ]}),
        );

        let spec = load_with_fallback(&ScoreSpecs, &db, &StaticSpecSource::empty())
            .await
            .unwrap();

        let values: Vec<f64> = spec.scores().iter().map(|s| s.value).collect();
        assert_eq!(values, vec![1.0, 5.0]);
        assert_eq!(spec.score_by_value(5.0).unwrap().name, "good again");
    }

    #[tokio::test]
    async fn test_scores_missing_document_uses_default_and_persists() {
        let db = MockDatabase::default();
        let defaults = defaults_with_all();

        let spec = load_with_fallback(&ScoreSpecs, &db, &defaults)
            .await
            .unwrap();

        assert_eq!(spec.lowest_score().unwrap().value, 0.0);
        assert_eq!(spec.highest_score().unwrap().value, 10.0);

        let inserted = db.inserted();
        assert_eq!(inserted.len(), 1);
        assert_eq!(inserted[0]["_id"], "score_spec");
    }

    #[tokio::test]
    async fn test_scores_degrade_to_built_in_without_default() {
        let db = MockDatabase::default();

        let spec = load_with_fallback(&ScoreSpecs, &db, &StaticSpecSource::empty())
            .await
            .unwrap();

        assert_eq!(spec.scores().len(), 11);
        assert_eq!(spec.sentiment_by_value(3.0).unwrap(), crate::domain::model::Sentiment::Negative);
        assert_eq!(spec.sentiment_by_value(8.0).unwrap(), crate::domain::model::Sentiment::Positive);
    }

    #[tokio::test]
    async fn test_scores_store_failure_is_fatal() {
        let db = MockDatabase::default().fail_get();

        let err = load_with_fallback(&ScoreSpecs, &db, &defaults_with_all())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("score specification"));
    }

    #[tokio::test]
    async fn test_scores_invalid_custom_document_uses_default() {
        let db = MockDatabase::default()
            .with_document(SCORE_SPEC_DOC_ID, json!({"scores": "not-an-array"}));

        let spec = load_with_fallback(&ScoreSpecs, &db, &defaults_with_all())
            .await
            .unwrap();

        assert_eq!(spec.highest_score().unwrap().name, "high");
    }
}
