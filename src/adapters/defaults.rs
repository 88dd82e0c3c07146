use crate::domain::ports::DefaultSpecSource;
use serde_json::Value;
use tracing::warn;

const DEFAULT_DOMAIN_SPEC: &str = include_str!("../../default_specs/default_domain_spec.json");
const DEFAULT_TAG_SPEC: &str = include_str!("../../default_specs/default_tag_spec.json");
const DEFAULT_SCORE_SPEC: &str = include_str!("../../default_specs/default_score_spec.json");

/// Default specification documents compiled in from `default_specs/`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledSpecSource;

impl BundledSpecSource {
    pub fn new() -> Self {
        Self
    }

    fn parse(raw: &str, kind: &str) -> Option<Value> {
        match serde_json::from_str(raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("bundled default {} specification does not parse: {}", kind, err);
                None
            }
        }
    }
}

impl DefaultSpecSource for BundledSpecSource {
    fn domain_spec(&self) -> Option<Value> {
        Self::parse(DEFAULT_DOMAIN_SPEC, "domain")
    }

    fn tag_spec(&self) -> Option<Value> {
        Self::parse(DEFAULT_TAG_SPEC, "tag")
    }

    fn score_spec(&self) -> Option<Value> {
        Self::parse(DEFAULT_SCORE_SPEC, "score")
    }
}

/// In-memory source. Lets tests and local fixtures stand in for the
/// bundled documents.
#[derive(Debug, Clone, Default)]
pub struct StaticSpecSource {
    pub domains: Option<Value>,
    pub tags: Option<Value>,
    pub scores: Option<Value>,
}

impl StaticSpecSource {
    pub fn empty() -> Self {
        Self::default()
    }
}

impl DefaultSpecSource for StaticSpecSource {
    fn domain_spec(&self) -> Option<Value> {
        self.domains.clone()
    }

    fn tag_spec(&self) -> Option<Value> {
        self.tags.clone()
    }

    fn score_spec(&self) -> Option<Value> {
        self.scores.clone()
    }
}
