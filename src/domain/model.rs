use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A product or service users can rate. Looked up by id across a whole
/// spec, or by name within one domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offering {
    pub id: String,
    pub name: String,
}

/// A named group of offerings. Offerings are sorted case-insensitively by
/// name at construction time and keep that order (display order).
#[derive(Debug, Clone)]
pub struct Domain {
    name: String,
    offerings: Vec<Offering>,
}

impl Domain {
    pub fn new(name: impl Into<String>, mut offerings: Vec<Offering>) -> Self {
        offerings.sort_by_key(|offering| offering.name.to_lowercase());
        Self {
            name: name.into(),
            offerings,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn offerings(&self) -> &[Offering] {
        &self.offerings
    }

    pub fn offering_by_id(&self, offering_id: &str) -> Option<&Offering> {
        self.offerings
            .iter()
            .find(|offering| offering.id == offering_id)
    }

    pub fn offering_by_name(&self, offering_name: &str) -> Option<&Offering> {
        self.offerings
            .iter()
            .find(|offering| offering.name == offering_name)
    }
}

/// A set of domains, keyed by domain name.
#[derive(Debug, Clone)]
pub struct DomainSpec {
    name: String,
    domains: HashMap<String, Domain>,
}

impl DomainSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domains: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Adds a domain, replacing any existing domain with the same name.
    /// Domains without a name are ignored.
    pub fn add_domain(&mut self, domain: Domain) {
        if !domain.name().is_empty() {
            self.domains.insert(domain.name().to_string(), domain);
        }
    }

    pub fn remove_domain(&mut self, domain_name: &str) {
        self.domains.remove(domain_name);
    }

    pub fn domains(&self) -> impl Iterator<Item = &Domain> {
        self.domains.values()
    }

    pub fn domain(&self, domain_name: &str) -> Option<&Domain> {
        self.domains.get(domain_name)
    }

    /// Finds an offering by id, searching every domain in the spec.
    pub fn offering_by_id(&self, offering_id: &str) -> Option<&Offering> {
        self.domains
            .values()
            .find_map(|domain| domain.offering_by_id(offering_id))
    }
}

impl Default for DomainSpec {
    fn default() -> Self {
        Self::new("default")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
}

/// A named set of tags, sorted by name at construction time.
#[derive(Debug, Clone)]
pub struct TagSet {
    name: String,
    tags: Vec<Tag>,
}

impl TagSet {
    pub fn new(name: impl Into<String>, mut tags: Vec<Tag>) -> Self {
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            name: name.into(),
            tags,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn tag_by_id(&self, tag_id: &str) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.id == tag_id)
    }

    pub fn tag_by_name(&self, tag_name: &str) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.name == tag_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Negative,
    Neutral,
    Positive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub name: String,
    pub value: f64,
    pub sentiment: Option<Sentiment>,
}

impl Score {
    pub fn new(name: impl Into<String>, value: f64, sentiment: Option<Sentiment>) -> Self {
        Self {
            name: name.into(),
            value,
            sentiment,
        }
    }
}

/// A set of scores, kept sorted ascending by value with unique values.
/// Inserting a score whose value is already present replaces the earlier
/// entry (last inserted wins).
#[derive(Debug, Clone)]
pub struct ScoreSpec {
    name: String,
    scores: Vec<Score>,
}

impl ScoreSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scores: Vec::new(),
        }
    }

    /// The built-in 0..=10 score set used when neither a custom nor a
    /// bundled default specification is available.
    pub fn built_in() -> Self {
        let mut spec = ScoreSpec::new("default");
        for value in 0..=10 {
            let name = match value {
                0 => "0 (worst)".to_string(),
                10 => "10 (best)".to_string(),
                other => other.to_string(),
            };
            let sentiment = match value {
                0..=3 => Sentiment::Negative,
                4..=7 => Sentiment::Neutral,
                _ => Sentiment::Positive,
            };
            spec.add_score(Score::new(name, value as f64, Some(sentiment)));
        }
        spec
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn add_score(&mut self, score: Score) {
        self.scores.retain(|existing| existing.value != score.value);
        let index = self
            .scores
            .partition_point(|existing| existing.value < score.value);
        self.scores.insert(index, score);
    }

    pub fn remove_score_by_name(&mut self, name: &str) {
        self.scores.retain(|score| score.name != name);
    }

    pub fn remove_score_by_value(&mut self, value: f64) {
        self.scores.retain(|score| score.value != value);
    }

    pub fn scores(&self) -> &[Score] {
        &self.scores
    }

    pub fn score_by_value(&self, value: f64) -> Option<&Score> {
        self.scores.iter().find(|score| score.value == value)
    }

    pub fn lowest_score(&self) -> Option<&Score> {
        self.scores.first()
    }

    pub fn highest_score(&self) -> Option<&Score> {
        self.scores.last()
    }

    pub fn sentiment_by_value(&self, value: f64) -> Option<Sentiment> {
        self.score_by_value(value).and_then(|score| score.sentiment)
    }
}

impl Default for ScoreSpec {
    fn default() -> Self {
        Self::new("default")
    }
}
