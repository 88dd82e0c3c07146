//! Raw documents as persisted in the metadata database. Each shape is
//! parsed and validated per record; a document failing validation is
//! reported to the caller, never treated as an aggregate failure.

use crate::domain::model::{Domain, Offering, ScoreSpec, Sentiment, Tag, TagSet};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("malformed document: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("expected document type \"{expected}\"")]
    WrongType { expected: &'static str },

    #[error("document field \"{field}\" is missing or empty")]
    Empty { field: &'static str },
}

#[derive(Debug, Deserialize)]
pub struct DomainDocument {
    #[serde(rename = "type")]
    pub doc_type: String,
    pub domain_id: String,
    pub entities: Vec<EntityRecord>,
}

#[derive(Debug, Deserialize)]
pub struct EntityRecord {
    pub id: String,
    pub name: String,
}

impl DomainDocument {
    pub fn parse(value: &Value) -> Result<Self, DocumentError> {
        let doc: DomainDocument = serde_json::from_value(value.clone())?;
        if doc.doc_type != "domain" {
            return Err(DocumentError::WrongType { expected: "domain" });
        }
        if doc.domain_id.is_empty() {
            return Err(DocumentError::Empty {
                field: "domain_id",
            });
        }
        if doc.entities.is_empty() {
            return Err(DocumentError::Empty { field: "entities" });
        }
        Ok(doc)
    }
}

impl From<DomainDocument> for Domain {
    fn from(doc: DomainDocument) -> Self {
        let offerings = doc
            .entities
            .into_iter()
            .map(|entity| Offering {
                id: entity.id,
                name: entity.name,
            })
            .collect();
        Domain::new(doc.domain_id, offerings)
    }
}

#[derive(Debug, Deserialize)]
pub struct TagsDocument {
    #[serde(rename = "type")]
    pub doc_type: String,
    pub set_name: String,
    pub tags: Vec<TagRecord>,
}

#[derive(Debug, Deserialize)]
pub struct TagRecord {
    pub id: String,
    pub name: String,
}

impl TagsDocument {
    pub fn parse(value: &Value) -> Result<Self, DocumentError> {
        let doc: TagsDocument = serde_json::from_value(value.clone())?;
        if doc.doc_type != "tags" {
            return Err(DocumentError::WrongType { expected: "tags" });
        }
        if doc.tags.is_empty() {
            return Err(DocumentError::Empty { field: "tags" });
        }
        Ok(doc)
    }
}

impl From<TagsDocument> for TagSet {
    fn from(doc: TagsDocument) -> Self {
        let tags = doc
            .tags
            .into_iter()
            .map(|tag| Tag {
                id: tag.id,
                name: tag.name,
            })
            .collect();
        TagSet::new(doc.set_name, tags)
    }
}

/// The score specification is a single named document, so it carries no
/// `type` discriminator.
#[derive(Debug, Deserialize)]
pub struct ScoresDocument {
    pub scores: Vec<ScoreRecord>,
}

#[derive(Debug, Deserialize)]
pub struct ScoreRecord {
    pub name: String,
    pub value: f64,
    #[serde(default)]
    pub sentiment: Option<Sentiment>,
}

impl ScoresDocument {
    pub fn parse(value: &Value) -> Result<Self, DocumentError> {
        let doc: ScoresDocument = serde_json::from_value(value.clone())?;
        if doc.scores.is_empty() {
            return Err(DocumentError::Empty { field: "scores" });
        }
        Ok(doc)
    }
}

impl From<ScoresDocument> for ScoreSpec {
    fn from(doc: ScoresDocument) -> Self {
        let mut spec = ScoreSpec::default();
        for record in doc.scores {
            spec.add_score(crate::domain::model::Score::new(
                record.name,
                record.value,
                record.sentiment,
            ));
        }
        spec
    }
}
