use crate::domain::ports::{SpecDatabase, SpecStore};
use crate::utils::error::{BootstrapError, Result, StoreError};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

pub const DATA_DATABASE: &str = "pulse-data";
pub const META_DATABASE: &str = "pulse-meta";

/// Design names as addressed in view queries.
pub const STATS_DESIGN: &str = "stats";
pub const METADATA_DESIGN: &str = "metadata";

pub const STATS_DESIGN_ID: &str = "_design/stats";
pub const METADATA_DESIGN_ID: &str = "_design/metadata";

/// View definitions for the ratings database. Fixed configuration; the
/// map/reduce bodies are store-side JavaScript and must stay byte-stable
/// for wire compatibility with already-provisioned stores.
pub fn stats_design_doc() -> Value {
    json!({
        "_id": STATS_DESIGN_ID,
        "views": {
            "all_ratings": {
                "map": "function (doc) {\n  if(doc.type === 'rating') {\n emit(doc.data.offering_id, 1);}\n}"
            },
            "minmaxavg": {
                "map": "function (doc) {\n  if (doc.type && doc.type === 'rating' && doc.data && doc.data.score && !isNaN(doc.data.score)) {\n    emit(doc.data.offering_id, Number(doc.data.score));\n  }\n}",
                "reduce": "_stats"
            },
            "ratings_per_month": {
                "map": "function (doc) {\n  if(doc.type && doc.type === 'rating' && doc.data && doc.created) { \nemit([doc.data.offering_id, doc.created.substr(0,7)], doc.data.score);}\n}",
                "reduce": "_stats"
            }
        },
        "language": "javascript"
    })
}

/// View definitions for the metadata database: token bookkeeping plus the
/// three specification listings consumed by the loaders.
pub fn metadata_design_doc() -> Value {
    json!({
        "_id": METADATA_DESIGN_ID,
        "views": {
            "auth_tokens": {
                "map": "function (doc) {\n  if(doc.type && doc.type === 'token') {\n    emit(doc._id, [doc.user_name, doc.created]);\n  }\n}"
            },
            "expired_tokens": {
                "reduce": "_count",
                "map": "function (doc) {\n  if(doc.type === 'token') {\n    var remaining = Math.floor(((1800 * 1000) - (new Date() - new Date(doc.created)))/60000);\n    if(remaining <= 0) {\n      emit(doc.user_name, doc.created);      \n    }\n  }\n}"
            },
            "domains_spec": {
                "reduce": "_count",
                "map": "function (doc) {\n if(doc.type && doc.type === \"domain\") {\n  var entities = [];\n  for(var e in doc.entities) {\n  entities.push(doc.entities[e].name);\n }\n  emit(doc.domain_id, entities);    }\n}\n"
            },
            "tag_spec": {
                "map": "function (doc) {\n  if(doc.type && doc.type === 'tags') {\n  var tags = [];\n   for(var t in doc.tags) {\n   tags.push(doc.tags[t].name);\n    }\n    emit(doc._id, tags.sort());  \n  }\n  \n}\n"
            },
            "score_spec": {
                "map": "function (doc) {\n  if(doc._id === 'score_spec') {\n  var scores = [];\n   for(var s in doc.scores) {\n   scores.push(doc.scores[s].name);\n    }\n    emit(doc._id, scores.sort());  \n  }\n  \n}\n"
            }
        },
        "language": "javascript"
    })
}

/// Ensures one logical database exists and carries its design document.
/// Safe to run on every start; an already-provisioned database is left
/// untouched.
pub struct SchemaProvisioner<'a> {
    store: &'a dyn SpecStore,
    database: &'a str,
    design_id: &'a str,
    design_doc: Value,
}

impl<'a> SchemaProvisioner<'a> {
    pub fn new(
        store: &'a dyn SpecStore,
        database: &'a str,
        design_id: &'a str,
        design_doc: Value,
    ) -> Self {
        Self {
            store,
            database,
            design_id,
            design_doc,
        }
    }

    pub async fn ensure(&self) -> Result<Arc<dyn SpecDatabase>> {
        match self.store.database_info(self.database).await {
            Ok(info) => {
                debug!("database \"{}\" stats: {}", self.database, info);
                let db = self.store.database(self.database);
                match db.get(self.design_id).await {
                    Ok(_) => {
                        debug!(
                            "design document {} was found in database \"{}\"",
                            self.design_id, self.database
                        );
                        Ok(db)
                    }
                    Err(StoreError::NotFound) => {
                        debug!(
                            "design document {} was not found in database \"{}\"",
                            self.design_id, self.database
                        );
                        self.insert_design(db.as_ref()).await?;
                        Ok(db)
                    }
                    Err(err) => Err(BootstrapError::provision(
                        self.database,
                        format!("cannot check design document {}: {}", self.design_id, err),
                    )),
                }
            }
            Err(err) => {
                info!(
                    "cannot get information about database \"{}\": {}",
                    self.database, err
                );
                self.store
                    .create_database(self.database)
                    .await
                    .map_err(|err| {
                        BootstrapError::provision(
                            self.database,
                            format!("cannot create database: {}", err),
                        )
                    })?;
                let db = self.store.database(self.database);
                self.insert_design(db.as_ref()).await?;
                Ok(db)
            }
        }
    }

    async fn insert_design(&self, db: &dyn SpecDatabase) -> Result<()> {
        db.insert(&self.design_doc, Some(self.design_id))
            .await
            .map_err(|err| {
                BootstrapError::provision(
                    self.database,
                    format!("cannot create design document {}: {}", self.design_id, err),
                )
            })?;
        info!(
            "created design document {} in database \"{}\"",
            self.design_id, self.database
        );
        Ok(())
    }
}
