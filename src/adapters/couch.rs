use crate::domain::ports::{SpecDatabase, SpecStore, ViewOptions, ViewResponse};
use crate::utils::error::{StoreError, StoreResult};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use url::Url;

/// CouchDB/Cloudant client. One instance per process; database handles
/// share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct CouchStore {
    base: Url,
    client: Client,
}

impl CouchStore {
    pub fn new(url: &str) -> StoreResult<Self> {
        let mut base = Url::parse(url)?;
        // Url::join drops the last path segment without this.
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        Ok(Self {
            base,
            client: Client::new(),
        })
    }

    fn database_url(&self, name: &str) -> StoreResult<Url> {
        Ok(self.base.join(&format!("{}/", name))?)
    }
}

async fn expect_json(response: Response) -> StoreResult<Value> {
    expect_status(response).await?.json().await.map_err(Into::into)
}

async fn expect_status(response: Response) -> StoreResult<Response> {
    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::NOT_FOUND => Err(StoreError::NotFound),
        StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => Err(StoreError::Conflict),
        status => Err(StoreError::Unexpected {
            status: status.as_u16(),
        }),
    }
}

#[async_trait]
impl SpecStore for CouchStore {
    async fn database_info(&self, name: &str) -> StoreResult<Value> {
        let url = self.database_url(name)?;
        let response = self.client.get(url).send().await?;
        expect_json(response).await
    }

    async fn create_database(&self, name: &str) -> StoreResult<()> {
        let url = self.database_url(name)?;
        let response = self.client.put(url).send().await?;
        expect_status(response).await?;
        Ok(())
    }

    fn database(&self, name: &str) -> Arc<dyn SpecDatabase> {
        Arc::new(CouchDatabase {
            name: name.to_string(),
            base: self.base.clone(),
            client: self.client.clone(),
        })
    }
}

#[derive(Debug)]
pub struct CouchDatabase {
    name: String,
    base: Url,
    client: Client,
}

impl CouchDatabase {
    fn document_url(&self, id: &str) -> StoreResult<Url> {
        Ok(self.base.join(&format!("{}/{}", self.name, id))?)
    }
}

#[async_trait]
impl SpecDatabase for CouchDatabase {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, id: &str) -> StoreResult<Value> {
        let url = self.document_url(id)?;
        let response = self.client.get(url).send().await?;
        expect_json(response).await
    }

    async fn insert(&self, doc: &Value, id: Option<&str>) -> StoreResult<()> {
        let doc_id = id.or_else(|| doc.get("_id").and_then(Value::as_str));
        let response = match doc_id {
            Some(doc_id) => {
                let url = self.document_url(doc_id)?;
                self.client.put(url).json(doc).send().await?
            }
            None => {
                let url = self.base.join(&self.name)?;
                self.client.post(url).json(doc).send().await?
            }
        };
        expect_status(response).await?;
        Ok(())
    }

    async fn view(
        &self,
        design: &str,
        view: &str,
        options: ViewOptions,
    ) -> StoreResult<ViewResponse> {
        let url = self.document_url(&format!("_design/{}/_view/{}", design, view))?;
        let response = self
            .client
            .get(url)
            .query(&[
                ("reduce", options.reduce.to_string()),
                ("include_docs", options.include_docs.to_string()),
            ])
            .send()
            .await?;
        let body = expect_json(response).await?;
        Ok(serde_json::from_value(body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_database_info_found_and_missing() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/pulse-data/");
            then.status(200).json_body(json!({"db_name": "pulse-data", "doc_count": 3}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/missing/");
            then.status(404).json_body(json!({"error": "not_found"}));
        });

        let store = CouchStore::new(&server.base_url()).unwrap();

        let info = store.database_info("pulse-data").await.unwrap();
        assert_eq!(info["doc_count"], 3);

        assert!(matches!(
            store.database_info("missing").await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_create_database_conflict() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(PUT).path("/pulse-meta/");
            then.status(412).json_body(json!({"error": "file_exists"}));
        });

        let store = CouchStore::new(&server.base_url()).unwrap();
        assert!(matches!(
            store.create_database("pulse-meta").await,
            Err(StoreError::Conflict)
        ));
    }

    #[tokio::test]
    async fn test_insert_uses_id_from_document_body() {
        let server = MockServer::start();
        let put_mock = server.mock(|when, then| {
            when.method(PUT)
                .path("/pulse-meta/score_spec")
                .json_body_partial(r#"{"_id": "score_spec"}"#);
            then.status(201).json_body(json!({"ok": true}));
        });

        let store = CouchStore::new(&server.base_url()).unwrap();
        let db = store.database("pulse-meta");
        db.insert(&json!({"_id": "score_spec", "scores": []}), None)
            .await
            .unwrap();

        put_mock.assert();
    }

    #[tokio::test]
    async fn test_insert_without_id_posts_to_database() {
        let server = MockServer::start();
        let post_mock = server.mock(|when, then| {
            when.method(POST).path("/pulse-meta");
            then.status(201).json_body(json!({"ok": true, "id": "generated"}));
        });

        let store = CouchStore::new(&server.base_url()).unwrap();
        let db = store.database("pulse-meta");
        db.insert(&json!({"type": "tags", "tags": []}), None)
            .await
            .unwrap();

        post_mock.assert();
    }

    #[tokio::test]
    async fn test_view_query_parses_rows() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/pulse-meta/_design/metadata/_view/domains_spec")
                .query_param("reduce", "false")
                .query_param("include_docs", "true");
            then.status(200).json_body(json!({
                "total_rows": 1,
                "offset": 0,
                "rows": [{
                    "id": "doc1",
                    "key": "products",
                    "value": ["Mobile App"],
                    "doc": {"type": "domain", "domain_id": "products"}
                }]
            }));
        });

        let store = CouchStore::new(&server.base_url()).unwrap();
        let db = store.database("pulse-meta");
        let response = db
            .view("metadata", "domains_spec", ViewOptions::documents())
            .await
            .unwrap();

        assert_eq!(response.rows.len(), 1);
        let doc = response.rows[0].doc.as_ref().unwrap();
        assert_eq!(doc["domain_id"], "products");
    }

    #[tokio::test]
    async fn test_get_document_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/pulse-meta/score_spec");
            then.status(404).json_body(json!({"error": "not_found"}));
        });

        let store = CouchStore::new(&server.base_url()).unwrap();
        let db = store.database("pulse-meta");
        assert!(matches!(
            db.get("score_spec").await,
            Err(StoreError::NotFound)
        ));
    }
}
