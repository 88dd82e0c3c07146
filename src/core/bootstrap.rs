use crate::config::AppConfig;
use crate::core::loader::{self, DomainSpecs, ScoreSpecs, TagSpecs};
use crate::core::provision::{self, SchemaProvisioner};
use crate::domain::model::{DomainSpec, ScoreSpec, TagSet};
use crate::domain::ports::{DefaultSpecSource, SpecDatabase, SpecStore};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use std::sync::Arc;
use tracing::{debug, info};

/// Everything the serving layer needs: the two database handles and the
/// three loaded specifications. Handles are shared read-only from here on.
pub struct BootstrapResult {
    pub data: Arc<dyn SpecDatabase>,
    pub meta: Arc<dyn SpecDatabase>,
    pub domains: DomainSpec,
    pub tag_sets: Vec<TagSet>,
    pub scores: ScoreSpec,
}

impl std::fmt::Debug for BootstrapResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapResult")
            .field("data", &self.data.name())
            .field("meta", &self.meta.name())
            .field("domains", &self.domains)
            .field("tag_sets", &self.tag_sets)
            .field("scores", &self.scores)
            .finish()
    }
}

/// Top-level orchestrator. Provisions both databases concurrently, then
/// loads the three specifications concurrently against the metadata
/// handle. The first fatal error wins; degraded loader results (empty
/// tags, built-in scores) are not errors.
pub struct Bootstrapper<S, D> {
    store: S,
    defaults: D,
}

impl<S: SpecStore, D: DefaultSpecSource> Bootstrapper<S, D> {
    pub fn new(store: S, defaults: D) -> Self {
        Self { store, defaults }
    }

    pub async fn run(&self, config: &AppConfig) -> Result<BootstrapResult> {
        config.validate()?;

        let data_provisioner = SchemaProvisioner::new(
            &self.store,
            provision::DATA_DATABASE,
            provision::STATS_DESIGN_ID,
            provision::stats_design_doc(),
        );
        let meta_provisioner = SchemaProvisioner::new(
            &self.store,
            provision::META_DATABASE,
            provision::METADATA_DESIGN_ID,
            provision::metadata_design_doc(),
        );

        let (data, meta) = tokio::try_join!(data_provisioner.ensure(), meta_provisioner.ensure())?;
        debug!("databases provisioned, loading specifications");

        let (domains, tag_sets, scores) = tokio::try_join!(
            loader::load_with_fallback(&DomainSpecs, meta.as_ref(), &self.defaults),
            loader::load_with_fallback(&TagSpecs, meta.as_ref(), &self.defaults),
            loader::load_with_fallback(&ScoreSpecs, meta.as_ref(), &self.defaults),
        )?;

        info!(
            "loaded {} domain(s), {} tag set(s), {} score(s)",
            domains.domains().count(),
            tag_sets.len(),
            scores.scores().len()
        );

        Ok(BootstrapResult {
            data,
            meta,
            domains,
            tag_sets,
            scores,
        })
    }
}
