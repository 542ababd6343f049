// reconcile/src/commands/backend.rs
//
// Picks one adapter per port from reconcile.yaml.

use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use reconcile_core::application::{ReconciliationWizard, RuleService};
use reconcile_core::infrastructure::adapters::{
    FileExporter, HttpBackend, JsonRuleStore, LocalBatchSource,
};
use reconcile_core::infrastructure::config::{Settings, Target, load_settings_or_default};
use reconcile_core::ports::{BatchSource, Exporter, RuleStore};

pub struct Backend {
    pub settings: Settings,
    pub remote: Arc<HttpBackend>,
    pub rules: RuleService,
    pub exporter: Arc<dyn Exporter>,
    pub batches: Arc<dyn BatchSource>,
}

impl Backend {
    pub fn connect(project_dir: &Path) -> anyhow::Result<Self> {
        let settings = load_settings_or_default(project_dir).with_context(|| {
            format!("Failed to load reconcile configuration from {:?}", project_dir)
        })?;

        // Building the client opens no connection
        let remote = Arc::new(
            HttpBackend::new(&settings.api.base_url, settings.timeout())
                .context("Failed to build the backend client")?,
        );

        let store: Arc<dyn RuleStore> = match settings.rules.store {
            Target::Local => Arc::new(JsonRuleStore::new(settings.rules_path(project_dir))),
            Target::Remote => remote.clone(),
        };
        let exporter: Arc<dyn Exporter> = match settings.export.target {
            Target::Local => Arc::new(FileExporter::new(settings.export_dir(project_dir))),
            Target::Remote => remote.clone(),
        };
        let batches: Arc<dyn BatchSource> = match settings.batch_source {
            Target::Local => Arc::new(LocalBatchSource::new(settings.data_dir(project_dir))),
            Target::Remote => remote.clone(),
        };

        debug!(
            rules = ?settings.rules.store,
            export = ?settings.export.target,
            batches = ?settings.batch_source,
            api = %settings.api.base_url,
            "Backend wired"
        );
        Ok(Self {
            settings,
            remote,
            rules: RuleService::new(store),
            exporter,
            batches,
        })
    }

    /// Detection and row mutation always run on the processing backend.
    pub fn wizard(&self) -> ReconciliationWizard {
        ReconciliationWizard::new(
            self.remote.clone(),
            self.remote.clone(),
            self.exporter.clone(),
            self.rules.clone(),
        )
    }
}
