// reconcile-core/src/infrastructure/adapters/rule_file.rs

use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::domain::error::DomainError;
use crate::domain::rules::{AutomaticRule, NormalizationRule, RuleListing, RuleSet};
use crate::error::ReconcileError;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::{read_json, write_json};
use crate::ports::RuleStore;

/// Rules kept in a local JSON file, with the backup slot next to it
/// (`rules.json` -> `rules.backup.json`).
pub struct JsonRuleStore {
    path: PathBuf,
    backup_path: PathBuf,
    // Serializes read-modify-write cycles.
    lock: Mutex<()>,
}

impl JsonRuleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            backup_path: path.with_extension("backup.json"),
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    fn load(&self) -> Result<RuleSet, InfrastructureError> {
        Ok(read_json(&self.path)?.unwrap_or_default())
    }

    fn save(&self, rules: &RuleSet) -> Result<(), InfrastructureError> {
        write_json(&self.path, rules)?;
        debug!(
            path = ?self.path,
            normalizations = rules.total_normalizations(),
            automatic = rules.total_automatic_rules(),
            "Rules saved"
        );
        Ok(())
    }

    async fn update<R>(
        &self,
        change: impl FnOnce(&mut RuleSet) -> Result<R, DomainError>,
    ) -> Result<R, ReconcileError> {
        let _guard = self.lock.lock().await;
        let mut rules = self.load()?;
        let out = change(&mut rules)?;
        self.save(&rules)?;
        Ok(out)
    }
}

#[async_trait]
impl RuleStore for JsonRuleStore {
    async fn list(&self) -> Result<RuleListing, ReconcileError> {
        let _guard = self.lock.lock().await;
        Ok(self.load()?.listing())
    }

    #[instrument(skip(self))]
    async fn create_normalization(&self, rule: NormalizationRule) -> Result<(), ReconcileError> {
        let replaced = self.update(|rules| rules.upsert_normalization(rule)).await?;
        if let Some(previous) = replaced {
            debug!(previous = %previous, "Normalization replaced");
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn create_automatic(&self, rule: AutomaticRule) -> Result<(), ReconcileError> {
        let index = self.update(|rules| rules.push_automatic(rule)).await?;
        debug!(index, "Automatic rule stored");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_normalization(&self, pattern: &str) -> Result<(), ReconcileError> {
        self.update(|rules| rules.remove_normalization(pattern))
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_automatic(&self, index: usize) -> Result<(), ReconcileError> {
        self.update(|rules| rules.remove_automatic(index)).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear_all(&self, overwrite_backup: bool) -> Result<(), ReconcileError> {
        let _guard = self.lock.lock().await;
        if self.backup_path.exists() && !overwrite_backup {
            return Err(DomainError::Conflict(format!(
                "a rule backup already exists at {}",
                self.backup_path.display()
            ))
            .into());
        }

        // Backup first: a failure here leaves the rules untouched.
        let current = self.load()?;
        write_json(&self.backup_path, &current)?;
        self.save(&RuleSet::default())?;

        info!(
            normalizations = current.total_normalizations(),
            automatic = current.total_automatic_rules(),
            "Rules cleared"
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn restore_backup(&self) -> Result<(), ReconcileError> {
        let _guard = self.lock.lock().await;
        let backup: RuleSet = read_json(&self.backup_path)?
            .ok_or_else(|| DomainError::NotFound("rule backup".into()))?;

        self.save(&backup)?;
        fs::remove_file(&self.backup_path).map_err(InfrastructureError::from)?;
        info!("Rules restored from backup");
        Ok(())
    }
}
