// reconcile-core/src/application/rules.rs
//
// USE CASE: Rule management (list, create, delete, clear with backup, restore).

use chrono::{SecondsFormat, Utc};
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::domain::decision::Action;
use crate::domain::rules::{
    ANY_FIELD, AutomaticRule, NormalizationRule, RuleListing, SynthesizedRule,
};
use crate::error::ReconcileError;
use crate::ports::RuleStore;

/// Validates rule input before it reaches the store, wherever the store lives.
#[derive(Clone)]
pub struct RuleService {
    store: Arc<dyn RuleStore>,
}

impl RuleService {
    pub fn new(store: Arc<dyn RuleStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<RuleListing, ReconcileError> {
        self.store.list().await
    }

    #[instrument(skip(self))]
    pub async fn add_normalization(
        &self,
        pattern: &str,
        normalized_value: &str,
    ) -> Result<NormalizationRule, ReconcileError> {
        let rule = NormalizationRule::new(pattern.trim(), normalized_value.trim());
        rule.validate()?;
        self.store.create_normalization(rule.clone()).await?;
        info!(pattern = %rule.pattern, "Normalization rule saved");
        Ok(rule)
    }

    #[instrument(skip(self))]
    pub async fn add_automatic(
        &self,
        kind: &str,
        field: Option<&str>,
        action: Action,
        value: Option<&str>,
    ) -> Result<AutomaticRule, ReconcileError> {
        let rule = AutomaticRule {
            kind: kind.trim().to_string(),
            field: field
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .unwrap_or(ANY_FIELD)
                .to_string(),
            action,
            value: value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()),
            created_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
        };
        rule.validate()?;
        self.store.create_automatic(rule.clone()).await?;
        info!(kind = %rule.kind, field = %rule.field, "Automatic rule saved");
        Ok(rule)
    }

    #[instrument(skip(self))]
    pub async fn delete_normalization(&self, pattern: &str) -> Result<(), ReconcileError> {
        self.store.delete_normalization(pattern).await
    }

    #[instrument(skip(self))]
    pub async fn delete_automatic(&self, index: usize) -> Result<(), ReconcileError> {
        self.store.delete_automatic(index).await
    }

    #[instrument(skip(self))]
    pub async fn clear_all(&self, overwrite_backup: bool) -> Result<(), ReconcileError> {
        self.store.clear_all(overwrite_backup).await?;
        info!("All rules cleared (backup kept)");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn restore_backup(&self) -> Result<(), ReconcileError> {
        self.store.restore_backup().await?;
        info!("Rules restored from backup");
        Ok(())
    }

    /// Saves synthesized rules concurrently; fails on the first store error.
    #[instrument(skip_all, fields(rules = rules.len()))]
    pub async fn persist(&self, rules: Vec<SynthesizedRule>) -> Result<usize, ReconcileError> {
        let count = rules.len();
        let writes = rules.into_iter().map(|rule| {
            let store = Arc::clone(&self.store);
            async move {
                match rule {
                    SynthesizedRule::Normalization(r) => store.create_normalization(r).await,
                    SynthesizedRule::Automatic(r) => store.create_automatic(r).await,
                }
            }
        });
        try_join_all(writes).await?;
        Ok(count)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::testing::MockBackend;

    fn service() -> (RuleService, MockBackend) {
        let backend = MockBackend::new();
        (RuleService::new(Arc::new(backend.clone())), backend)
    }

    #[tokio::test]
    async fn test_add_normalization_trims_input() -> anyhow::Result<()> {
        let (rules, backend) = service();
        let rule = rules.add_normalization("  Golden ", " Golden Delicious ").await?;
        assert_eq!(rule, NormalizationRule::new("Golden", "Golden Delicious"));
        assert_eq!(backend.calls(), ["create_normalization golden"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_rules_never_reach_the_store() {
        let (rules, backend) = service();
        assert!(rules.add_normalization(" ", "x").await.unwrap_err().is_validation());
        assert!(
            rules
                .add_automatic("valores_vacios", Some("Precio"), Action::Fill, None)
                .await
                .unwrap_err()
                .is_validation()
        );
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_automatic_rule_defaults_to_any_field() -> anyhow::Result<()> {
        let (rules, _) = service();
        let rule = rules
            .add_automatic("duplicados_exactos", None, Action::Delete, None)
            .await?;
        assert_eq!(rule.field, ANY_FIELD);
        assert!(rule.created_at.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_persist_writes_every_rule() -> anyhow::Result<()> {
        let (rules, backend) = service();
        let saved = rules
            .persist(vec![
                SynthesizedRule::Normalization(NormalizationRule::new("manzana", "Manzana")),
                SynthesizedRule::Normalization(NormalizationRule::new("manzna", "Manzana")),
            ])
            .await?;
        assert_eq!(saved, 2);
        assert_eq!(backend.rules().total_normalizations(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_clear_and_restore_round_trip() -> anyhow::Result<()> {
        let (rules, backend) = service();
        rules.add_normalization("pera", "Pera").await?;
        rules.clear_all(false).await?;
        assert!(backend.rules().is_empty());

        rules.add_normalization("kiwi", "Kiwi").await?;
        assert!(rules.clear_all(false).await.unwrap_err().is_conflict());

        rules.restore_backup().await?;
        assert_eq!(backend.rules().normalization("PERA"), Some("Pera"));
        assert!(rules.restore_backup().await.unwrap_err().is_not_found());
        Ok(())
    }
}
