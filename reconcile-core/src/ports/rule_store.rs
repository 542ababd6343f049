// reconcile-core/src/ports/rule_store.rs

use async_trait::async_trait;

use crate::domain::rules::{AutomaticRule, NormalizationRule, RuleListing};
use crate::error::ReconcileError;

/// Persistent rule storage with a single backup slot.
#[async_trait]
pub trait RuleStore: Send + Sync {
    async fn list(&self) -> Result<RuleListing, ReconcileError>;

    async fn create_normalization(&self, rule: NormalizationRule) -> Result<(), ReconcileError>;

    async fn create_automatic(&self, rule: AutomaticRule) -> Result<(), ReconcileError>;

    /// Case-insensitive on the pattern; `NotFound` when absent.
    async fn delete_normalization(&self, pattern: &str) -> Result<(), ReconcileError>;

    /// `NotFound` when `index` is out of range.
    async fn delete_automatic(&self, index: usize) -> Result<(), ReconcileError>;

    /// Snapshots every rule into the backup slot, then empties the store.
    /// `Conflict` when a backup exists and `overwrite_backup` is false.
    async fn clear_all(&self, overwrite_backup: bool) -> Result<(), ReconcileError>;

    /// Replaces the rules with the backup and empties the slot; `NotFound`
    /// when there is no backup.
    async fn restore_backup(&self) -> Result<(), ReconcileError>;
}
