// reconcile-core/src/infrastructure/config/mod.rs

pub mod loader;
pub mod settings;

pub use loader::{CONFIG_CANDIDATES, apply_overrides, load_settings, load_settings_or_default};
pub use settings::{ApiSettings, ExportSettings, RuleSettings, Settings, Target};
