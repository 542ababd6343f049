// reconcile-core/src/infrastructure/adapters/mod.rs

pub mod batch;
pub mod exporter;
pub mod http;
pub mod rule_file;

pub use batch::LocalBatchSource;
pub use exporter::FileExporter;
pub use http::HttpBackend;
pub use rule_file::JsonRuleStore;
