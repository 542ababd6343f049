// reconcile-core/src/ports/mod.rs

// What the wizard needs from the outside world, without knowing how it is
// done: an HTTP backend, local files, or a test double.

pub mod batch_source;
pub mod detector;
pub mod exporter;
pub mod processor;
pub mod rule_store;

pub use batch_source::{BatchSource, UploadReceipt};
pub use detector::{AnalysisReport, Detector};
pub use exporter::{ExportPayload, ExportReceipt, Exporter};
pub use processor::{ApplyResponse, Processor};
pub use rule_store::RuleStore;
