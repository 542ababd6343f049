// reconcile-core/src/domain/incongruence/mod.rs

pub mod impact;
pub mod kind;
pub mod model;
pub mod options;

pub use impact::{Impact, percentage_of};
pub use kind::{IncongruenceKind, ValueRange};
pub use model::{EXAMPLE_SAMPLE_SIZE, Incongruence, IncongruenceBuilder};
pub use options::{ResolutionOption, resolve_options, synthesize_options};
