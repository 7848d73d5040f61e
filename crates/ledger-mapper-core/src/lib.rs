pub mod classify;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod export;
pub mod format;
pub mod grouping;
pub mod model;
pub mod naming;
pub mod parts;
pub mod progress;
pub mod scanner;
pub mod summary;

pub use config::{AppConfig, UnclassifiedPolicy};
pub use diagnostics::Diagnostic;
pub use engine::{PlanEngine, PlanResult};
pub use error::Error;
pub use export::{PlanReport, PlanRow, RowStatus};
pub use grouping::{EntityGroup, GroupStatus};
pub use model::{DestinationPlan, DocType, FileRecord, PartHint};
pub use progress::{ProgressReporter, SilentReporter};
pub use summary::PlanSummary;
