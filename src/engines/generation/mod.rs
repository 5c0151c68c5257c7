pub mod operators;
pub mod progress;
pub mod retention;
pub mod scheduler;

pub use operators::{CrossoverMethod, CrossoverPolicy};
pub use progress::{LogProgressCallback, ProgressCallback, SilentProgress};
pub use retention::RetentionPolicy;
pub use scheduler::{BestEntity, GenerationReport, GenerationScheduler, RunSummary};
