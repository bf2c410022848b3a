//! The ingestion jobs: collect → summarize → digest, plus the retention sweep.

mod classify;
pub mod collector;
pub mod digest;
pub mod retention;
pub mod summarizer;

pub use classify::Classifier;
pub use collector::{CollectReport, Collector};
pub use digest::{DigestBuilder, DigestReport};
pub use retention::RetentionReport;
pub use summarizer::{SummarizeReport, Summarizer};
