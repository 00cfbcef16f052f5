pub mod extractor;
pub mod orchestrator;

pub use extractor::InfoExtractor;
pub use orchestrator::{FolderPlan, FolderSync};
