pub mod core;
pub mod discovery;
pub mod preview;
pub mod processor;
pub mod rewrite;

pub use discovery::{FileDiscovery, GlobWalker};
pub use processor::{FileProcessor, FileStore, FsStore, RunReport, WriteMode};
pub use rewrite::RuleSet;
