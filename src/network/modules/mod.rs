pub mod rewrite;
pub mod stats;

// Re-export the rewrite engine for convenience
pub use rewrite::{rewrite, RewriteOptions, ScanMode, DEFAULT_REWRITE_LIMIT};
pub use stats::RewriteStats;
