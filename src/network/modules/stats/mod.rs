pub mod rewrite_stats;
pub mod util;

pub use rewrite_stats::RewriteStats;
