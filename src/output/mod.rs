pub mod formatter;
pub mod merge;
pub mod writer;

pub use formatter::{
    format_breakdown, format_rating, format_score, format_shard_summary, format_stats,
    should_use_colors,
};
pub use merge::{
    merge_shards, write_merge_output, MergeOutput, MergedProject, ScoreStats, SearchIndex,
    ALL_PROJECTS_FILE, SEARCH_INDEX_FILE,
};
pub use writer::{find_shards, write_lookup_table, write_shard, write_shards};
