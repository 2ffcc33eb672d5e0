use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Pipeline configuration.
///
/// Every field is optional in the file; missing fields take their defaults.
///
/// Example YAML:
/// ```yaml
/// input: data/allprojects.csv
/// shard_dir: data/partitioned
/// partitions: 30
/// merge_dir: public/data
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Registry export to score and shard
    #[serde(default = "default_input")]
    pub input: PathBuf,

    /// Directory receiving shard CSVs and the lookup table
    #[serde(default = "default_shard_dir")]
    pub shard_dir: PathBuf,

    /// Number of shards to split the catalog into
    #[serde(default = "default_partitions")]
    pub partitions: usize,

    /// Directory receiving the merged JSON files
    #[serde(default = "default_merge_dir")]
    pub merge_dir: PathBuf,
}

fn default_input() -> PathBuf {
    PathBuf::from("data/allprojects.csv")
}

fn default_shard_dir() -> PathBuf {
    PathBuf::from("data/partitioned")
}

fn default_partitions() -> usize {
    30
}

fn default_merge_dir() -> PathBuf {
    PathBuf::from("public/data")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: default_input(),
            shard_dir: default_shard_dir(),
            partitions: default_partitions(),
            merge_dir: default_merge_dir(),
        }
    }
}
