use anyhow::Result;
use std::path::Path;
use tracing::info;

use crate::catalog::{load_catalog, Catalog};
use crate::output::write_shards;
use crate::sharding::{ordered_ids, partition, LookupTable, Partition};

/// What a shard run produced.
#[derive(Debug, Clone)]
pub struct ShardSummary {
    pub projects: usize,
    pub skipped: usize,
    pub shards: usize,
    pub lookup: LookupTable,
}

/// Order and partition a loaded catalog.
///
/// Fails with [`crate::sharding::PartitionError`] when the catalog has fewer
/// projects than `partitions`.
pub fn plan_shards(catalog: &Catalog, partitions: usize) -> Result<Vec<Partition>> {
    let ids = ordered_ids(catalog);
    let parts = partition(&ids, partitions)?;
    info!(
        projects = ids.len(),
        shards = parts.len(),
        last_shard = parts.last().map(Partition::len).unwrap_or(0),
        "partitioned catalog"
    );
    Ok(parts)
}

/// Load, score, sort, partition and write the catalog at `input`.
///
/// Called from main.rs for the `shard` command. Nothing is written unless
/// partitioning succeeds.
pub fn run_shard(input: &Path, out_dir: &Path, partitions: usize) -> Result<ShardSummary> {
    let catalog = load_catalog(input)?;
    let parts = plan_shards(&catalog, partitions)?;
    let lookup = write_shards(&catalog, &parts, out_dir)?;

    Ok(ShardSummary {
        projects: catalog.len(),
        skipped: catalog.skipped(),
        shards: parts.len(),
        lookup,
    })
}
