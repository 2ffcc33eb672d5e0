use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::sharding::{LookupTable, Partition, LOOKUP_TABLE_FILE};

/// Glob matching shard files inside `dir`.
pub fn shard_pattern(dir: &Path) -> String {
    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    format!("{}/projects_*.csv", escaped)
}

/// Shard files in `dir`, sorted by path.
pub fn find_shards(dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = shard_pattern(dir);
    let mut paths = glob::glob(&pattern)
        .with_context(|| format!("Invalid shard pattern {}", pattern))?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to list shards in {}", dir.display()))?;
    paths.sort();
    Ok(paths)
}

/// Remove shards and the lookup table left by a previous run.
fn clear_previous_run(dir: &Path) -> Result<()> {
    let lookup_path = dir.join(LOOKUP_TABLE_FILE);
    if lookup_path.exists() {
        fs::remove_file(&lookup_path)
            .with_context(|| format!("Failed to remove {}", lookup_path.display()))?;
    }
    for path in find_shards(dir)? {
        debug!(path = %path.display(), "removing stale shard");
        fs::remove_file(&path)
            .with_context(|| format!("Failed to remove stale shard {}", path.display()))?;
    }
    Ok(())
}

/// Write one shard: the catalog header, then one row per ID in order.
pub fn write_shard(catalog: &Catalog, partition: &Partition, path: &Path) -> Result<()> {
    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    {
        let mut wtr = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(&mut file);
        wtr.write_record(catalog.header())
            .with_context(|| format!("Failed to write header to {}", path.display()))?;
        for &id in partition.ids() {
            let project = catalog
                .get(id)
                .with_context(|| format!("Project {} is not in the catalog", id))?;
            wtr.write_record(project.to_row())
                .with_context(|| format!("Failed to write project {} to {}", id, path.display()))?;
        }
        wtr.flush()
            .with_context(|| format!("Failed to flush {}", path.display()))?;
    }

    file.commit()
        .with_context(|| format!("Failed to save shard {}", path.display()))?;
    Ok(())
}

/// Save the lookup table as JSON atomically.
pub fn write_lookup_table(table: &LookupTable, path: &Path) -> Result<()> {
    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    serde_json::to_writer(&mut file, table).context("Failed to serialize lookup table")?;
    file.commit().context("Failed to save lookup table")?;
    Ok(())
}

/// Write every partition as a shard into `out_dir`, then the lookup table.
///
/// The lookup table is written last, so its presence means the shard set is
/// complete. Returns the lookup table that was written.
pub fn write_shards(
    catalog: &Catalog,
    partitions: &[Partition],
    out_dir: &Path,
) -> Result<LookupTable> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory at {}", out_dir.display()))?;
    clear_previous_run(out_dir)?;

    for partition in partitions {
        let path = out_dir.join(partition.file_name());
        write_shard(catalog, partition, &path)?;
        debug!(shard = %partition.shard_name(), projects = partition.len(), "wrote shard");
    }

    let table = LookupTable::build(partitions);
    write_lookup_table(&table, &out_dir.join(LOOKUP_TABLE_FILE))?;

    info!(
        dir = %out_dir.display(),
        shards = partitions.len(),
        projects = table.len(),
        "wrote shard set"
    );
    Ok(table)
}
