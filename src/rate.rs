use std::fs::File;
use std::path::Path;
use thiserror::Error;

use crate::catalog::ProjectRecord;
use crate::sharding::{LookupTable, LOOKUP_TABLE_FILE};

#[derive(Debug, Error)]
pub enum RateError {
    #[error("project {0} is not in the lookup table")]
    NotIndexed(u64),
    #[error("project {id} is missing from shard {shard}")]
    NotInShard { id: u64, shard: String },
    #[error("project {id} has an unreadable score {raw:?}")]
    BadScore { id: u64, raw: String },
    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse lookup table: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read shard: {0}")]
    Csv(#[from] csv::Error),
}

fn open(path: &Path) -> Result<File, RateError> {
    File::open(path).map_err(|source| RateError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Read the lookup table from a shard directory.
pub fn load_lookup_table(shard_dir: &Path) -> Result<LookupTable, RateError> {
    let file = open(&shard_dir.join(LOOKUP_TABLE_FILE))?;
    Ok(serde_json::from_reader(file)?)
}

/// A stored score together with the row it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Rating {
    pub id: u64,
    pub score: f64,
    /// The original fields, without the score column.
    pub record: ProjectRecord,
}

/// Find project `id` through `table` without scanning other shards. The score
/// is the last field of the project's row.
pub fn rating_with(table: &LookupTable, shard_dir: &Path, id: u64) -> Result<Rating, RateError> {
    let shard = table.get(id).ok_or(RateError::NotIndexed(id))?;
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(open(&shard_dir.join(shard))?);

    let key = id.to_string();
    for result in rdr.records() {
        let row = result?;
        if row.get(0) != Some(key.as_str()) {
            continue;
        }
        let last = row.len().saturating_sub(1);
        let raw = row.get(last).unwrap_or("").trim();
        let score = raw.parse().map_err(|_| RateError::BadScore {
            id,
            raw: raw.to_string(),
        })?;
        let record = ProjectRecord::new(row.iter().take(last).map(str::to_string).collect());
        return Ok(Rating { id, score, record });
    }

    Err(RateError::NotInShard {
        id,
        shard: shard.to_string(),
    })
}

/// Load the lookup table from `shard_dir` and find project `id`.
pub fn rating(shard_dir: &Path, id: u64) -> Result<Rating, RateError> {
    let table = load_lookup_table(shard_dir)?;
    rating_with(&table, shard_dir, id)
}

/// Load the lookup table from `shard_dir` and return project `id`'s score.
pub fn rate(shard_dir: &Path, id: u64) -> Result<f64, RateError> {
    rating(shard_dir, id).map(|rating| rating.score)
}
