use anyhow::{bail, Context, Result};
use atomic_write_file::AtomicWriteFile;
use chrono::NaiveDate;
use serde::ser::Serializer;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use super::writer::find_shards;
use crate::catalog::{parse_identifier, Column, SCORE_HEADER};
use crate::sharding::{LookupTable, LOOKUP_TABLE_FILE};

pub const ALL_PROJECTS_FILE: &str = "allprojects.json";
pub const SEARCH_INDEX_FILE: &str = "search-index.json";

/// One project as served to the web front-end.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedProject {
    pub id: String,
    pub name: String,
    pub proponent: String,
    pub project_type: String,
    // The front-end reads this key, typo included
    #[serde(rename = "afolzuActivities")]
    pub afolu_activities: String,
    pub methodology: String,
    pub status: String,
    pub country: String,
    pub estimated_emissions: String,
    pub region: String,
    pub registration_date: String,
    pub crediting_period_start: String,
    pub crediting_period_end: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexEntry {
    pub name: String,
    pub score: f64,
    pub country: String,
    pub status: String,
}

/// Condensed per-project index, keyed by ID in catalog order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchIndex {
    #[serde(serialize_with = "serialize_ordered")]
    pub projects: Vec<(String, IndexEntry)>,
    pub total: usize,
    pub last_updated: String,
}

fn serialize_ordered<S: Serializer>(
    entries: &[(String, IndexEntry)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(entries.iter().map(|(id, entry)| (id, entry)))
}

impl SearchIndex {
    pub fn build(projects: &[MergedProject], last_updated: NaiveDate) -> Self {
        let entries = projects
            .iter()
            .map(|p| {
                (
                    p.id.clone(),
                    IndexEntry {
                        name: p.name.clone(),
                        score: p.score,
                        country: p.country.clone(),
                        status: p.status.clone(),
                    },
                )
            })
            .collect();
        Self {
            projects: entries,
            total: projects.len(),
            last_updated: last_updated.format("%Y-%m-%d").to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MergeOutput {
    pub projects: Vec<MergedProject>,
    pub index: SearchIndex,
}

/// Summary of the non-zero scores in a merged catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreStats {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl ScoreStats {
    /// `None` when no project has a positive score.
    pub fn from_projects(projects: &[MergedProject]) -> Option<Self> {
        let scores: Vec<f64> = projects
            .iter()
            .map(|p| p.score)
            .filter(|s| *s > 0.0)
            .collect();
        if scores.is_empty() {
            return None;
        }
        let count = scores.len();
        Some(Self {
            count,
            mean: scores.iter().sum::<f64>() / count as f64,
            min: scores.iter().copied().fold(f64::INFINITY, f64::min),
            max: scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

/// Column positions resolved from a shard's header row.
struct HeaderMap {
    columns: Vec<Option<usize>>,
    score: Option<usize>,
}

impl HeaderMap {
    fn new(header: &csv::StringRecord) -> Self {
        let position = |name: &str| header.iter().position(|h| h.trim() == name);
        Self {
            columns: Column::ALL.iter().map(|c| position(c.header())).collect(),
            score: position(SCORE_HEADER),
        }
    }

    fn field(&self, row: &csv::StringRecord, column: Column) -> String {
        self.columns[column.index()]
            .and_then(|i| row.get(i))
            .unwrap_or("")
            .trim()
            .to_string()
    }

    fn score(&self, row: &csv::StringRecord) -> f64 {
        self.score
            .and_then(|i| row.get(i))
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0.0)
    }

    fn project(&self, row: &csv::StringRecord) -> MergedProject {
        MergedProject {
            id: self.field(row, Column::Id),
            name: self.field(row, Column::Name),
            proponent: self.field(row, Column::Proponent),
            project_type: self.field(row, Column::ProjectType),
            afolu_activities: self.field(row, Column::AfoluActivities),
            methodology: self.field(row, Column::Methodology),
            status: self.field(row, Column::Status),
            country: self.field(row, Column::Country),
            estimated_emissions: self.field(row, Column::EstimatedEmissions),
            region: self.field(row, Column::Region),
            registration_date: self.field(row, Column::RegistrationDate),
            crediting_period_start: self.field(row, Column::CreditingPeriodStart),
            crediting_period_end: self.field(row, Column::CreditingPeriodEnd),
            score: self.score(row),
        }
    }
}

/// The lookup table is written after every shard, so a directory without one
/// holds an unfinished run.
fn read_lookup_table(shard_dir: &Path) -> Result<LookupTable> {
    let path = shard_dir.join(LOOKUP_TABLE_FILE);
    if !path.exists() {
        bail!(
            "No {} in {}; the shard run did not complete",
            LOOKUP_TABLE_FILE,
            shard_dir.display()
        );
    }
    let raw = fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Fail unless the merged projects and the lookup table name the same IDs.
fn check_complete(table: &LookupTable, projects: &[MergedProject], shard_dir: &Path) -> Result<()> {
    let merged: HashSet<u64> = projects
        .iter()
        .filter_map(|p| parse_identifier(&p.id))
        .collect();

    let missing: Vec<(u64, &str)> = table.iter().filter(|(id, _)| !merged.contains(id)).collect();
    if let Some((id, shard)) = missing.first() {
        bail!(
            "Incomplete shard set in {}: {} indexed projects are missing (first: {} from {})",
            shard_dir.display(),
            missing.len(),
            id,
            shard
        );
    }

    if let Some(id) = merged.iter().find(|id| table.get(**id).is_none()) {
        bail!(
            "Project {} in {} is not in {}",
            id,
            shard_dir.display(),
            LOOKUP_TABLE_FILE
        );
    }
    Ok(())
}

/// Read every shard in `shard_dir` back into a single catalog.
///
/// Shards are read in path order. Rows with an empty ID are skipped and the
/// first row seen for an ID wins. The result is sorted by numeric ID, with
/// non-numeric IDs last in the order they were read.
///
/// Fails when the directory has no lookup table, or when the shards and the
/// lookup table disagree about which projects exist.
pub fn merge_shards(shard_dir: &Path, today: NaiveDate) -> Result<MergeOutput> {
    let table = read_lookup_table(shard_dir)?;
    let shards = find_shards(shard_dir)?;
    info!(dir = %shard_dir.display(), shards = shards.len(), "merging shards");

    let mut projects = Vec::new();
    let mut seen = HashSet::new();

    for path in &shards {
        debug!(path = %path.display(), "reading shard");
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("Failed to open shard {}", path.display()))?;
        let header = HeaderMap::new(
            rdr.headers()
                .with_context(|| format!("Failed to read header of {}", path.display()))?,
        );

        for result in rdr.records() {
            let row = result.with_context(|| format!("Malformed row in {}", path.display()))?;
            let project = header.project(&row);
            if project.id.is_empty() || !seen.insert(project.id.clone()) {
                continue;
            }
            projects.push(project);
        }
    }

    check_complete(&table, &projects, shard_dir)?;

    projects.sort_by_key(|p| match parse_identifier(&p.id) {
        Some(id) => (false, id),
        None => (true, 0),
    });

    let index = SearchIndex::build(&projects, today);
    info!(projects = projects.len(), "merged unique projects");
    Ok(MergeOutput { projects, index })
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    serde_json::to_writer_pretty(&mut file, value)
        .with_context(|| format!("Failed to serialize {}", path.display()))?;
    file.commit()
        .with_context(|| format!("Failed to save {}", path.display()))?;
    Ok(())
}

/// Write `allprojects.json` and `search-index.json` into `out_dir`.
pub fn write_merge_output(output: &MergeOutput, out_dir: &Path) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory at {}", out_dir.display()))?;
    write_json(&output.projects, &out_dir.join(ALL_PROJECTS_FILE))?;
    write_json(&output.index, &out_dir.join(SEARCH_INDEX_FILE))?;
    Ok(())
}
