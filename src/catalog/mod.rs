pub mod loader;
pub mod record;

pub use loader::{load_catalog, read_catalog};
pub use record::{parse_identifier, Column, ProjectRecord, ScoredProject, SCORE_HEADER};

use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::{debug, warn};

/// The scored project catalog for one run.
///
/// Built once from the raw export and never modified afterwards. Later stages
/// (ordering, partitioning, writing) borrow it.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    header: Vec<String>,
    projects: HashMap<u64, ScoredProject>,
    skipped: usize,
}

impl Catalog {
    /// Score `rows` as of `today` and index them by identifier.
    ///
    /// Rows without a digit-only identifier are skipped. A repeated identifier
    /// replaces the earlier row.
    pub fn build<I>(mut header: Vec<String>, rows: I, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = ProjectRecord>,
    {
        header.push(SCORE_HEADER.to_string());

        let mut projects = HashMap::new();
        let mut skipped = 0;

        for record in rows {
            let Some(id) = record.id() else {
                debug!(id = record.get(Column::Id), "skipping row without numeric ID");
                skipped += 1;
                continue;
            };
            let score = crate::scoring::score_at(&record, today);
            if projects
                .insert(id, ScoredProject { id, record, score })
                .is_some()
            {
                warn!(id, "duplicate project ID, keeping the later row");
            }
        }

        Self {
            header,
            projects,
            skipped,
        }
    }

    /// Column names including the appended score column.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn get(&self, id: u64) -> Option<&ScoredProject> {
        self.projects.get(&id)
    }

    /// Identifiers in no particular order. See [`crate::sharding::ordered_ids`].
    pub fn ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.projects.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Number of input rows dropped for lacking a numeric identifier
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}
