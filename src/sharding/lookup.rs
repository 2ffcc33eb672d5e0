use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::partition::Partition;

/// File name of the serialized lookup table inside the shard directory.
pub const LOOKUP_TABLE_FILE: &str = "lookuptable.json";

/// Maps each project identifier to the shard file that holds it.
///
/// Serializes as a flat JSON object with stringified identifiers as keys:
/// `{"1": "projects_1_5.csv", ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LookupTable {
    entries: BTreeMap<u64, String>,
}

impl LookupTable {
    pub fn build(partitions: &[Partition]) -> Self {
        let mut entries = BTreeMap::new();
        for partition in partitions {
            let file_name = partition.file_name();
            for &id in partition.ids() {
                entries.insert(id, file_name.clone());
            }
        }
        Self { entries }
    }

    /// Shard file holding `id`
    pub fn get(&self, id: u64) -> Option<&str> {
        self.entries.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &str)> {
        self.entries.iter().map(|(id, name)| (*id, name.as_str()))
    }
}
