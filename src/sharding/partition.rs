use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PartitionError {
    #[error("partition count must be at least 1")]
    ZeroPartitions,
    #[error("cannot split {identifiers} projects into {partitions} non-empty shards")]
    TooFewIdentifiers { identifiers: usize, partitions: usize },
}

/// A contiguous, non-empty run of sorted identifiers that becomes one shard.
/// Only [`partition`] constructs these, so `first`/`last` always exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    ids: Vec<u64>,
}

impl Partition {
    pub fn ids(&self) -> &[u64] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn first(&self) -> u64 {
        self.ids[0]
    }

    pub fn last(&self) -> u64 {
        self.ids[self.ids.len() - 1]
    }

    /// `projects_{first}_{last}`
    pub fn shard_name(&self) -> String {
        format!("projects_{}_{}", self.first(), self.last())
    }

    /// Shard name plus the `.csv` extension.
    pub fn file_name(&self) -> String {
        format!("{}.csv", self.shard_name())
    }
}

/// Split `sorted_ids` into `n` contiguous groups.
///
/// Every group but the last holds exactly `len / n` identifiers; the last one
/// takes whatever remains, so it can be up to `n - 1` larger than the rest.
/// Shard names depend on these exact boundaries.
///
/// `sorted_ids` must be strictly ascending (see [`super::ordered_ids`]).
pub fn partition(sorted_ids: &[u64], n: usize) -> Result<Vec<Partition>, PartitionError> {
    debug_assert!(
        sorted_ids.windows(2).all(|w| w[0] < w[1]),
        "partition input must be sorted without duplicates"
    );
    if n == 0 {
        return Err(PartitionError::ZeroPartitions);
    }
    if sorted_ids.len() < n {
        return Err(PartitionError::TooFewIdentifiers {
            identifiers: sorted_ids.len(),
            partitions: n,
        });
    }

    let size = sorted_ids.len() / n;
    let mut partitions: Vec<Partition> = (0..n - 1)
        .map(|i| Partition {
            ids: sorted_ids[i * size..(i + 1) * size].to_vec(),
        })
        .collect();
    partitions.push(Partition {
        ids: sorted_ids[(n - 1) * size..].to_vec(),
    });

    Ok(partitions)
}
