pub mod lookup;
pub mod order;
pub mod partition;

pub use lookup::{LookupTable, LOOKUP_TABLE_FILE};
pub use order::ordered_ids;
pub use partition::{partition, Partition, PartitionError};
