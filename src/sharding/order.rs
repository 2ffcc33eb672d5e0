use crate::catalog::Catalog;

/// All catalog identifiers in ascending order.
pub fn ordered_ids(catalog: &Catalog) -> Vec<u64> {
    let mut ids: Vec<u64> = catalog.ids().collect();
    ids.sort();
    ids
}
