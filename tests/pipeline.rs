use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use approx::assert_relative_eq;
use rate_my_vcc::catalog::load_catalog;
use rate_my_vcc::output::{
    find_shards, merge_shards, write_merge_output, ALL_PROJECTS_FILE, SEARCH_INDEX_FILE,
};
use rate_my_vcc::pipeline::run_shard;
use rate_my_vcc::rate::{rate, rating, RateError};
use rate_my_vcc::scoring::breakdown_at;
use rate_my_vcc::sharding::{LookupTable, LOOKUP_TABLE_FILE};

const HEADER: &str = "ID,Name,Proponent,Project Type,AFOLU Activities,Methodology,Status,Country/Area,Estimated Annual Emission Reductions,Region,Project Registration Date,Crediting Period Start Date,Crediting Period End Date";

const METHODOLOGIES: [&str; 6] = ["VM0044", "VM0007", "AMS-I.D", "", "VM0042", "ACM0022"];
const STATUSES: [&str; 4] = ["Registered", "Under validation", "Withdrawn", ""];

/// A registry export with `n` scored rows (IDs in scrambled order) plus a
/// couple of rows that must be dropped.
fn write_export(path: &Path, n: u64) {
    let mut content = format!("{}\n", HEADER);
    for i in 0..n {
        let id = (i * 37) % n + 1000;
        content.push_str(&format!(
            "{},Project {},Proponent,Energy industries,,{},{},Germany,\"{},000\",Europe,2019-03-01,2019-03-01,2029-03-01\n",
            id,
            id,
            METHODOLOGIES[(i % 6) as usize],
            STATUSES[(i % 4) as usize],
            i * 10,
        ));
    }
    content.push_str("TBD,Pipeline project,,,,,,,,,,,\n");
    content.push_str(",No id,,,,,,,,,,,\n");
    fs::write(path, content).unwrap();
}

#[test]
fn test_shard_merge_rate_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("allprojects.csv");
    let shard_dir = dir.path().join("partitioned");
    let merge_dir = dir.path().join("public");
    write_export(&input, 100);

    let summary = run_shard(&input, &shard_dir, 30).unwrap();
    assert_eq!(summary.projects, 100);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.shards, 30);

    // 29 shards of 3 and a last shard of 13
    let shards = find_shards(&shard_dir).unwrap();
    assert_eq!(shards.len(), 30);
    let mut sizes = Vec::new();
    for shard in &shards {
        let mut rdr = csv::Reader::from_path(shard).unwrap();
        assert_eq!(rdr.headers().unwrap().get(13), Some("our score"));
        sizes.push(rdr.records().count());
    }
    sizes.sort();
    assert_eq!(sizes.iter().filter(|&&s| s == 3).count(), 29);
    assert_eq!(sizes.last(), Some(&13));
    assert!(shard_dir.join("projects_1087_1099.csv").exists());

    // Lookup table covers every project exactly once
    let table: LookupTable =
        serde_json::from_slice(&fs::read(shard_dir.join(LOOKUP_TABLE_FILE)).unwrap()).unwrap();
    let keys: BTreeSet<u64> = table.iter().map(|(id, _)| id).collect();
    let expected: BTreeSet<u64> = (1000..1100).collect();
    assert_eq!(keys, expected);

    // Stored scores match a fresh load of the export
    let catalog = load_catalog(&input).unwrap();
    for id in [1000, 1042, 1099] {
        let stored = rate(&shard_dir, id).unwrap();
        assert_relative_eq!(stored, catalog.get(id).unwrap().score, epsilon = 1e-9);
        assert!((0.0..=100.0).contains(&stored));
    }
    assert!(matches!(rate(&shard_dir, 7), Err(RateError::NotIndexed(7))));

    // Merge reverses the sharding
    let output = merge_shards(&shard_dir, chrono::Utc::now().date_naive()).unwrap();
    assert_eq!(output.projects.len(), 100);
    let ids: Vec<u64> = output.projects.iter().map(|p| p.id.parse().unwrap()).collect();
    assert_eq!(ids, (1000..1100).collect::<Vec<_>>());

    write_merge_output(&output, &merge_dir).unwrap();
    assert!(merge_dir.join(ALL_PROJECTS_FILE).exists());
    let index: serde_json::Value =
        serde_json::from_slice(&fs::read(merge_dir.join(SEARCH_INDEX_FILE)).unwrap()).unwrap();
    assert_eq!(index["total"], 100);
    assert_eq!(index["projects"]["1042"]["country"], "Germany");
}

#[test]
fn test_rerun_with_fewer_shards_replaces_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("allprojects.csv");
    let shard_dir = dir.path().join("partitioned");
    write_export(&input, 20);

    run_shard(&input, &shard_dir, 10).unwrap();
    run_shard(&input, &shard_dir, 4).unwrap();

    assert_eq!(find_shards(&shard_dir).unwrap().len(), 4);
    let output = merge_shards(&shard_dir, chrono::Utc::now().date_naive()).unwrap();
    assert_eq!(output.projects.len(), 20);
}

#[test]
fn test_too_many_partitions_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("allprojects.csv");
    write_export(&input, 5);

    let err = run_shard(&input, &dir.path().join("out"), 6).unwrap_err();
    assert!(err.to_string().contains("5 projects into 6"));
}

#[test]
fn test_merge_refuses_interrupted_shard_run() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("allprojects.csv");
    let shard_dir = dir.path().join("partitioned");
    write_export(&input, 9);
    run_shard(&input, &shard_dir, 3).unwrap();
    let today = chrono::Utc::now().date_naive();

    // Shard missing but still indexed
    fs::remove_file(shard_dir.join("projects_1006_1008.csv")).unwrap();
    assert!(merge_shards(&shard_dir, today).is_err());

    // Run died before the lookup table was written
    fs::remove_file(shard_dir.join(LOOKUP_TABLE_FILE)).unwrap();
    let err = merge_shards(&shard_dir, today).unwrap_err();
    assert!(err.to_string().contains(LOOKUP_TABLE_FILE));
}

#[test]
fn test_rating_breakdown_matches_stored_score() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("allprojects.csv");
    let shard_dir = dir.path().join("partitioned");
    write_export(&input, 12);
    run_shard(&input, &shard_dir, 4).unwrap();

    let found = rating(&shard_dir, 1005).unwrap();
    assert_eq!(found.record.id(), Some(1005));
    assert_eq!(found.record.fields().len(), 13);

    let breakdown = breakdown_at(&found.record, chrono::Utc::now().date_naive());
    assert_eq!(breakdown.criteria.len(), 7);
    assert_relative_eq!(breakdown.total, found.score, epsilon = 1e-9);
}
