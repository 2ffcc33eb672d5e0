use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

use super::{Catalog, ProjectRecord};

/// Load and score the registry export at `path`.
///
/// Fails if the file cannot be opened or a row cannot be decoded. Rows with a
/// non-numeric ID are not errors; they are dropped and counted.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open project export at {}", path.display()))?;

    let catalog = read_catalog(file, Utc::now().date_naive())
        .with_context(|| format!("Failed to read project export at {}", path.display()))?;

    info!(
        path = %path.display(),
        projects = catalog.len(),
        skipped = catalog.skipped(),
        "loaded catalog"
    );
    Ok(catalog)
}

fn decode(record: &csv::ByteRecord) -> Vec<String> {
    record
        .iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect()
}

/// Read a CSV export (header row first) and score it as of `today`.
///
/// Fields are decoded lossily: invalid UTF-8 becomes U+FFFD instead of
/// failing the whole load.
pub fn read_catalog<R: Read>(reader: R, today: NaiveDate) -> Result<Catalog> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let header = decode(rdr.byte_headers().context("Failed to read header row")?);

    let mut rows = Vec::new();
    for (line, result) in rdr.byte_records().enumerate() {
        // +2: one for the header, one for 1-based line numbers
        let record = result.with_context(|| format!("Malformed CSV row at line {}", line + 2))?;
        rows.push(ProjectRecord::new(decode(&record)));
    }

    Ok(Catalog::build(header, rows, today))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Column, SCORE_HEADER};

    const EXPORT: &str = "\
ID,Name,Proponent,Project Type,AFOLU Activities,Methodology,Status,Country/Area,Estimated Annual Emission Reductions,Region,Project Registration Date,Crediting Period Start Date,Crediting Period End Date
1,Test Biochar,Company A,Waste handling and disposal,,VM0044,Registered,Germany,\"50,000\",Europe,2023-01-01,2023-01-01,2030-01-01
2,Forest Protection,Company B,Agriculture Forestry and Other Land Use,ARR,VM0007,Registered,Brazil,\"2,000,000\",Latin America,2015-01-01,2015-01-01,2035-01-01
N/A,Broken,Company C,,,,,,,,,,
3,Short row,Company D
";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn test_read_catalog() {
        let catalog = read_catalog(EXPORT.as_bytes(), today()).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.skipped(), 1);
        assert_eq!(catalog.header().len(), 14);
        assert_eq!(catalog.header()[13], SCORE_HEADER);

        let biochar = catalog.get(1).unwrap();
        assert_eq!(biochar.record.get(Column::EstimatedEmissions), "50,000");
        assert!((biochar.score - 87.25).abs() < 1e-9);
    }

    #[test]
    fn test_short_rows_are_kept() {
        let catalog = read_catalog(EXPORT.as_bytes(), today()).unwrap();
        let short = catalog.get(3).unwrap();
        assert_eq!(short.record.fields().len(), 3);
        assert_eq!(short.record.get(Column::Methodology), "");
    }

    #[test]
    fn test_invalid_utf8_field_is_not_fatal() {
        let mut export = b"ID,Name,Proponent\n".to_vec();
        export.extend_from_slice(b"1,Caf\xe9 Cooperative,Company A\n");
        export.extend_from_slice(b"2,Plain,Company B\n");

        let catalog = read_catalog(export.as_slice(), today()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.get(1).unwrap().record.get(Column::Name),
            "Caf\u{FFFD} Cooperative"
        );
        assert_eq!(catalog.get(1).unwrap().record.get(Column::Proponent), "Company A");
    }

    #[test]
    fn test_header_only() {
        let catalog = read_catalog("ID,Name\n".as_bytes(), today()).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_catalog(Path::new("/nonexistent/rate-my-vcc/allprojects.csv"));
        assert!(result.is_err());
    }
}
