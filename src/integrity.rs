// 🔍 Referential Integrity Checker
// Pre-import sanity pass over the CSV exports: foreign-key references are
// spot-checked on a leading sample, uniqueness constraints on the full file.
// Every finding is reported to stdout; nothing here aborts the process.

use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// One CSV row as header -> value, for datasets whose shape we treat as opaque
pub type CsvRow = HashMap<String, String>;

/// Foreign-key checks scan only this many leading rows per dataset
pub const SAMPLE_ROWS: usize = 10;
/// Cap on violations listed per reported line
pub const MAX_REPORTED: usize = 5;

// ============================================================================
// LOADING
// ============================================================================

/// Load a CSV file into opaque header-keyed rows
pub fn load_rows(csv_path: &Path) -> Result<Vec<CsvRow>> {
    let mut rdr = csv::Reader::from_path(csv_path)
        .with_context(|| format!("Failed to open CSV file {}", csv_path.display()))?;

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let row: CsvRow = result
            .with_context(|| format!("Failed to read row from {}", csv_path.display()))?;
        rows.push(row);
    }
    Ok(rows)
}

// ============================================================================
// CHECK PRIMITIVES
// ============================================================================

/// Collect the verbatim values of `field` across all rows (no key parsing)
pub fn id_set(rows: &[CsvRow], field: &str) -> HashSet<String> {
    rows.iter()
        .filter_map(|row| row.get(field))
        .cloned()
        .collect()
}

/// Scan the first `sample` rows and report values of `field` that are absent
/// from `known`, as 1-based (row, value) pairs. Empty values are not
/// references and are ignored.
pub fn missing_references(
    rows: &[CsvRow],
    field: &str,
    known: &HashSet<String>,
    sample: usize,
) -> Vec<(usize, String)> {
    rows.iter()
        .take(sample)
        .enumerate()
        .filter_map(|(i, row)| match row.get(field) {
            Some(value) if !value.is_empty() && !known.contains(value) => {
                Some((i + 1, value.clone()))
            }
            _ => None,
        })
        .collect()
}

/// Values of `field` appearing more than once, in first-seen order,
/// each listed exactly once
pub fn duplicate_values(rows: &[CsvRow], field: &str) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        if let Some(value) = row.get(field) {
            *counts.entry(value.as_str()).or_insert(0) += 1;
        }
    }

    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for row in rows {
        if let Some(value) = row.get(field) {
            if counts[value.as_str()] > 1 && seen.insert(value.as_str()) {
                duplicates.push(value.clone());
            }
        }
    }
    duplicates
}

/// True when `field` carries fewer distinct values than there are rows
pub fn has_duplicate_values(rows: &[CsvRow], field: &str) -> bool {
    let distinct: HashSet<&str> = rows
        .iter()
        .filter_map(|row| row.get(field).map(String::as_str))
        .collect();
    distinct.len() < rows.len()
}

// ============================================================================
// CHECKER
// ============================================================================

pub struct IntegrityChecker {
    csv_dir: PathBuf,
}

impl IntegrityChecker {
    pub fn new(csv_dir: impl Into<PathBuf>) -> Self {
        IntegrityChecker {
            csv_dir: csv_dir.into(),
        }
    }

    /// Load one dataset, downgrading any failure to a reported warning and an
    /// empty dataset so the remaining checks still run.
    fn load_or_empty(&self, filename: &str) -> Vec<CsvRow> {
        match load_rows(&self.csv_dir.join(filename)) {
            Ok(rows) => {
                println!("✅ Loaded {} records from {}", rows.len(), filename);
                rows
            }
            Err(err) => {
                println!("❌ Error loading {}: {:#}", filename, err);
                Vec::new()
            }
        }
    }

    fn report_references(&self, label: &str, missing: &[(usize, String)]) {
        if missing.is_empty() {
            println!("✅ All {label} references are valid");
        } else {
            let shown = &missing[..missing.len().min(MAX_REPORTED)];
            println!("❌ Missing {label} references: {shown:?}");
        }
    }

    /// Run every check and print the pass/fail report
    pub fn run(&self) {
        println!("🔍 VALIDATING FOREIGN KEY CONSTRAINTS");
        println!("{}", "=".repeat(50));

        let patients = self.load_or_empty("patients.csv");
        let profiles = self.load_or_empty("profiles.csv");
        let payment_records = self.load_or_empty("payment_records.csv");
        let user_roles = self.load_or_empty("user_roles.csv");

        let patient_ids = id_set(&patients, "patient_id");
        let profile_ids = id_set(&profiles, "id");

        println!("\n📊 Data Summary:");
        println!("   Patients: {}", patients.len());
        println!("   Profiles: {}", profiles.len());
        println!("   Payment Records: {}", payment_records.len());
        println!("   User Roles: {}", user_roles.len());

        println!("\n🔗 Checking payment_records foreign keys...");
        self.report_references(
            "patient",
            &missing_references(&payment_records, "patient_id", &patient_ids, SAMPLE_ROWS),
        );
        self.report_references(
            "user",
            &missing_references(&payment_records, "user_id", &profile_ids, SAMPLE_ROWS),
        );

        println!("\n🔗 Checking user_roles foreign keys...");
        self.report_references(
            "user role",
            &missing_references(&user_roles, "user_id", &profile_ids, SAMPLE_ROWS),
        );
        self.report_references(
            "granted_by",
            &missing_references(&user_roles, "granted_by", &profile_ids, SAMPLE_ROWS),
        );

        println!("\n📋 Data Consistency Checks:");

        let duplicate_ids = duplicate_values(&patients, "patient_id");
        if duplicate_ids.is_empty() {
            println!("✅ All patient_ids are unique");
        } else {
            let shown = &duplicate_ids[..duplicate_ids.len().min(MAX_REPORTED)];
            println!("❌ Duplicate patient_ids in patients: {shown:?}");
        }

        if has_duplicate_values(&patients, "email") {
            println!("❌ Duplicate emails found in patients");
        } else {
            println!("✅ All patient emails are unique");
        }

        if has_duplicate_values(&profiles, "email") {
            println!("❌ Duplicate emails found in profiles");
        } else {
            println!("✅ All profile emails are unique");
        }

        println!("\n🎯 Validation complete.");
        println!("If all checks pass, the CSV data should import cleanly.");
        println!("If any check failed, regenerate the CSV files before importing.");
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> CsvRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_id_set_takes_values_verbatim() {
        let rows = vec![
            row(&[("patient_id", "P0007"), ("email", "a@example.com")]),
            row(&[("patient_id", "P0010"), ("email", "b@example.com")]),
        ];

        let ids = id_set(&rows, "patient_id");
        // No prefix stripping here, unlike the SQL generator
        assert!(ids.contains("P0007"));
        assert!(ids.contains("P0010"));
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_missing_references_reports_one_based_positions() {
        let known: HashSet<String> = ["P0001".to_string(), "P0002".to_string()].into();
        let rows = vec![
            row(&[("patient_id", "P0001")]),
            row(&[("patient_id", "P0099")]),
            row(&[("patient_id", "P0002")]),
        ];

        let missing = missing_references(&rows, "patient_id", &known, SAMPLE_ROWS);
        assert_eq!(missing, vec![(2, "P0099".to_string())]);
    }

    #[test]
    fn test_missing_references_only_scans_sample_window() {
        let known: HashSet<String> = ["ok".to_string()].into();
        let mut rows: Vec<CsvRow> = (0..SAMPLE_ROWS).map(|_| row(&[("user_id", "ok")])).collect();
        // Row 11 is broken but sits outside the sample
        rows.push(row(&[("user_id", "missing")]));

        let missing = missing_references(&rows, "user_id", &known, SAMPLE_ROWS);
        assert!(missing.is_empty());
    }

    #[test]
    fn test_missing_references_ignores_empty_and_absent_fields() {
        let known: HashSet<String> = HashSet::new();
        let rows = vec![
            row(&[("user_id", "")]),
            row(&[("other_field", "x")]),
        ];

        let missing = missing_references(&rows, "user_id", &known, SAMPLE_ROWS);
        assert!(missing.is_empty());
    }

    #[test]
    fn test_duplicate_values_reports_each_value_once() {
        let rows = vec![
            row(&[("patient_id", "P0001")]),
            row(&[("patient_id", "P0002")]),
            row(&[("patient_id", "P0001")]),
            row(&[("patient_id", "P0001")]),
        ];

        let duplicates = duplicate_values(&rows, "patient_id");
        assert_eq!(duplicates, vec!["P0001".to_string()]);
    }

    #[test]
    fn test_duplicate_values_first_seen_order() {
        let rows = vec![
            row(&[("patient_id", "P0005")]),
            row(&[("patient_id", "P0003")]),
            row(&[("patient_id", "P0005")]),
            row(&[("patient_id", "P0003")]),
        ];

        let duplicates = duplicate_values(&rows, "patient_id");
        assert_eq!(duplicates, vec!["P0005".to_string(), "P0003".to_string()]);
    }

    #[test]
    fn test_has_duplicate_values() {
        let unique = vec![
            row(&[("email", "a@example.com")]),
            row(&[("email", "b@example.com")]),
        ];
        assert!(!has_duplicate_values(&unique, "email"));

        let duplicated = vec![
            row(&[("email", "a@example.com")]),
            row(&[("email", "a@example.com")]),
        ];
        assert!(has_duplicate_values(&duplicated, "email"));
    }

    #[test]
    fn test_load_rows_missing_file_is_an_error() {
        // The checker downgrades this to a warning; the loader itself errors
        assert!(load_rows(Path::new("no_such_file.csv")).is_err());
    }

    #[test]
    fn test_load_rows_fixture_keeps_headers() {
        let rows = load_rows(Path::new("test_payment_records.csv")).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["patient_id"], "P0007");
        assert_eq!(rows[0]["payment_status"], "completed");
        // user_id is opaque data to the checker but still present
        assert!(rows[0].contains_key("user_id"));
    }
}
