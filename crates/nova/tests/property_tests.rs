//! Property-based tests for identity, deduplication and table alignment.
//!
//! # Running Property Tests
//!
//! ```bash
//! cargo test -p nova --test property_tests
//!
//! # More cases (slower but more thorough)
//! PROPTEST_CASES=10000 cargo test -p nova --test property_tests
//! ```

use std::collections::HashSet;

use proptest::prelude::*;

use nova::DataTable;
use nova::md::stats::{RunningStats, round_to};
use nova::md::parse_file_name;
use nova::molecule::{IdentityMerger, compute_uid, concat_diagonal, dedupe_first};

// =============================================================================
// Test Strategies
// =============================================================================

/// SMILES-like strings from a small alphabet so duplicates are common.
fn smiles_like() -> impl Strategy<Value = String> {
    "[CNO]{1,4}"
}

/// A `SMILES`/`ID` table with up to 30 rows.
fn molecule_table() -> impl Strategy<Value = DataTable> {
    prop::collection::vec((smiles_like(), "[A-Z]{3}[0-9]{2}"), 0..30).prop_map(|rows| {
        DataTable::new(
            vec!["SMILES".to_string(), "ID".to_string()],
            rows.into_iter().map(|(s, id)| vec![s, id]).collect(),
        )
    })
}

/// A table with a random subset of columns from a fixed pool.
fn partial_table() -> impl Strategy<Value = DataTable> {
    (
        prop::sample::subsequence(vec!["SMILES", "ID", "name", "mass", "formula"], 1..=5),
        0..5usize,
    )
        .prop_map(|(columns, rows)| {
            let headers: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
            let body = (0..rows)
                .map(|r| headers.iter().map(|h| format!("{h}{r}")).collect())
                .collect();
            DataTable::new(headers, body)
        })
}

// =============================================================================
// Identity
// =============================================================================

proptest! {
    /// The uid is a pure function of the SMILES text.
    #[test]
    fn uid_is_stable(smiles in ".{0,80}") {
        let a = compute_uid(&smiles);
        let b = compute_uid(&smiles);
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a.len(), 64);
        prop_assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    /// Distinct SMILES produce distinct uids.
    #[test]
    fn uid_distinguishes_smiles(a in smiles_like(), b in smiles_like()) {
        prop_assume!(a != b);
        prop_assert_ne!(compute_uid(&a), compute_uid(&b));
    }
}

// =============================================================================
// Deduplication
// =============================================================================

proptest! {
    /// After dedup every SMILES appears once, and the surviving row is the
    /// first one seen.
    #[test]
    fn dedup_keeps_first_seen(table in molecule_table()) {
        let (deduped, removed) = dedupe_first(&table, "SMILES");

        let smiles: Vec<&str> = deduped.column_values(0).collect();
        let unique: HashSet<&str> = smiles.iter().copied().collect();
        prop_assert_eq!(smiles.len(), unique.len());
        prop_assert_eq!(deduped.row_count() + removed, table.row_count());

        for row in &deduped.rows {
            let first = table.rows.iter().find(|r| r[0] == row[0]).unwrap();
            prop_assert_eq!(first, row);
        }
    }

    /// Merged output has one row per distinct SMILES, each with its uid.
    #[test]
    fn merge_assigns_one_uid_per_structure(a in molecule_table(), b in molecule_table()) {
        let distinct: HashSet<String> = a.rows.iter().chain(&b.rows).map(|r| r[0].clone()).collect();
        prop_assume!(!distinct.is_empty());

        let merger = IdentityMerger::new("_processed");
        let (merged, report) = merger
            .merge_tables(vec![("a".to_string(), a), ("b".to_string(), b)])
            .unwrap();

        prop_assert_eq!(merged.row_count(), distinct.len());
        prop_assert_eq!(report.rows_in - report.duplicates_removed, report.rows_out);
        for row in 0..merged.row_count() {
            let smiles = merged.get_by_name(row, "SMILES").unwrap();
            prop_assert_eq!(merged.get_by_name(row, "uid").unwrap(), compute_uid(smiles));
        }
    }
}

// =============================================================================
// Diagonal Concatenation
// =============================================================================

proptest! {
    /// The result's columns are exactly the union of the inputs', and every
    /// input row is present.
    #[test]
    fn concat_covers_schema_union(tables in prop::collection::vec(partial_table(), 1..5)) {
        let combined = concat_diagonal(&tables);

        let expected: HashSet<&str> = tables
            .iter()
            .flat_map(|t| t.headers.iter().map(String::as_str))
            .collect();
        let actual: HashSet<&str> = combined.headers.iter().map(String::as_str).collect();
        prop_assert_eq!(&actual, &expected);
        prop_assert_eq!(combined.headers.len(), expected.len());

        let total: usize = tables.iter().map(DataTable::row_count).sum();
        prop_assert_eq!(combined.row_count(), total);
        prop_assert!(combined.rows.iter().all(|r| r.len() == combined.headers.len()));
    }
}

// =============================================================================
// Statistics and File Names
// =============================================================================

proptest! {
    /// Running statistics match the two-pass population formulas.
    #[test]
    fn running_stats_match_two_pass(values in prop::collection::vec(-1.0e6f64..1.0e6, 1..200)) {
        let mut stats = RunningStats::new();
        for v in &values {
            stats.add(*v);
        }
        let summary = stats.summary().unwrap();

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        prop_assert!((summary.mean - mean).abs() <= 1e-6 * (1.0 + mean.abs()));
        prop_assert!((summary.std - var.sqrt()).abs() <= 1e-6 * (1.0 + var.sqrt()));
    }

    /// Rounding never moves a value by more than half a unit in the last place.
    #[test]
    fn rounding_is_bounded(value in -1.0e6f64..1.0e6, decimals in 0u32..7) {
        let rounded = round_to(value, decimals);
        let unit = 10f64.powi(decimals as i32);
        prop_assert!((rounded - value).abs() <= 0.5 / unit + 1e-9);
    }

    /// `<ligand>-<protein>-rmsd.xvg` always splits back into its parts.
    #[test]
    fn file_name_round_trip(ligand in "[a-z0-9]{1,10}", protein in "[A-Za-z0-9_-]{1,12}") {
        let key = parse_file_name(&format!("{ligand}-{protein}-rmsd.xvg"), ".xvg", "-rmsd");
        prop_assert_eq!(key.ligand, ligand);
        prop_assert_eq!(key.protein, protein);
    }
}
