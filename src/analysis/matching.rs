use crate::analysis::family::detect_csv_family;
use crate::models::contract::ApiContract;
use crate::models::report::{CsvRow, MatchedRows};

/// `"v" + major`, e.g. `2.3.1` → `v2`. A leading `v` in the version string is
/// not doubled.
pub fn major_version_tag(version: &str) -> String {
    let trimmed = version.trim();
    let without_prefix = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);
    let major = without_prefix.split('.').next().unwrap_or("").trim();
    format!("v{major}")
}

pub fn filter_matching_rows(rows: &[CsvRow], api: &ApiContract) -> MatchedRows {
    let family = detect_csv_family(api);
    filter_rows_for(rows, family.as_deref(), &major_version_tag(&api.version))
}

/// Split rows by family (case-insensitive) and exact version tag. Without a
/// family every row is unmatched.
pub fn filter_rows_for(rows: &[CsvRow], family: Option<&str>, version_tag: &str) -> MatchedRows {
    let mut out = MatchedRows::default();

    for row in rows {
        let family_ok = family
            .map(|family| row.api_family.eq_ignore_ascii_case(family))
            .unwrap_or(false);
        if family_ok && row.api_version == version_tag {
            out.matched.push(row.clone());
        } else {
            out.unmatched.push(row.clone());
        }
    }

    out
}
