use crate::analysis::csv::{parse_csv, read_header};
use crate::analysis::validation::validate_report;
use crate::commands::db::open_store;
use crate::commands::reports::write_report;
use crate::commands::settings::load_settings;
use crate::models::report::ValidationResult;
use crate::models::settings::AppSettings;
use crate::reports::validation_summary::render_validation_summary;
use crate::storage::repository::ContractRepository;
use crate::storage::KeyValueStore;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

#[cfg_attr(feature = "desktop", tauri::command)]
pub async fn validate_csv(workspace_path: String, api_id: String, csv_text: String) -> Result<ValidationResult, String> {
    let store = open_store(&workspace_path)?;
    validate_csv_internal(&store, &api_id, &csv_text)
}

#[cfg_attr(feature = "desktop", tauri::command)]
pub async fn validate_csv_file(workspace_path: String, api_id: String, path: String) -> Result<ValidationResult, String> {
    let csv_text = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| format!("READ_FAILED: Could not read {path}: {e}"))?;
    let store = open_store(&workspace_path)?;
    validate_csv_internal(&store, &api_id, &csv_text)
}

pub fn validate_csv_internal(
    store: &dyn KeyValueStore,
    api_id: &str,
    csv_text: &str,
) -> Result<ValidationResult, String> {
    let api = ContractRepository::new(store).require(api_id)?;
    check_report_header(csv_text)?;

    let rows = parse_csv(csv_text);
    let result = validate_report(&rows, &api);
    log::info!(
        "Validated report for {}: {}/{} row(s) matched, {} finding(s)",
        api.id,
        result.matched_rows,
        result.total_rows,
        result.findings.len()
    );
    Ok(result)
}

/// Reject text with no header line. Missing columns read as empty values,
/// so such rows simply stay unmatched.
fn check_report_header(csv_text: &str) -> Result<(), String> {
    read_header(csv_text).map(|_| ()).ok_or_else(|| "INVALID_CSV: Report is empty".to_string())
}

#[cfg_attr(feature = "desktop", tauri::command)]
pub async fn export_validation_pdf(
    workspace_path: String,
    api_id: String,
    csv_text: String,
    output_path: String,
) -> Result<Value, String> {
    let bytes = {
        let store = open_store(&workspace_path)?;
        let settings = load_settings(&store)?;
        validation_pdf_internal(&store, &api_id, &csv_text, &settings, Utc::now())?
    };

    write_report(&output_path, &bytes).await?;
    Ok(json!({"status": "exported", "path": output_path, "bytes": bytes.len()}))
}

pub fn validation_pdf_internal(
    store: &dyn KeyValueStore,
    api_id: &str,
    csv_text: &str,
    settings: &AppSettings,
    now: DateTime<Utc>,
) -> Result<Vec<u8>, String> {
    let result = validate_csv_internal(store, api_id, csv_text)?;
    let api = ContractRepository::new(store).require(api_id)?;
    Ok(render_validation_summary(&api, &result, settings, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::contract::ApiContract;
    use crate::models::report::FindingSeverity;
    use crate::storage::MemoryStore;

    const REPORT: &str = "org_id_ignored,api_family,api_version,endpoint,statuscode,qtd_paired,qtd_paired_inconsistent,qtd_unpaired,qtd_chamadas\n\
        x,accounts,v2,/accounts/v2/accounts,200,70,5,25,100\n\
        x,accounts,v1,/accounts/v1/accounts,200,1,0,0,1\n";

    fn seeded(store: &MemoryStore) -> String {
        let mut api = ApiContract::new("accounts", "2.4.0", Utc::now());
        api.specification = Some(json!({
            "paths": {
                "/accounts/v2/accounts": { "get": {} },
                "/accounts/v2/accounts/{accountId}": { "get": {} }
            }
        }));
        ContractRepository::new(store).upsert(api).unwrap().id
    }

    #[test]
    fn validates_matched_rows_only() {
        let store = MemoryStore::new();
        let api_id = seeded(&store);

        let result = validate_csv_internal(&store, &api_id, REPORT).unwrap();
        assert_eq!(result.total_rows, 2);
        assert_eq!(result.matched_rows, 1);
        assert_eq!(result.pairing.total, 100);
        assert_eq!(result.findings[0].severity, FindingSeverity::Info);
        assert!(result
            .findings
            .iter()
            .any(|finding| finding.severity == FindingSeverity::Error));
    }

    #[test]
    fn rejects_empty_text() {
        let store = MemoryStore::new();
        let api_id = seeded(&store);

        let err = validate_csv_internal(&store, &api_id, "\n\n").unwrap_err();
        assert!(err.starts_with("INVALID_CSV"));
    }

    #[test]
    fn report_without_family_columns_leaves_rows_unmatched() {
        let store = MemoryStore::new();
        let api_id = seeded(&store);

        let text = "endpoint,qtd_chamadas\n/accounts/v2/accounts,1\n/accounts/v2/accounts,4\n";
        let result = validate_csv_internal(&store, &api_id, text).unwrap();
        assert_eq!(result.total_rows, 2);
        assert_eq!(result.matched_rows, 0);
        assert_eq!(result.unmatched_rows, 2);
        assert_eq!(result.total_calls, 0);
    }

    #[test]
    fn header_only_report_is_valid_and_empty() {
        let store = MemoryStore::new();
        let api_id = seeded(&store);

        let result = validate_csv_internal(&store, &api_id, "api_family,api_version\n").unwrap();
        assert_eq!(result.total_rows, 0);
        assert!(result.date_range.is_none());
    }

    #[test]
    fn unknown_api_is_not_found() {
        let store = MemoryStore::new();
        let err = validate_csv_internal(&store, "missing", REPORT).unwrap_err();
        assert!(err.starts_with("NOT_FOUND"));
    }

    #[test]
    fn renders_summary_pdf() {
        let store = MemoryStore::new();
        let api_id = seeded(&store);
        let bytes = validation_pdf_internal(&store, &api_id, REPORT, &AppSettings::default(), Utc::now()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.4"));
    }
}
