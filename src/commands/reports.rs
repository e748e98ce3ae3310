use crate::commands::db::open_store;
use crate::commands::settings::load_settings;
use crate::models::settings::AppSettings;
use crate::reports::field_listing::render_field_listing;
use crate::storage::repository::ContractRepository;
use crate::storage::KeyValueStore;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::path::Path;

#[cfg_attr(feature = "desktop", tauri::command)]
pub async fn export_pcm_report_pdf(
    workspace_path: String,
    api_id: String,
    output_path: String,
) -> Result<Value, String> {
    let bytes = {
        let store = open_store(&workspace_path)?;
        let settings = load_settings(&store)?;
        pcm_report_internal(&store, &api_id, &settings, Utc::now())?
    };

    write_report(&output_path, &bytes).await?;
    Ok(json!({"status": "exported", "path": output_path, "bytes": bytes.len()}))
}

pub fn pcm_report_internal(
    store: &dyn KeyValueStore,
    api_id: &str,
    settings: &AppSettings,
    now: DateTime<Utc>,
) -> Result<Vec<u8>, String> {
    let api = ContractRepository::new(store).require(api_id)?;
    Ok(render_field_listing(&api, settings, now))
}

/// Write a rendered report, creating missing parent directories.
pub async fn write_report(output_path: &str, bytes: &[u8]) -> Result<(), String> {
    if output_path.trim().is_empty() {
        return Err("INVALID_INPUT: Output path is required".to_string());
    }

    if let Some(parent) = Path::new(output_path).parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| format!("WRITE_FAILED: Could not create {}: {e}", parent.display()))?;
    }
    tokio::fs::write(output_path, bytes)
        .await
        .map_err(|e| format!("WRITE_FAILED: Could not write {output_path}: {e}"))?;

    log::info!("Wrote {} byte report to {output_path}", bytes.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::contract::ApiContract;
    use crate::storage::MemoryStore;

    #[test]
    fn renders_listing_for_stored_contract() {
        let store = MemoryStore::new();
        let api = ContractRepository::new(&store)
            .upsert(ApiContract::new("loans", "2.0.0", Utc::now()))
            .unwrap();

        let bytes = pcm_report_internal(&store, &api.id, &AppSettings::default(), Utc::now()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(pcm_report_internal(&store, "missing", &AppSettings::default(), Utc::now()).is_err());
    }

    #[tokio::test]
    async fn write_report_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out").join("fields.pdf");

        write_report(target.to_str().unwrap(), b"%PDF-1.4\n").await.unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"%PDF-1.4\n");
        assert!(write_report("  ", b"").await.is_err());
    }
}
