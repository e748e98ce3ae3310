use crate::commands::db::open_store;
use crate::models::contract::ApiContract;
use crate::models::lifecycle::normalize_phases;
use crate::models::transfer::{
    ApiBundle, ApiExport, ExportedApiHeader, ExportedLifecycle, ImportReport, SkippedImport, BUNDLE_FORMAT_VERSION,
};
use crate::storage::repository::ContractRepository;
use crate::storage::KeyValueStore;
use chrono::{DateTime, Utc};
use serde_json::Value;

#[cfg_attr(feature = "desktop", tauri::command)]
pub async fn export_api(workspace_path: String, api_id: String) -> Result<ApiExport, String> {
    let store = open_store(&workspace_path)?;
    export_api_internal(&store, &api_id, Utc::now())
}

pub fn export_api_internal(store: &dyn KeyValueStore, api_id: &str, now: DateTime<Utc>) -> Result<ApiExport, String> {
    let api = ContractRepository::new(store).require(api_id)?;
    Ok(to_export(api, now))
}

#[cfg_attr(feature = "desktop", tauri::command)]
pub async fn export_all_apis(workspace_path: String) -> Result<ApiBundle, String> {
    let store = open_store(&workspace_path)?;
    export_all_apis_internal(&store, Utc::now())
}

pub fn export_all_apis_internal(store: &dyn KeyValueStore, now: DateTime<Utc>) -> Result<ApiBundle, String> {
    let apis = ContractRepository::new(store).list()?;
    log::info!("Exporting {} API contract(s)", apis.len());
    Ok(ApiBundle {
        version: BUNDLE_FORMAT_VERSION.to_string(),
        export_date: now,
        apis,
    })
}

#[cfg_attr(feature = "desktop", tauri::command)]
pub async fn import_apis(workspace_path: String, raw: String) -> Result<ImportReport, String> {
    let store = open_store(&workspace_path)?;
    import_apis_internal(&store, &raw)
}

/// Import either a single-contract export or a whole bundle.
///
/// Bundles skip contracts whose (name, version) is already registered and
/// report each skip. A single export with a taken identity is an error and
/// nothing is written.
pub fn import_apis_internal(store: &dyn KeyValueStore, raw: &str) -> Result<ImportReport, String> {
    let parsed: Value =
        serde_json::from_str(raw).map_err(|e| format!("INVALID_IMPORT: File is not valid JSON: {e}"))?;

    let repo = ContractRepository::new(store);
    let mut apis = repo.list()?;
    let mut report = ImportReport::default();
    let now = Utc::now();

    if let Some(items) = parsed.get("apis").and_then(Value::as_array) {
        for item in items {
            let api = match serde_json::from_value::<ApiContract>(item.clone()) {
                Ok(api) => api,
                Err(e) => {
                    report.skipped.push(SkippedImport {
                        name: text_field(item, "name"),
                        version: text_field(item, "version"),
                        reason: format!("Unreadable entry: {e}"),
                    });
                    continue;
                }
            };
            match admit(&mut apis, api, now) {
                Ok(id) => report.imported.push(id),
                Err(skip) => report.skipped.push(skip),
            }
        }
    } else if parsed.get("api").is_some_and(Value::is_object) {
        let export: ApiExport =
            serde_json::from_value(parsed).map_err(|e| format!("INVALID_IMPORT: Unreadable API export: {e}"))?;
        let id = admit(&mut apis, from_export(export), now)
            .map_err(|skip| format!("DUPLICATE: {} {} {}", skip.name, skip.version, skip.reason))?;
        report.imported.push(id);
    } else {
        return Err("INVALID_IMPORT: Expected an API export or an export bundle".to_string());
    }

    if !report.imported.is_empty() {
        repo.save_all(&apis)?;
    }
    for skip in &report.skipped {
        log::warn!("Skipped import of {} {}: {}", skip.name, skip.version, skip.reason);
    }
    log::info!(
        "Imported {} API contract(s), skipped {}",
        report.imported.len(),
        report.skipped.len()
    );
    Ok(report)
}

fn admit(apis: &mut Vec<ApiContract>, mut api: ApiContract, now: DateTime<Utc>) -> Result<String, SkippedImport> {
    if apis.iter().any(|existing| existing.same_identity(&api.name, &api.version)) {
        return Err(SkippedImport {
            name: api.name,
            version: api.version,
            reason: "is already registered".to_string(),
        });
    }

    if api.id.trim().is_empty() || apis.iter().any(|existing| existing.id == api.id) {
        api.id = uuid::Uuid::new_v4().to_string();
    }
    api.lifecycle = normalize_phases(&api.lifecycle);
    api.updated_at = now;

    let id = api.id.clone();
    apis.push(api);
    Ok(id)
}

fn text_field(item: &Value, key: &str) -> String {
    item.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
}

fn to_export(api: ApiContract, now: DateTime<Utc>) -> ApiExport {
    ApiExport {
        api: ExportedApiHeader {
            id: api.id,
            name: api.name,
            version: api.version,
            summary: api.summary,
            created_at: api.created_at,
            updated_at: api.updated_at,
            display_name: api.display_name,
            use_display_name: api.use_display_name,
            group: api.group,
            beta: api.beta,
        },
        contract: api.contract,
        specification: api.specification,
        lifecycle: ExportedLifecycle {
            phases: api.lifecycle,
            milestones: api.milestones,
        },
        issues: api.known_issues,
        backlog: api.backlog,
        pcm: api.pcm_fields,
        exported_at: now,
    }
}

fn from_export(export: ApiExport) -> ApiContract {
    let header = export.api;
    ApiContract {
        id: header.id,
        name: header.name,
        display_name: header.display_name,
        use_display_name: header.use_display_name,
        group: header.group,
        beta: header.beta,
        version: header.version,
        summary: header.summary,
        contract: export.contract,
        specification: export.specification,
        lifecycle: export.lifecycle.phases,
        milestones: export.lifecycle.milestones,
        known_issues: export.issues,
        backlog: export.backlog,
        pcm_fields: export.pcm,
        created_at: header.created_at,
        updated_at: header.updated_at,
    }
}
