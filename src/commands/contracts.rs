use crate::analysis::lifecycle::current_phase;
use crate::analysis::openapi::{parse_specification, spec_info};
use crate::commands::db::open_store;
use crate::models::contract::ApiContract;
use crate::models::lifecycle::{normalize_phases, LifecyclePhase};
use crate::storage::repository::ContractRepository;
use crate::storage::KeyValueStore;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

#[cfg_attr(feature = "desktop", tauri::command)]
pub async fn api_crud(
    workspace_path: String,
    operation: String,
    item: Option<ApiContract>,
    id: Option<String>,
) -> Result<Value, String> {
    let store = open_store(&workspace_path)?;
    api_crud_internal(&store, &operation, item, id.as_deref())
}

pub fn api_crud_internal(
    store: &dyn KeyValueStore,
    operation: &str,
    item: Option<ApiContract>,
    id: Option<&str>,
) -> Result<Value, String> {
    let repo = ContractRepository::new(store);

    match operation {
        "create" => {
            let mut item = item.ok_or("Item required for create")?;
            if item.name.trim().is_empty() || item.version.trim().is_empty() {
                return Err("INVALID_INPUT: Name and version are required".to_string());
            }
            if item.id.trim().is_empty() {
                item.id = uuid::Uuid::new_v4().to_string();
            }
            if repo.get(&item.id)?.is_some() {
                return Err(format!("DUPLICATE: An API with id {} already exists", item.id));
            }
            if repo.find_by_identity(&item.name, &item.version)?.is_some() {
                return Err(format!(
                    "DUPLICATE: {} {} is already registered",
                    item.name, item.version
                ));
            }

            item.created_at = Utc::now();
            item.lifecycle = normalize_phases(&item.lifecycle);
            let saved = repo.upsert(item)?;
            log::info!("Created API contract {} ({} {})", saved.id, saved.name, saved.version);
            Ok(json!({"status": "created", "id": saved.id}))
        }
        "update" => {
            let mut item = item.ok_or("Item required for update")?;
            if item.name.trim().is_empty() || item.version.trim().is_empty() {
                return Err("INVALID_INPUT: Name and version are required".to_string());
            }
            let stored = repo.require(&item.id)?;
            if let Some(other) = repo.find_by_identity(&item.name, &item.version)? {
                if other.id != item.id {
                    return Err(format!(
                        "DUPLICATE: {} {} is already registered",
                        item.name, item.version
                    ));
                }
            }

            item.created_at = stored.created_at;
            let saved = repo.upsert(item)?;
            Ok(json!({"status": "updated", "id": saved.id}))
        }
        "read" => {
            let id = id.ok_or("ID required for read")?;
            let item = repo.get(id)?;
            Ok(serde_json::to_value(item).unwrap_or(Value::Null))
        }
        "list" => {
            let items = repo.list()?;
            Ok(serde_json::to_value(items).unwrap_or_default())
        }
        "delete" => {
            let id = id.ok_or("ID required for delete")?;
            let removed = repo.delete(id)?;
            if removed {
                log::info!("Deleted API contract {id}");
            }
            Ok(json!({"status": "deleted", "removed": removed}))
        }
        _ => Err(format!("Unknown operation: {operation}")),
    }
}

#[cfg_attr(feature = "desktop", tauri::command)]
pub async fn register_specification(
    workspace_path: String,
    raw: String,
    name: Option<String>,
    version: Option<String>,
) -> Result<ApiContract, String> {
    let store = open_store(&workspace_path)?;
    register_specification_internal(&store, &raw, name.as_deref(), version.as_deref())
}

/// Create a contract from an OpenAPI document, taking name and version from
/// `info` unless given explicitly.
pub fn register_specification_internal(
    store: &dyn KeyValueStore,
    raw: &str,
    name: Option<&str>,
    version: Option<&str>,
) -> Result<ApiContract, String> {
    let spec = parse_specification(raw)?;
    let info = spec_info(&spec);

    let name = name
        .map(str::to_string)
        .filter(|n| !n.trim().is_empty())
        .or(info.title)
        .ok_or("INVALID_SPEC: Specification has no info.title; provide a name")?;
    let version = version
        .map(str::to_string)
        .filter(|v| !v.trim().is_empty())
        .or(info.version)
        .ok_or("INVALID_SPEC: Specification has no info.version; provide a version")?;

    let mut api = ApiContract::new(&name, &version, Utc::now());
    api.summary = info.description.unwrap_or_default();
    api.contract = raw.to_string();
    api.specification = Some(spec);

    let created = api_crud_internal(store, "create", Some(api), None)?;
    let id = created["id"].as_str().unwrap_or_default().to_string();
    ContractRepository::new(store).require(&id)
}

#[cfg_attr(feature = "desktop", tauri::command)]
pub async fn import_specification(
    workspace_path: String,
    api_id: String,
    raw: String,
) -> Result<ApiContract, String> {
    let store = open_store(&workspace_path)?;
    import_specification_internal(&store, &api_id, &raw)
}

/// Replace the raw and parsed specification of an existing contract. A
/// document that fails to parse leaves the contract untouched.
pub fn import_specification_internal(
    store: &dyn KeyValueStore,
    api_id: &str,
    raw: &str,
) -> Result<ApiContract, String> {
    let spec = parse_specification(raw)?;
    let description = spec_info(&spec).description;

    ContractRepository::new(store).modify(api_id, |api| {
        api.contract = raw.to_string();
        api.specification = Some(spec);
        if api.summary.trim().is_empty() {
            api.summary = description.unwrap_or_default();
        }
        Ok(())
    })
}

#[cfg_attr(feature = "desktop", tauri::command)]
pub async fn snapshot_api(workspace_path: String, api_id: String) -> Result<Value, String> {
    let store = open_store(&workspace_path)?;
    snapshot_api_internal(&store, &api_id)
}

pub fn snapshot_api_internal(store: &dyn KeyValueStore, api_id: &str) -> Result<Value, String> {
    let repo = ContractRepository::new(store);
    let api = repo.require(api_id)?;
    repo.save_snapshot(&api)?;
    Ok(json!({"status": "snapshotted", "id": api.id}))
}

#[cfg_attr(feature = "desktop", tauri::command)]
pub async fn restore_api_snapshot(workspace_path: String, api_id: String) -> Result<ApiContract, String> {
    let store = open_store(&workspace_path)?;
    restore_api_snapshot_internal(&store, &api_id)
}

pub fn restore_api_snapshot_internal(store: &dyn KeyValueStore, api_id: &str) -> Result<ApiContract, String> {
    let repo = ContractRepository::new(store);
    let snapshot = repo
        .load_snapshot(api_id)?
        .ok_or_else(|| format!("NOT_FOUND: No snapshot stored for API {api_id}"))?;
    repo.upsert(snapshot)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_apis: usize,
    pub beta_apis: usize,
    pub by_phase: BTreeMap<String, usize>,
    pub without_phase: usize,
    pub open_issues: usize,
    pub pending_backlog: usize,
    pub pcm_fields: usize,
}

#[cfg_attr(feature = "desktop", tauri::command)]
pub async fn portfolio_summary(workspace_path: String) -> Result<PortfolioSummary, String> {
    let store = open_store(&workspace_path)?;
    portfolio_summary_internal(&store)
}

pub fn portfolio_summary_internal(store: &dyn KeyValueStore) -> Result<PortfolioSummary, String> {
    let apis = ContractRepository::new(store).list()?;
    let now = Utc::now();

    let mut by_phase: BTreeMap<String, usize> = LifecyclePhase::ALL
        .iter()
        .map(|phase| (phase.as_str().to_string(), 0))
        .collect();
    let mut without_phase = 0;
    for api in &apis {
        match current_phase(&api.lifecycle, now) {
            Some(phase) => *by_phase.entry(phase.as_str().to_string()).or_insert(0) += 1,
            None => without_phase += 1,
        }
    }

    Ok(PortfolioSummary {
        total_apis: apis.len(),
        beta_apis: apis.iter().filter(|api| api.beta).count(),
        by_phase,
        without_phase,
        open_issues: apis
            .iter()
            .flat_map(|api| api.known_issues.iter())
            .filter(|issue| issue.is_open())
            .count(),
        pending_backlog: apis
            .iter()
            .flat_map(|api| api.backlog.iter())
            .filter(|item| item.status != crate::models::contract::BacklogStatus::Done)
            .count(),
        pcm_fields: apis.iter().map(|api| api.pcm_fields.len()).sum(),
    })
}
