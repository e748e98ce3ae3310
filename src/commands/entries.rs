use crate::analysis::pcm_mapping::generate_pcm_fields;
use crate::commands::db::open_store;
use crate::models::contract::{ApiContract, BacklogItem, KnownIssue};
use crate::models::lifecycle::Milestone;
use crate::models::pcm::PcmField;
use crate::storage::repository::ContractRepository;
use crate::storage::KeyValueStore;
use serde::Serialize;
use serde_json::{json, Value};

/// A record nested inside one contract and addressed by its own id.
pub trait NestedEntry: Clone + Serialize {
    const LABEL: &'static str;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    fn collection(api: &mut ApiContract) -> &mut Vec<Self>;

    /// Reject an entry that clashes with another one already present.
    fn check_conflict(&self, _others: &[Self]) -> Result<(), String> {
        Ok(())
    }
}

impl NestedEntry for KnownIssue {
    const LABEL: &'static str = "Known issue";

    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
    fn collection(api: &mut ApiContract) -> &mut Vec<Self> {
        &mut api.known_issues
    }
}

impl NestedEntry for BacklogItem {
    const LABEL: &'static str = "Backlog item";

    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
    fn collection(api: &mut ApiContract) -> &mut Vec<Self> {
        &mut api.backlog
    }
}

impl NestedEntry for Milestone {
    const LABEL: &'static str = "Milestone";

    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
    fn collection(api: &mut ApiContract) -> &mut Vec<Self> {
        &mut api.milestones
    }
}

impl NestedEntry for PcmField {
    const LABEL: &'static str = "PCM field";

    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
    fn collection(api: &mut ApiContract) -> &mut Vec<Self> {
        &mut api.pcm_fields
    }

    fn check_conflict(&self, others: &[Self]) -> Result<(), String> {
        let key = self.key();
        match others.iter().find(|other| other.id != self.id && other.key() == key) {
            Some(_) => Err(format!(
                "DUPLICATE: {} {} already has a PCM field named {}",
                key.1, key.0, key.2
            )),
            None => Ok(()),
        }
    }
}

/// Shared create/update/delete/list over one nested collection.
pub fn entry_crud_internal<T: NestedEntry>(
    store: &dyn KeyValueStore,
    api_id: &str,
    operation: &str,
    item: Option<T>,
    id: Option<&str>,
) -> Result<Value, String> {
    let repo = ContractRepository::new(store);

    match operation {
        "list" => {
            let mut api = repo.require(api_id)?;
            Ok(serde_json::to_value(T::collection(&mut api).clone()).unwrap_or_default())
        }
        "create" => {
            let mut item = item.ok_or("Item required for create")?;
            if item.id().trim().is_empty() {
                item.set_id(uuid::Uuid::new_v4().to_string());
            }
            let new_id = item.id().to_string();
            repo.modify(api_id, |api| {
                let entries = T::collection(api);
                if entries.iter().any(|entry| entry.id() == new_id) {
                    return Err(format!("DUPLICATE: {} {new_id} already exists", T::LABEL));
                }
                item.check_conflict(entries.as_slice())?;
                entries.push(item);
                Ok(())
            })?;
            Ok(json!({"status": "created", "id": new_id}))
        }
        "update" => {
            let item = item.ok_or("Item required for update")?;
            let target = item.id().to_string();
            repo.modify(api_id, |api| {
                let entries = T::collection(api);
                item.check_conflict(entries.as_slice())?;
                let slot = entries
                    .iter_mut()
                    .find(|entry| entry.id() == target)
                    .ok_or_else(|| format!("NOT_FOUND: {} {target} does not exist", T::LABEL))?;
                *slot = item;
                Ok(())
            })?;
            Ok(json!({"status": "updated", "id": target}))
        }
        "delete" => {
            let id = id.ok_or("ID required for delete")?.to_string();
            repo.modify(api_id, |api| {
                T::collection(api).retain(|entry| entry.id() != id);
                Ok(())
            })?;
            Ok(json!({"status": "deleted"}))
        }
        _ => Err(format!("Unknown operation: {operation}")),
    }
}

#[cfg_attr(feature = "desktop", tauri::command)]
pub async fn issue_crud(
    workspace_path: String,
    api_id: String,
    operation: String,
    item: Option<KnownIssue>,
    id: Option<String>,
) -> Result<Value, String> {
    let store = open_store(&workspace_path)?;
    entry_crud_internal(&store, &api_id, &operation, item, id.as_deref())
}

#[cfg_attr(feature = "desktop", tauri::command)]
pub async fn backlog_crud(
    workspace_path: String,
    api_id: String,
    operation: String,
    item: Option<BacklogItem>,
    id: Option<String>,
) -> Result<Value, String> {
    let store = open_store(&workspace_path)?;
    entry_crud_internal(&store, &api_id, &operation, item, id.as_deref())
}

#[cfg_attr(feature = "desktop", tauri::command)]
pub async fn milestone_crud(
    workspace_path: String,
    api_id: String,
    operation: String,
    item: Option<Milestone>,
    id: Option<String>,
) -> Result<Value, String> {
    let store = open_store(&workspace_path)?;
    entry_crud_internal(&store, &api_id, &operation, item, id.as_deref())
}

#[cfg_attr(feature = "desktop", tauri::command)]
pub async fn pcm_crud(
    workspace_path: String,
    api_id: String,
    operation: String,
    item: Option<PcmField>,
    id: Option<String>,
) -> Result<Value, String> {
    let store = open_store(&workspace_path)?;
    entry_crud_internal(&store, &api_id, &operation, item, id.as_deref())
}

#[cfg_attr(feature = "desktop", tauri::command)]
pub async fn auto_map_pcm_fields(workspace_path: String, api_id: String) -> Result<Value, String> {
    let store = open_store(&workspace_path)?;
    auto_map_pcm_fields_internal(&store, &api_id)
}

pub fn auto_map_pcm_fields_internal(store: &dyn KeyValueStore, api_id: &str) -> Result<Value, String> {
    let mut added = 0;
    let api = ContractRepository::new(store).modify(api_id, |api| {
        let generated = generate_pcm_fields(
            api.specification.as_ref(),
            &api.name,
            &api.version,
            &api.pcm_fields,
        );
        added = generated.len();
        api.pcm_fields.extend(generated);
        Ok(())
    })?;

    log::info!("Auto-mapped {added} PCM field(s) for {}", api.id);
    Ok(json!({"status": "mapped", "added": added, "total": api.pcm_fields.len()}))
}
