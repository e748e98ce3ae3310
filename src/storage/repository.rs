use crate::models::contract::ApiContract;
use crate::models::lifecycle::normalize_phases;
use crate::storage::{read_json, read_json_opt, snapshot_key, write_json, KeyValueStore, CONTRACTS_KEY};
use chrono::Utc;

/// The API collection, stored whole under one key and edited by id.
pub struct ContractRepository<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> ContractRepository<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Result<Vec<ApiContract>, String> {
        let mut apis: Vec<ApiContract> = read_json(self.store, CONTRACTS_KEY)?;
        for api in &mut apis {
            api.lifecycle = normalize_phases(&api.lifecycle);
        }
        Ok(apis)
    }

    pub fn get(&self, id: &str) -> Result<Option<ApiContract>, String> {
        Ok(self.list()?.into_iter().find(|api| api.id == id))
    }

    pub fn require(&self, id: &str) -> Result<ApiContract, String> {
        self.get(id)?
            .ok_or_else(|| format!("NOT_FOUND: No API contract with id {id}"))
    }

    pub fn find_by_identity(&self, name: &str, version: &str) -> Result<Option<ApiContract>, String> {
        Ok(self
            .list()?
            .into_iter()
            .find(|api| api.same_identity(name, version)))
    }

    pub fn save_all(&self, apis: &[ApiContract]) -> Result<(), String> {
        write_json(self.store, CONTRACTS_KEY, apis)
    }

    /// Replace the contract with the same id, or append it. Refreshes
    /// `updated_at`.
    pub fn upsert(&self, mut api: ApiContract) -> Result<ApiContract, String> {
        api.lifecycle = normalize_phases(&api.lifecycle);
        api.updated_at = Utc::now();

        let mut apis = self.list()?;
        match apis.iter_mut().find(|existing| existing.id == api.id) {
            Some(slot) => *slot = api.clone(),
            None => apis.push(api.clone()),
        }
        self.save_all(&apis)?;
        Ok(api)
    }

    /// Apply `edit` to the stored contract and write it back.
    pub fn modify<F>(&self, id: &str, edit: F) -> Result<ApiContract, String>
    where
        F: FnOnce(&mut ApiContract) -> Result<(), String>,
    {
        let mut api = self.require(id)?;
        edit(&mut api)?;
        self.upsert(api)
    }

    pub fn delete(&self, id: &str) -> Result<bool, String> {
        let mut apis = self.list()?;
        let before = apis.len();
        apis.retain(|api| api.id != id);
        let removed = apis.len() != before;
        if removed {
            self.save_all(&apis)?;
            self.store.remove(&snapshot_key(id))?;
        }
        Ok(removed)
    }

    pub fn save_snapshot(&self, api: &ApiContract) -> Result<(), String> {
        write_json(self.store, &snapshot_key(&api.id), api)
    }

    pub fn load_snapshot(&self, id: &str) -> Result<Option<ApiContract>, String> {
        read_json_opt(self.store, &snapshot_key(id))
    }
}
