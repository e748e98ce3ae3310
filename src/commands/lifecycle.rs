use crate::analysis::lifecycle::current_phase;
use crate::commands::db::open_store;
use crate::models::lifecycle::{LifecyclePhase, LifecyclePhaseData, Milestone};
use crate::storage::repository::ContractRepository;
use crate::storage::KeyValueStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleStatus {
    pub api_id: String,
    pub phases: Vec<LifecyclePhaseData>,
    pub current_phase: Option<LifecyclePhase>,
    pub milestones: Vec<Milestone>,
}

#[cfg_attr(feature = "desktop", tauri::command)]
pub async fn get_lifecycle_status(workspace_path: String, api_id: String) -> Result<LifecycleStatus, String> {
    let store = open_store(&workspace_path)?;
    get_lifecycle_status_internal(&store, &api_id, Utc::now())
}

pub fn get_lifecycle_status_internal(
    store: &dyn KeyValueStore,
    api_id: &str,
    now: DateTime<Utc>,
) -> Result<LifecycleStatus, String> {
    let api = ContractRepository::new(store).require(api_id)?;
    Ok(LifecycleStatus {
        current_phase: current_phase(&api.lifecycle, now),
        api_id: api.id,
        phases: api.lifecycle,
        milestones: api.milestones,
    })
}

#[cfg_attr(feature = "desktop", tauri::command)]
pub async fn set_lifecycle_phase(
    workspace_path: String,
    api_id: String,
    phase: String,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
) -> Result<LifecycleStatus, String> {
    let store = open_store(&workspace_path)?;
    set_lifecycle_phase_internal(&store, &api_id, &phase, start_date, end_date)?;
    get_lifecycle_status_internal(&store, &api_id, Utc::now())
}

/// Set one phase interval. Clearing both dates empties the slot.
pub fn set_lifecycle_phase_internal(
    store: &dyn KeyValueStore,
    api_id: &str,
    phase: &str,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
) -> Result<(), String> {
    let phase = LifecyclePhase::parse(phase).ok_or_else(|| format!("INVALID_INPUT: Unknown lifecycle phase {phase}"))?;
    if let (Some(start), Some(end)) = (start_date, end_date) {
        if end < start {
            return Err("INVALID_INPUT: Phase end date is before its start date".to_string());
        }
    }

    ContractRepository::new(store).modify(api_id, |api| {
        if let Some(slot) = api.lifecycle.iter_mut().find(|slot| slot.phase == phase) {
            slot.start_date = start_date;
            slot.end_date = end_date;
        }
        Ok(())
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::contract::ApiContract;
    use crate::storage::MemoryStore;
    use chrono::Duration;

    #[test]
    fn setting_a_phase_changes_the_derived_current_phase() {
        let store = MemoryStore::new();
        let api = ContractRepository::new(&store)
            .upsert(ApiContract::new("consents", "3.0.0", Utc::now()))
            .unwrap();
        let now = Utc::now();

        set_lifecycle_phase_internal(&store, &api.id, "implementing", Some(now - Duration::days(30)), None)
            .unwrap();
        set_lifecycle_phase_internal(
            &store,
            &api.id,
            "current",
            Some(now - Duration::days(2)),
            Some(now + Duration::days(60)),
        )
        .unwrap();

        let status = get_lifecycle_status_internal(&store, &api.id, now).unwrap();
        // Implementing is open-ended and earlier in table order.
        assert_eq!(status.current_phase, Some(LifecyclePhase::Implementing));

        set_lifecycle_phase_internal(
            &store,
            &api.id,
            "implementing",
            Some(now - Duration::days(30)),
            Some(now - Duration::days(3)),
        )
        .unwrap();
        let status = get_lifecycle_status_internal(&store, &api.id, now).unwrap();
        assert_eq!(status.current_phase, Some(LifecyclePhase::Current));
        assert_eq!(status.phases.len(), 5);
    }

    #[test]
    fn rejects_unknown_phase_and_inverted_interval() {
        let store = MemoryStore::new();
        let api = ContractRepository::new(&store)
            .upsert(ApiContract::new("consents", "3.0.0", Utc::now()))
            .unwrap();
        let now = Utc::now();

        assert!(set_lifecycle_phase_internal(&store, &api.id, "sunset", None, None).is_err());
        assert!(set_lifecycle_phase_internal(&store, &api.id, "retired", Some(now), Some(now - Duration::days(1)))
            .is_err());
    }
}
