use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecyclePhase {
    Implementing,
    Certifying,
    Current,
    Deprecated,
    Retired,
}

impl LifecyclePhase {
    /// Table order used for storage and for current-phase resolution.
    pub const ALL: [LifecyclePhase; 5] = [
        LifecyclePhase::Implementing,
        LifecyclePhase::Certifying,
        LifecyclePhase::Current,
        LifecyclePhase::Deprecated,
        LifecyclePhase::Retired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecyclePhase::Implementing => "implementing",
            LifecyclePhase::Certifying => "certifying",
            LifecyclePhase::Current => "current",
            LifecyclePhase::Deprecated => "deprecated",
            LifecyclePhase::Retired => "retired",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|phase| phase.as_str().eq_ignore_ascii_case(raw.trim()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecyclePhaseData {
    pub phase: LifecyclePhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
}

impl LifecyclePhaseData {
    pub fn empty(phase: LifecyclePhase) -> Self {
        Self {
            phase,
            start_date: None,
            end_date: None,
        }
    }
}

pub fn default_phases() -> Vec<LifecyclePhaseData> {
    LifecyclePhase::ALL
        .into_iter()
        .map(LifecyclePhaseData::empty)
        .collect()
}

/// Rebuild the five phase slots in table order. Missing slots are empty,
/// repeated slots keep the first occurrence.
pub fn normalize_phases(phases: &[LifecyclePhaseData]) -> Vec<LifecyclePhaseData> {
    LifecyclePhase::ALL
        .into_iter()
        .map(|phase| {
            phases
                .iter()
                .find(|slot| slot.phase == phase)
                .cloned()
                .unwrap_or_else(|| LifecyclePhaseData::empty(phase))
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    #[default]
    Planned,
    InProgress,
    Done,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: MilestoneStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn normalize_fills_missing_slots_in_table_order() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let input = vec![
            LifecyclePhaseData {
                phase: LifecyclePhase::Deprecated,
                start_date: Some(start),
                end_date: None,
            },
            LifecyclePhaseData::empty(LifecyclePhase::Implementing),
            LifecyclePhaseData::empty(LifecyclePhase::Deprecated),
        ];

        let normalized = normalize_phases(&input);
        let order: Vec<LifecyclePhase> = normalized.iter().map(|slot| slot.phase).collect();
        assert_eq!(order, LifecyclePhase::ALL.to_vec());
        assert_eq!(normalized[3].start_date, Some(start));
    }

    #[test]
    fn parses_phase_names_case_insensitively() {
        assert_eq!(LifecyclePhase::parse(" Current "), Some(LifecyclePhase::Current));
        assert_eq!(LifecyclePhase::parse("sunset"), None);
    }
}
