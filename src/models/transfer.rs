use crate::models::contract::{ApiContract, BacklogItem, KnownIssue};
use crate::models::lifecycle::{LifecyclePhaseData, Milestone};
use crate::models::pcm::PcmField;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const BUNDLE_FORMAT_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedApiHeader {
    pub id: String,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub summary: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub use_display_name: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default)]
    pub beta: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExportedLifecycle {
    #[serde(default)]
    pub phases: Vec<LifecyclePhaseData>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
}

/// Single-contract export file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiExport {
    pub api: ExportedApiHeader,
    #[serde(default)]
    pub contract: String,
    #[serde(default)]
    pub specification: Option<Value>,
    #[serde(default)]
    pub lifecycle: ExportedLifecycle,
    #[serde(default)]
    pub issues: Vec<KnownIssue>,
    #[serde(default)]
    pub backlog: Vec<BacklogItem>,
    #[serde(default)]
    pub pcm: Vec<PcmField>,
    pub exported_at: DateTime<Utc>,
}

/// Whole-collection export file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiBundle {
    pub version: String,
    pub export_date: DateTime<Utc>,
    pub apis: Vec<ApiContract>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedImport {
    pub name: String,
    pub version: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub imported: Vec<String>,
    pub skipped: Vec<SkippedImport>,
}
