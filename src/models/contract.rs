use crate::models::lifecycle::{LifecyclePhaseData, Milestone};
use crate::models::pcm::PcmField;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiContract {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub use_display_name: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default)]
    pub beta: bool,
    pub version: String,
    #[serde(default)]
    pub summary: String,
    /// Raw specification text as imported (JSON or YAML).
    #[serde(default)]
    pub contract: String,
    #[serde(default)]
    pub specification: Option<Value>,
    #[serde(default)]
    pub lifecycle: Vec<LifecyclePhaseData>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub known_issues: Vec<KnownIssue>,
    #[serde(default)]
    pub backlog: Vec<BacklogItem>,
    #[serde(default)]
    pub pcm_fields: Vec<PcmField>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApiContract {
    pub fn new(name: &str, version: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            display_name: None,
            use_display_name: false,
            group: None,
            beta: false,
            version: version.to_string(),
            summary: String::new(),
            contract: String::new(),
            specification: None,
            lifecycle: crate::models::lifecycle::default_phases(),
            milestones: Vec::new(),
            known_issues: Vec::new(),
            backlog: Vec::new(),
            pcm_fields: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Name shown in listings and reports.
    pub fn label(&self) -> &str {
        match self.display_name.as_deref() {
            Some(display) if self.use_display_name && !display.trim().is_empty() => display,
            _ => &self.name,
        }
    }

    /// Identity used for duplicate detection on create and import.
    pub fn same_identity(&self, name: &str, version: &str) -> bool {
        self.name.trim() == name.trim() && self.version.trim() == version.trim()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    #[default]
    Open,
    Investigating,
    Resolved,
    WontFix,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnownIssue {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub severity: IssueSeverity,
    #[serde(default)]
    pub status: IssueStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workaround: Option<String>,
    pub reported_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl KnownIssue {
    pub fn is_open(&self) -> bool {
        matches!(self.status, IssueStatus::Open | IssueStatus::Investigating)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BacklogPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BacklogStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacklogItem {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: BacklogPriority,
    #[serde(default)]
    pub status: BacklogStatus,
    pub created_at: DateTime<Utc>,
}
