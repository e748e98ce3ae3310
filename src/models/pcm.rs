use serde::{Deserialize, Serialize};

/// Which side of a call must report the field to the metrics platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MandatoryReporting {
    Server,
    Client,
    #[default]
    Both,
    #[serde(rename = "none")]
    NotRequired,
}

impl MandatoryReporting {
    pub fn as_str(&self) -> &'static str {
        match self {
            MandatoryReporting::Server => "server",
            MandatoryReporting::Client => "client",
            MandatoryReporting::Both => "both",
            MandatoryReporting::NotRequired => "none",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PcmField {
    #[serde(default)]
    pub id: String,
    pub endpoint: String,
    pub method: String,
    pub field: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub filling_rule: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub http_codes: Vec<String>,
    #[serde(default)]
    pub mandatory: MandatoryReporting,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

impl PcmField {
    /// Uniqueness key within one contract: (endpoint, METHOD, field).
    pub fn key(&self) -> (String, String, String) {
        field_key(&self.endpoint, &self.method, &self.field)
    }
}

pub fn field_key(endpoint: &str, method: &str, field: &str) -> (String, String, String) {
    (
        endpoint.trim().to_string(),
        method.trim().to_uppercase(),
        field.trim().to_string(),
    )
}
