use serde::{Deserialize, Serialize};

/// One aggregated line of a PCM call-pairing report. Serialized names are the
/// report's column headers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CsvRow {
    #[serde(rename = "orgid")]
    pub org_id: String,
    #[serde(rename = "clientid")]
    pub client_id: String,
    #[serde(rename = "serverid")]
    pub server_id: String,
    pub reporter: String,
    #[serde(rename = "iniciador")]
    pub initiator: String,
    #[serde(rename = "detentor")]
    pub holder: String,
    pub status: String,
    #[serde(rename = "statuscode")]
    pub status_code: u16,
    pub api_family: String,
    pub api_version: String,
    pub endpoint: String,
    #[serde(rename = "data_chamada")]
    pub call_date: String,
    #[serde(rename = "role_reporter")]
    pub reporter_role: String,
    #[serde(rename = "org_faltante")]
    pub missing_org: String,
    #[serde(rename = "nome_faltante")]
    pub missing_name: String,
    #[serde(rename = "role_faltante")]
    pub missing_role: String,
    #[serde(rename = "qtd_paired")]
    pub paired: u64,
    #[serde(rename = "qtd_paired_inconsistent")]
    pub paired_inconsistent: u64,
    #[serde(rename = "qtd_unpaired")]
    pub unpaired: u64,
    #[serde(rename = "qtd_chamadas")]
    pub calls: u64,
    pub percent_paired: f64,
    pub percent_paired_inconsistent: f64,
    pub percent_unpaired: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchedRows {
    pub matched: Vec<CsvRow>,
    pub unmatched: Vec<CsvRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingSeverity {
    Error,
    Warning,
    Info,
}

impl FindingSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingSeverity::Error => "error",
            FindingSeverity::Warning => "warning",
            FindingSeverity::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCodeCount {
    pub code: u16,
    pub calls: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FindingKind {
    #[serde(rename_all = "camelCase")]
    UndeclaredEndpoints { count: usize, endpoints: Vec<String> },
    #[serde(rename_all = "camelCase")]
    UnreportedEndpoints { count: usize, endpoints: Vec<String> },
    #[serde(rename_all = "camelCase")]
    UnpairedRate { percent: f64, unpaired: u64, total: u64 },
    #[serde(rename_all = "camelCase")]
    PairedInconsistent { count: u64 },
    #[serde(rename_all = "camelCase")]
    ErrorStatusRate { percent: f64, codes: Vec<StatusCodeCount> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub severity: FindingSeverity,
    pub kind: FindingKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingSummary {
    pub paired: u64,
    pub unpaired: u64,
    pub paired_inconsistent: u64,
    pub total: u64,
    pub paired_percent: f64,
    pub unpaired_percent: f64,
    pub paired_inconsistent_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointCoverage {
    pub endpoint: String,
    pub in_spec: bool,
    #[serde(rename = "inCSV")]
    pub in_csv: bool,
    pub calls: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub api_id: String,
    pub api_name: String,
    pub family: Option<String>,
    pub version_tag: String,
    pub total_rows: usize,
    pub matched_rows: usize,
    pub unmatched_rows: usize,
    pub total_calls: u64,
    pub status_codes: Vec<StatusCodeCount>,
    pub pairing: PairingSummary,
    pub endpoints: Vec<EndpointCoverage>,
    pub date_range: Option<DateRange>,
    pub reporters: Vec<String>,
    pub holders: Vec<String>,
    pub findings: Vec<Finding>,
}
