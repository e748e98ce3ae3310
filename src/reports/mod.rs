pub mod field_listing;
pub mod pdf;
pub mod validation_summary;

use crate::models::settings::Language;
use chrono::{DateTime, Utc};

/// Fixed report captions in one language.
#[derive(Debug)]
pub struct ReportLabels {
    pub field_listing_title: &'static str,
    pub validation_title: &'static str,
    pub api: &'static str,
    pub version: &'static str,
    pub generated_at: &'static str,
    pub no_fields: &'static str,
    pub mandatory: &'static str,
    pub roles: &'static str,
    pub http_codes: &'static str,
    pub filling_rule: &'static str,
    pub size: &'static str,
    pub pattern: &'static str,
    pub example: &'static str,
    pub total_fields: &'static str,
    pub family: &'static str,
    pub not_detected: &'static str,
    pub rows: &'static str,
    pub matched: &'static str,
    pub unmatched: &'static str,
    pub total_calls: &'static str,
    pub period: &'static str,
    pub pairing: &'static str,
    pub paired: &'static str,
    pub unpaired: &'static str,
    pub inconsistent: &'static str,
    pub status_codes: &'static str,
    pub coverage: &'static str,
    pub in_spec: &'static str,
    pub in_csv: &'static str,
    pub calls: &'static str,
    pub yes: &'static str,
    pub no: &'static str,
    pub reporters: &'static str,
    pub holders: &'static str,
    pub findings: &'static str,
    pub no_findings: &'static str,
}

static EN: ReportLabels = ReportLabels {
    field_listing_title: "PCM field listing",
    validation_title: "PCM report validation",
    api: "API",
    version: "Version",
    generated_at: "Generated at",
    no_fields: "No PCM fields registered.",
    mandatory: "Mandatory",
    roles: "Roles",
    http_codes: "HTTP codes",
    filling_rule: "Filling rule",
    size: "Size",
    pattern: "Pattern",
    example: "Example",
    total_fields: "Total fields",
    family: "Family",
    not_detected: "not detected",
    rows: "Rows",
    matched: "matched",
    unmatched: "unmatched",
    total_calls: "Total calls",
    period: "Period",
    pairing: "Pairing",
    paired: "Paired",
    unpaired: "Unpaired",
    inconsistent: "Paired inconsistent",
    status_codes: "Status codes",
    coverage: "Endpoint coverage",
    in_spec: "spec",
    in_csv: "CSV",
    calls: "calls",
    yes: "yes",
    no: "no",
    reporters: "Reporters",
    holders: "Holders",
    findings: "Findings",
    no_findings: "No findings.",
};

static PT: ReportLabels = ReportLabels {
    field_listing_title: "Campos PCM",
    validation_title: "Validação de relatório PCM",
    api: "API",
    version: "Versão",
    generated_at: "Gerado em",
    no_fields: "Nenhum campo PCM cadastrado.",
    mandatory: "Obrigatoriedade",
    roles: "Papéis",
    http_codes: "Códigos HTTP",
    filling_rule: "Regra de preenchimento",
    size: "Tamanho",
    pattern: "Padrão",
    example: "Exemplo",
    total_fields: "Total de campos",
    family: "Família",
    not_detected: "não detectada",
    rows: "Linhas",
    matched: "correspondentes",
    unmatched: "não correspondentes",
    total_calls: "Total de chamadas",
    period: "Período",
    pairing: "Pareamento",
    paired: "Pareadas",
    unpaired: "Não pareadas",
    inconsistent: "Pareadas inconsistentes",
    status_codes: "Códigos de status",
    coverage: "Cobertura de endpoints",
    in_spec: "especificação",
    in_csv: "CSV",
    calls: "chamadas",
    yes: "sim",
    no: "não",
    reporters: "Reportadores",
    holders: "Detentores",
    findings: "Apontamentos",
    no_findings: "Nenhum apontamento.",
};

pub fn labels(language: Language) -> &'static ReportLabels {
    match language {
        Language::En => &EN,
        Language::Pt => &PT,
    }
}

pub(crate) fn format_timestamp(at: DateTime<Utc>, language: Language) -> String {
    match language {
        Language::En => at.format("%Y-%m-%d %H:%M UTC").to_string(),
        Language::Pt => at.format("%d/%m/%Y %H:%M UTC").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn labels_follow_language() {
        assert_eq!(labels(Language::En).findings, "Findings");
        assert_eq!(labels(Language::Pt).findings, "Apontamentos");
    }

    #[test]
    fn timestamps_use_regional_order() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
        assert_eq!(format_timestamp(at, Language::En), "2024-03-09 14:05 UTC");
        assert_eq!(format_timestamp(at, Language::Pt), "09/03/2024 14:05 UTC");
    }
}
