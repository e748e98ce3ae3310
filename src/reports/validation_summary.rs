use crate::analysis::validation::describe_finding;
use crate::models::contract::ApiContract;
use crate::models::report::ValidationResult;
use crate::models::settings::AppSettings;
use crate::reports::pdf::PdfDocument;
use crate::reports::{format_timestamp, labels};
use chrono::{DateTime, Utc};

pub fn render_validation_summary(
    api: &ApiContract,
    result: &ValidationResult,
    settings: &AppSettings,
    generated_at: DateTime<Utc>,
) -> Vec<u8> {
    let language = settings.language;
    let text = labels(language);
    let mut doc = PdfDocument::new();

    doc.title(&format!("{}: {}", text.validation_title, api.label()));
    doc.text(&format!("{}: {}", text.version, api.version));
    doc.text(&format!(
        "{}: {} ({})",
        text.family,
        result.family.as_deref().unwrap_or(text.not_detected),
        result.version_tag
    ));
    doc.text(&format!(
        "{}: {}",
        text.generated_at,
        format_timestamp(generated_at, language)
    ));

    doc.heading(text.rows);
    doc.text(&format!(
        "{} | {} {} | {} {}",
        result.total_rows, result.matched_rows, text.matched, result.unmatched_rows, text.unmatched
    ));
    doc.text(&format!("{}: {}", text.total_calls, result.total_calls));
    if let Some(range) = &result.date_range {
        doc.text(&format!("{}: {} .. {}", text.period, range.start, range.end));
    }

    let pairing = &result.pairing;
    doc.heading(text.pairing);
    doc.text(&format!("{}: {} ({:.1}%)", text.paired, pairing.paired, pairing.paired_percent));
    doc.text(&format!(
        "{}: {} ({:.1}%)",
        text.unpaired, pairing.unpaired, pairing.unpaired_percent
    ));
    doc.text(&format!(
        "{}: {} ({:.1}%)",
        text.inconsistent, pairing.paired_inconsistent, pairing.paired_inconsistent_percent
    ));

    if !result.status_codes.is_empty() {
        doc.heading(text.status_codes);
        for status in &result.status_codes {
            doc.text(&format!(
                "{}: {} {} ({:.1}%)",
                status.code, status.calls, text.calls, status.percent
            ));
        }
    }

    if !result.endpoints.is_empty() {
        doc.heading(text.coverage);
        for endpoint in &result.endpoints {
            let flag = |present: bool| if present { text.yes } else { text.no };
            doc.text(&format!(
                "{} | {}: {} | {}: {} | {} {}",
                endpoint.endpoint,
                text.in_spec,
                flag(endpoint.in_spec),
                text.in_csv,
                flag(endpoint.in_csv),
                endpoint.calls,
                text.calls
            ));
        }
    }

    if !result.reporters.is_empty() {
        doc.text(&format!("{}: {}", text.reporters, result.reporters.join(", ")));
    }
    if !result.holders.is_empty() {
        doc.text(&format!("{}: {}", text.holders, result.holders.join(", ")));
    }

    doc.heading(text.findings);
    if result.findings.is_empty() {
        doc.text(text.no_findings);
    }
    for finding in &result.findings {
        doc.text(&format!(
            "[{}] {}",
            finding.severity.as_str().to_uppercase(),
            describe_finding(&finding.kind, language)
        ));
    }

    doc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::csv::parse_csv;
    use crate::analysis::validation::validate_report;
    use crate::models::settings::Language;
    use serde_json::json;

    const REPORT: &str = "orgid,reporter,detentor,statuscode,api_family,api_version,endpoint,data_chamada,qtd_paired,qtd_paired_inconsistent,qtd_unpaired,qtd_chamadas\n\
        org1,bank-a,bank-b,200,accounts,v2,/accounts/v2/accounts,2024-03-01,70,5,25,100\n";

    fn contract() -> ApiContract {
        let mut api = ApiContract::new("Accounts", "2.3.1", Utc::now());
        api.specification = Some(json!({
            "paths": { "/accounts/v2/accounts": { "get": {} } }
        }));
        api
    }

    fn render(language: Language) -> String {
        let api = contract();
        let result = validate_report(&parse_csv(REPORT), &api);
        let settings = AppSettings { language, ..AppSettings::default() };
        String::from_utf8(render_validation_summary(&api, &result, &settings, Utc::now())).unwrap()
    }

    #[test]
    fn summarizes_pairing_and_findings() {
        let out = render(Language::En);
        assert!(out.contains("Family: accounts \\(v2\\)"));
        assert!(out.contains("Unpaired: 25 \\(25.0%\\)"));
        assert!(out.contains("[ERROR] Unpaired rate is 25.0%"));
        assert!(out.contains("2024-03-01 .. 2024-03-01"));
    }

    #[test]
    fn renders_findings_in_the_selected_language() {
        let out = render(Language::Pt);
        assert!(out.contains("Apontamentos"));
        assert!(out.contains("Taxa de chamadas n\\343o pareadas"));
    }
}
