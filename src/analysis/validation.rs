use crate::analysis::family::detect_csv_family;
use crate::analysis::matching::{filter_rows_for, major_version_tag};
use crate::analysis::openapi::endpoint_paths;
use crate::models::contract::ApiContract;
use crate::models::report::*;
use crate::models::settings::Language;
use std::collections::{BTreeMap, BTreeSet, HashMap};

const UNPAIRED_ERROR_PERCENT: f64 = 20.0;
const UNPAIRED_WARNING_PERCENT: f64 = 5.0;
const ERROR_STATUS_WARNING_PERCENT: f64 = 10.0;
const LISTED_ENDPOINTS: usize = 3;

/// Reconcile a parsed report against one contract. Statistics cover the
/// matched rows only.
pub fn validate_report(rows: &[CsvRow], api: &ApiContract) -> ValidationResult {
    let family = detect_csv_family(api);
    let version_tag = major_version_tag(&api.version);
    let split = filter_rows_for(rows, family.as_deref(), &version_tag);
    let matched = &split.matched;

    let total_calls = saturating_sum(matched.iter().map(|row| row.calls));
    let status_codes = status_distribution(matched, total_calls);
    let pairing = pairing_summary(matched);
    let spec_paths = api
        .specification
        .as_ref()
        .map(endpoint_paths)
        .unwrap_or_default();
    let endpoints = endpoint_coverage(&spec_paths, matched);

    let mut findings = Vec::new();
    endpoint_findings(&endpoints, &mut findings);
    unpaired_finding(&pairing, &mut findings);
    inconsistent_finding(&pairing, &mut findings);
    error_status_finding(&status_codes, total_calls, &mut findings);

    ValidationResult {
        api_id: api.id.clone(),
        api_name: api.label().to_string(),
        family,
        version_tag,
        total_rows: rows.len(),
        matched_rows: matched.len(),
        unmatched_rows: split.unmatched.len(),
        total_calls,
        status_codes,
        pairing,
        endpoints,
        date_range: date_range(matched),
        reporters: distinct(matched.iter().map(|row| row.reporter.as_str())),
        holders: distinct(matched.iter().map(|row| row.holder.as_str())),
        findings,
    }
}

/// Counts come from untrusted reports; totals clamp at `u64::MAX`.
fn saturating_sum(values: impl Iterator<Item = u64>) -> u64 {
    values.fold(0, u64::saturating_add)
}

fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Calls per status code, largest first.
fn status_distribution(rows: &[CsvRow], total_calls: u64) -> Vec<StatusCodeCount> {
    let mut by_code: BTreeMap<u16, u64> = BTreeMap::new();
    for row in rows {
        let calls = by_code.entry(row.status_code).or_insert(0);
        *calls = calls.saturating_add(row.calls);
    }

    let mut out: Vec<StatusCodeCount> = by_code
        .into_iter()
        .map(|(code, calls)| StatusCodeCount {
            code,
            calls,
            percent: percent(calls, total_calls),
        })
        .collect();
    out.sort_by(|a, b| b.calls.cmp(&a.calls).then(a.code.cmp(&b.code)));
    out
}

fn pairing_summary(rows: &[CsvRow]) -> PairingSummary {
    let paired = saturating_sum(rows.iter().map(|row| row.paired));
    let unpaired = saturating_sum(rows.iter().map(|row| row.unpaired));
    let paired_inconsistent = saturating_sum(rows.iter().map(|row| row.paired_inconsistent));
    let total = saturating_sum([paired, unpaired, paired_inconsistent].into_iter());

    PairingSummary {
        paired,
        unpaired,
        paired_inconsistent,
        total,
        paired_percent: percent(paired, total),
        unpaired_percent: percent(unpaired, total),
        paired_inconsistent_percent: percent(paired_inconsistent, total),
    }
}

fn endpoint_coverage(spec_paths: &[String], rows: &[CsvRow]) -> Vec<EndpointCoverage> {
    let mut calls_by_endpoint: HashMap<&str, u64> = HashMap::new();
    for row in rows {
        let endpoint = row.endpoint.trim();
        if endpoint.is_empty() {
            continue;
        }
        let calls = calls_by_endpoint.entry(endpoint).or_insert(0);
        *calls = calls.saturating_add(row.calls);
    }

    let spec_set: BTreeSet<&str> = spec_paths.iter().map(|path| path.trim()).collect();
    let all: BTreeSet<&str> = spec_set
        .iter()
        .copied()
        .chain(calls_by_endpoint.keys().copied())
        .collect();

    let mut out: Vec<EndpointCoverage> = all
        .into_iter()
        .map(|endpoint| EndpointCoverage {
            endpoint: endpoint.to_string(),
            in_spec: spec_set.contains(endpoint),
            in_csv: calls_by_endpoint.contains_key(endpoint),
            calls: calls_by_endpoint.get(endpoint).copied().unwrap_or(0),
        })
        .collect();
    out.sort_by(|a, b| b.calls.cmp(&a.calls).then_with(|| a.endpoint.cmp(&b.endpoint)));
    out
}

fn date_range(rows: &[CsvRow]) -> Option<DateRange> {
    let dates = rows
        .iter()
        .map(|row| row.call_date.trim())
        .filter(|date| !date.is_empty());
    let (mut start, mut end): (Option<&str>, Option<&str>) = (None, None);
    for date in dates {
        start = Some(start.map_or(date, |current| current.min(date)));
        end = Some(end.map_or(date, |current| current.max(date)));
    }

    Some(DateRange {
        start: start?.to_string(),
        end: end?.to_string(),
    })
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn push(findings: &mut Vec<Finding>, severity: FindingSeverity, kind: FindingKind) {
    let message = describe_finding(&kind, Language::En);
    findings.push(Finding {
        severity,
        kind,
        message,
    });
}

fn endpoint_findings(endpoints: &[EndpointCoverage], findings: &mut Vec<Finding>) {
    let undeclared: Vec<String> = endpoints
        .iter()
        .filter(|e| e.in_csv && !e.in_spec)
        .map(|e| e.endpoint.clone())
        .collect();
    if !undeclared.is_empty() {
        push(
            findings,
            FindingSeverity::Warning,
            FindingKind::UndeclaredEndpoints {
                count: undeclared.len(),
                endpoints: undeclared,
            },
        );
    }

    let unreported: Vec<String> = endpoints
        .iter()
        .filter(|e| e.in_spec && !e.in_csv)
        .map(|e| e.endpoint.clone())
        .collect();
    if !unreported.is_empty() {
        push(
            findings,
            FindingSeverity::Info,
            FindingKind::UnreportedEndpoints {
                count: unreported.len(),
                endpoints: unreported,
            },
        );
    }
}

fn unpaired_finding(pairing: &PairingSummary, findings: &mut Vec<Finding>) {
    if pairing.total == 0 {
        return;
    }

    let rate = pairing.unpaired_percent;
    let severity = if rate > UNPAIRED_ERROR_PERCENT {
        FindingSeverity::Error
    } else if rate > UNPAIRED_WARNING_PERCENT {
        FindingSeverity::Warning
    } else {
        return;
    };

    push(
        findings,
        severity,
        FindingKind::UnpairedRate {
            percent: rate,
            unpaired: pairing.unpaired,
            total: pairing.total,
        },
    );
}

fn inconsistent_finding(pairing: &PairingSummary, findings: &mut Vec<Finding>) {
    if pairing.paired_inconsistent > 0 {
        push(
            findings,
            FindingSeverity::Warning,
            FindingKind::PairedInconsistent {
                count: pairing.paired_inconsistent,
            },
        );
    }
}

fn error_status_finding(status_codes: &[StatusCodeCount], total_calls: u64, findings: &mut Vec<Finding>) {
    if total_calls == 0 {
        return;
    }

    let mut offending: Vec<StatusCodeCount> = status_codes
        .iter()
        .filter(|status| status.code >= 400 && status.calls > 0)
        .cloned()
        .collect();
    let error_calls = saturating_sum(offending.iter().map(|status| status.calls));
    let rate = percent(error_calls, total_calls);
    if rate <= ERROR_STATUS_WARNING_PERCENT {
        return;
    }

    offending.sort_by(|a, b| b.calls.cmp(&a.calls).then(a.code.cmp(&b.code)));
    push(
        findings,
        FindingSeverity::Warning,
        FindingKind::ErrorStatusRate {
            percent: rate,
            codes: offending,
        },
    );
}

fn truncated_list(endpoints: &[String]) -> String {
    let mut listed = endpoints
        .iter()
        .take(LISTED_ENDPOINTS)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
    if endpoints.len() > LISTED_ENDPOINTS {
        listed.push_str(", ...");
    }
    listed
}

/// Human-readable text for a finding in the requested language.
pub fn describe_finding(kind: &FindingKind, language: Language) -> String {
    match (kind, language) {
        (FindingKind::UndeclaredEndpoints { count, endpoints }, Language::En) => format!(
            "{count} endpoint(s) reported in the CSV are not declared in the specification: {}",
            truncated_list(endpoints)
        ),
        (FindingKind::UndeclaredEndpoints { count, endpoints }, Language::Pt) => format!(
            "{count} endpoint(s) presentes no CSV não constam na especificação: {}",
            truncated_list(endpoints)
        ),
        (FindingKind::UnreportedEndpoints { count, endpoints }, Language::En) => format!(
            "{count} endpoint(s) declared in the specification have no calls in the CSV: {}",
            truncated_list(endpoints)
        ),
        (FindingKind::UnreportedEndpoints { count, endpoints }, Language::Pt) => format!(
            "{count} endpoint(s) da especificação não aparecem no CSV: {}",
            truncated_list(endpoints)
        ),
        (FindingKind::UnpairedRate { percent, unpaired, total }, Language::En) => format!(
            "Unpaired rate is {percent:.1}% ({unpaired} of {total} calls)"
        ),
        (FindingKind::UnpairedRate { percent, unpaired, total }, Language::Pt) => format!(
            "Taxa de chamadas não pareadas é {percent:.1}% ({unpaired} de {total} chamadas)"
        ),
        (FindingKind::PairedInconsistent { count }, Language::En) => {
            format!("{count} call(s) were paired with inconsistent data")
        }
        (FindingKind::PairedInconsistent { count }, Language::Pt) => {
            format!("{count} chamada(s) pareadas com dados inconsistentes")
        }
        (FindingKind::ErrorStatusRate { percent, codes }, language) => {
            let listed = codes
                .iter()
                .map(|status| format!("{}: {}", status.code, status.calls))
                .collect::<Vec<_>>()
                .join(", ");
            match language {
                Language::En => format!("Error status rate is {percent:.1}% ({listed})"),
                Language::Pt => format!("Taxa de status de erro é {percent:.1}% ({listed})"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn accounts_api() -> ApiContract {
        let mut api = ApiContract::new("accounts", "2.3.1", Utc::now());
        api.specification = Some(json!({
            "paths": {
                "/accounts": { "get": {} },
                "/accounts/{accountId}": { "get": {} },
                "/accounts/{accountId}/balances": { "get": {} }
            }
        }));
        api
    }

    fn row(endpoint: &str, status: u16, calls: u64) -> CsvRow {
        CsvRow {
            api_family: "accounts".to_string(),
            api_version: "v2".to_string(),
            endpoint: endpoint.to_string(),
            status_code: status,
            calls,
            paired: calls,
            ..CsvRow::default()
        }
    }

    fn finding_of<'a>(result: &'a ValidationResult, pred: fn(&FindingKind) -> bool) -> Option<&'a Finding> {
        result.findings.iter().find(|f| pred(&f.kind))
    }

    #[test]
    fn oversized_counts_clamp_instead_of_overflowing() {
        let text = "api_family,api_version,endpoint,statuscode,qtd_paired,qtd_unpaired,qtd_chamadas\n\
                    accounts,v2,/accounts,500,1e30,1e30,1e30\n\
                    accounts,v2,/accounts,500,1e30,1e30,1e30\n";
        let rows = crate::analysis::csv::parse_csv(text);
        assert_eq!(rows[0].calls, u64::MAX);

        let result = validate_report(&rows, &accounts_api());
        assert_eq!(result.matched_rows, 2);
        assert_eq!(result.total_calls, u64::MAX);
        assert_eq!(result.status_codes[0].calls, u64::MAX);
        assert_eq!(result.pairing.total, u64::MAX);
        let coverage = result.endpoints.iter().find(|e| e.endpoint == "/accounts").unwrap();
        assert_eq!(coverage.calls, u64::MAX);
    }

    #[test]
    fn unpaired_rate_over_twenty_percent_is_an_error() {
        let mut only = row("/accounts", 200, 100);
        only.paired = 70;
        only.unpaired = 25;
        only.paired_inconsistent = 5;

        let result = validate_report(&[only], &accounts_api());
        let finding = finding_of(&result, |k| matches!(k, FindingKind::UnpairedRate { .. }))
            .expect("unpaired finding");
        assert_eq!(finding.severity, FindingSeverity::Error);
        assert!((result.pairing.unpaired_percent - 25.0).abs() < 1e-9);

        let inconsistent = finding_of(&result, |k| matches!(k, FindingKind::PairedInconsistent { .. }))
            .expect("inconsistent finding");
        assert_eq!(inconsistent.kind, FindingKind::PairedInconsistent { count: 5 });
    }

    #[test]
    fn unpaired_rate_between_five_and_twenty_is_a_warning() {
        let mut only = row("/accounts", 200, 100);
        only.paired = 90;
        only.unpaired = 10;

        let result = validate_report(&[only], &accounts_api());
        let finding = finding_of(&result, |k| matches!(k, FindingKind::UnpairedRate { .. }))
            .expect("unpaired finding");
        assert_eq!(finding.severity, FindingSeverity::Warning);

        let mut low = row("/accounts", 200, 100);
        low.paired = 95;
        low.unpaired = 5;
        let result = validate_report(&[low], &accounts_api());
        assert!(finding_of(&result, |k| matches!(k, FindingKind::UnpairedRate { .. })).is_none());
    }

    #[test]
    fn no_matched_rows_produces_no_rate_findings() {
        let mut foreign = row("/accounts", 500, 100);
        foreign.api_version = "v1".to_string();
        foreign.unpaired = 100;

        let result = validate_report(&[foreign], &accounts_api());
        assert_eq!(result.matched_rows, 0);
        assert_eq!(result.unmatched_rows, 1);
        assert_eq!(result.total_calls, 0);
        assert!(result.status_codes.is_empty());
        assert!(result.date_range.is_none());
        assert!(result
            .findings
            .iter()
            .all(|f| matches!(f.kind, FindingKind::UnreportedEndpoints { .. })));
    }

    #[test]
    fn coverage_is_union_of_spec_and_csv_sorted_by_calls() {
        let rows = vec![
            row("/accounts", 200, 40),
            row("/accounts", 200, 10),
            row("/accounts/{accountId}/transactions", 200, 70),
        ];

        let result = validate_report(&rows, &accounts_api());
        let names: Vec<&str> = result.endpoints.iter().map(|e| e.endpoint.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "/accounts/{accountId}/transactions",
                "/accounts",
                "/accounts/{accountId}",
                "/accounts/{accountId}/balances",
            ]
        );

        let csv_only = &result.endpoints[0];
        assert!(!csv_only.in_spec);
        assert!(csv_only.in_csv);
        assert_eq!(csv_only.calls, 70);
        assert_eq!(result.endpoints[1].calls, 50);

        let undeclared = finding_of(&result, |k| matches!(k, FindingKind::UndeclaredEndpoints { .. }))
            .expect("undeclared finding");
        assert_eq!(undeclared.severity, FindingSeverity::Warning);
        let unreported = finding_of(&result, |k| matches!(k, FindingKind::UnreportedEndpoints { .. }))
            .expect("unreported finding");
        assert_eq!(unreported.severity, FindingSeverity::Info);
    }

    #[test]
    fn endpoint_lists_truncate_after_three_names() {
        let kind = FindingKind::UndeclaredEndpoints {
            count: 4,
            endpoints: vec!["/a".into(), "/b".into(), "/c".into(), "/d".into()],
        };
        let text = describe_finding(&kind, Language::En);
        assert!(text.ends_with("/a, /b, /c, ..."));
        assert!(!text.contains("/d"));
    }

    #[test]
    fn error_status_rate_lists_codes_by_descending_count() {
        let rows = vec![
            row("/accounts", 200, 70),
            row("/accounts", 500, 10),
            row("/accounts", 403, 20),
        ];

        let result = validate_report(&rows, &accounts_api());
        let finding = finding_of(&result, |k| matches!(k, FindingKind::ErrorStatusRate { .. }))
            .expect("error status finding");
        match &finding.kind {
            FindingKind::ErrorStatusRate { percent, codes } => {
                assert!((percent - 30.0).abs() < 1e-9);
                let order: Vec<u16> = codes.iter().map(|c| c.code).collect();
                assert_eq!(order, vec![403, 500]);
            }
            other => panic!("unexpected finding {other:?}"),
        }
        assert!(finding.message.contains("403: 20, 500: 10"));
    }

    #[test]
    fn error_rate_at_exactly_ten_percent_is_not_reported() {
        let rows = vec![row("/accounts", 200, 90), row("/accounts", 404, 10)];
        let result = validate_report(&rows, &accounts_api());
        assert!(finding_of(&result, |k| matches!(k, FindingKind::ErrorStatusRate { .. })).is_none());
    }

    #[test]
    fn collects_date_range_and_distinct_organizations() {
        let mut first = row("/accounts", 200, 1);
        first.call_date = "2024-05-03".to_string();
        first.reporter = "org-b".to_string();
        first.holder = "bank-1".to_string();
        let mut second = row("/accounts", 200, 1);
        second.call_date = "2024-04-28".to_string();
        second.reporter = "org-a".to_string();
        second.holder = "bank-1".to_string();
        let mut third = row("/accounts", 200, 1);
        third.reporter = "org-b".to_string();

        let result = validate_report(&[first, second, third], &accounts_api());
        let range = result.date_range.expect("date range");
        assert_eq!(range.start, "2024-04-28");
        assert_eq!(range.end, "2024-05-03");
        assert_eq!(result.reporters, vec!["org-a".to_string(), "org-b".to_string()]);
        assert_eq!(result.holders, vec!["bank-1".to_string()]);
    }

    #[test]
    fn findings_keep_fixed_order() {
        let mut noisy = row("/unknown", 500, 100);
        noisy.paired = 50;
        noisy.unpaired = 40;
        noisy.paired_inconsistent = 10;

        let result = validate_report(&[noisy], &accounts_api());
        let kinds: Vec<&str> = result
            .findings
            .iter()
            .map(|f| match f.kind {
                FindingKind::UndeclaredEndpoints { .. } => "undeclared",
                FindingKind::UnreportedEndpoints { .. } => "unreported",
                FindingKind::UnpairedRate { .. } => "unpaired",
                FindingKind::PairedInconsistent { .. } => "inconsistent",
                FindingKind::ErrorStatusRate { .. } => "errors",
            })
            .collect();
        assert_eq!(kinds, vec!["undeclared", "unreported", "unpaired", "inconsistent", "errors"]);
    }
}
