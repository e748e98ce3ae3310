use crate::models::report::CsvRow;
use std::collections::HashMap;

/// Parse a PCM call-report. The first non-blank line is the header; data
/// lines whose field count differs from the header's are dropped.
pub fn parse_csv(text: &str) -> Vec<CsvRow> {
    let mut lines = content_lines(text);

    let Some(header_line) = lines.next() else {
        return Vec::new();
    };

    let header = parse_header(header_line);
    let columns: HashMap<&str, usize> = header
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.as_str(), idx))
        .collect();

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for line in lines {
        let fields = split_csv_line(line);
        if fields.len() != header.len() {
            dropped += 1;
            continue;
        }
        rows.push(build_row(&columns, &fields));
    }

    if dropped > 0 {
        log::debug!("parse_csv dropped {dropped} line(s) with a mismatched field count");
    }

    rows
}

/// Lower-cased column names of the header line, if the text has one.
pub fn read_header(text: &str) -> Option<Vec<String>> {
    content_lines(text).next().map(parse_header)
}

fn content_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
}

fn parse_header(line: &str) -> Vec<String> {
    split_csv_line(line)
        .into_iter()
        .map(|name| name.trim_start_matches('\u{feff}').to_lowercase())
        .collect()
}

/// Split one line on commas outside double quotes. `""` inside a quoted
/// field is a literal quote.
pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    fields.push(current.trim().to_string());

    fields
}

fn build_row(columns: &HashMap<&str, usize>, fields: &[String]) -> CsvRow {
    let text = |name: &str| -> String {
        columns
            .get(name)
            .and_then(|idx| fields.get(*idx))
            .cloned()
            .unwrap_or_default()
    };

    CsvRow {
        org_id: text("orgid"),
        client_id: text("clientid"),
        server_id: text("serverid"),
        reporter: text("reporter"),
        initiator: text("iniciador"),
        holder: text("detentor"),
        status: text("status"),
        status_code: u16::try_from(parse_count(&text("statuscode"))).unwrap_or(0),
        api_family: text("api_family"),
        api_version: text("api_version"),
        endpoint: text("endpoint"),
        call_date: text("data_chamada"),
        reporter_role: text("role_reporter"),
        missing_org: text("org_faltante"),
        missing_name: text("nome_faltante"),
        missing_role: text("role_faltante"),
        paired: parse_count(&text("qtd_paired")),
        paired_inconsistent: parse_count(&text("qtd_paired_inconsistent")),
        unpaired: parse_count(&text("qtd_unpaired")),
        calls: parse_count(&text("qtd_chamadas")),
        percent_paired: parse_percent(&text("percent_paired")),
        percent_paired_inconsistent: parse_percent(&text("percent_paired_inconsistent")),
        percent_unpaired: parse_percent(&text("percent_unpaired")),
    }
}

/// Non-negative integer column; anything unparseable is 0.
fn parse_count(raw: &str) -> u64 {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<u64>() {
        return value;
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value.trunc() as u64,
        _ => 0,
    }
}

fn parse_percent(raw: &str) -> f64 {
    let cleaned = raw.trim().trim_end_matches('%').replace(',', ".");
    match cleaned.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "orgid,reporter,detentor,statuscode,api_family,api_version,endpoint,data_chamada,qtd_paired,qtd_paired_inconsistent,qtd_unpaired,qtd_chamadas,percent_unpaired";

    #[test]
    fn header_only_file_yields_no_rows() {
        assert!(parse_csv(HEADER).is_empty());
        assert!(parse_csv(&format!("{HEADER}\n\n")).is_empty());
        assert!(parse_csv("").is_empty());
    }

    #[test]
    fn drops_lines_with_mismatched_field_count() {
        let text = format!(
            "{HEADER}\n\
             org-1,org-1,org-2,200,accounts,v2,/accounts,2024-05-01,10,0,1,11,9.1\n\
             org-1,org-1,org-2,200,accounts\n\
             org-1,org-1,org-2,500,accounts,v2,/accounts,2024-05-02,1,0,0,1,0,extra\n"
        );

        let rows = parse_csv(&text);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].calls, 11);
        assert_eq!(rows[0].status_code, 200);
    }

    #[test]
    fn quoted_fields_keep_commas_and_escaped_quotes() {
        let fields = split_csv_line(r#"a,"b, c","say ""hi""",d"#);
        assert_eq!(fields, vec!["a", "b, c", "say \"hi\"", "d"]);
    }

    #[test]
    fn numeric_columns_default_to_zero_and_missing_columns_to_empty() {
        let text = "API_FAMILY,qtd_chamadas,statuscode,percent_unpaired\r\n\
                    payments,abc,,12.5%\r\n";

        let rows = parse_csv(text);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.api_family, "payments");
        assert_eq!(row.calls, 0);
        assert_eq!(row.status_code, 0);
        assert_eq!(row.paired, 0);
        assert_eq!(row.endpoint, "");
        assert!((row.percent_unpaired - 12.5).abs() < 1e-9);
    }

    #[test]
    fn header_reader_skips_leading_blank_lines_and_bom() {
        let header = read_header("\n\u{feff}OrgId, API_FAMILY\nx,y\n").unwrap();
        assert_eq!(header, vec!["orgid", "api_family"]);
        assert!(read_header(" \r\n").is_none());
    }

    #[test]
    fn fractional_counts_are_truncated() {
        let rows = parse_csv("qtd_paired,qtd_unpaired\n3.9,-2\n");
        assert_eq!(rows[0].paired, 3);
        assert_eq!(rows[0].unpaired, 0);
    }
}
