use crate::models::contract::ApiContract;
use crate::models::pcm::PcmField;
use crate::models::settings::AppSettings;
use crate::reports::pdf::PdfDocument;
use crate::reports::{format_timestamp, labels};
use chrono::{DateTime, Utc};

/// PDF listing of every PCM field of one contract, grouped by operation.
pub fn render_field_listing(api: &ApiContract, settings: &AppSettings, generated_at: DateTime<Utc>) -> Vec<u8> {
    let text = labels(settings.language);
    let mut doc = PdfDocument::new();

    doc.title(&format!("{}: {}", text.field_listing_title, api.label()));
    doc.text(&format!("{}: {}", text.version, api.version));
    doc.text(&format!(
        "{}: {}",
        text.generated_at,
        format_timestamp(generated_at, settings.language)
    ));

    if api.pcm_fields.is_empty() {
        doc.heading(text.no_fields);
        return doc.finish();
    }

    let mut fields: Vec<&PcmField> = api.pcm_fields.iter().collect();
    fields.sort_by_key(|field| field.key());

    let mut operation: Option<(String, String)> = None;
    for field in fields {
        let (endpoint, method, name) = field.key();
        if operation.as_ref() != Some(&(endpoint.clone(), method.clone())) {
            doc.heading(&format!("{method} {endpoint}"));
            operation = Some((endpoint, method));
        }

        doc.text(&name);
        let mut details = vec![
            format!("{}: {}", text.mandatory, field.mandatory.as_str()),
            format!("{}: {}", text.roles, join_or_dash(&field.roles)),
            format!("{}: {}", text.http_codes, join_or_dash(&field.http_codes)),
        ];
        if field.min_size.is_some() || field.max_size.is_some() {
            details.push(format!(
                "{}: {}..{}",
                text.size,
                field.min_size.map(|n| n.to_string()).unwrap_or_default(),
                field.max_size.map(|n| n.to_string()).unwrap_or_default()
            ));
        }
        doc.text(&format!("    {}", details.join(" | ")));

        if !field.definition.trim().is_empty() {
            doc.text(&format!("    {}", field.definition.trim()));
        }
        if !field.filling_rule.trim().is_empty() {
            doc.text(&format!("    {}: {}", text.filling_rule, field.filling_rule.trim()));
        }
        if let Some(pattern) = &field.pattern {
            doc.text(&format!("    {}: {pattern}", text.pattern));
        }
        if let Some(example) = &field.example {
            doc.text(&format!("    {}: {example}", text.example));
        }
    }

    doc.heading(&format!("{}: {}", text.total_fields, api.pcm_fields.len()));
    doc.finish()
}

fn join_or_dash(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}
