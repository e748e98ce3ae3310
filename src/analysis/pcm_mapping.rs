use crate::analysis::family::{matching_families, CodeScope, PcmRuleTemplate, BASE_PCM_RULES, FAMILY_RULES};
use crate::analysis::matching::major_version_tag;
use crate::analysis::openapi::{operations, SpecOperation};
use crate::models::pcm::{field_key, MandatoryReporting, PcmField};
use serde_json::Value;
use std::collections::HashSet;

/// Candidate PCM fields for every declared operation that are not already
/// present in `existing`.
pub fn generate_pcm_fields(
    specification: Option<&Value>,
    name: &str,
    version: &str,
    existing: &[PcmField],
) -> Vec<PcmField> {
    let Some(spec) = specification else {
        return Vec::new();
    };

    let ops = operations(spec);
    let lowered_paths: Vec<String> = ops.iter().map(|op| op.path.to_lowercase()).collect();
    let families = matching_families(FAMILY_RULES, name, &lowered_paths);
    let version_tag = major_version_tag(version);

    let mut seen: HashSet<(String, String, String)> = existing.iter().map(PcmField::key).collect();
    let mut out = Vec::new();

    for op in &ops {
        let templates = BASE_PCM_RULES
            .iter()
            .chain(families.iter().flat_map(|family| family.extra_fields.iter()));

        for template in templates {
            if !seen.insert(field_key(&op.path, &op.method, template.field)) {
                continue;
            }
            out.push(build_field(op, template, &version_tag));
        }
    }

    out
}

fn build_field(op: &SpecOperation, template: &PcmRuleTemplate, version_tag: &str) -> PcmField {
    let example = match template.field {
        "apiVersion" => Some(version_tag.to_string()),
        "endpoint" => Some(op.path.clone()),
        "httpMethod" => Some(op.method.clone()),
        _ => template.example.map(str::to_string),
    };

    PcmField {
        id: uuid::Uuid::new_v4().to_string(),
        endpoint: op.path.clone(),
        method: op.method.clone(),
        field: template.field.to_string(),
        definition: template.definition.to_string(),
        filling_rule: template.filling_rule.to_string(),
        roles: roles_for(template.mandatory),
        http_codes: codes_for(&op.response_codes, template.codes),
        mandatory: template.mandatory,
        min_size: template.min_size,
        max_size: template.max_size,
        pattern: template.pattern.map(str::to_string),
        example,
    }
}

fn roles_for(mandatory: MandatoryReporting) -> Vec<String> {
    let roles: &[&str] = match mandatory {
        MandatoryReporting::Server => &["server"],
        MandatoryReporting::Client => &["client"],
        MandatoryReporting::Both => &["client", "server"],
        MandatoryReporting::NotRequired => &[],
    };
    roles.iter().map(|role| role.to_string()).collect()
}

fn codes_for(declared: &[String], scope: CodeScope) -> Vec<String> {
    declared
        .iter()
        .filter(|code| match scope {
            CodeScope::All => true,
            CodeScope::Success => code.starts_with('2'),
        })
        .cloned()
        .collect()
}
