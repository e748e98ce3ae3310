use serde::{Deserialize, Serialize};
use serde_json::Value;

const HTTP_METHODS: [&str; 8] = ["get", "put", "post", "delete", "options", "head", "patch", "trace"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecOperation {
    pub path: String,
    pub method: String,
    pub summary: Option<String>,
    pub operation_id: Option<String>,
    pub parameters: Vec<String>,
    pub response_codes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpecInfo {
    pub title: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
}

/// Best-effort parse of an OpenAPI document given as JSON or YAML.
pub fn parse_specification(raw: &str) -> Result<Value, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("INVALID_SPEC: Specification is empty".to_string());
    }

    let parsed = match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => value,
        Err(json_err) => serde_yaml::from_str::<Value>(trimmed).map_err(|yaml_err| {
            format!("INVALID_SPEC: Not valid JSON ({json_err}) or YAML ({yaml_err})")
        })?,
    };

    if !parsed.is_object() {
        return Err("INVALID_SPEC: Specification root must be an object".to_string());
    }

    Ok(parsed)
}

pub fn spec_info(spec: &Value) -> SpecInfo {
    let info = spec.get("info");
    let text = |key: &str| {
        info.and_then(|i| i.get(key))
            .and_then(scalar_to_string)
            .filter(|s| !s.trim().is_empty())
    };

    SpecInfo {
        title: text("title"),
        version: text("version"),
        description: text("description"),
    }
}

/// Declared path keys of the `paths` object.
pub fn endpoint_paths(spec: &Value) -> Vec<String> {
    spec.get("paths")
        .and_then(Value::as_object)
        .map(|paths| paths.keys().cloned().collect())
        .unwrap_or_default()
}

pub fn operations(spec: &Value) -> Vec<SpecOperation> {
    let Some(paths) = spec.get("paths").and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for (path, item) in paths {
        let Some(item_obj) = item.as_object() else {
            continue;
        };

        // Path-level parameters apply to every operation below.
        let shared_params = parameter_names(item_obj.get("parameters"));

        for method in HTTP_METHODS {
            let Some(operation) = item_obj.get(method).and_then(Value::as_object) else {
                continue;
            };

            let mut parameters = shared_params.clone();
            for name in parameter_names(operation.get("parameters")) {
                if !parameters.contains(&name) {
                    parameters.push(name);
                }
            }

            let response_codes = operation
                .get("responses")
                .and_then(Value::as_object)
                .map(|responses| responses.keys().cloned().collect())
                .unwrap_or_default();

            out.push(SpecOperation {
                path: path.clone(),
                method: method.to_uppercase(),
                summary: operation.get("summary").and_then(scalar_to_string),
                operation_id: operation.get("operationId").and_then(scalar_to_string),
                parameters,
                response_codes,
            });
        }
    }

    out
}

fn parameter_names(params: Option<&Value>) -> Vec<String> {
    params
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(|param| param.get("name").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
