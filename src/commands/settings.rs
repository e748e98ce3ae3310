use crate::commands::db::open_store;
use crate::models::settings::{AppSettings, Language, Theme};
use crate::storage::{read_json_opt, write_json, KeyValueStore, LANGUAGE_KEY, THEME_KEY};
use serde_json::{json, Map, Value};

#[cfg_attr(feature = "desktop", tauri::command)]
pub async fn get_settings(workspace_path: String) -> Result<AppSettings, String> {
    let store = open_store(&workspace_path)?;
    load_settings(&store)
}

#[cfg_attr(feature = "desktop", tauri::command)]
pub async fn save_settings(workspace_path: String, settings: Value) -> Result<AppSettings, String> {
    let store = open_store(&workspace_path)?;
    save_settings_internal(&store, &settings)
}

pub fn load_settings(store: &dyn KeyValueStore) -> Result<AppSettings, String> {
    let mut raw = Map::new();
    if let Some(language) = read_json_opt::<Value>(store, LANGUAGE_KEY)? {
        raw.insert("language".to_string(), language);
    }
    if let Some(theme) = read_json_opt::<Value>(store, THEME_KEY)? {
        raw.insert("theme".to_string(), theme);
    }

    Ok(settings_from_map(&sanitize_settings(raw)))
}

/// Merge a partial update over the stored values. Unknown keys are ignored
/// and invalid values fall back to the defaults.
pub fn save_settings_internal(store: &dyn KeyValueStore, incoming: &Value) -> Result<AppSettings, String> {
    let current = load_settings(store)?;
    let mut merged = Map::new();
    merged.insert("language".to_string(), json!(current.language.as_str()));
    merged.insert("theme".to_string(), json!(current.theme.as_str()));

    if let Some(obj) = incoming.as_object() {
        for key in ["language", "theme"] {
            if let Some(value) = obj.get(key) {
                merged.insert(key.to_string(), value.clone());
            }
        }
    }

    let settings = settings_from_map(&sanitize_settings(merged));
    write_json(store, LANGUAGE_KEY, settings.language.as_str())?;
    write_json(store, THEME_KEY, settings.theme.as_str())?;
    log::debug!(
        "Saved settings language={} theme={}",
        settings.language.as_str(),
        settings.theme.as_str()
    );
    Ok(settings)
}

fn sanitize_settings(mut map: Map<String, Value>) -> Map<String, Value> {
    sanitize_enum(&mut map, "language", &Language::ALLOWED, Language::default().as_str());
    sanitize_enum(&mut map, "theme", &Theme::ALLOWED, Theme::default().as_str());
    map
}

fn sanitize_enum(map: &mut Map<String, Value>, key: &str, allowed: &[&str], default: &str) {
    let valid = map
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| allowed.contains(value))
        .unwrap_or(default);
    map.insert(key.to_string(), json!(valid));
}

fn settings_from_map(map: &Map<String, Value>) -> AppSettings {
    let text = |key: &str| map.get(key).and_then(Value::as_str).unwrap_or_default();
    AppSettings {
        language: Language::parse(text("language")).unwrap_or_default(),
        theme: Theme::parse(text("theme")).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn absent_keys_load_defaults() {
        let store = MemoryStore::new();
        let settings = load_settings(&store).expect("load");
        assert_eq!(settings, AppSettings::default());
        assert_eq!(settings.language, Language::En);
        assert_eq!(settings.theme, Theme::System);
    }

    #[test]
    fn merges_partial_settings_without_losing_existing_values() {
        let store = MemoryStore::new();
        save_settings_internal(&store, &json!({ "theme": "dark" })).expect("save theme");
        let saved = save_settings_internal(&store, &json!({ "language": "pt" })).expect("save language");

        assert_eq!(saved.language, Language::Pt);
        assert_eq!(saved.theme, Theme::Dark);
        assert_eq!(load_settings(&store).expect("reload"), saved);
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let store = MemoryStore::new();
        store.set(LANGUAGE_KEY, "\"fr\"").unwrap();
        store.set(THEME_KEY, "42").unwrap();
        let settings = load_settings(&store).expect("load");
        assert_eq!(settings, AppSettings::default());

        let saved = save_settings_internal(&store, &json!({ "theme": "neon" })).expect("save");
        assert_eq!(saved.theme, Theme::System);
    }
}
