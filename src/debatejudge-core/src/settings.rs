//! Settings store for runtime-tunable configuration.
//!
//! Holds the guardrail blocklists, per-model generation parameters, and the
//! maximum debate duration. The store is read-mostly: values are fetched
//! fresh on every access with no caching layer, so an admin edit is visible
//! to the next read. The only consistency guarantee is "most recent write
//! wins".

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::debug;

use crate::error::DebateError;

/// Key-value settings storage.
///
/// Keys are setting names ("blocked_words", "model_settings", ...); values
/// are free-form TOML values so the admin surface can store lists and
/// per-model tables without schema changes here.
pub trait SettingsStore: Send + Sync {
    /// Fetch a setting, `None` if it was never written.
    fn get(&self, name: &str) -> Result<Option<toml::Value>, DebateError>;

    /// Write a setting, replacing any previous value.
    fn set(&self, name: &str, value: toml::Value) -> Result<(), DebateError>;
}

/// Settings backed by a TOML file on disk.
///
/// The file is re-read on every `get` and rewritten whole on every `set`.
/// A missing file behaves like an empty store.
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<toml::Table, DebateError> {
        if !self.path.exists() {
            return Ok(toml::Table::new());
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| DebateError::SettingsError(format!("Failed to read settings: {}", e)))?;
        toml::from_str(&content)
            .map_err(|e| DebateError::SettingsError(format!("Failed to parse settings: {}", e)))
    }
}

impl SettingsStore for FileSettingsStore {
    fn get(&self, name: &str) -> Result<Option<toml::Value>, DebateError> {
        let table = self.load()?;
        let value = table.get(name).cloned();
        debug!(setting = name, found = value.is_some(), "settings read");
        Ok(value)
    }

    fn set(&self, name: &str, value: toml::Value) -> Result<(), DebateError> {
        let mut table = self.load()?;
        table.insert(name.to_string(), value);
        let content = toml::to_string(&table)
            .map_err(|e| DebateError::SettingsError(format!("Failed to encode settings: {}", e)))?;
        fs::write(&self.path, content)
            .map_err(|e| DebateError::SettingsError(format!("Failed to write settings: {}", e)))?;
        debug!(setting = name, "settings write");
        Ok(())
    }
}

/// In-memory settings, used in tests and when no settings file is configured.
#[derive(Default)]
pub struct MemorySettingsStore {
    values: Mutex<BTreeMap<String, toml::Value>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, name: &str) -> Result<Option<toml::Value>, DebateError> {
        let values = self
            .values
            .lock()
            .map_err(|_| DebateError::SettingsError("settings lock poisoned".to_string()))?;
        Ok(values.get(name).cloned())
    }

    fn set(&self, name: &str, value: toml::Value) -> Result<(), DebateError> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| DebateError::SettingsError("settings lock poisoned".to_string()))?;
        values.insert(name.to_string(), value);
        Ok(())
    }
}

/// Generation parameters for one model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1000,
        }
    }
}

fn string_list(value: Option<toml::Value>) -> Vec<String> {
    value
        .and_then(|v| v.as_array().cloned())
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Blocked words for the guardrail filter, empty when unset.
pub fn blocked_words(store: &dyn SettingsStore) -> Result<Vec<String>, DebateError> {
    Ok(string_list(store.get("blocked_words")?))
}

/// Blocked topics for the guardrail filter, empty when unset.
pub fn blocked_topics(store: &dyn SettingsStore) -> Result<Vec<String>, DebateError> {
    Ok(string_list(store.get("blocked_topics")?))
}

/// Per-model generation parameters, defaults when the model has no entry.
pub fn generation_params(
    store: &dyn SettingsStore,
    model_id: &str,
) -> Result<GenerationParams, DebateError> {
    let defaults = GenerationParams::default();
    let Some(settings) = store.get("model_settings")? else {
        return Ok(defaults);
    };
    let Some(entry) = settings.get(model_id) else {
        return Ok(defaults);
    };

    let temperature = entry
        .get("temperature")
        .and_then(|v| v.as_float().or_else(|| v.as_integer().map(|i| i as f64)))
        .map(|f| f as f32)
        .unwrap_or(defaults.temperature);
    let max_tokens = entry
        .get("max_tokens")
        .and_then(|v| v.as_integer())
        .map(|i| i as u32)
        .unwrap_or(defaults.max_tokens);

    Ok(GenerationParams {
        temperature,
        max_tokens,
    })
}

/// Maximum advisory debate duration in seconds (default 180).
pub fn max_debate_duration(store: &dyn SettingsStore) -> Result<u64, DebateError> {
    Ok(store
        .get("max_debate_duration")?
        .and_then(|v| v.as_integer())
        .map(|i| i as u64)
        .unwrap_or(180))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        let store = MemorySettingsStore::new();
        assert!(blocked_words(&store).unwrap().is_empty());
        assert!(blocked_topics(&store).unwrap().is_empty());
        assert_eq!(
            generation_params(&store, "some-model").unwrap(),
            GenerationParams::default()
        );
        assert_eq!(max_debate_duration(&store).unwrap(), 180);
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemorySettingsStore::new();
        store
            .set(
                "blocked_words",
                toml::Value::Array(vec![toml::Value::String("spam".to_string())]),
            )
            .unwrap();
        assert_eq!(blocked_words(&store).unwrap(), vec!["spam".to_string()]);
    }

    #[test]
    fn test_model_params_from_table() {
        let store = MemorySettingsStore::new();
        let table: toml::Value = toml::from_str(
            r#"
            [my-model]
            temperature = 0.3
            max_tokens = 500
            "#,
        )
        .unwrap();
        store.set("model_settings", table).unwrap();

        let params = generation_params(&store, "my-model").unwrap();
        assert!((params.temperature - 0.3).abs() < 1e-6);
        assert_eq!(params.max_tokens, 500);

        // Unknown model still gets defaults.
        assert_eq!(
            generation_params(&store, "other-model").unwrap(),
            GenerationParams::default()
        );
    }

    #[test]
    fn test_file_store_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let store = FileSettingsStore::new(&path);

        // Missing file behaves like an empty store.
        assert!(store.get("max_debate_duration").unwrap().is_none());

        store
            .set("max_debate_duration", toml::Value::Integer(240))
            .unwrap();
        assert_eq!(max_debate_duration(&store).unwrap(), 240);

        // A second handle sees the write immediately (no caching).
        let other = FileSettingsStore::new(&path);
        assert_eq!(max_debate_duration(&other).unwrap(), 240);
    }
}
