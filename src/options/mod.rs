//! Runtime configuration with TOML preset support.
//!
//! Backend capabilities, per-style quality mappings, worker offload and the
//! known color-scheme names are consolidated here. Options serialize to and
//! from TOML so hosts can ship presets.

mod capabilities;
mod colors;
mod quality;
mod worker;

use std::path::Path;

pub use capabilities::CapabilityOptions;
pub use colors::ColorOptions;
pub use quality::{QualityLevel, QualityOptions, StyleQuality};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use worker::WorkerOptions;

use crate::error::ReprError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[capabilities]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Rendering backend capabilities.
    pub capabilities: CapabilityOptions,
    /// Quality shorthand expansion per style.
    pub quality: QualityOptions,
    /// Background worker settings.
    pub worker: WorkerOptions,
    /// Known color schemes.
    #[schemars(skip)]
    pub colors: ColorOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ReprError::Io`] if the file cannot be read or
    /// [`ReprError::OptionsParse`] if it is not valid options TOML.
    pub fn load(path: &Path) -> Result<Self, ReprError> {
        let content = std::fs::read_to_string(path).map_err(ReprError::Io)?;
        toml::from_str(&content)
            .map_err(|e| ReprError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// Returns [`ReprError::OptionsParse`] on serialization failure or
    /// [`ReprError::Io`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ReprError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ReprError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ReprError::Io)?;
        }
        std::fs::write(path, content).map_err(ReprError::Io)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: Options = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
[capabilities]
impostor = false
";
        let opts: Options = toml::from_str(toml_str).unwrap();
        assert!(!opts.capabilities.impostor);
        // Everything else should be default
        assert!(opts.worker.use_worker);
        assert_eq!(opts.worker.thread_name, "surface-worker");
        assert!(opts.colors.is_scheme("element"));
    }

    #[test]
    fn quality_defaults_per_style() {
        let q = QualityOptions::default();
        let low = q.expand("ball+stick", QualityLevel::Low).unwrap();
        assert_eq!(low.i64("sphereDetail"), Some(0));
        assert_eq!(low.i64("radiusSegments"), Some(5));
        let high = q.expand("spacefill", QualityLevel::High).unwrap();
        assert_eq!(high.i64("sphereDetail"), Some(2));
        assert!(!high.contains("radiusSegments"));
        assert!(q.expand("line", QualityLevel::High).is_none());
        assert_eq!(QualityLevel::parse("medium"), Some(QualityLevel::Medium));
        assert_eq!(QualityLevel::parse("auto"), None);
    }

    #[test]
    fn quality_overrides_from_toml() {
        let toml_str = r#"
[quality.styles.spacefill.high]
sphereDetail = 3
"#;
        let opts: Options = toml::from_str(toml_str).unwrap();
        let q = &opts.quality.styles["spacefill"];
        assert_eq!(q.high.i64("sphereDetail"), Some(3));
        assert!(q.low.is_empty());
        // Replacing the map drops the built-in entries for other styles.
        assert!(!opts.quality.styles.contains_key("licorice"));
    }

    #[test]
    fn save_load_and_list_presets() {
        let dir = std::env::temp_dir()
            .join(format!("molrepr-presets-{}", std::process::id()));
        let mut opts = Options::default();
        opts.worker.use_worker = false;
        opts.save(&dir.join("inline.toml")).unwrap();
        Options::default().save(&dir.join("default.toml")).unwrap();
        std::fs::write(dir.join("notes.txt"), "x").unwrap();

        assert_eq!(Options::list_presets(&dir), vec!["default", "inline"]);
        let loaded = Options::load(&dir.join("inline.toml")).unwrap();
        assert_eq!(loaded, opts);

        std::fs::write(dir.join("broken.toml"), "capabilities = 3").unwrap();
        assert!(matches!(
            Options::load(&dir.join("broken.toml")),
            Err(ReprError::OptionsParse(_))
        ));
        assert!(matches!(
            Options::load(&dir.join("missing.toml")),
            Err(ReprError::Io(_))
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value =
            serde_json::to_value(Options::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();

        assert!(props.contains_key("capabilities"));
        assert!(props.contains_key("quality"));
        assert!(props.contains_key("worker"));
        // Skipped sections should be absent
        assert!(!props.contains_key("colors"));

        let worker = &props["worker"]["properties"];
        assert!(worker.get("use_worker").is_some());
        assert!(worker.get("thread_name").is_none());
    }
}
