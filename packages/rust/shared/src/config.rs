//! Application configuration for resolvekit.
//!
//! User config lives at `~/.resolvekit/resolvekit.toml`.
//! CLI flags override config file values, which override defaults.
//!
//! The `[normalizer]` and `[classifier]` tables hold every heuristic
//! threshold and keyword list, so a deployment can tune or localize them
//! without touching code.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ResolveKitError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "resolvekit.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".resolvekit";

// ---------------------------------------------------------------------------
// Config structs (matching resolvekit.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub editor: EditorConfig,

    #[serde(default)]
    pub normalizer: NormalizerConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,
}

/// `[storage]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the libSQL database file. `~` expands to the home directory.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    "~/.resolvekit/resolvekit.db".into()
}

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    3400
}

/// `[client]` section: where `push` sends documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:3400".into()
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[editor]` section: debounce delays for reclassification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Delay after the last keystroke before classifying.
    #[serde(default = "default_keystroke_debounce")]
    pub keystroke_debounce_ms: u64,

    /// Shorter delay used right after a paste.
    #[serde(default = "default_paste_debounce")]
    pub paste_debounce_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            keystroke_debounce_ms: default_keystroke_debounce(),
            paste_debounce_ms: default_paste_debounce(),
        }
    }
}

fn default_keystroke_debounce() -> u64 {
    800
}
fn default_paste_debounce() -> u64 {
    150
}

/// `[normalizer]` section: font-size and bold promotion thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Paragraphs at or above this size (points) become `<h1>`.
    #[serde(default = "default_h1_min_pt")]
    pub h1_min_pt: f32,

    #[serde(default = "default_h2_min_pt")]
    pub h2_min_pt: f32,

    #[serde(default = "default_h3_min_pt")]
    pub h3_min_pt: f32,

    /// Heading level given to a paragraph whose whole text is bold.
    #[serde(default = "default_bold_heading_level")]
    pub bold_heading_level: u8,

    /// Bold paragraphs longer than this stay paragraphs.
    #[serde(default = "default_bold_heading_max_chars")]
    pub bold_heading_max_chars: usize,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            h1_min_pt: default_h1_min_pt(),
            h2_min_pt: default_h2_min_pt(),
            h3_min_pt: default_h3_min_pt(),
            bold_heading_level: default_bold_heading_level(),
            bold_heading_max_chars: default_bold_heading_max_chars(),
        }
    }
}

fn default_h1_min_pt() -> f32 {
    20.0
}
fn default_h2_min_pt() -> f32 {
    16.0
}
fn default_h3_min_pt() -> f32 {
    13.0
}
fn default_bold_heading_level() -> u8 {
    3
}
fn default_bold_heading_max_chars() -> usize {
    120
}

/// `[classifier]` section: keyword tables and fixed output strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_method_keywords")]
    pub method_keywords: Vec<String>,

    #[serde(default = "default_escalation_keywords")]
    pub escalation_keywords: Vec<String>,

    #[serde(default = "default_document_keywords")]
    pub document_keywords: Vec<String>,

    #[serde(default = "default_timeline_keywords")]
    pub timeline_keywords: Vec<String>,

    #[serde(default = "default_note_keywords")]
    pub note_keywords: Vec<String>,

    /// A paragraph must be longer than this to become a description.
    #[serde(default = "default_min_description_chars")]
    pub min_description_chars: usize,

    /// Template for `mainHeading.description`; `{entity}` is substituted.
    #[serde(default = "default_main_description_template")]
    pub main_description_template: String,

    #[serde(default = "default_fallback_method_title")]
    pub fallback_method_title: String,

    #[serde(default = "default_timeline_days")]
    pub timeline_default_days: String,

    #[serde(default = "default_timeline_description")]
    pub timeline_default_description: String,

    #[serde(default)]
    pub headings: SectionHeadings,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            method_keywords: default_method_keywords(),
            escalation_keywords: default_escalation_keywords(),
            document_keywords: default_document_keywords(),
            timeline_keywords: default_timeline_keywords(),
            note_keywords: default_note_keywords(),
            min_description_chars: default_min_description_chars(),
            main_description_template: default_main_description_template(),
            fallback_method_title: default_fallback_method_title(),
            timeline_default_days: default_timeline_days(),
            timeline_default_description: default_timeline_description(),
            headings: SectionHeadings::default(),
        }
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| (*w).to_string()).collect()
}

fn default_method_keywords() -> Vec<String> {
    words(&["method", "step", "process", "procedure", "way", "approach"])
}
fn default_escalation_keywords() -> Vec<String> {
    words(&["escalation", "level", "hierarchy", "tier", "stage"])
}
fn default_document_keywords() -> Vec<String> {
    words(&["document", "required", "needed", "proof", "evidence", "copy"])
}
fn default_timeline_keywords() -> Vec<String> {
    words(&["timeline", "resolution", "time", "days", "weeks", "duration"])
}
fn default_note_keywords() -> Vec<String> {
    words(&["note", "important", "warning", "caution", "remember"])
}
fn default_min_description_chars() -> usize {
    20
}
fn default_main_description_template() -> String {
    "Step-by-step guide to filing a complaint with {entity} and escalating it if it is not resolved."
        .into()
}
fn default_fallback_method_title() -> String {
    "General Complaint Process".into()
}
fn default_timeline_days() -> String {
    "30".into()
}
fn default_timeline_description() -> String {
    "Expected resolution time".into()
}

/// `[classifier.headings]`: display headings of each output section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionHeadings {
    #[serde(default = "default_methods_heading")]
    pub methods: String,
    #[serde(default = "default_levels_heading")]
    pub levels: String,
    #[serde(default = "default_documents_heading")]
    pub documents: String,
    #[serde(default = "default_timeline_heading")]
    pub timeline: String,
}

impl Default for SectionHeadings {
    fn default() -> Self {
        Self {
            methods: default_methods_heading(),
            levels: default_levels_heading(),
            documents: default_documents_heading(),
            timeline: default_timeline_heading(),
        }
    }
}

fn default_methods_heading() -> String {
    "Complaint Methods".into()
}
fn default_levels_heading() -> String {
    "Escalation Levels".into()
}
fn default_documents_heading() -> String {
    "Documents Required".into()
}
fn default_timeline_heading() -> String {
    "Resolution Timeline".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.resolvekit/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ResolveKitError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.resolvekit/resolvekit.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ResolveKitError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        ResolveKitError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ResolveKitError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ResolveKitError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ResolveKitError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Expand a leading `~/` against the home directory.
pub fn expand_home(path: &str) -> Result<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => {
            let home = dirs::home_dir()
                .ok_or_else(|| ResolveKitError::config("could not determine home directory"))?;
            Ok(home.join(rest))
        }
        None => Ok(PathBuf::from(path)),
    }
}

/// Reject configs whose thresholds cannot produce sensible headings.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    let n = &config.normalizer;
    if !(n.h1_min_pt > n.h2_min_pt && n.h2_min_pt > n.h3_min_pt) {
        return Err(ResolveKitError::config(format!(
            "font-size thresholds must be strictly decreasing (h1 {} > h2 {} > h3 {})",
            n.h1_min_pt, n.h2_min_pt, n.h3_min_pt
        )));
    }
    if !(1..=6).contains(&n.bold_heading_level) {
        return Err(ResolveKitError::config(format!(
            "bold_heading_level must be 1-6, got {}",
            n.bold_heading_level
        )));
    }
    let c = &config.classifier;
    for (name, list) in [
        ("method_keywords", &c.method_keywords),
        ("escalation_keywords", &c.escalation_keywords),
        ("document_keywords", &c.document_keywords),
        ("timeline_keywords", &c.timeline_keywords),
        ("note_keywords", &c.note_keywords),
    ] {
        if list.iter().any(|k| k.trim().is_empty()) {
            return Err(ResolveKitError::config(format!(
                "{name} contains an empty keyword"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("db_path"));
        assert!(toml_str.contains("method_keywords"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.server.port, 3400);
        assert_eq!(parsed.classifier.min_description_chars, 20);
        assert_eq!(parsed.classifier.headings.documents, "Documents Required");
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let toml_str = r#"
[classifier]
note_keywords = ["hinweis", "wichtig"]

[editor]
paste_debounce_ms = 50
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.classifier.note_keywords, vec!["hinweis", "wichtig"]);
        assert_eq!(config.classifier.method_keywords.len(), 6);
        assert_eq!(config.editor.paste_debounce_ms, 50);
        assert_eq!(config.editor.keystroke_debounce_ms, 800);
    }

    #[test]
    fn validation_rejects_inverted_thresholds() {
        let mut config = AppConfig::default();
        assert!(validate_config(&config).is_ok());

        config.normalizer.h2_min_pt = 30.0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("strictly decreasing"));
    }

    #[test]
    fn validation_rejects_empty_keyword() {
        let mut config = AppConfig::default();
        config.classifier.note_keywords.push("  ".into());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn expand_home_leaves_absolute_paths() {
        let p = expand_home("/tmp/x.db").expect("expand");
        assert_eq!(p, PathBuf::from("/tmp/x.db"));
    }
}
