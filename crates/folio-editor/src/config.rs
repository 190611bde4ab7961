use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use folio_export::print::ExportTimings;
use folio_genai::client::GenAiSettings;

/// Current config version. Bump this when adding fields or changing shape.
/// Each bump requires a corresponding entry in [`migrate`].
const CURRENT_VERSION: u32 = 1;

pub const DEFAULT_BIND: &str = "127.0.0.1:4173";
pub const DEFAULT_FALLBACK_URL: &str = "https://pdfia.netlify.app/";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Schema version. Missing or 0 = pre-versioned config.
    #[serde(default)]
    pub config_version: u32,
    pub bind: String,
    /// Where the report record lives. `None` means the platform data dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub fallback_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default)]
    pub genai: GenAiSettings,
    /// Export wait bounds. Added in v1.
    #[serde(default)]
    pub timings: ExportTimings,
    pub created_at: jiff::Timestamp,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            config_version: CURRENT_VERSION,
            bind: DEFAULT_BIND.to_string(),
            data_dir: None,
            fallback_url: DEFAULT_FALLBACK_URL.to_string(),
            api_key: None,
            genai: GenAiSettings::default(),
            timings: ExportTimings::default(),
            created_at: jiff::Timestamp::now(),
        }
    }
}

impl EditorConfig {
    /// Apply `FOLIO_*` and API key overrides read through `var`.
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(bind) = var("FOLIO_BIND") {
            self.bind = bind;
        }
        if let Some(dir) = var("FOLIO_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(url) = var("FOLIO_FALLBACK_URL") {
            self.fallback_url = url;
        }
        if let Some(key) = var("GEMINI_API_KEY").or_else(|| var("API_KEY")) {
            self.api_key = Some(key);
        }
    }

    pub fn resolved_data_dir(&self) -> eyre::Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => {
                let base =
                    dirs::data_dir().ok_or_else(|| eyre::eyre!("no data directory found"))?;
                Ok(base.join("folio"))
            }
        }
    }
}

fn config_dir() -> eyre::Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| eyre::eyre!("no config directory found"))?;
    Ok(base.join("folio"))
}

pub fn config_path() -> eyre::Result<PathBuf> {
    Ok(config_dir()?.join("config.json"))
}

/// Load the config at `path`, or write and return defaults if there is none.
pub fn load_or_init(path: &Path) -> eyre::Result<EditorConfig> {
    if path.exists() {
        return load_config(path);
    }
    let config = EditorConfig::default();
    save_config(path, &config)?;
    Ok(config)
}

pub fn load_config(path: &Path) -> eyre::Result<EditorConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read config at {}: {e}", path.display()))?;

    // Parse as raw JSON so we can run migrations before deserializing.
    let json: serde_json::Value = serde_json::from_str(&contents)?;
    let on_disk_version = json
        .get("config_version")
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as u32;

    let migrated = migrate(json, on_disk_version)?;
    let config: EditorConfig = serde_json::from_value(migrated)?;
    Ok(config)
}

/// Run sequential migrations from `from_version` up to [`CURRENT_VERSION`].
fn migrate(mut json: serde_json::Value, from_version: u32) -> eyre::Result<serde_json::Value> {
    if from_version > CURRENT_VERSION {
        return Err(eyre::eyre!(
            "config_version {from_version} is newer than this build supports ({CURRENT_VERSION}). \
             Please update Folio."
        ));
    }

    // v0 → v1: add export timings
    if from_version < 1 {
        let obj = json
            .as_object_mut()
            .ok_or_else(|| eyre::eyre!("config is not a JSON object"))?;
        obj.entry("timings")
            .or_insert(serde_json::to_value(ExportTimings::default())?);
        obj.insert(
            "config_version".to_string(),
            serde_json::Value::Number(1.into()),
        );
        tracing::info!("migrated config v0 → v1 (added timings)");
    }

    Ok(json)
}

pub fn save_config(path: &Path, config: &EditorConfig) -> eyre::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| eyre::eyre!("config path has no parent: {}", path.display()))?;
    std::fs::create_dir_all(dir)?;

    // Always write the current version, regardless of what was loaded.
    let mut stamped = config.clone();
    stamped.config_version = CURRENT_VERSION;

    let json = serde_json::to_string_pretty(&stamped)?;

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json.as_bytes())?;

    // The file may hold an API key.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
    }

    std::fs::rename(&tmp_path, path)?;

    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}
