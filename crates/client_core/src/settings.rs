//! Flat two-section settings file (`[api]` and `[settings]`).

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use shared::{
    domain::{AntiAliasingMode, Mode, OutputFormat},
    protocol::DEFAULT_ENDPOINT,
};
use tracing::{info, warn};

use crate::{client::Credentials, request::RequestDraft};

pub const DEFAULT_SETTINGS_FILE: &str = "vectorizer.toml";
pub const SETTINGS_PATH_ENV: &str = "VECTORIZER_CONFIG";
pub const LOG_FILE_NAME: &str = "vectorizer_app.log";

/// Settings file location: explicit flag, then `VECTORIZER_CONFIG`, then the working directory.
pub fn resolve_settings_path(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| {
        std::env::var_os(SETTINGS_PATH_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    })
    .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE))
}

/// The application log lives next to the settings file.
pub fn log_file_path(settings_path: &Path) -> PathBuf {
    settings_path
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(LOG_FILE_NAME)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSection {
    pub api_key: String,
    pub api_secret: String,
    pub endpoint: String,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

/// Processing defaults, kept as text exactly as they are edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingSection {
    pub input_base_folder: String,
    pub output_folder: String,
    pub palette: String,
    pub gpl_file_path: String,
    pub mode: String,
    pub output_file_format: String,
    pub line_fit_tolerance: String,
    pub anti_aliasing_mode: String,
    pub input_dpi: String,
    pub output_dpi: String,
    pub max_colors: String,
    pub min_area_px: String,
}

impl Default for ProcessingSection {
    fn default() -> Self {
        Self {
            input_base_folder: String::new(),
            output_folder: String::new(),
            palette: String::new(),
            gpl_file_path: String::new(),
            mode: Mode::Preview.to_string(),
            output_file_format: OutputFormat::Png.to_string(),
            line_fit_tolerance: "0.1".into(),
            anti_aliasing_mode: AntiAliasingMode::AntiAliased.to_string(),
            input_dpi: "96".into(),
            output_dpi: "96".into(),
            max_colors: "36".into(),
            min_area_px: "50".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSection,
    pub settings: ProcessingSection,
}

impl Settings {
    /// Reads the file if present, then applies `APP__*` environment overrides.
    pub fn load(path: &Path) -> anyhow::Result<Settings> {
        let mut settings = match fs::read_to_string(path) {
            Ok(raw) => toml::from_str::<Settings>(&raw)
                .with_context(|| format!("failed to parse settings file '{}'", path.display()))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no settings file; using defaults");
                Settings::default()
            }
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed to read settings file '{}'", path.display())
                })
            }
        };
        settings.apply_env_overrides();
        info!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let raw = toml::to_string_pretty(self).context("failed to serialize settings")?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create settings directory '{}'", parent.display())
            })?;
        }
        fs::write(path, raw)
            .with_context(|| format!("failed to write settings file '{}'", path.display()))?;
        info!(path = %path.display(), "settings saved");
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("APP__API_KEY") {
            self.api.api_key = v;
        }
        if let Ok(v) = std::env::var("APP__API_SECRET") {
            self.api.api_secret = v;
        }
        if let Ok(v) = std::env::var("APP__ENDPOINT") {
            self.api.endpoint = v;
        }
        if let Ok(v) = std::env::var("APP__OUTPUT_FOLDER") {
            self.settings.output_folder = v;
        }
        if let Ok(v) = std::env::var("APP__INPUT_BASE_FOLDER") {
            self.settings.input_base_folder = v;
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.api.api_key.trim(), self.api.api_secret.trim())
    }

    pub fn endpoint(&self) -> &str {
        let endpoint = self.api.endpoint.trim();
        if endpoint.is_empty() {
            DEFAULT_ENDPOINT
        } else {
            endpoint
        }
    }

    pub fn mode(&self) -> Mode {
        parse_or_default("mode", &self.settings.mode)
    }

    pub fn output_format(&self) -> OutputFormat {
        parse_or_default("output_file_format", &self.settings.output_file_format)
    }

    pub fn anti_aliasing_mode(&self) -> AntiAliasingMode {
        parse_or_default("anti_aliasing_mode", &self.settings.anti_aliasing_mode)
    }

    /// Form values pre-filled from the stored defaults.
    pub fn draft(&self) -> RequestDraft {
        let s = &self.settings;
        RequestDraft {
            image_path: String::new(),
            output_format: self.output_format(),
            mode: self.mode(),
            width_cm: String::new(),
            height_cm: String::new(),
            input_dpi: s.input_dpi.clone(),
            output_dpi: s.output_dpi.clone(),
            line_fit_tolerance: s.line_fit_tolerance.clone(),
            anti_aliasing_mode: self.anti_aliasing_mode(),
            min_area_px: s.min_area_px.clone(),
            max_colors: s.max_colors.clone(),
            palette: s.palette.clone(),
            gpl_file_path: s.gpl_file_path.clone(),
            batch_id: String::new(),
            output_folder: s.output_folder.clone(),
        }
    }

    /// Copies the editable defaults of a draft back into the stored settings.
    pub fn absorb_draft(&mut self, draft: &RequestDraft) {
        let s = &mut self.settings;
        s.output_folder = draft.output_folder.clone();
        s.palette = draft.palette.clone();
        s.gpl_file_path = draft.gpl_file_path.clone();
        s.mode = draft.mode.to_string();
        s.output_file_format = draft.output_format.to_string();
        s.line_fit_tolerance = draft.line_fit_tolerance.clone();
        s.anti_aliasing_mode = draft.anti_aliasing_mode.to_string();
        s.input_dpi = draft.input_dpi.clone();
        s.output_dpi = draft.output_dpi.clone();
        s.max_colors = draft.max_colors.clone();
        s.min_area_px = draft.min_area_px.clone();
    }
}

fn parse_or_default<T>(key: &str, raw: &str) -> T
where
    T: std::str::FromStr + Default,
    T::Err: std::fmt::Display,
{
    if raw.trim().is_empty() {
        return T::default();
    }
    raw.parse().unwrap_or_else(|err| {
        warn!(key, "{err}; falling back to default");
        T::default()
    })
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
