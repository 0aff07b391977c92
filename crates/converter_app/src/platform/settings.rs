use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context};
use converter_engine::{parse_base_url, ServiceSettings};
use engine_logging::engine_info;
use serde::Deserialize;

/// Optional RON settings file. Every field falls back to the built-in default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SettingsFile {
    base_url: Option<String>,
    poll_interval_ms: Option<u64>,
    connect_timeout_ms: Option<u64>,
    request_timeout_ms: Option<u64>,
}

/// Values given on the command line; they win over the file.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub server: Option<String>,
    pub interval_ms: Option<u64>,
}

pub fn load_settings(
    config: Option<&Path>,
    overrides: &SettingsOverrides,
) -> anyhow::Result<ServiceSettings> {
    let file = match config {
        Some(path) => read_settings_file(path)?,
        None => SettingsFile::default(),
    };
    let settings = resolve(file, overrides)?;
    engine_info!(
        "Service {} polled every {:?}",
        settings.base_url,
        settings.poll_interval
    );
    Ok(settings)
}

fn read_settings_file(path: &Path) -> anyhow::Result<SettingsFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file {}", path.display()))?;
    ron::from_str(&content)
        .with_context(|| format!("failed to parse settings file {}", path.display()))
}

fn resolve(file: SettingsFile, overrides: &SettingsOverrides) -> anyhow::Result<ServiceSettings> {
    let mut settings = ServiceSettings::default();

    if let Some(raw) = overrides.server.as_ref().or(file.base_url.as_ref()) {
        settings.base_url =
            parse_base_url(raw).with_context(|| format!("invalid service URL '{raw}'"))?;
    }
    if let Some(ms) = overrides.interval_ms.or(file.poll_interval_ms) {
        if ms == 0 {
            bail!("poll interval must be at least 1 ms");
        }
        settings.poll_interval = Duration::from_millis(ms);
    }
    settings.connect_timeout = file.connect_timeout_ms.map(Duration::from_millis);
    settings.request_timeout = file.request_timeout_ms.map(Duration::from_millis);

    Ok(settings)
}
