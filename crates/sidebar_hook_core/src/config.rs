use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

pub const CONFIG_ENV: &str = "SIDEBAR_HOOK_CONFIG";
pub const CODEC_ENV: &str = "SIDEBAR_HOOK_CODEC";
pub const YQ_PATH_ENV: &str = "YQ_PATH";
pub const DIAGNOSTICS_ENV: &str = "SIDEBAR_HOOK_DIAGNOSTICS";

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CodecBackend {
    /// In-process YAML, the converter is only used when asked for.
    #[default]
    Auto,
    Native,
    Yq,
}

impl CodecBackend {
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        if value.eq_ignore_ascii_case("native") {
            return Ok(Self::Native);
        }
        if value.eq_ignore_ascii_case("yq") {
            return Ok(Self::Yq);
        }
        bail!("unsupported codec backend: {value} (expected auto|native|yq)")
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Native => "native",
            Self::Yq => "yq",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct HookConfig {
    #[serde(default)]
    pub codec: CodecSection,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct CodecSection {
    #[serde(default)]
    pub backend: CodecBackend,
    pub yq_path: Option<PathBuf>,
}

impl HookConfig {
    /// Resolve the codec backend: env SIDEBAR_HOOK_CODEC > config > auto.
    pub fn backend_with_lookup<F>(&self, lookup: F) -> Result<CodecBackend>
    where
        F: Fn(&str) -> Option<String>,
    {
        match non_blank(lookup(CODEC_ENV)) {
            Some(value) => {
                CodecBackend::parse(&value).with_context(|| format!("invalid {CODEC_ENV}"))
            }
            None => Ok(self.codec.backend),
        }
    }

    /// Resolve an explicit converter path: env YQ_PATH > config > None.
    pub fn yq_path_with_lookup<F>(&self, lookup: F) -> Option<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        non_blank(lookup(YQ_PATH_ENV))
            .map(PathBuf::from)
            .or_else(|| self.codec.yq_path.clone())
    }
}

/// Load and parse a HookConfig from a TOML file. Returns default if file doesn't exist.
pub fn load_config(config_path: &Path) -> Result<HookConfig> {
    if !config_path.exists() {
        return Ok(HookConfig::default());
    }
    let content = fs::read_to_string(config_path)
        .with_context(|| format!("failed to read {}", config_path.display()))?;
    let parsed: HookConfig = toml::from_str(&content)
        .with_context(|| format!("failed to parse {}", config_path.display()))?;
    Ok(parsed)
}

pub fn flag_enabled(value: Option<String>) -> bool {
    non_blank(value)
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
