//! Loading and saving site documents.
//!
//! The in-process codec handles YAML directly. The `yq` codec shells out to the
//! converter and exchanges JSON with it, for setups that pin formatting to yq.

use std::env;
use std::ffi::OsStr;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use anyhow::{Context, Result, bail};
use thiserror::Error;

use crate::config::{CodecBackend, HookConfig, YQ_PATH_ENV};
use crate::document::{Document, from_json, parse_yaml, render_json, render_yaml};

/// The external converter exited unsuccessfully. `code` is surfaced as the process exit code.
#[derive(Debug, Error)]
#[error("{tool} exited with status {code}")]
pub struct ExternalToolError {
    pub tool: String,
    pub code: i32,
    pub stderr: String,
}

pub trait DocumentCodec {
    fn name(&self) -> &'static str;
    fn load(&self, path: &Path) -> Result<Document>;
    fn save(&self, path: &Path, document: &Document) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NativeYamlCodec;

impl DocumentCodec for NativeYamlCodec {
    fn name(&self) -> &'static str {
        "native"
    }

    fn load(&self, path: &Path) -> Result<Document> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        parse_yaml(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    fn save(&self, path: &Path, document: &Document) -> Result<()> {
        let rendered = render_yaml(document)?;
        fs::write(path, rendered).with_context(|| format!("failed to write {}", path.display()))
    }
}

#[derive(Debug, Clone)]
pub struct YqCodec {
    binary: PathBuf,
}

impl YqCodec {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn run(&self, args: &[&OsStr]) -> Result<Output> {
        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .with_context(|| format!("failed to execute {}", self.binary.display()))?;
        if !output.status.success() {
            return Err(ExternalToolError {
                tool: self.binary.display().to_string(),
                code: output.status.code().unwrap_or(1),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            }
            .into());
        }
        Ok(output)
    }
}

impl DocumentCodec for YqCodec {
    fn name(&self) -> &'static str {
        "yq"
    }

    fn load(&self, path: &Path) -> Result<Document> {
        let output = self.run(&[OsStr::new("-o=json"), path.as_os_str()])?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            return from_json(serde_json::Value::Null);
        }
        let json: serde_json::Value = serde_json::from_str(&stdout)
            .with_context(|| format!("failed to parse converter output for {}", path.display()))?;
        from_json(json)
    }

    fn save(&self, path: &Path, document: &Document) -> Result<()> {
        let rendered = render_json(document)?;
        let dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        // Removed on drop, on the error paths too.
        let mut scratch = tempfile::Builder::new()
            .prefix(".sidebar-hook-")
            .suffix(".json")
            .tempfile_in(dir)
            .with_context(|| format!("failed to create scratch file in {}", dir.display()))?;
        scratch
            .write_all(rendered.as_bytes())
            .with_context(|| format!("failed to write {}", scratch.path().display()))?;
        scratch
            .flush()
            .with_context(|| format!("failed to flush {}", scratch.path().display()))?;

        let output = self.run(&[OsStr::new("-P"), scratch.path().as_os_str()])?;
        fs::write(path, &output.stdout)
            .with_context(|| format!("failed to write {}", path.display()))
    }
}

/// Pick the codec once at startup from config, env and the converters on disk.
pub fn select_codec(config: &HookConfig, cwd: &Path) -> Result<Box<dyn DocumentCodec>> {
    select_codec_with_lookup(config, cwd, |key| env::var(key).ok())
}

pub fn select_codec_with_lookup<F>(
    config: &HookConfig,
    cwd: &Path,
    lookup: F,
) -> Result<Box<dyn DocumentCodec>>
where
    F: Fn(&str) -> Option<String>,
{
    match config.backend_with_lookup(&lookup)? {
        CodecBackend::Auto | CodecBackend::Native => Ok(Box::new(NativeYamlCodec)),
        CodecBackend::Yq => {
            let explicit = config.yq_path_with_lookup(&lookup);
            let Some(binary) = find_yq_path(explicit.as_deref(), cwd, lookup("PATH")) else {
                bail!("yq converter requested but not found (set {YQ_PATH_ENV} or put yq on PATH)");
            };
            Ok(Box::new(YqCodec::new(binary)))
        }
    }
}

pub fn find_yq_path(
    explicit: Option<&Path>,
    cwd: &Path,
    path_var: Option<String>,
) -> Option<PathBuf> {
    if let Some(explicit) = explicit.filter(|path| path.exists()) {
        return Some(explicit.to_path_buf());
    }

    let binary_name = if cfg!(windows) { "yq.exe" } else { "yq" };
    let local_tools = cwd.join("tools").join(binary_name);
    if local_tools.exists() {
        return Some(local_tools);
    }

    let path_var = path_var?;
    let separator = if cfg!(windows) { ';' } else { ':' };
    for part in path_var.split(separator) {
        let candidate_dir = PathBuf::from(part.trim().trim_matches('"'));
        if candidate_dir.as_os_str().is_empty() {
            continue;
        }
        let candidate = candidate_dir.join(binary_name);
        if candidate.exists() {
            return Some(candidate);
        }
    }
    None
}
