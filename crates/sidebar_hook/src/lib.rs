use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use sidebar_hook_core::codec::{ExternalToolError, select_codec};
use sidebar_hook_core::config::{CONFIG_ENV, DIAGNOSTICS_ENV, HookConfig, flag_enabled, load_config};
use sidebar_hook_core::hooks::{
    CollapseLevelOnly, HookReport, SidebarMutation, WrapSection, run_hook,
};
use sidebar_hook_core::sidebar::DEFAULT_LANG_ID;

const USAGE_EXIT_CODE: u8 = 2;

#[derive(Debug, Parser)]
#[command(
    version,
    about = "Post-merge hook for generated sidebar YAML (rewrites the file in place)"
)]
pub struct Cli {
    #[arg(value_name = "YAML_FILE", help = "Sidebar YAML to rewrite in place")]
    pub yaml_file: Option<PathBuf>,
    #[arg(value_name = "LANG_ID", default_value = DEFAULT_LANG_ID, help = "Language identifier")]
    pub lang_id: String,
    #[arg(value_name = "BASE", help = "Site base path (reserved)")]
    pub base: Option<String>,
    #[arg(hide = true)]
    pub extra: Vec<String>,
    #[arg(long, value_name = "PATH", help = "Hook config TOML")]
    pub config: Option<PathBuf>,
    #[arg(long, help = "Print resolved hook diagnostics to stderr")]
    pub diagnostics: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    WrapSection,
    CollapseLevel,
}

impl HookKind {
    pub fn binary_name(self) -> &'static str {
        match self {
            Self::WrapSection => "sidebar-wrap-section",
            Self::CollapseLevel => "sidebar-collapse-level",
        }
    }

    fn mutation(self, lang_id: &str) -> Box<dyn SidebarMutation> {
        match self {
            Self::WrapSection => Box::new(WrapSection::new(lang_id)),
            Self::CollapseLevel => Box::new(CollapseLevelOnly),
        }
    }
}

pub fn main_for(kind: HookKind) -> ExitCode {
    let cli = Cli::parse();
    ExitCode::from(run_cli(kind, &cli))
}

/// Run one hook invocation and map the result onto a process exit status.
pub fn run_cli(kind: HookKind, cli: &Cli) -> u8 {
    let Some(yaml_file) = cli.yaml_file.as_deref() else {
        eprintln!("Usage: {} <YAML_FILE> <LANG_ID> <BASE>", kind.binary_name());
        return USAGE_EXIT_CODE;
    };

    match execute(kind, cli, yaml_file) {
        Ok(_) => 0,
        Err(error) => report_failure(&error),
    }
}

fn execute(kind: HookKind, cli: &Cli, yaml_file: &Path) -> Result<HookReport> {
    let config = resolve_config(cli)?;
    let cwd = env::current_dir().context("failed to read current directory")?;
    let codec = select_codec(&config, &cwd)?;
    let mutation = kind.mutation(&cli.lang_id);

    let report = run_hook(codec.as_ref(), yaml_file, mutation.as_ref())?;

    if cli.diagnostics || flag_enabled(env::var(DIAGNOSTICS_ENV).ok()) {
        eprintln!("[diagnostics]");
        eprintln!("hook: {}", mutation.name());
        eprintln!("yaml_file: {}", normalize_path(yaml_file));
        eprintln!("lang_id: {}", cli.lang_id);
        eprintln!("base: {}", cli.base.as_deref().unwrap_or("<none>"));
        eprintln!("codec: {}", codec.name());
        eprintln!("outcome: {}", report.outcome.as_str());
        eprintln!("wrote: {}", format_flag(report.wrote));
    }
    Ok(report)
}

fn resolve_config(cli: &Cli) -> Result<HookConfig> {
    let path = cli.config.clone().or_else(|| {
        env::var(CONFIG_ENV)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    });
    match path {
        Some(path) => load_config(&path),
        None => Ok(HookConfig::default()),
    }
}

fn report_failure(error: &anyhow::Error) -> u8 {
    if let Some(failure) = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<ExternalToolError>())
    {
        if let Some(text) = forwarded_stderr(&failure.stderr) {
            eprint!("{text}");
        }
        return tool_exit_code(failure.code);
    }
    eprintln!("error: {error:#}");
    1
}

// Converter output is forwarded as-is, newline-terminated; nothing when it was silent.
fn forwarded_stderr(stderr: &str) -> Option<String> {
    if stderr.is_empty() {
        return None;
    }
    let mut text = stderr.to_string();
    if !text.ends_with('\n') {
        text.push('\n');
    }
    Some(text)
}

fn tool_exit_code(code: i32) -> u8 {
    u8::try_from(code)
        .ok()
        .filter(|code| *code != 0)
        .unwrap_or(1)
}

fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn format_flag(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
