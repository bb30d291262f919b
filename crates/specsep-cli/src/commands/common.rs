//! Shared CLI helpers used across multiple commands.

use clap::Args;
use specsep_config::{Settings, default_settings_path, resolve_profile, validate_settings};
use std::path::PathBuf;

/// Where the base settings come from. Command-line flags override them.
#[derive(Args, Debug, Default)]
pub struct SettingsArgs {
    /// Settings file (TOML)
    #[arg(long, conflicts_with = "profile")]
    pub config: Option<PathBuf>,

    /// Factory or user profile name
    #[arg(long)]
    pub profile: Option<String>,
}

impl SettingsArgs {
    /// Resolve and validate the base settings.
    ///
    /// Searches in this order:
    /// 1. `--config` file
    /// 2. `--profile` (factory profiles, then user profile files)
    /// 3. The user's default settings file, if present
    /// 4. Library defaults
    pub fn load(&self) -> anyhow::Result<Settings> {
        let settings = if let Some(path) = &self.config {
            tracing::debug!(path = %path.display(), "loading settings file");
            Settings::load(path)?
        } else if let Some(name) = &self.profile {
            resolve_profile(name).map_err(|e| {
                anyhow::anyhow!("{e}. Use 'specsep profiles list' to see available profiles.")
            })?
        } else {
            let path = default_settings_path();
            if path.is_file() {
                tracing::debug!(path = %path.display(), "loading default settings");
                Settings::load(&path)?
            } else {
                Settings::default()
            }
        };

        validate_settings(&settings)?;
        Ok(settings)
    }
}

/// Print a matrix summary line.
pub fn report(label: &str, path: &std::path::Path, shape: &[usize]) {
    let dims: Vec<String> = shape.iter().map(ToString::to_string).collect();
    println!("  {:12} {} ({})", label, path.display(), dims.join("x"));
}
