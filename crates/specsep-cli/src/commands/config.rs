//! Settings file commands.

use clap::{Args, Subcommand};
use specsep_config::{
    Settings, default_settings_path, resolve_profile, user_config_dir, user_profiles_dir,
    validate_settings,
};
use std::path::{Path, PathBuf};

use super::common::SettingsArgs;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective settings as TOML
    Show {
        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Check a settings file and report every problem
    Validate {
        /// Settings file (TOML)
        file: PathBuf,
    },

    /// Write settings to a file (defaults to the user's settings file)
    Write {
        /// Destination (defaults to the user's settings file)
        output: Option<PathBuf>,

        /// Start from this profile instead of the defaults
        #[arg(long)]
        profile: Option<String>,

        /// Overwrite if the file already exists
        #[arg(long)]
        force: bool,
    },

    /// Show configuration directories
    Paths,
}

pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show { settings } => {
            let settings = settings.load()?;
            print!("{}", settings.to_toml()?);
            Ok(())
        }
        ConfigCommand::Validate { file } => validate(&file),
        ConfigCommand::Write {
            output,
            profile,
            force,
        } => write(output, profile, force),
        ConfigCommand::Paths => {
            println!("Configuration paths:");
            println!();
            println!("  Config dir:    {}", user_config_dir().display());
            println!("  Settings file: {}", default_settings_path().display());
            println!("  Profiles dir:  {}", user_profiles_dir().display());
            Ok(())
        }
    }
}

fn validate(file: &Path) -> anyhow::Result<()> {
    let settings = Settings::load(file)?;
    match validate_settings(&settings) {
        Ok(()) => {
            println!("{}: OK", file.display());
            Ok(())
        }
        Err(e) => anyhow::bail!("{}: {}", file.display(), e),
    }
}

fn write(output: Option<PathBuf>, profile: Option<String>, force: bool) -> anyhow::Result<()> {
    let path = output.unwrap_or_else(default_settings_path);
    if path.exists() && !force {
        anyhow::bail!(
            "'{}' already exists. Use --force to overwrite.",
            path.display()
        );
    }

    let settings = match profile {
        Some(name) => resolve_profile(&name)?,
        None => Settings::default(),
    };

    settings.save(&path)?;
    println!("Wrote settings to {}", path.display());
    Ok(())
}
