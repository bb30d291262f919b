//! Profile listing commands.

use clap::{Args, Subcommand};
use specsep_config::{
    factory_profile_names, get_factory_profile, list_user_profiles, profile_name_from_path,
    resolve_profile, user_profiles_dir,
};

#[derive(Args)]
pub struct ProfilesArgs {
    #[command(subcommand)]
    command: Option<ProfilesCommand>,
}

#[derive(Subcommand)]
enum ProfilesCommand {
    /// List available profiles (factory and user)
    List {
        /// Show only factory profiles
        #[arg(long)]
        factory: bool,

        /// Show only user profiles
        #[arg(long)]
        user: bool,
    },

    /// Show the settings of a profile
    Show {
        /// Profile name or path
        name: String,
    },
}

pub fn run(args: ProfilesArgs) -> anyhow::Result<()> {
    match args.command.unwrap_or(ProfilesCommand::List {
        factory: false,
        user: false,
    }) {
        ProfilesCommand::List { factory, user } => {
            list(!user || factory, !factory || user);
            Ok(())
        }
        ProfilesCommand::Show { name } => {
            let settings = resolve_profile(&name)?;
            if let Some(display) = &settings.name {
                println!("# {display}");
            }
            if let Some(description) = &settings.description {
                println!("# {description}");
            }
            print!("{}", settings.to_toml()?);
            Ok(())
        }
    }
}

fn list(show_factory: bool, show_user: bool) {
    if show_factory {
        println!("Factory profiles:");
        for id in factory_profile_names() {
            let description = get_factory_profile(id)
                .and_then(|p| p.description)
                .unwrap_or_default();
            println!("  {id:20} - {description}");
        }
        println!();
    }

    if show_user {
        println!("User profiles ({}):", user_profiles_dir().display());
        let user_profiles = list_user_profiles();
        if user_profiles.is_empty() {
            println!("  (none)");
        }
        for path in user_profiles {
            if let Some(name) = profile_name_from_path(&path) {
                println!("  {name}");
            }
        }
    }
}
