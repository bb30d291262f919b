//! Configuration and profile management for specsep.
//!
//! Settings for the three specsep operations live in one TOML document,
//! one section per operation. Files can be loaded, validated, saved, and
//! turned into the library's option types.
//!
//! # Features
//!
//! - **Settings**: `[hpss]`, `[nn_filter]` and `[decompose]` sections, all optional
//! - **Validation**: every problem in a file reported at once
//! - **Profiles**: built-in named settings plus user profile files
//! - **Paths**: platform-specific config and profile directories
//!
//! # Example
//!
//! ```rust,no_run
//! use specsep_config::{Settings, get_factory_profile, validate_settings};
//!
//! let settings = Settings::load("settings.toml").unwrap();
//! validate_settings(&settings).unwrap();
//! let options = settings.hpss.to_options();
//!
//! let nlm = get_factory_profile("nlm").unwrap();
//! let builder = nlm.nn_filter.builder().unwrap();
//! ```

mod error;
mod settings;

/// Platform-specific paths for profiles and configuration.
pub mod paths;

/// Settings validation.
pub mod validation;

/// Built-in and user profiles.
pub mod profiles;

pub use error::ConfigError;
pub use paths::{
    default_settings_path, ensure_user_profiles_dir, find_profile, list_profiles_in_dir,
    list_user_profiles, profile_name_from_path, user_config_dir, user_profiles_dir,
};
pub use profiles::{
    factory_profile_names, factory_profiles, get_factory_profile, is_factory_profile,
    resolve_profile,
};
pub use settings::{DecomposeSettings, HpssSettings, NnFilterSettings, Settings};
pub use validation::{
    ValidationError, ValidationResult, validate_decompose, validate_hpss, validate_nn_filter,
    validate_settings,
};
