//! Named settings profiles.
//!
//! Factory profiles are embedded TOML and always available. User profiles
//! are TOML files in [`user_profiles_dir`](crate::paths::user_profiles_dir);
//! [`resolve_profile`] checks the factory set first, then files.

use crate::error::ConfigError;
use crate::paths::find_profile;
use crate::settings::Settings;

/// TOML content for factory profiles, keyed by identifier.
static FACTORY_PROFILES_TOML: &[(&str, &str)] = &[
    ("default", DEFAULT_PROFILE),
    ("fine-harmonic", FINE_HARMONIC_PROFILE),
    ("hard-mask", HARD_MASK_PROFILE),
    ("nlm", NLM_PROFILE),
    ("repet-sim", REPET_SIM_PROFILE),
];

/// Library defaults.
const DEFAULT_PROFILE: &str = r#"
name = "Default"
description = "Library defaults for every operation"
"#;

/// Short harmonic window for faster-moving tonal content.
const FINE_HARMONIC_PROFILE: &str = r#"
name = "Fine Harmonic"
description = "13-frame harmonic filter, 31-bin percussive filter"

[hpss]
kernel_harmonic = 13
kernel_percussive = 31
power = 2.0
"#;

/// Binary masks.
const HARD_MASK_PROFILE: &str = r#"
name = "Hard Mask"
description = "Binary harmonic/percussive masks"

[hpss]
kernel_size = 31
mask = true
"#;

/// Non-local means de-noising over affinity-weighted neighbors.
const NLM_PROFILE: &str = r#"
name = "Non-Local Means"
description = "Affinity-weighted average over mutual nearest neighbors"

[nn_filter]
aggregate = "weighted"
metric = "cosine"
mode = "affinity"
sym = true
width = 2
"#;

/// Repeating-pattern extraction via median over similar frames.
const REPET_SIM_PROFILE: &str = r#"
name = "REPET-SIM"
description = "Median of cosine-similar frames for repeating background"

[nn_filter]
aggregate = "median"
metric = "cosine"
mode = "connectivity"
width = 2
"#;

/// All factory profiles.
pub fn factory_profiles() -> Vec<Settings> {
    FACTORY_PROFILES_TOML
        .iter()
        .filter_map(|(_, toml)| Settings::from_toml(toml).ok())
        .collect()
}

/// Factory profile by identifier or display name, case-insensitive.
pub fn get_factory_profile(name: &str) -> Option<Settings> {
    let name_lower = name.to_lowercase();

    for (id, toml) in FACTORY_PROFILES_TOML {
        if id.to_lowercase() == name_lower {
            return Settings::from_toml(toml).ok();
        }
    }

    factory_profiles().into_iter().find(|profile| {
        profile
            .name
            .as_deref()
            .is_some_and(|n| n.to_lowercase() == name_lower)
    })
}

/// Identifiers of all factory profiles.
pub fn factory_profile_names() -> Vec<&'static str> {
    FACTORY_PROFILES_TOML.iter().map(|(name, _)| *name).collect()
}

/// Whether `name` refers to a factory profile.
pub fn is_factory_profile(name: &str) -> bool {
    get_factory_profile(name).is_some()
}

/// Resolve a profile name to settings.
///
/// Factory profiles win; otherwise `name` is looked up as a file path or
/// as a file in the user profiles directory.
pub fn resolve_profile(name: &str) -> Result<Settings, ConfigError> {
    if let Some(profile) = get_factory_profile(name) {
        return Ok(profile);
    }
    match find_profile(name) {
        Some(path) => Settings::load(path),
        None => Err(ConfigError::ProfileNotFound(name.to_string())),
    }
}
