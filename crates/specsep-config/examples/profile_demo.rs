//! Profile demo: factory profiles, validation, and option conversion.
//!
//! Run with: cargo run -p specsep-config --example profile_demo

use specsep_config::{Settings, factory_profiles, get_factory_profile, validate_settings};

fn main() {
    println!("=== Factory Profiles ===\n");

    for profile in factory_profiles() {
        let status = if validate_settings(&profile).is_ok() {
            "ok"
        } else {
            "INVALID"
        };
        println!(
            "{:<16} [{}] {}",
            profile.name.as_deref().unwrap_or("?"),
            status,
            profile.description.as_deref().unwrap_or("")
        );
    }

    println!("\n=== Fine Harmonic as library options ===\n");
    if let Some(profile) = get_factory_profile("fine-harmonic") {
        let options = profile.hpss.to_options();
        println!(
            "kernel: {} x {}, power {}, mask {}",
            options.kernel_size.harmonic(),
            options.kernel_size.percussive(),
            options.power,
            options.mask
        );
    }

    println!("\n=== Validation ===\n");
    let mut settings = Settings::new("Broken");
    settings.hpss.kernel_size = 0;
    settings.nn_filter.aggregate = "mode".into();
    match validate_settings(&settings) {
        Ok(()) => println!("valid"),
        Err(e) => println!("{e}"),
    }

    println!("\n=== Default settings TOML ===\n");
    match Settings::default().to_toml() {
        Ok(toml) => println!("{toml}"),
        Err(e) => eprintln!("error: {e}"),
    }
}
