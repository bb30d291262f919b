//! Integration tests for specsep-config.
//!
//! These tests verify end-to-end functionality across modules: files on
//! disk, validation, profiles, and running the library with the resulting
//! options.

use specsep::ndarray::Array2;
use specsep::{decompose, hpss, nn_filter};
use specsep_config::{
    ConfigError, Settings, ValidationError, factory_profiles, get_factory_profile,
    resolve_profile, validate_settings,
};
use tempfile::TempDir;

/// Save then load through the filesystem, creating missing directories.
#[test]
fn test_save_and_load_settings_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("dir").join("settings.toml");

    let mut settings = Settings::new("Roundtrip").with_description("saved to disk");
    settings.hpss.kernel_harmonic = Some(9);
    settings.nn_filter.aggregate = "median".into();
    settings.decompose.n_components = Some(3);
    settings.decompose.sort = true;

    settings.save(&path).expect("should save settings");
    assert!(path.exists());

    let loaded = Settings::load(&path).expect("should load settings");
    assert_eq!(loaded, settings);
}

/// Missing files are reported with their path.
#[test]
fn test_load_missing_file() {
    let err = Settings::load("/nonexistent/specsep/settings.toml").unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
    assert!(err.to_string().contains("/nonexistent/specsep/settings.toml"));
}

/// A profile file given by path resolves like a factory profile.
#[test]
fn test_resolve_profile_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("mine.toml");
    std::fs::write(&path, "name = \"Mine\"\n[hpss]\npower = 1.0\n").unwrap();

    let settings = resolve_profile(path.to_str().unwrap()).unwrap();
    assert_eq!(settings.name.as_deref(), Some("Mine"));
    assert_eq!(settings.hpss.power, 1.0);

    // factory names take precedence over files
    assert_eq!(
        resolve_profile("hard-mask").unwrap().name.as_deref(),
        Some("Hard Mask")
    );
}

/// Validation errors convert into ConfigError for `?` chains.
#[test]
fn test_validation_error_converts() {
    fn load_checked(toml: &str) -> Result<Settings, ConfigError> {
        let settings = Settings::from_toml(toml)?;
        validate_settings(&settings)?;
        Ok(settings)
    }

    let err = load_checked("[nn_filter]\nwidth = 0\nmetric = \"hamming\"\n").unwrap_err();
    let ConfigError::Validation(ValidationError::Multiple(errors)) = err else {
        panic!("expected multiple validation errors, got {err}");
    };
    assert_eq!(errors.len(), 2);
}

/// Every factory profile drives all three operations without error.
#[test]
fn test_factory_profiles_run() {
    let s = Array2::from_shape_fn((12, 16), |(f, t)| ((f * 5 + t * 3) % 7) as f32 + 0.1);

    for profile in factory_profiles() {
        let name = profile.name.clone().unwrap_or_default();

        let (h, p) = hpss(s.view(), &profile.hpss.to_options())
            .unwrap_or_else(|e| panic!("{name}: hpss failed: {e}"));
        assert_eq!(h.dim(), s.dim());
        assert_eq!(p.dim(), s.dim());

        let aggregate = profile.nn_filter.aggregate().unwrap();
        let builder = profile.nn_filter.builder().unwrap();
        let filtered = nn_filter(s.view(), None, &aggregate, profile.nn_filter.axis, &builder)
            .unwrap_or_else(|e| panic!("{name}: nn_filter failed: {e}"));
        assert!(filtered.iter().all(|v| v.is_finite()));

        let mut options = profile.decompose.to_options();
        options.n_components = Some(2);
        options.nmf.max_iter = 20;
        let d = decompose(s.view(), None, &options)
            .unwrap_or_else(|e| panic!("{name}: decompose failed: {e}"));
        assert_eq!(d.components.dim(), (12, 2));
    }
}

/// Hard-mask profile yields binary masks.
#[test]
fn test_hard_mask_profile_output() {
    let profile = get_factory_profile("hard-mask").unwrap();
    let s = Array2::from_shape_fn((8, 8), |(f, t)| (f + t) as f32);
    let (mh, mp) = hpss(s.view(), &profile.hpss.to_options()).unwrap();
    for (a, b) in mh.iter().zip(mp.iter()) {
        assert!(*a == 0.0 || *a == 1.0);
        assert_eq!(a + b, 1.0);
    }
}
