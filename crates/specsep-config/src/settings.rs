//! Settings file format and conversion into library options.

use serde::{Deserialize, Serialize};
use std::path::Path;

use specsep::{
    Aggregate, DecomposeOptions, HpssOptions, Metric, NmfOptions, RecurrenceBuilder,
    RecurrenceMode,
};

use crate::error::ConfigError;

/// Settings for all three operations.
///
/// Every section and every field is optional in the file; anything left
/// out takes the library default.
///
/// # TOML Format
///
/// ```toml
/// name = "Drums"
/// description = "Tight percussive split"
///
/// [hpss]
/// kernel_size = 31
/// kernel_harmonic = 17
/// power = 2.0
/// mask = false
///
/// [nn_filter]
/// aggregate = "median"
/// axis = -1
/// k = 10
/// width = 3
/// metric = "cosine"
/// mode = "connectivity"
/// sym = false
///
/// [decompose]
/// n_components = 8
/// sort = true
/// max_iter = 200
/// tol = 1e-4
/// seed = 0
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Display name, used by profiles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Optional description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Harmonic/percussive separation.
    pub hpss: HpssSettings,

    /// Nearest-neighbor filtering.
    pub nn_filter: NnFilterSettings,

    /// Matrix factorization.
    pub decompose: DecomposeSettings,
}

impl Settings {
    /// Settings with a display name and library defaults.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load settings from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the settings to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the settings to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// `[hpss]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HpssSettings {
    /// Window length for both median filters.
    pub kernel_size: usize,
    /// Overrides `kernel_size` for the time-axis (harmonic) filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kernel_harmonic: Option<usize>,
    /// Overrides `kernel_size` for the frequency-axis (percussive) filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kernel_percussive: Option<usize>,
    /// Soft mask exponent.
    pub power: f32,
    /// Output binary masks instead of components.
    pub mask: bool,
}

impl Default for HpssSettings {
    fn default() -> Self {
        let defaults = HpssOptions::default();
        Self {
            kernel_size: defaults.kernel_size.harmonic(),
            kernel_harmonic: None,
            kernel_percussive: None,
            power: defaults.power,
            mask: defaults.mask,
        }
    }
}

impl HpssSettings {
    /// Library options for [`specsep::hpss`].
    pub fn to_options(&self) -> HpssOptions {
        let options = HpssOptions::default()
            .with_power(self.power)
            .with_mask(self.mask);
        match (self.kernel_harmonic, self.kernel_percussive) {
            (None, None) => options.with_kernel_size(self.kernel_size),
            (h, p) => options.with_kernel_sizes(
                h.unwrap_or(self.kernel_size),
                p.unwrap_or(self.kernel_size),
            ),
        }
    }
}

/// `[nn_filter]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NnFilterSettings {
    /// Reducer name: `mean`, `median`, `max`, `min` or `weighted`.
    pub aggregate: String,
    /// Axis whose slices are filtered; negative counts from the end.
    pub axis: isize,
    /// Neighbors per point; automatic when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k: Option<usize>,
    /// Exclusion band around each point.
    pub width: usize,
    /// Distance metric name.
    pub metric: String,
    /// `connectivity`, `distance` or `affinity`.
    pub mode: String,
    /// Keep only mutual links.
    pub sym: bool,
    /// Affinity bandwidth; automatic when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bandwidth: Option<f32>,
}

impl Default for NnFilterSettings {
    fn default() -> Self {
        let builder = RecurrenceBuilder::default();
        Self {
            aggregate: Aggregate::default().name().to_string(),
            axis: -1,
            k: builder.k,
            width: builder.width,
            metric: "euclidean".to_string(),
            mode: "connectivity".to_string(),
            sym: builder.sym,
            bandwidth: builder.bandwidth,
        }
    }
}

impl NnFilterSettings {
    /// Parsed reducer.
    pub fn aggregate(&self) -> Result<Aggregate, ConfigError> {
        self.aggregate
            .parse()
            .map_err(|e| ConfigError::invalid("nn_filter", "aggregate", e))
    }

    /// Graph builder configured from this section.
    pub fn builder(&self) -> Result<RecurrenceBuilder, ConfigError> {
        let metric: Metric = self
            .metric
            .parse()
            .map_err(|e| ConfigError::invalid("nn_filter", "metric", e))?;
        let mode: RecurrenceMode = self
            .mode
            .parse()
            .map_err(|e| ConfigError::invalid("nn_filter", "mode", e))?;

        Ok(RecurrenceBuilder {
            k: self.k,
            width: self.width,
            metric,
            sym: self.sym,
            mode,
            bandwidth: self.bandwidth,
        })
    }
}

/// `[decompose]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DecomposeSettings {
    /// Number of components; defaults to the number of features.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_components: Option<usize>,
    /// Sort components by spectral peak.
    pub sort: bool,
    /// NMF iteration cap.
    pub max_iter: usize,
    /// NMF convergence tolerance.
    pub tol: f32,
    /// NMF initialization seed.
    pub seed: u64,
}

impl Default for DecomposeSettings {
    fn default() -> Self {
        let nmf = NmfOptions::default();
        Self {
            n_components: None,
            sort: false,
            max_iter: nmf.max_iter,
            tol: nmf.tol,
            seed: nmf.seed,
        }
    }
}

impl DecomposeSettings {
    /// Library options for [`specsep::decompose`].
    pub fn to_options(&self) -> DecomposeOptions {
        DecomposeOptions {
            n_components: self.n_components,
            sort: self.sort,
            fit: true,
            nmf: NmfOptions {
                max_iter: self.max_iter,
                tol: self.tol,
                seed: self.seed,
            },
        }
    }
}
