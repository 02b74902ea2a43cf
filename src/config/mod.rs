use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

pub mod validator;

use crate::cli::Cli;
use crate::domain::{GenerationOptions, DEFAULT_MAX_DEPTH};

/// Config file read when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "proteus.toml";

/// Prefix of environment overrides, e.g. `PROTEUS__GENERATION__SEED=7`.
pub const ENV_PREFIX: &str = "PROTEUS";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub generation: GenerationSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

/// `[generation]` section; mirrors [`GenerationOptions`].
///
/// Overrides and array lengths are lists of entries rather than tables so
/// that their paths survive the config layer untouched.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationSettings {
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub bypass_examples: bool,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default)]
    pub overrides: Vec<OverrideEntry>,
    #[serde(default)]
    pub array_lengths: Vec<ArrayLengthEntry>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            seed: None,
            bypass_examples: false,
            max_depth: DEFAULT_MAX_DEPTH,
            overrides: Vec::new(),
            array_lengths: Vec::new(),
        }
    }
}

/// `[[generation.overrides]]`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OverrideEntry {
    pub path: String,
    pub value: Value,
}

/// `[[generation.array_lengths]]`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ArrayLengthEntry {
    pub path: String,
    pub min: usize,
    pub max: usize,
}

/// `[output]` section
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputSettings {
    /// Pretty-print the generated JSON
    #[serde(default)]
    pub pretty: bool,
    /// Number of values to generate
    #[serde(default = "default_count")]
    pub count: usize,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            pretty: false,
            count: default_count(),
        }
    }
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_count() -> usize {
    1
}

impl Settings {
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::from_path(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Settings from a config file (optional) and the environment.
    pub fn from_path(config_path: &Path) -> Result<Self, anyhow::Error> {
        let settings = Self::load(config_path)?;
        settings.validated()
    }

    /// Create settings from CLI arguments (config file, environment, then CLI)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let mut settings = Self::load(&cli.config)?;

        // CLI > env vars > config file
        settings.apply_cli_overrides(cli);

        settings.validated()
    }

    fn load(config_path: &Path) -> Result<Self, anyhow::Error> {
        let s = Config::builder()
            .add_source(File::from(config_path.to_path_buf()).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("generation.max_depth", DEFAULT_MAX_DEPTH as i64)?
            .set_default("output.count", default_count() as i64)?
            .set_default("output.pretty", false)?
            .build()?;

        let settings: Settings = s.try_deserialize()?;
        tracing::debug!(path = %config_path.display(), "Loaded settings");
        Ok(settings)
    }

    fn validated(self) -> Result<Self, anyhow::Error> {
        validator::ConfigValidator::validate(&self).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!(
                "Configuration validation failed:\n{}",
                error_messages.join("\n")
            )
        })?;
        Ok(self)
    }

    /// Apply CLI argument overrides to settings
    fn apply_cli_overrides(&mut self, cli: &Cli) {
        let generation = &mut self.generation;
        if let Some(seed) = cli.seed {
            generation.seed = Some(seed);
        }
        if let Some(max_depth) = cli.max_depth {
            generation.max_depth = max_depth;
        }
        if let Some(bypass) = cli.bypass_examples {
            generation.bypass_examples = bypass;
        }

        // Later entries for the same path win when the options are built
        generation
            .overrides
            .extend(cli.overrides.iter().map(|(path, value)| OverrideEntry {
                path: path.clone(),
                value: value.clone(),
            }));
        generation
            .array_lengths
            .extend(cli.array_lengths.iter().map(|(path, (min, max))| ArrayLengthEntry {
                path: path.clone(),
                min: *min,
                max: *max,
            }));

        if let Some(count) = cli.count {
            self.output.count = count;
        }
        if let Some(pretty) = cli.pretty {
            self.output.pretty = pretty;
        }
    }

    /// Engine options described by the `[generation]` section.
    pub fn generation_options(&self) -> GenerationOptions {
        let generation = &self.generation;
        GenerationOptions {
            seed: generation.seed,
            bypass_examples: generation.bypass_examples,
            overrides: generation
                .overrides
                .iter()
                .map(|entry| (entry.path.clone(), entry.value.clone()))
                .collect(),
            array_lengths: generation
                .array_lengths
                .iter()
                .map(|entry| (entry.path.clone(), (entry.min, entry.max)))
                .collect(),
            max_depth: generation.max_depth,
        }
    }
}
