//! TOML Configuration File Support
//!
//! Loads the pet's configuration from `~/.config/codepet/codepet.toml`.
//!
//! # Configuration Priority
//!
//! Values are loaded with the following priority (highest first):
//! 1. CLI arguments ([`ConfigOverrides`])
//! 2. Environment variables (`CODEPET_*`)
//! 3. TOML configuration file
//! 4. Default values
//!
//! The raw file also stays available as [`Settings`] for dotted-path lookups
//! of keys the typed sections do not cover.
//!
//! # Example Configuration
//!
//! ```toml
//! [pet]
//! name = "Pipi"
//! species = "cat"
//! personality = "cheerful"
//! energy = 100
//! happiness = 60
//!
//! [activity]
//! sample_interval_ms = 1000
//! idle_threshold_secs = 300
//! programming_apps = ["code.exe", "idea64.exe"]
//!
//! [behavior]
//! tick_interval_ms = 200
//! vitals_interval_secs = 10
//! encourage_probability = 0.3
//!
//! [behavior.durations]
//! rest_secs = 10
//!
//! [animation]
//! assets_dir = "/usr/share/codepet/assets"
//! default_interval_ms = 100
//! ```

mod settings;

pub use settings::Settings;

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::activity::ActivitySettings;
use crate::animation::AnimationSettings;
use crate::controller::{ActionDurations, BehaviorSettings};
use crate::pet::{Action, Mood, PetModel, PetRecord};

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    #[default]
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// `[pet]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PetToml {
    /// Display name
    pub name: Option<String>,
    /// Species; also the animation character
    pub species: Option<String>,
    /// Personality key for speech lines
    pub personality: Option<String>,
    /// Starting energy
    pub energy: Option<f32>,
    /// Starting happiness
    pub happiness: Option<f32>,
    /// Starting mood name
    pub mood: Option<String>,
    /// Starting action name
    pub action: Option<String>,
}

/// `[activity]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityToml {
    /// Window poll cadence in milliseconds
    pub sample_interval_ms: Option<u64>,
    /// Idle seconds before a session closes
    pub idle_threshold_secs: Option<f64>,
    /// Programming process names
    pub programming_apps: Option<Vec<String>>,
    /// Browser process names
    pub browsers: Option<Vec<String>>,
    /// Programming site keywords
    pub programming_sites: Option<Vec<String>>,
}

/// `[behavior.durations]` section, all in seconds
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DurationsToml {
    /// Encouragement pulse
    pub encourage_secs: Option<f64>,
    /// Tired slump after a long session
    pub tired_secs: Option<f64>,
    /// Happy bounce after a medium session
    pub happy_secs: Option<f64>,
    /// Rest after a short idle
    pub rest_secs: Option<f64>,
    /// Play when going idle
    pub play_secs: Option<f64>,
    /// Click reaction
    pub react_secs: Option<f64>,
    /// Eating after a feed
    pub eat_secs: Option<f64>,
    /// Response to petting
    pub pet_secs: Option<f64>,
    /// Achievement celebration
    pub achievement_secs: Option<f64>,
    /// Goal celebration
    pub goal_secs: Option<f64>,
    /// Keypress milestone reaction
    pub keypress_reaction_secs: Option<f64>,
    /// Low-energy alert
    pub alert_secs: Option<f64>,
}

/// `[behavior]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorToml {
    /// Expiry check cadence in milliseconds
    pub tick_interval_ms: Option<u64>,
    /// Vitals cadence in seconds
    pub vitals_interval_secs: Option<f64>,

    /// Energy above which a working pet is happy
    pub high_energy_threshold: Option<f32>,
    /// Energy below which a working pet is tired
    pub low_energy_threshold: Option<f32>,
    /// Energy below which a working pet alerts
    pub alert_energy_threshold: Option<f32>,
    /// Energy below which vitals turn the mood Tired
    pub tired_mood_threshold: Option<f32>,
    /// Happiness below which vitals turn the mood Sad
    pub sad_mood_threshold: Option<f32>,
    /// Vitals above which the mood turns cheerful
    pub cheerful_threshold: Option<f32>,
    /// Happiness needed to play when going idle
    pub playful_threshold: Option<f32>,

    /// Sessions longer than this end tired
    pub long_session_secs: Option<f64>,
    /// Sessions longer than this end happy
    pub medium_session_secs: Option<f64>,
    /// Idle longer than this puts the pet to sleep
    pub deep_idle_secs: Option<f64>,

    /// Energy lost per vitals tick while working
    pub energy_decay_working: Option<f32>,
    /// Energy regained per vitals tick while idle
    pub energy_regen_idle: Option<f32>,
    /// Energy regained per vitals tick while sleeping
    pub energy_regen_sleeping: Option<f32>,
    /// Happiness lost per vitals tick while working
    pub happiness_decay_working: Option<f32>,
    /// Happiness lost per vitals tick while idle and bored
    pub happiness_decay_bored: Option<f32>,
    /// Happiness regained per vitals tick while playful
    pub happiness_regen_playful: Option<f32>,
    /// Happiness regained per vitals tick while sleeping
    pub happiness_regen_sleeping: Option<f32>,

    /// Chance of an encouragement pulse
    pub encourage_probability: Option<f64>,
    /// Presses between keypress reaction chances
    pub keypress_reaction_interval: Option<u64>,
    /// Chance of a keypress reaction
    pub keypress_reaction_probability: Option<f64>,

    /// Happiness from a click
    pub click_happiness_gain: Option<f32>,
    /// Energy from a feed
    pub feed_energy_gain: Option<f32>,
    /// Happiness from a feed
    pub feed_happiness_gain: Option<f32>,
    /// Energy from petting
    pub pet_energy_gain: Option<f32>,
    /// Happiness from petting
    pub pet_happiness_gain: Option<f32>,

    /// Timed action lengths
    pub durations: DurationsToml,
}

/// `[animation]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationToml {
    /// Root of the per-character frame trees
    pub assets_dir: Option<PathBuf>,
    /// Frame interval for actions without `speed_ms`
    pub default_interval_ms: Option<u64>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CodepetToml {
    /// Pet identity and starting values
    pub pet: PetToml,
    /// Activity detection
    pub activity: ActivityToml,
    /// Behavior tunables
    pub behavior: BehaviorToml,
    /// Animation assets
    pub animation: AnimationToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Who the pet is and how it starts
#[derive(Clone, Debug, PartialEq)]
pub struct PetSettings {
    /// Display name
    pub name: String,
    /// Species; also the animation character
    pub species: String,
    /// Personality key for speech lines
    pub personality: String,
    /// Starting energy
    pub initial_energy: f32,
    /// Starting happiness
    pub initial_happiness: f32,
    /// Starting mood name
    pub initial_mood: String,
    /// Starting action name
    pub initial_action: String,
}

impl Default for PetSettings {
    fn default() -> Self {
        let record = PetRecord::default();
        Self {
            name: record.name,
            species: record.species,
            personality: record.personality,
            initial_energy: record.energy,
            initial_happiness: record.happiness,
            initial_mood: Mood::Normal.as_str().to_string(),
            initial_action: Action::Idle.as_str().to_string(),
        }
    }
}

impl PetSettings {
    /// Build the starting model
    ///
    /// Mood and action names are coerced; [`PetConfig::validate`] rejects
    /// unknown ones beforehand.
    #[must_use]
    pub fn build_model(&self) -> PetModel {
        PetModel::new(&self.name, &self.species, &self.personality)
            .with_vitals(self.initial_energy, self.initial_happiness)
            .with_appearance(
                Mood::parse_or_default(&self.initial_mood),
                Action::parse_or_default(&self.initial_action),
            )
    }
}

/// Centralized configuration for the pet engine
///
/// Use [`load_config`] to load configuration with proper priority handling.
#[derive(Clone, Debug, Default)]
pub struct PetConfig {
    /// Pet identity and starting values
    pub pet: PetSettings,
    /// Activity detection
    pub activity: ActivitySettings,
    /// Behavior tunables
    pub behavior: BehaviorSettings,
    /// Animation assets
    pub animation: AnimationSettings,
    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    settings: Settings,
    source: ConfigSource,
}

impl PetConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Raw file contents for dotted-path lookups
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Check value ranges and names
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] listing every problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        let intervals = [
            ("activity.sample_interval_ms", self.activity.sample_interval),
            ("behavior.tick_interval_ms", self.behavior.tick_interval),
            ("behavior.vitals_interval_secs", self.behavior.vitals_interval),
            ("animation.default_interval_ms", self.animation.default_interval),
        ];
        for (key, interval) in intervals {
            if interval.is_zero() {
                problems.push(format!("{key} must be positive"));
            }
        }
        if !(self.activity.idle_threshold_secs > 0.0) {
            problems.push("activity.idle_threshold_secs must be positive".to_string());
        }
        if self.behavior.keypress_reaction_interval == 0 {
            problems.push("behavior.keypress_reaction_interval must be positive".to_string());
        }

        let probabilities = [
            ("behavior.encourage_probability", self.behavior.encourage_probability),
            (
                "behavior.keypress_reaction_probability",
                self.behavior.keypress_reaction_probability,
            ),
        ];
        for (key, p) in probabilities {
            if !(0.0..=1.0).contains(&p) {
                problems.push(format!("{key} must be within [0, 1], got {p}"));
            }
        }

        let b = &self.behavior;
        let thresholds = [
            ("pet.energy", self.pet.initial_energy),
            ("pet.happiness", self.pet.initial_happiness),
            ("behavior.high_energy_threshold", b.high_energy_threshold),
            ("behavior.low_energy_threshold", b.low_energy_threshold),
            ("behavior.alert_energy_threshold", b.alert_energy_threshold),
            ("behavior.tired_mood_threshold", b.tired_mood_threshold),
            ("behavior.sad_mood_threshold", b.sad_mood_threshold),
            ("behavior.cheerful_threshold", b.cheerful_threshold),
            ("behavior.playful_threshold", b.playful_threshold),
        ];
        for (key, value) in thresholds {
            if !(0.0..=100.0).contains(&value) {
                problems.push(format!("{key} must be within [0, 100], got {value}"));
            }
        }

        if let Err(e) = self.pet.initial_mood.parse::<Mood>() {
            problems.push(format!("pet.mood: {e}"));
        }
        if let Err(e) = self.pet.initial_action.parse::<Action>() {
            problems.push(format!("pet.action: {e}"));
        }
        if self.pet.species.trim().is_empty() {
            problems.push("pet.species must not be empty".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::ValidationError(problems.join("; ")))
        }
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/codepet/codepet.toml` or the platform
/// equivalent.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("codepet").join("codepet.toml"))
}

/// Load configuration from all sources with proper priority
///
/// CLI overrides are not handled here; apply [`ConfigOverrides`] after.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed.
/// A missing config file is not an error (defaults are used).
pub fn load_config() -> Result<PetConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path and the process environment
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<PetConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration from a specific path and an environment lookup
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_with_env<F>(path: Option<PathBuf>, env: F) -> Result<PetConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = PetConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: CodepetToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.settings = Settings::parse(&toml_content)?;
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env);

    Ok(config)
}

fn secs(value: f64, key: &str) -> Option<Duration> {
    match Duration::try_from_secs_f64(value) {
        Ok(duration) => Some(duration),
        Err(_) => {
            tracing::warn!(key, value, "Invalid duration in config, keeping default");
            None
        }
    }
}

fn set<T: Copy>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

fn set_secs(target: &mut Duration, value: Option<f64>, key: &str) {
    if let Some(duration) = value.and_then(|v| secs(v, key)) {
        *target = duration;
    }
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut PetConfig, toml: &CodepetToml) {
    // Pet
    let pet = &toml.pet;
    if let Some(ref name) = pet.name {
        config.pet.name.clone_from(name);
    }
    if let Some(ref species) = pet.species {
        config.pet.species.clone_from(species);
    }
    if let Some(ref personality) = pet.personality {
        config.pet.personality.clone_from(personality);
    }
    set(&mut config.pet.initial_energy, pet.energy);
    set(&mut config.pet.initial_happiness, pet.happiness);
    if let Some(ref mood) = pet.mood {
        config.pet.initial_mood.clone_from(mood);
    }
    if let Some(ref action) = pet.action {
        config.pet.initial_action.clone_from(action);
    }

    // Activity
    let activity = &toml.activity;
    if let Some(ms) = activity.sample_interval_ms {
        config.activity.sample_interval = Duration::from_millis(ms);
    }
    set(&mut config.activity.idle_threshold_secs, activity.idle_threshold_secs);
    if let Some(ref apps) = activity.programming_apps {
        config.activity.programming_apps.clone_from(apps);
    }
    if let Some(ref browsers) = activity.browsers {
        config.activity.browsers.clone_from(browsers);
    }
    if let Some(ref sites) = activity.programming_sites {
        config.activity.programming_sites.clone_from(sites);
    }

    // Behavior
    let t = &toml.behavior;
    let b = &mut config.behavior;
    if let Some(ms) = t.tick_interval_ms {
        b.tick_interval = Duration::from_millis(ms);
    }
    set_secs(&mut b.vitals_interval, t.vitals_interval_secs, "behavior.vitals_interval_secs");
    set(&mut b.high_energy_threshold, t.high_energy_threshold);
    set(&mut b.low_energy_threshold, t.low_energy_threshold);
    set(&mut b.alert_energy_threshold, t.alert_energy_threshold);
    set(&mut b.tired_mood_threshold, t.tired_mood_threshold);
    set(&mut b.sad_mood_threshold, t.sad_mood_threshold);
    set(&mut b.cheerful_threshold, t.cheerful_threshold);
    set(&mut b.playful_threshold, t.playful_threshold);
    set(&mut b.long_session_secs, t.long_session_secs);
    set(&mut b.medium_session_secs, t.medium_session_secs);
    set(&mut b.deep_idle_secs, t.deep_idle_secs);
    set(&mut b.energy_decay_working, t.energy_decay_working);
    set(&mut b.energy_regen_idle, t.energy_regen_idle);
    set(&mut b.energy_regen_sleeping, t.energy_regen_sleeping);
    set(&mut b.happiness_decay_working, t.happiness_decay_working);
    set(&mut b.happiness_decay_bored, t.happiness_decay_bored);
    set(&mut b.happiness_regen_playful, t.happiness_regen_playful);
    set(&mut b.happiness_regen_sleeping, t.happiness_regen_sleeping);
    set(&mut b.encourage_probability, t.encourage_probability);
    set(&mut b.keypress_reaction_interval, t.keypress_reaction_interval);
    set(&mut b.keypress_reaction_probability, t.keypress_reaction_probability);
    set(&mut b.click_happiness_gain, t.click_happiness_gain);
    set(&mut b.feed_energy_gain, t.feed_energy_gain);
    set(&mut b.feed_happiness_gain, t.feed_happiness_gain);
    set(&mut b.pet_energy_gain, t.pet_energy_gain);
    set(&mut b.pet_happiness_gain, t.pet_happiness_gain);
    apply_durations(&mut b.durations, &t.durations);

    // Animation
    if let Some(ref dir) = toml.animation.assets_dir {
        config.animation.assets_dir = Some(dir.clone());
    }
    if let Some(ms) = toml.animation.default_interval_ms {
        config.animation.default_interval = Duration::from_millis(ms);
    }
}

fn apply_durations(d: &mut ActionDurations, t: &DurationsToml) {
    let key = "behavior.durations";
    set_secs(&mut d.encourage, t.encourage_secs, key);
    set_secs(&mut d.tired, t.tired_secs, key);
    set_secs(&mut d.happy, t.happy_secs, key);
    set_secs(&mut d.rest, t.rest_secs, key);
    set_secs(&mut d.play, t.play_secs, key);
    set_secs(&mut d.react, t.react_secs, key);
    set_secs(&mut d.eat, t.eat_secs, key);
    set_secs(&mut d.pet, t.pet_secs, key);
    set_secs(&mut d.achievement, t.achievement_secs, key);
    set_secs(&mut d.goal, t.goal_secs, key);
    set_secs(&mut d.keypress_reaction, t.keypress_reaction_secs, key);
    set_secs(&mut d.alert, t.alert_secs, key);
}

/// Apply environment variable overrides to the config
fn apply_env_config<F>(config: &mut PetConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    // Pet identity
    if let Some(name) = env("CODEPET_NAME") {
        config.pet.name = name;
        config.source = ConfigSource::Env;
    }
    if let Some(species) = env("CODEPET_SPECIES") {
        config.pet.species = species;
        config.source = ConfigSource::Env;
    }
    if let Some(personality) = env("CODEPET_PERSONALITY") {
        config.pet.personality = personality;
        config.source = ConfigSource::Env;
    }

    // Activity
    if let Some(interval) = env("CODEPET_SAMPLE_INTERVAL_MS") {
        if let Ok(ms) = interval.parse::<u64>() {
            config.activity.sample_interval = Duration::from_millis(ms);
            config.source = ConfigSource::Env;
        }
    }
    if let Some(threshold) = env("CODEPET_IDLE_THRESHOLD_SECS") {
        if let Ok(secs) = threshold.parse::<f64>() {
            config.activity.idle_threshold_secs = secs;
            config.source = ConfigSource::Env;
        }
    }
    if let Some(apps) = env("CODEPET_PROGRAMMING_APPS") {
        config.activity.programming_apps = apps
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect();
        config.source = ConfigSource::Env;
    }

    // Behavior
    if let Some(interval) = env("CODEPET_TICK_INTERVAL_MS") {
        if let Ok(ms) = interval.parse::<u64>() {
            config.behavior.tick_interval = Duration::from_millis(ms);
            config.source = ConfigSource::Env;
        }
    }
    if let Some(interval) = env("CODEPET_VITALS_INTERVAL_SECS") {
        if let Some(duration) = interval
            .parse::<f64>()
            .ok()
            .and_then(|v| secs(v, "CODEPET_VITALS_INTERVAL_SECS"))
        {
            config.behavior.vitals_interval = duration;
            config.source = ConfigSource::Env;
        }
    }
    if let Some(p) = env("CODEPET_ENCOURAGE_PROBABILITY") {
        if let Ok(p) = p.parse::<f64>() {
            config.behavior.encourage_probability = p;
            config.source = ConfigSource::Env;
        }
    }

    // Animation
    if let Some(dir) = env("CODEPET_ASSETS_DIR") {
        config.animation.assets_dir = Some(PathBuf::from(dir));
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Assets root override
    pub assets_dir: Option<PathBuf>,
    /// Species (animation character) override
    pub species: Option<String>,
    /// Pet name override
    pub name: Option<String>,
    /// Window poll cadence override (milliseconds)
    pub sample_interval_ms: Option<u64>,
    /// Expiry tick cadence override (milliseconds)
    pub tick_interval_ms: Option<u64>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set assets root override
    #[must_use]
    pub fn with_assets_dir(mut self, path: PathBuf) -> Self {
        self.assets_dir = Some(path);
        self
    }

    /// Set species override
    #[must_use]
    pub fn with_species(mut self, species: String) -> Self {
        self.species = Some(species);
        self
    }

    /// Set name override
    #[must_use]
    pub fn with_name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    /// Set sample interval override
    #[must_use]
    pub fn with_sample_interval_ms(mut self, ms: u64) -> Self {
        self.sample_interval_ms = Some(ms);
        self
    }

    /// Set tick interval override
    #[must_use]
    pub fn with_tick_interval_ms(mut self, ms: u64) -> Self {
        self.tick_interval_ms = Some(ms);
        self
    }

    /// Whether any override is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets_dir.is_none()
            && self.species.is_none()
            && self.name.is_none()
            && self.sample_interval_ms.is_none()
            && self.tick_interval_ms.is_none()
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut PetConfig) {
        if !self.is_empty() {
            config.source = ConfigSource::Cli;
        }

        if let Some(ref dir) = self.assets_dir {
            config.animation.assets_dir = Some(dir.clone());
        }
        if let Some(ref species) = self.species {
            config.pet.species.clone_from(species);
        }
        if let Some(ref name) = self.name {
            config.pet.name.clone_from(name);
        }
        if let Some(ms) = self.sample_interval_ms {
            config.activity.sample_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = self.tick_interval_ms {
            config.behavior.tick_interval = Duration::from_millis(ms);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
