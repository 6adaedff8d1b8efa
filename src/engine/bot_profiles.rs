//! Named bot profiles: thinking delay and vocabulary tuning per
//! difficulty tier. Loaded from TOML at runtime for the arena CLI and
//! match sessions.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::engine::models::Difficulty;

/// A named bot profile. Unset fields fall back to the built-in defaults
/// for the difficulty tier the profile is resolved for.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct BotProfile {
    pub description: Option<String>,
    /// Simulated thinking delay before the automated move fires.
    pub think_time_ms: Option<u64>,
    /// Share of the lexicon the bot may draw from, in (0, 1].
    pub vocabulary_share: Option<f64>,
    /// Whether the bot refuses words ending on the forbidden terminal.
    pub avoid_terminal: Option<bool>,
}

/// Maps difficulty tiers to profile names.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProductionConfig {
    pub easy: Option<String>,
    pub medium: Option<String>,
    pub hard: Option<String>,
    pub default: Option<String>,
}

/// Top-level TOML file structure.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct BotProfilesFile {
    #[serde(default)]
    pub profiles: HashMap<String, BotProfile>,
    #[serde(default)]
    pub production: ProductionConfig,
}

/// Resolved parameters an automated participant plays with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BotParams {
    pub think_time: Duration,
    pub vocabulary_share: f64,
    pub avoid_terminal: bool,
}

impl BotParams {
    /// Built-in defaults per tier, used when no profile file overrides.
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                think_time: Duration::from_millis(2500),
                vocabulary_share: 0.4,
                avoid_terminal: false,
            },
            Difficulty::Medium => Self {
                think_time: Duration::from_millis(1500),
                vocabulary_share: 0.7,
                avoid_terminal: false,
            },
            Difficulty::Hard => Self {
                think_time: Duration::from_millis(800),
                vocabulary_share: 1.0,
                avoid_terminal: true,
            },
        }
    }
}

impl BotProfile {
    /// Overlay this profile on top of `base`, keeping base values for any
    /// unspecified field.
    pub fn to_params(&self, base: BotParams) -> BotParams {
        BotParams {
            think_time: self
                .think_time_ms
                .map(Duration::from_millis)
                .unwrap_or(base.think_time),
            vocabulary_share: self
                .vocabulary_share
                .map(|s| s.clamp(0.0, 1.0))
                .unwrap_or(base.vocabulary_share),
            avoid_terminal: self.avoid_terminal.unwrap_or(base.avoid_terminal),
        }
    }
}

impl ProductionConfig {
    /// Resolve a difficulty tier to a profile name.
    pub fn resolve(&self, difficulty: Difficulty) -> Option<&str> {
        let tier = match difficulty {
            Difficulty::Easy => self.easy.as_deref(),
            Difficulty::Medium => self.medium.as_deref(),
            Difficulty::Hard => self.hard.as_deref(),
        };
        tier.or(self.default.as_deref())
    }
}

impl BotProfilesFile {
    /// Effective parameters for a tier: the production mapping's profile
    /// overlaid on the built-in defaults, or the defaults alone.
    pub fn params_for(&self, difficulty: Difficulty) -> BotParams {
        let base = BotParams::for_difficulty(difficulty);
        self.production
            .resolve(difficulty)
            .and_then(|name| self.profiles.get(name))
            .map(|profile| profile.to_params(base))
            .unwrap_or(base)
    }
}

/// Load profiles from a TOML file at the given path.
pub fn load_profiles(path: &Path) -> Result<BotProfilesFile, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    toml::from_str(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}

/// Try well-known paths, returning built-in defaults if none parses.
pub fn load_default_profiles() -> BotProfilesFile {
    let candidates = [
        "bot_profiles.toml",
        "../bot_profiles.toml",
        "/etc/shiritori/bot_profiles.toml",
    ];
    for path in &candidates {
        let p = Path::new(path);
        if p.exists() {
            match load_profiles(p) {
                Ok(profiles) => {
                    tracing::info!(path = %p.display(), count = profiles.profiles.len(), "loaded bot profiles");
                    return profiles;
                }
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "failed to load bot profiles");
                }
            }
        }
    }
    tracing::info!("no bot_profiles.toml found, using built-in defaults");
    BotProfilesFile::default()
}
