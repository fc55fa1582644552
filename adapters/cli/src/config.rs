//! TOML configuration for the command-line tools.

use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use blast_arena_core::HazardTolerance;
use blast_arena_system_goal_selection::Config as GoalConfig;
use blast_arena_world::HazardTiming;
use serde::Deserialize;

const SUPPORTED_CONFIG_VERSION: u32 = 1;

/// Resolved settings consumed by the subcommands.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Settings {
    pub(crate) timing: HazardTiming,
    pub(crate) goals: GoalConfig,
    pub(crate) tolerance: HazardTolerance,
    pub(crate) wall_density: f32,
    pub(crate) seed: u64,
    pub(crate) bomb_power: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timing: HazardTiming::default(),
            goals: GoalConfig::default(),
            tolerance: HazardTolerance::STRICT,
            wall_density: RoundSection::default().wall_density,
            seed: 0,
            bomb_power: 1,
        }
    }
}

/// Loads settings from `path`, falling back to defaults when absent.
pub(crate) fn load(path: Option<&Path>) -> Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid config file {}", path.display()))
}

/// Parses settings from TOML text.
pub(crate) fn parse(contents: &str) -> Result<Settings> {
    let file: ConfigFile = toml::from_str(contents).context("failed to parse config toml")?;
    if file.version != SUPPORTED_CONFIG_VERSION {
        bail!(
            "unsupported config version {}; expected {}",
            file.version,
            SUPPORTED_CONFIG_VERSION
        );
    }

    let timing = HazardTiming::new(
        Duration::from_millis(file.timing.fuse_ms),
        Duration::from_millis(file.timing.imminent_ms),
        Duration::from_millis(file.timing.explosion_ms),
    );

    let tolerance = match file.navigation.tolerance.as_str() {
        "strict" => HazardTolerance::STRICT,
        "permissive" => HazardTolerance::PERMISSIVE,
        "ignore" => HazardTolerance::Ignore,
        other => bail!("unknown navigation tolerance `{other}`"),
    };

    let goals = GoalConfig::new(file.scoring.bonus, file.scoring.player)
        .context("invalid [scoring] section")?;

    let density = file.round.wall_density;
    if !(0.0..=1.0).contains(&density) {
        bail!("wall_density {density} must lie within 0.0..=1.0");
    }
    if file.round.bomb_power == 0 {
        bail!("bomb_power must be at least 1");
    }

    Ok(Settings {
        timing,
        goals,
        tolerance,
        wall_density: density,
        seed: file.round.seed,
        bomb_power: file.round.bomb_power,
    })
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    version: u32,
    #[serde(default)]
    timing: TimingSection,
    #[serde(default)]
    scoring: ScoringSection,
    #[serde(default)]
    navigation: NavigationSection,
    #[serde(default)]
    round: RoundSection,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct TimingSection {
    fuse_ms: u64,
    imminent_ms: u64,
    explosion_ms: u64,
}

impl Default for TimingSection {
    fn default() -> Self {
        Self {
            fuse_ms: 2_000,
            imminent_ms: 1_000,
            explosion_ms: 500,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ScoringSection {
    bonus: u32,
    player: u32,
}

impl Default for ScoringSection {
    fn default() -> Self {
        let defaults = GoalConfig::default();
        Self {
            bonus: defaults.bonus_score(),
            player: defaults.player_score(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct NavigationSection {
    tolerance: String,
}

impl Default for NavigationSection {
    fn default() -> Self {
        Self {
            tolerance: "strict".to_owned(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RoundSection {
    wall_density: f32,
    seed: u64,
    bomb_power: u32,
}

impl Default for RoundSection {
    fn default() -> Self {
        Self {
            wall_density: 0.6,
            seed: 0,
            bomb_power: 1,
        }
    }
}
