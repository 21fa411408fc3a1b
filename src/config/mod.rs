//! Configuration defaults and TOML loading.

use crate::error::LoadError;
use crate::role::RoleThresholds;
use serde::Deserialize;
use std::path::Path;

/// Default number of members in a recommended team.
pub const DEFAULT_TEAM_SIZE: usize = 6;

/// Level every optimizer candidate is evaluated at (capped by the table length).
pub const OPTIMIZER_LEVEL_CAP: u32 = 50;

/// Budget for the "low cost" greedy run in the multi-strategy recommender.
pub const DEFAULT_LOW_COST_BUDGET: f64 = 30_000.0;

/// Default number of upgrade recommendations returned.
pub const DEFAULT_MAX_RECOMMENDATIONS: usize = 5;

/// Level step used when scanning for a unit's recommended level.
pub const RECOMMENDED_LEVEL_STEP: u32 = 10;

/// Highest level considered when scanning for a unit's recommended level.
pub const RECOMMENDED_LEVEL_CEILING: u32 = 100;

/// Level increments the upgrade advisor proposes from the current level.
pub const UPGRADE_STEPS: [u32; 3] = [5, 10, 15];

/// Rarities that earn one guaranteed slot in a balanced team, highest first.
pub const RARITY_PRIORITY: [&str; 7] = [
    "Godly",
    "Extreme Boosted",
    "Ultimate",
    "Exotic",
    "Celestial",
    "Mythic",
    "Legendary",
];

/// Score weights: `total_dps * DPS_WEIGHT + avg_efficiency * EFFICIENCY_SCALE * EFFICIENCY_WEIGHT`.
pub const SCORE_DPS_WEIGHT: f64 = 0.7;
pub const SCORE_EFFICIENCY_WEIGHT: f64 = 0.3;
pub const SCORE_EFFICIENCY_SCALE: f64 = 1000.0;

#[derive(Debug, Clone, Deserialize)]
pub struct CalcConfig {
    #[serde(default = "default_team_size")]
    pub team_size: usize,
    /// Optional cap on the greedy team's total cost.
    #[serde(default)]
    pub max_total_cost: Option<f64>,
    #[serde(default = "default_low_cost_budget")]
    pub low_cost_budget: f64,
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,
    #[serde(default)]
    pub roles: RoleThresholds,
}

fn default_team_size() -> usize {
    DEFAULT_TEAM_SIZE
}

fn default_low_cost_budget() -> f64 {
    DEFAULT_LOW_COST_BUDGET
}

fn default_max_recommendations() -> usize {
    DEFAULT_MAX_RECOMMENDATIONS
}

impl Default for CalcConfig {
    fn default() -> Self {
        Self {
            team_size: DEFAULT_TEAM_SIZE,
            max_total_cost: None,
            low_cost_budget: DEFAULT_LOW_COST_BUDGET,
            max_recommendations: DEFAULT_MAX_RECOMMENDATIONS,
            roles: RoleThresholds::default(),
        }
    }
}

impl CalcConfig {
    pub fn from_toml_str(s: &str, path: &Path) -> Result<Self, LoadError> {
        toml::from_str(s).map_err(|e| LoadError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let s = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
        Self::from_toml_str(&s, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let cfg = CalcConfig::from_toml_str("", Path::new("calc.toml")).unwrap();
        assert_eq!(cfg.team_size, 6);
        assert_eq!(cfg.max_total_cost, None);
        assert_eq!(cfg.low_cost_budget, 30_000.0);
        assert_eq!(cfg.max_recommendations, 5);
        assert_eq!(cfg.roles.main_dps_min, 10_000.0);
    }

    #[test]
    fn toml_overrides_fields() {
        let s = r#"
team_size = 4
max_total_cost = 12000.0

[roles]
main_dps_min = 20000.0
"#;
        let cfg = CalcConfig::from_toml_str(s, Path::new("calc.toml")).unwrap();
        assert_eq!(cfg.team_size, 4);
        assert_eq!(cfg.max_total_cost, Some(12_000.0));
        assert_eq!(cfg.roles.main_dps_min, 20_000.0);
        assert_eq!(cfg.roles.sub_dps_min, 5_000.0);
    }

    #[test]
    fn bad_toml_reports_path() {
        let err = CalcConfig::from_toml_str("team_size = [", Path::new("bad.toml")).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }
}
