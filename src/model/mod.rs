//! Unit, level table, technique and team member model.

mod load;

pub use load::{
    distinct_rarities, load_roster, load_techniques, parse_roster, parse_techniques, RosterFilter,
};
use serde::{Deserialize, Serialize};

/// One row of a unit's upgrade table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelStat {
    pub level: u32,
    /// Price of the transition stored at this row (see `dps::cumulative_cost`).
    pub upgrade_cost: f64,
    pub damage: f64,
    pub range: f64,
    /// Seconds per attack; lower is faster.
    pub spa: f64,
    /// Precomputed damage per second at this level.
    pub dps: f64,
}

/// A unit record as exported by the data service. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: String,
    pub name: String,
    pub rarity: String,
    #[serde(default)]
    pub element: String,
    #[serde(default, rename = "type")]
    pub unit_type: String,
    /// Spend to field the unit at level 1.
    pub deployment_cost: f64,
    /// Deployment plus every upgrade to max level, as scraped.
    #[serde(default)]
    pub total_cost: f64,
    #[serde(default)]
    pub can_evolve: bool,
    #[serde(default)]
    pub is_evolved: bool,
    #[serde(default)]
    pub upgrades: Vec<LevelStat>,
}

impl Unit {
    /// Highest level in the table (its row count).
    pub fn max_level(&self) -> u32 {
        self.upgrades.len() as u32
    }

    /// Row whose `level` field equals `level`. Tolerates gaps and reordering.
    pub fn stat_for_level(&self, level: u32) -> Option<&LevelStat> {
        self.upgrades.iter().find(|s| s.level == level)
    }

    /// Row at array position `level - 1`. Assumes a contiguous 1-indexed table.
    pub fn stat_at(&self, level: u32) -> Option<&LevelStat> {
        let idx = level.checked_sub(1)?;
        self.upgrades.get(idx as usize)
    }

    /// Last row of the table, if any.
    pub fn max_stat(&self) -> Option<&LevelStat> {
        self.upgrades.last()
    }
}

/// Optional modifiers a technique applies. Absent fields have no effect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechniqueEffects {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_multiplier: Option<f64>,
    /// Divides DPS: a value of 2 halves the attack interval.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spa_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub money_multiplier: Option<f64>,
    /// Percent, 0..=100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crit_chance_bonus: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crit_damage_multiplier: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Technique {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tier: u32,
    #[serde(default)]
    pub rarity: String,
    #[serde(default)]
    pub probability: f64,
    #[serde(default)]
    pub effects: TechniqueEffects,
    #[serde(default)]
    pub description: String,
}

impl Technique {
    /// Technique with the given effects and no metadata.
    pub fn with_effects(effects: TechniqueEffects) -> Self {
        Self {
            effects,
            ..Self::default()
        }
    }
}

/// A unit fielded at a level, optionally with a technique.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamMember<'a> {
    pub unit: &'a Unit,
    pub level: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technique: Option<&'a Technique>,
}

impl<'a> TeamMember<'a> {
    pub fn new(unit: &'a Unit, level: u32) -> Self {
        Self {
            unit,
            level,
            technique: None,
        }
    }

    pub fn with_technique(mut self, technique: &'a Technique) -> Self {
        self.technique = Some(technique);
        self
    }
}
