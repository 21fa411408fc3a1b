//! Display role of a unit, derived from its max-level stats.

use crate::model::Unit;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Main DPS")]
    MainDps,
    #[serde(rename = "AoE Damage")]
    AoeDamage,
    #[serde(rename = "Sub DPS")]
    SubDps,
    #[serde(rename = "Range Support")]
    RangeSupport,
    Support,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::MainDps => "Main DPS",
            Role::AoeDamage => "AoE Damage",
            Role::SubDps => "Sub DPS",
            Role::RangeSupport => "Range Support",
            Role::Support => "Support",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classifier cut-offs. All comparisons are strict.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RoleThresholds {
    /// DPS above this is Main DPS.
    pub main_dps_min: f64,
    /// DPS above this is AoE Damage or Sub DPS.
    pub sub_dps_min: f64,
    /// Range above this turns a Sub DPS into AoE Damage.
    pub aoe_range_min: f64,
    /// Range above this turns a Support into Range Support.
    pub support_range_min: f64,
}

impl Default for RoleThresholds {
    fn default() -> Self {
        Self {
            main_dps_min: 10_000.0,
            sub_dps_min: 5_000.0,
            aoe_range_min: 30.0,
            support_range_min: 35.0,
        }
    }
}

/// Role from the unit's last table row. Units without rows are Support.
pub fn classify(unit: &Unit, thresholds: &RoleThresholds) -> Role {
    let Some(max) = unit.max_stat() else {
        return Role::Support;
    };
    if max.dps > thresholds.main_dps_min {
        Role::MainDps
    } else if max.dps > thresholds.sub_dps_min {
        if max.range > thresholds.aoe_range_min {
            Role::AoeDamage
        } else {
            Role::SubDps
        }
    } else if max.range > thresholds.support_range_min {
        Role::RangeSupport
    } else {
        Role::Support
    }
}
