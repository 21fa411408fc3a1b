//! DPS evaluation, cumulative cost, efficiency and team aggregates.
//!
//! Two lookup conventions coexist on purpose: `effective_dps` matches rows by
//! their `level` field, while cost accumulation and the recommended-level scan
//! index the table by `level - 1`. They only agree on contiguous tables.

use crate::config::{RECOMMENDED_LEVEL_CEILING, RECOMMENDED_LEVEL_STEP};
use crate::model::{TeamMember, Technique, Unit};

/// Effective DPS of `unit` at `level`, with optional technique modifiers.
///
/// Returns 0 when no row has `level`. Modifiers apply in a fixed order:
/// damage multiplier, then speed multiplier, then expected crit uplift.
pub fn effective_dps(unit: &Unit, level: u32, technique: Option<&Technique>) -> f64 {
    let Some(stat) = unit.stat_for_level(level) else {
        return 0.0;
    };
    let mut dps = stat.dps;
    if let Some(t) = technique {
        let fx = &t.effects;
        if let Some(m) = fx.damage_multiplier {
            dps *= m;
        }
        if let Some(m) = fx.spa_multiplier {
            // Non-positive speed multipliers would divide by zero or flip sign.
            if m > 0.0 {
                dps /= m;
            }
        }
        if let (Some(chance), Some(crit_dmg)) = (fx.crit_chance_bonus, fx.crit_damage_multiplier) {
            let chance = (chance / 100.0).min(1.0);
            dps *= 1.0 + chance * (crit_dmg - 1.0);
        }
    }
    dps
}

/// Deployment cost plus the upgrade cost of every row from index 1 up to
/// index `target_level - 1`.
///
/// A row's `upgrade_cost` is the price of reaching that row's level, so the
/// level-1 row only restates the deployment cost and is never added. Missing
/// rows count as zero.
pub fn cumulative_cost(unit: &Unit, target_level: u32) -> f64 {
    unit.deployment_cost + transition_cost(unit, 1, target_level)
}

/// Sum of upgrade costs for moving from `from_level` to `to_level`: rows at
/// indices `from_level ..= to_level - 1`. Zero when `to_level <= from_level`.
pub fn transition_cost(unit: &Unit, from_level: u32, to_level: u32) -> f64 {
    unit.upgrades
        .iter()
        .skip(from_level as usize)
        .take(to_level.saturating_sub(from_level) as usize)
        .map(|s| s.upgrade_cost)
        .sum()
}

/// DPS per unit of currency spent to reach `level`; 0 when the cost is 0.
pub fn efficiency(unit: &Unit, level: u32, technique: Option<&Technique>) -> f64 {
    let cost = cumulative_cost(unit, level);
    if cost == 0.0 {
        return 0.0;
    }
    effective_dps(unit, level, technique) / cost
}

/// Default level for a newly picked unit: the most efficient of levels
/// 10, 20, .. up to `min(max_level, 100)`, or 1 if none beats zero.
pub fn recommended_level(unit: &Unit) -> u32 {
    let ceiling = unit.max_level().min(RECOMMENDED_LEVEL_CEILING);
    let mut best_level = 1;
    let mut best_eff = 0.0;
    let mut level = RECOMMENDED_LEVEL_STEP;
    while level <= ceiling {
        if let Some(stat) = unit.stat_at(level) {
            let cost = cumulative_cost(unit, level);
            let eff = if cost > 0.0 { stat.dps / cost } else { 0.0 };
            if eff > best_eff {
                best_eff = eff;
                best_level = level;
            }
        }
        level += RECOMMENDED_LEVEL_STEP;
    }
    best_level
}

pub fn team_dps(team: &[TeamMember<'_>]) -> f64 {
    team.iter()
        .map(|m| effective_dps(m.unit, m.level, m.technique))
        .sum()
}

pub fn team_cost(team: &[TeamMember<'_>]) -> f64 {
    team.iter().map(|m| cumulative_cost(m.unit, m.level)).sum()
}

/// Team DPS over team cost; 0 for an empty or free team.
pub fn avg_efficiency(total_dps: f64, total_cost: f64, team_len: usize) -> f64 {
    if team_len == 0 || total_cost == 0.0 {
        0.0
    } else {
        total_dps / total_cost
    }
}
