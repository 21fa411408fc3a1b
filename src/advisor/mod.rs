//! Upgrade advice: which level-ups give the most DPS per currency spent.

use crate::config::UPGRADE_STEPS;
use crate::dps::transition_cost;
use crate::model::Unit;
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpgradeRecommendation<'a> {
    pub unit: &'a Unit,
    pub current_level: u32,
    pub target_level: u32,
    pub cost: f64,
    pub dps_gain: f64,
    /// Gain relative to current DPS; 0 when current DPS is 0.
    pub dps_gain_percent: f64,
    /// DPS gained per 1000 spent; 0 for a free upgrade.
    pub efficiency: f64,
}

/// Evaluate `current + 5/10/15` for every member and return the best
/// `max_recommendations` across the whole team.
///
/// Every target is measured from the member's current level. Rows are read by
/// index, so a target or current level without a row is skipped.
pub fn recommend_upgrades<'a>(
    team: &[(&'a Unit, u32)],
    max_recommendations: usize,
) -> Vec<UpgradeRecommendation<'a>> {
    let mut out = Vec::new();
    for &(unit, current_level) in team {
        let max_level = unit.max_level();
        for step in UPGRADE_STEPS {
            let target_level = current_level.saturating_add(step);
            if target_level > max_level {
                break;
            }
            if let Some(rec) = evaluate(unit, current_level, target_level) {
                out.push(rec);
            }
        }
    }
    out.sort_by(|a, b| {
        b.efficiency
            .partial_cmp(&a.efficiency)
            .unwrap_or(Ordering::Equal)
    });
    out.truncate(max_recommendations);
    out
}

fn evaluate(unit: &Unit, current_level: u32, target_level: u32) -> Option<UpgradeRecommendation<'_>> {
    let current = unit.stat_at(current_level)?;
    let target = unit.stat_at(target_level)?;

    let cost = transition_cost(unit, current_level, target_level);

    let dps_gain = target.dps - current.dps;
    let dps_gain_percent = if current.dps != 0.0 {
        dps_gain / current.dps * 100.0
    } else {
        0.0
    };
    let efficiency = if cost > 0.0 {
        dps_gain / cost * 1000.0
    } else {
        0.0
    };
    Some(UpgradeRecommendation {
        unit,
        current_level,
        target_level,
        cost,
        dps_gain,
        dps_gain_percent,
        efficiency,
    })
}
