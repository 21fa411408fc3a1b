//! Data-quality audit of unit tables: severity, explanation, technical note.
//!
//! The engine never repairs data; these findings are for whoever maintains
//! the unit export.

use crate::dps::cumulative_cost;
use crate::model::Unit;
use serde::{Deserialize, Serialize};

/// Relative tolerance for `total_cost` against the summed table.
const TOTAL_COST_TOLERANCE: f64 = 0.01;

/// Relative tolerance for row `dps` against `damage / spa`.
const DPS_TOLERANCE: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnomalySeverity {
    Info,
    Warn,
    Crit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anomaly {
    pub code: String,
    pub severity: AnomalySeverity,
    /// Short explanation for users.
    pub summary: String,
    /// Technical note for data maintainers.
    pub technical: String,
    pub unit_id: String,
    pub levels: Vec<u32>,
}

impl Anomaly {
    pub fn empty_upgrades(unit_id: &str) -> Self {
        Self {
            code: "EMPTY_UPGRADES".to_string(),
            severity: AnomalySeverity::Warn,
            summary: format!("Unit {} has no upgrade table; it scores 0 DPS.", unit_id),
            technical: "upgrades is empty".to_string(),
            unit_id: unit_id.to_string(),
            levels: vec![],
        }
    }

    pub fn level_sequence(unit_id: &str, bad_positions: Vec<u32>) -> Self {
        Self {
            code: "LEVEL_SEQUENCE".to_string(),
            severity: AnomalySeverity::Crit,
            summary: format!(
                "Unit {}: upgrade table has gaps or duplicates; level-based and index-based lookups disagree.",
                unit_id
            ),
            technical: format!(
                "upgrades[i].level != i + 1 at {} position(s)",
                bad_positions.len()
            ),
            unit_id: unit_id.to_string(),
            levels: bad_positions,
        }
    }

    pub fn deployment_cost_mismatch(unit_id: &str, deployment: f64, level_one: f64) -> Self {
        Self {
            code: "DEPLOYMENT_COST_MISMATCH".to_string(),
            severity: AnomalySeverity::Warn,
            summary: format!(
                "Unit {}: deployment cost {:.0} differs from the level 1 row ({:.0}).",
                unit_id, deployment, level_one
            ),
            technical: format!("deploymentCost={} upgrades[0].upgradeCost={}", deployment, level_one),
            unit_id: unit_id.to_string(),
            levels: vec![1],
        }
    }

    pub fn total_cost_mismatch(unit_id: &str, declared: f64, summed: f64) -> Self {
        Self {
            code: "TOTAL_COST_MISMATCH".to_string(),
            severity: AnomalySeverity::Info,
            summary: format!(
                "Unit {}: declared total cost {:.0} vs table sum {:.0}.",
                unit_id, declared, summed
            ),
            technical: format!("totalCost={} cumulativeCost(maxLevel)={}", declared, summed),
            unit_id: unit_id.to_string(),
            levels: vec![],
        }
    }

    pub fn dps_mismatch(unit_id: &str, level: u32, dps: f64, computed: f64) -> Self {
        Self {
            code: "DPS_MISMATCH".to_string(),
            severity: AnomalySeverity::Info,
            summary: format!(
                "Unit {} level {}: stored DPS {:.1} vs damage/SPA {:.1}.",
                unit_id, level, dps, computed
            ),
            technical: format!("dps={} damage/spa={}", dps, computed),
            unit_id: unit_id.to_string(),
            levels: vec![level],
        }
    }
}

fn differs(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() > tolerance * a.abs().max(b.abs()).max(1.0)
}

/// Audit one unit's table.
pub fn audit_unit(unit: &Unit) -> Vec<Anomaly> {
    let mut out = Vec::new();
    let Some(first) = unit.upgrades.first() else {
        out.push(Anomaly::empty_upgrades(&unit.id));
        return out;
    };

    let bad: Vec<u32> = unit
        .upgrades
        .iter()
        .enumerate()
        .filter(|(i, s)| s.level != *i as u32 + 1)
        .map(|(i, _)| i as u32)
        .collect();
    if !bad.is_empty() {
        out.push(Anomaly::level_sequence(&unit.id, bad));
    }

    if first.level == 1 && differs(unit.deployment_cost, first.upgrade_cost, 0.0) {
        out.push(Anomaly::deployment_cost_mismatch(
            &unit.id,
            unit.deployment_cost,
            first.upgrade_cost,
        ));
    }

    if unit.total_cost > 0.0 {
        let summed = cumulative_cost(unit, unit.max_level());
        if differs(unit.total_cost, summed, TOTAL_COST_TOLERANCE) {
            out.push(Anomaly::total_cost_mismatch(&unit.id, unit.total_cost, summed));
        }
    }

    // One finding per unit is enough to flag a stale scrape.
    if let Some(s) = unit
        .upgrades
        .iter()
        .find(|s| s.spa > 0.0 && differs(s.dps, s.damage / s.spa, DPS_TOLERANCE))
    {
        out.push(Anomaly::dps_mismatch(&unit.id, s.level, s.dps, s.damage / s.spa));
    }
    out
}

pub fn audit_roster(units: &[Unit]) -> Vec<Anomaly> {
    let out: Vec<Anomaly> = units.iter().flat_map(audit_unit).collect();
    tracing::debug!("audited {} unit(s), {} finding(s)", units.len(), out.len());
    out
}
