//! JSON report generation.

use crate::advisor::UpgradeRecommendation;
use crate::anomaly::Anomaly;
use crate::optimizer::{RankedResult, Strategy, TeamResult};
use crate::role::{classify, Role, RoleThresholds};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Flattened team member for reports: ids instead of whole unit records.
#[derive(Debug, Clone, Serialize)]
pub struct MemberRow {
    pub unit_id: String,
    pub name: String,
    pub rarity: String,
    pub level: u32,
    pub role: Role,
    pub dps: f64,
    pub cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technique: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamReport {
    pub strategy: Option<Strategy>,
    pub members: Vec<MemberRow>,
    pub total_dps: f64,
    pub total_cost: f64,
    pub avg_efficiency: f64,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpgradeRow {
    pub unit_id: String,
    pub current_level: u32,
    pub target_level: u32,
    pub cost: f64,
    pub dps_gain: f64,
    pub dps_gain_percent: f64,
    pub efficiency: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub roster_size: usize,
    pub teams: Vec<TeamReport>,
    pub upgrades: Vec<UpgradeRow>,
    pub anomalies: Vec<Anomaly>,
}

impl TeamReport {
    pub fn new(strategy: Option<Strategy>, result: &TeamResult<'_>, roles: &RoleThresholds) -> Self {
        let members = result
            .team
            .iter()
            .map(|m| MemberRow {
                unit_id: m.unit.id.clone(),
                name: m.unit.name.clone(),
                rarity: m.unit.rarity.clone(),
                level: m.level,
                role: classify(m.unit, roles),
                dps: crate::dps::effective_dps(m.unit, m.level, m.technique),
                cost: crate::dps::cumulative_cost(m.unit, m.level),
                technique: m.technique.map(|t| t.name.clone()),
            })
            .collect();
        Self {
            strategy,
            members,
            total_dps: result.total_dps,
            total_cost: result.total_cost,
            avg_efficiency: result.avg_efficiency,
            score: result.score,
        }
    }

    pub fn from_ranked(ranked: &[RankedResult<'_>], roles: &RoleThresholds) -> Vec<Self> {
        ranked
            .iter()
            .map(|r| Self::new(Some(r.strategy), &r.result, roles))
            .collect()
    }
}

impl From<&UpgradeRecommendation<'_>> for UpgradeRow {
    fn from(r: &UpgradeRecommendation<'_>) -> Self {
        Self {
            unit_id: r.unit.id.clone(),
            current_level: r.current_level,
            target_level: r.target_level,
            cost: r.cost,
            dps_gain: r.dps_gain,
            dps_gain_percent: r.dps_gain_percent,
            efficiency: r.efficiency,
        }
    }
}

impl Report {
    pub fn new(roster_size: usize) -> Self {
        Self {
            generated_at: Utc::now(),
            roster_size,
            teams: vec![],
            upgrades: vec![],
            anomalies: vec![],
        }
    }
}

pub fn write_json_report(report: &Report, path: &Path) -> Result<(), String> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| e.to_string())?;
    }
    let json = serde_json::to_string_pretty(report).map_err(|e| e.to_string())?;
    fs::write(path, json).map_err(|e| e.to_string())?;
    Ok(())
}
