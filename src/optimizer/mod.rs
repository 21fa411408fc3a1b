//! Team search: greedy-by-efficiency and rarity-balanced selection.
//!
//! Every candidate is evaluated at `min(max_level, OPTIMIZER_LEVEL_CAP)`.
//! Both strategies are single forward passes with no backtracking, and sort
//! stably so equally efficient units keep their roster order.

use crate::config::{
    OPTIMIZER_LEVEL_CAP, RARITY_PRIORITY, SCORE_DPS_WEIGHT, SCORE_EFFICIENCY_SCALE,
    SCORE_EFFICIENCY_WEIGHT,
};
use crate::dps::{avg_efficiency, cumulative_cost, efficiency, team_cost, team_dps};
use crate::model::{TeamMember, Unit};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// A scored team. `score` only ranks results against each other.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamResult<'a> {
    pub team: Vec<TeamMember<'a>>,
    pub total_dps: f64,
    pub total_cost: f64,
    pub avg_efficiency: f64,
    pub score: f64,
}

impl<'a> TeamResult<'a> {
    /// Aggregate DPS, cost, efficiency and score for a fixed team.
    pub fn from_team(team: Vec<TeamMember<'a>>) -> Self {
        let total_dps = team_dps(&team);
        let total_cost = team_cost(&team);
        let avg_efficiency = avg_efficiency(total_dps, total_cost, team.len());
        Self {
            score: score(total_dps, avg_efficiency),
            team,
            total_dps,
            total_cost,
            avg_efficiency,
        }
    }
}

pub fn score(total_dps: f64, avg_efficiency: f64) -> f64 {
    total_dps * SCORE_DPS_WEIGHT + avg_efficiency * SCORE_EFFICIENCY_SCALE * SCORE_EFFICIENCY_WEIGHT
}

/// Level at which the optimizers field a unit.
pub fn optimizer_level(unit: &Unit) -> u32 {
    unit.max_level().min(OPTIMIZER_LEVEL_CAP)
}

struct Candidate<'a> {
    unit: &'a Unit,
    level: u32,
    efficiency: f64,
}

fn candidate(unit: &Unit) -> Candidate<'_> {
    let level = optimizer_level(unit);
    Candidate {
        unit,
        level,
        efficiency: efficiency(unit, level, None),
    }
}

fn by_efficiency_desc(a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    b.efficiency
        .partial_cmp(&a.efficiency)
        .unwrap_or(Ordering::Equal)
}

/// Pick the most efficient units in order, skipping any that would push the
/// team past `max_total_cost`. Returns a partial team when the roster or the
/// budget runs out.
pub fn optimize_greedy(
    units: &[Unit],
    team_size: usize,
    max_total_cost: Option<f64>,
) -> TeamResult<'_> {
    let mut candidates: Vec<Candidate<'_>> = units.iter().map(candidate).collect();
    candidates.sort_by(by_efficiency_desc);

    let mut team = Vec::with_capacity(team_size.min(candidates.len()));
    let mut spent = 0.0;
    for c in candidates {
        if team.len() >= team_size {
            break;
        }
        let cost = cumulative_cost(c.unit, c.level);
        if let Some(budget) = max_total_cost {
            if spent + cost > budget {
                tracing::debug!(
                    "greedy: skip {} (cost {:.0}, spent {:.0}, budget {:.0})",
                    c.unit.id,
                    cost,
                    spent,
                    budget
                );
                continue;
            }
        }
        tracing::debug!(
            "greedy: pick {} at level {} (efficiency {:.5})",
            c.unit.id,
            c.level,
            c.efficiency
        );
        team.push(TeamMember::new(c.unit, c.level));
        spent += cost;
    }
    TeamResult::from_team(team)
}

/// One best unit per priority rarity, then fill remaining slots by efficiency.
///
/// Rarities outside `RARITY_PRIORITY` can only enter through the fill.
pub fn optimize_balanced(units: &[Unit], team_size: usize) -> TeamResult<'_> {
    let mut team = Vec::with_capacity(team_size);
    let mut used: HashSet<&str> = HashSet::new();

    for rarity in RARITY_PRIORITY {
        if team.len() >= team_size {
            break;
        }
        let mut tier: Vec<Candidate<'_>> = units
            .iter()
            .filter(|u| u.rarity == rarity && !used.contains(u.id.as_str()))
            .map(candidate)
            .collect();
        tier.sort_by(by_efficiency_desc);
        if let Some(best) = tier.into_iter().next() {
            tracing::debug!("balanced: {} slot -> {}", rarity, best.unit.id);
            used.insert(best.unit.id.as_str());
            team.push(TeamMember::new(best.unit, best.level));
        }
    }

    if team.len() < team_size {
        let mut rest: Vec<Candidate<'_>> = units
            .iter()
            .filter(|u| !used.contains(u.id.as_str()))
            .map(candidate)
            .collect();
        rest.sort_by(by_efficiency_desc);
        for c in rest {
            if team.len() >= team_size {
                break;
            }
            // Duplicate ids in the roster must not fill two slots.
            if !used.insert(c.unit.id.as_str()) {
                continue;
            }
            tracing::debug!("balanced: fill -> {}", c.unit.id);
            team.push(TeamMember::new(c.unit, c.level));
        }
    }
    TeamResult::from_team(team)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Strategy {
    /// Greedy with no budget: highest output.
    Greedy,
    Balanced,
    /// Greedy capped at the low-cost budget.
    LowCost,
}

impl Strategy {
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Greedy => "Highest DPS",
            Strategy::Balanced => "Balanced",
            Strategy::LowCost => "Low Cost",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult<'a> {
    pub strategy: Strategy,
    pub result: TeamResult<'a>,
}

/// Run every strategy and rank the results by score, best first.
pub fn recommend_teams(
    units: &[Unit],
    team_size: usize,
    low_cost_budget: f64,
) -> Vec<RankedResult<'_>> {
    let mut out = vec![
        RankedResult {
            strategy: Strategy::Greedy,
            result: optimize_greedy(units, team_size, None),
        },
        RankedResult {
            strategy: Strategy::Balanced,
            result: optimize_balanced(units, team_size),
        },
        RankedResult {
            strategy: Strategy::LowCost,
            result: optimize_greedy(units, team_size, Some(low_cost_budget)),
        },
    ];
    sort_by_score(&mut out);
    out
}

fn sort_by_score(ranked: &mut [RankedResult<'_>]) {
    ranked.sort_by(|a, b| {
        b.result
            .score
            .partial_cmp(&a.result.score)
            .unwrap_or(Ordering::Equal)
    });
}

/// Replace member levels with user-chosen ones (keyed by unit id) and rescore.
/// Missing or zero levels keep the optimizer's choice; levels past the end of
/// a unit's table are clamped to its max level.
pub fn apply_level_overrides<'a>(
    result: &TeamResult<'a>,
    levels: &HashMap<String, u32>,
) -> TeamResult<'a> {
    let team = result
        .team
        .iter()
        .map(|m| {
            let level = levels
                .get(&m.unit.id)
                .copied()
                .filter(|l| *l > 0)
                .map(|l| l.min(m.unit.max_level().max(1)))
                .unwrap_or(m.level);
            TeamMember { level, ..m.clone() }
        })
        .collect();
    TeamResult::from_team(team)
}

/// Apply level overrides to every ranked result, then restore best-first order.
pub fn rerank_with_levels<'a>(
    ranked: &[RankedResult<'a>],
    levels: &HashMap<String, u32>,
) -> Vec<RankedResult<'a>> {
    let mut out: Vec<RankedResult<'a>> = ranked
        .iter()
        .map(|r| RankedResult {
            strategy: r.strategy,
            result: apply_level_overrides(&r.result, levels),
        })
        .collect();
    sort_by_score(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{linear_unit, unit};

    fn ids<'a>(r: &'a TeamResult<'_>) -> Vec<&'a str> {
        r.team.iter().map(|m| m.unit.id.as_str()).collect()
    }

    /// Single-row unit with efficiency dps / deployment_cost.
    fn flat(id: &str, rarity: &str, cost: f64, dps: f64) -> Unit {
        unit(id, rarity, cost, &[(0.0, dps)])
    }

    #[test]
    fn greedy_orders_by_efficiency() {
        let units = vec![
            flat("low", "Rare", 100.0, 10.0),
            flat("high", "Rare", 100.0, 50.0),
            flat("mid", "Rare", 100.0, 30.0),
        ];
        let r = optimize_greedy(&units, 2, None);
        assert_eq!(ids(&r), vec!["high", "mid"]);
        assert_eq!(r.total_dps, 80.0);
        assert_eq!(r.total_cost, 200.0);
        assert!((r.avg_efficiency - 0.4).abs() < 1e-12);
        assert!((r.score - (80.0 * 0.7 + 0.4 * 1000.0 * 0.3)).abs() < 1e-9);
    }

    #[test]
    fn greedy_caps_level_at_50() {
        let units = vec![linear_unit("big", "Godly", 80, 10.0, 5.0)];
        let r = optimize_greedy(&units, 6, None);
        assert_eq!(r.team[0].level, 50);
        let short = vec![linear_unit("small", "Godly", 12, 10.0, 5.0)];
        assert_eq!(optimize_greedy(&short, 6, None).team[0].level, 12);
    }

    #[test]
    fn greedy_skips_over_budget_and_keeps_going() {
        let units = vec![
            flat("a", "Rare", 100.0, 100.0),
            flat("pricey", "Rare", 1_000.0, 900.0),
            flat("b", "Rare", 100.0, 50.0),
        ];
        let r = optimize_greedy(&units, 3, Some(250.0));
        assert_eq!(ids(&r), vec!["a", "b"]);
        assert!(r.total_cost <= 250.0);
    }

    #[test]
    fn greedy_budget_never_exceeded() {
        let units: Vec<Unit> = (0..20)
            .map(|i| linear_unit(&format!("u{}", i), "Mythic", 10 + i, 7.0 + i as f64, 33.0 * (i as f64 + 1.0)))
            .collect();
        for budget in [0.0, 500.0, 2_500.0, 10_000.0] {
            let r = optimize_greedy(&units, 6, Some(budget));
            assert!(r.total_cost <= budget, "budget {} exceeded: {}", budget, r.total_cost);
        }
    }

    #[test]
    fn greedy_partial_team_for_small_roster() {
        let units = vec![flat("only", "Rare", 10.0, 1.0)];
        assert_eq!(optimize_greedy(&units, 6, None).team.len(), 1);
        let empty: Vec<Unit> = vec![];
        let r = optimize_greedy(&empty, 6, None);
        assert!(r.team.is_empty());
        assert_eq!(r.avg_efficiency, 0.0);
        assert_eq!(r.score, 0.0);
    }

    #[test]
    fn greedy_ties_keep_roster_order() {
        let units = vec![
            flat("first", "Rare", 100.0, 10.0),
            flat("second", "Rare", 100.0, 10.0),
        ];
        assert_eq!(ids(&optimize_greedy(&units, 1, None)), vec!["first"]);
    }

    #[test]
    fn balanced_takes_one_per_priority_rarity() {
        let units = vec![
            flat("leg", "Legendary", 100.0, 90.0),
            flat("godly-weak", "Godly", 100.0, 1.0),
            flat("godly-strong", "Godly", 100.0, 5.0),
            flat("eb", "Extreme Boosted", 100.0, 2.0),
            flat("ult", "Ultimate", 100.0, 2.0),
            flat("exo", "Exotic", 100.0, 2.0),
            flat("cel", "Celestial", 100.0, 2.0),
            flat("myth", "Mythic", 100.0, 2.0),
        ];
        let r = optimize_balanced(&units, 6);
        assert_eq!(
            ids(&r),
            vec!["godly-strong", "eb", "ult", "exo", "cel", "myth"]
        );
    }

    #[test]
    fn balanced_fills_from_any_rarity() {
        let units = vec![
            flat("godly", "Godly", 100.0, 1.0),
            flat("epic-a", "Epic", 100.0, 50.0),
            flat("rare", "Rare", 100.0, 10.0),
            flat("godly-2", "Godly", 100.0, 0.5),
            flat("epic-b", "Epic", 100.0, 40.0),
        ];
        let r = optimize_balanced(&units, 4);
        assert_eq!(ids(&r), vec!["godly", "epic-a", "epic-b", "rare"]);
    }

    #[test]
    fn balanced_never_repeats_an_id() {
        let units = vec![
            flat("dup", "Rare", 100.0, 10.0),
            flat("dup", "Epic", 100.0, 9.0),
            flat("other", "Rare", 100.0, 1.0),
        ];
        let r = optimize_balanced(&units, 6);
        let mut seen = HashSet::new();
        for m in &r.team {
            assert!(seen.insert(m.unit.id.as_str()), "duplicate {}", m.unit.id);
        }
        assert_eq!(r.team.len(), 2);
    }

    #[test]
    fn optimizers_are_deterministic() {
        let units: Vec<Unit> = ["Godly", "Mythic", "Rare", "Mythic", "Epic", "Exotic", "Godly"]
            .iter()
            .enumerate()
            .map(|(i, r)| linear_unit(&format!("u{}", i), r, 20 + i as u32, 3.0 + i as f64, 17.0))
            .collect();
        assert_eq!(optimize_balanced(&units, 6), optimize_balanced(&units, 6));
        assert_eq!(
            optimize_greedy(&units, 6, Some(4_000.0)),
            optimize_greedy(&units, 6, Some(4_000.0))
        );
    }

    #[test]
    fn recommend_teams_ranked_by_score() {
        let units = vec![
            flat("godly", "Godly", 10_000.0, 100.0),
            flat("cheap", "Rare", 100.0, 50.0),
            flat("pricey", "Rare", 40_000.0, 5_000.0),
        ];
        let ranked = recommend_teams(&units, 2, 30_000.0);
        assert_eq!(ranked.len(), 3);
        for w in ranked.windows(2) {
            assert!(w[0].result.score >= w[1].result.score);
        }
        let low = ranked
            .iter()
            .find(|r| r.strategy == Strategy::LowCost)
            .unwrap();
        assert!(low.result.total_cost <= 30_000.0);
    }

    #[test]
    fn level_overrides_rescore() {
        let a = unit("a", "Godly", 100.0, &[(0.0, 10.0), (100.0, 20.0), (100.0, 40.0)]);
        let units = vec![a];
        let r = optimize_greedy(&units, 6, None);
        assert_eq!(r.team[0].level, 3);
        let mut levels = HashMap::new();
        levels.insert("a".to_string(), 1);
        let o = apply_level_overrides(&r, &levels);
        assert_eq!(o.team[0].level, 1);
        assert_eq!(o.total_dps, 10.0);
        assert_eq!(o.total_cost, 100.0);

        levels.insert("a".to_string(), 0);
        assert_eq!(apply_level_overrides(&r, &levels).team[0].level, 3);
    }

    #[test]
    fn level_override_past_table_is_clamped() {
        let a = unit("a", "Godly", 100.0, &[(0.0, 10.0), (100.0, 20.0), (100.0, 40.0)]);
        let units = vec![a];
        let r = optimize_greedy(&units, 6, None);
        let levels = HashMap::from([("a".to_string(), 999)]);
        let o = apply_level_overrides(&r, &levels);
        assert_eq!(o.team[0].level, 3);
        assert_eq!(o.total_dps, 40.0);
        assert_eq!(o, r);
    }

    #[test]
    fn rerank_restores_score_order() {
        // "a" is far ahead at level 2 and nearly worthless at level 1.
        let a = unit("a", "Godly", 1_000.0, &[(1_000.0, 10.0), (0.0, 10_000.0)]);
        let b = flat("b", "Mythic", 100.0, 500.0);
        let mut ranked = vec![
            RankedResult {
                strategy: Strategy::Greedy,
                result: TeamResult::from_team(vec![TeamMember::new(&a, 2)]),
            },
            RankedResult {
                strategy: Strategy::Balanced,
                result: TeamResult::from_team(vec![TeamMember::new(&b, 1)]),
            },
        ];
        sort_by_score(&mut ranked);
        assert_eq!(ranked[0].strategy, Strategy::Greedy);

        let levels = HashMap::from([("a".to_string(), 1)]);
        let reranked = rerank_with_levels(&ranked, &levels);
        assert_eq!(reranked[0].strategy, Strategy::Balanced);
        assert_eq!(reranked[1].result.team[0].level, 1);
        for w in reranked.windows(2) {
            assert!(w[0].result.score >= w[1].result.score);
        }
    }
}
