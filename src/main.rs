//! Team DPS calculator — CLI.

use als_teamcalc::advisor::recommend_upgrades;
use als_teamcalc::anomaly::{audit_roster, audit_unit, Anomaly, AnomalySeverity};
use als_teamcalc::config::CalcConfig;
use als_teamcalc::dps::{cumulative_cost, effective_dps, efficiency, recommended_level};
use als_teamcalc::model::{distinct_rarities, load_roster, load_techniques, RosterFilter, Unit};
use als_teamcalc::optimizer::{
    apply_level_overrides, optimize_balanced, optimize_greedy, recommend_teams,
    rerank_with_levels, Strategy, TeamResult,
};
use als_teamcalc::pool::{MemoryPool, UnitPool};
use als_teamcalc::report::{write_json_report, Report, TeamReport, UpgradeRow};
use als_teamcalc::role::{classify, RoleThresholds};
use als_teamcalc::util::{find_unit, init_logging, normalize_id};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "als-teamcalc")]
#[command(about = "Team DPS calculator: unit scoring, team optimization and upgrade advice")]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML file overriding team size, budgets and role thresholds.
    #[arg(long, global = true, value_name = "TOML")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Greedy,
    Balanced,
    All,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend a team from a roster and print upgrade advice for it.
    Optimize {
        #[arg(long, value_name = "JSON")]
        roster: PathBuf,
        #[arg(long, value_enum, default_value_t = StrategyArg::Balanced)]
        strategy: StrategyArg,
        #[arg(long)]
        team_size: Option<usize>,
        /// Cost cap for the greedy strategy.
        #[arg(long)]
        budget: Option<f64>,
        #[arg(
            long,
            value_name = "JSON",
            help = "Optional: JSON file { \"unit_id\": level } with user-chosen levels"
        )]
        levels: Option<PathBuf>,
        /// Only consider units owned in this pool file; owned levels become overrides.
        #[arg(long, value_name = "JSON")]
        pool: Option<PathBuf>,
        /// Case-insensitive unit name filter.
        #[arg(long)]
        search: Option<String>,
        /// Only consider units of this rarity.
        #[arg(long)]
        rarity: Option<String>,
        /// Field units without a chosen level at the optimizer's capped level
        /// instead of their recommended level.
        #[arg(long)]
        optimizer_levels: bool,
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
    /// Rank level-ups for a fixed team.
    Upgrades {
        #[arg(long, value_name = "JSON")]
        roster: PathBuf,
        #[arg(
            long,
            value_name = "JSON",
            help = "JSON array [{ \"unitId\": ..., \"level\": ... }]"
        )]
        team: PathBuf,
        #[arg(long)]
        max: Option<usize>,
    },
    /// Print readable summary for one unit (by ID or name).
    Unit {
        #[arg(long, value_name = "JSON")]
        roster: PathBuf,
        #[arg(long)]
        level: Option<u32>,
        /// Technique name to apply (requires --techniques).
        #[arg(long)]
        technique: Option<String>,
        #[arg(long, value_name = "JSON")]
        techniques: Option<PathBuf>,
        unit_id_or_name: String,
    },
    /// Check unit tables for data-quality problems.
    Audit {
        #[arg(long, value_name = "JSON")]
        roster: PathBuf,
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
    /// Manage the owned-units pool file.
    Pool {
        #[arg(long, value_name = "JSON")]
        file: PathBuf,
        #[command(subcommand)]
        action: PoolAction,
    },
}

#[derive(Subcommand)]
enum PoolAction {
    List,
    Add {
        unit_id: String,
        #[arg(long, default_value_t = 1)]
        level: u32,
    },
    Update {
        instance_id: String,
        level: u32,
    },
    Remove {
        instance_id: String,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TeamEntry {
    unit_id: String,
    level: u32,
}

fn main() -> Result<(), String> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let cfg = match &cli.config {
        Some(p) => CalcConfig::load(p).map_err(|e| e.to_string())?,
        None => CalcConfig::default(),
    };

    match cli.command {
        Commands::Optimize {
            roster,
            strategy,
            team_size,
            budget,
            levels,
            pool,
            search,
            rarity,
            optimizer_levels,
            out,
        } => run_optimize(
            &cfg,
            &roster,
            strategy,
            team_size.unwrap_or(cfg.team_size),
            budget.or(cfg.max_total_cost),
            levels,
            pool,
            RosterFilter {
                search,
                rarity,
                require_upgrades: true,
            },
            !optimizer_levels,
            out,
        ),
        Commands::Upgrades { roster, team, max } => {
            run_upgrades(&roster, &team, max.unwrap_or(cfg.max_recommendations))
        }
        Commands::Unit {
            roster,
            level,
            technique,
            techniques,
            unit_id_or_name,
        } => run_unit(&cfg, &roster, level, technique, techniques, &unit_id_or_name),
        Commands::Audit { roster, out } => run_audit(&roster, out),
        Commands::Pool { file, action } => run_pool(&file, action),
    }
}

/// Load levels override: { "unit_id": level, ... }
fn load_levels(path: &Path) -> Result<HashMap<String, u32>, String> {
    let s = fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&s).map_err(|e| e.to_string())
}

fn load_pool(path: &Path) -> Result<MemoryPool, String> {
    if !path.exists() {
        return Ok(MemoryPool::new());
    }
    let s = fs::read_to_string(path).map_err(|e| e.to_string())?;
    MemoryPool::from_json(&s).map_err(|e| e.to_string())
}

#[allow(clippy::too_many_arguments)]
fn run_optimize(
    cfg: &CalcConfig,
    roster_path: &Path,
    strategy: StrategyArg,
    team_size: usize,
    budget: Option<f64>,
    levels_path: Option<PathBuf>,
    pool_path: Option<PathBuf>,
    filter: RosterFilter,
    seed_recommended: bool,
    out: Option<PathBuf>,
) -> Result<(), String> {
    let roster = load_roster(roster_path).map_err(|e| e.to_string())?;

    let mut levels: HashMap<String, u32> = HashMap::new();
    let candidates: Vec<Unit> = match &pool_path {
        Some(p) => {
            let pool = load_pool(p)?;
            levels.extend(pool.level_map());
            pool.owned_units(&roster)
                .into_iter()
                .filter(|u| filter.matches(u))
                .cloned()
                .collect()
        }
        None => filter.apply(&roster).into_iter().cloned().collect(),
    };
    if let Some(p) = &levels_path {
        levels.extend(load_levels(p)?);
    }
    if seed_recommended {
        for u in &candidates {
            levels
                .entry(u.id.clone())
                .or_insert_with(|| recommended_level(u));
        }
    }
    tracing::info!(
        "optimizing over {} candidate unit(s), team size {}",
        candidates.len(),
        team_size
    );

    let mut results: Vec<(Option<Strategy>, TeamResult<'_>)> = match strategy {
        StrategyArg::Greedy => vec![(
            Some(Strategy::Greedy),
            optimize_greedy(&candidates, team_size, budget),
        )],
        StrategyArg::Balanced => vec![(
            Some(Strategy::Balanced),
            optimize_balanced(&candidates, team_size),
        )],
        StrategyArg::All => {
            let ranked = recommend_teams(&candidates, team_size, cfg.low_cost_budget);
            rerank_with_levels(&ranked, &levels)
                .into_iter()
                .map(|r| (Some(r.strategy), r.result))
                .collect()
        }
    };
    if !levels.is_empty() && !matches!(strategy, StrategyArg::All) {
        for (_, r) in &mut results {
            *r = apply_level_overrides(r, &levels);
        }
    }

    let mut report = Report::new(candidates.len());
    for (strategy, r) in &results {
        print_team(*strategy, r, &cfg.roles);
        report.teams.push(TeamReport::new(*strategy, r, &cfg.roles));
    }

    if let Some((_, best)) = results.first() {
        let team: Vec<(&Unit, u32)> = best.team.iter().map(|m| (m.unit, m.level)).collect();
        let recs = recommend_upgrades(&team, cfg.max_recommendations);
        println!("\nUpgrade advice:");
        if recs.is_empty() {
            println!("  None");
        }
        for r in &recs {
            println!(
                "  {}  {} -> {}  cost={:.0}  +{:.1} DPS ({:.1}%)  per1k={:.2}",
                r.unit.id,
                r.current_level,
                r.target_level,
                r.cost,
                r.dps_gain,
                r.dps_gain_percent,
                r.efficiency
            );
        }
        report.upgrades = recs.iter().map(UpgradeRow::from).collect();
    }

    if let Some(dir) = out {
        let path = dir.join("report.json");
        write_json_report(&report, &path)?;
        tracing::info!("wrote {}", path.display());
    }
    Ok(())
}

fn print_team(strategy: Option<Strategy>, r: &TeamResult<'_>, roles: &RoleThresholds) {
    match strategy {
        Some(s) => println!("Team ({}):", s.label()),
        None => println!("Team:"),
    }
    for m in &r.team {
        println!(
            "  {:<24} {:<16} lvl {:>3}  {:<13}  dps={:.1}",
            m.unit.name,
            m.unit.rarity,
            m.level,
            classify(m.unit, roles).label(),
            effective_dps(m.unit, m.level, m.technique)
        );
    }
    if r.team.is_empty() {
        println!("  (no units selected)");
    }
    println!(
        "  total_dps={:.1}  total_cost={:.0}  avg_efficiency={:.5}  score={:.2}",
        r.total_dps, r.total_cost, r.avg_efficiency, r.score
    );
}

fn run_upgrades(roster_path: &Path, team_path: &Path, max: usize) -> Result<(), String> {
    let roster = load_roster(roster_path).map_err(|e| e.to_string())?;
    let s = fs::read_to_string(team_path).map_err(|e| e.to_string())?;
    let entries: Vec<TeamEntry> = serde_json::from_str(&s).map_err(|e| e.to_string())?;
    let mut team = Vec::with_capacity(entries.len());
    for e in &entries {
        let unit = find_unit(&roster, &e.unit_id).map_err(|e| e.to_string())?;
        team.push((unit, e.level));
    }
    let recs = recommend_upgrades(&team, max);
    if recs.is_empty() {
        println!("No upgrades available.");
    }
    for r in &recs {
        println!(
            "{}  {} -> {}  cost={:.0}  dps_gain={:.1}  gain%={:.1}  efficiency={:.3}",
            r.unit.id,
            r.current_level,
            r.target_level,
            r.cost,
            r.dps_gain,
            r.dps_gain_percent,
            r.efficiency
        );
    }
    Ok(())
}

fn run_unit(
    cfg: &CalcConfig,
    roster_path: &Path,
    level: Option<u32>,
    technique: Option<String>,
    techniques_path: Option<PathBuf>,
    unit_id_or_name: &str,
) -> Result<(), String> {
    let roster = load_roster(roster_path).map_err(|e| e.to_string())?;
    let unit = find_unit(&roster, unit_id_or_name).map_err(|e| e.to_string())?;

    let techniques = match &techniques_path {
        Some(p) => load_techniques(p).map_err(|e| e.to_string())?,
        None => vec![],
    };
    let tech = match &technique {
        Some(name) => Some(
            techniques
                .iter()
                .find(|t| normalize_id(&t.name) == normalize_id(name))
                .ok_or_else(|| format!("technique not found: {}", name))?,
        ),
        None => None,
    };

    let recommended = recommended_level(unit);
    let level = level.unwrap_or(recommended);
    println!("Unit: {} ({})", unit.id, unit.name);
    println!(
        "Rarity: {}  Element: {}  Max level: {}",
        unit.rarity,
        if unit.element.is_empty() { "—" } else { unit.element.as_str() },
        unit.max_level()
    );
    println!("Role: {}", classify(unit, &cfg.roles));
    println!("Recommended level: {}", recommended);
    println!("\nAt level {}:", level);
    println!("  dps={:.2}", effective_dps(unit, level, None));
    println!("  cost={:.0}", cumulative_cost(unit, level));
    println!("  efficiency={:.5}", efficiency(unit, level, None));
    if let Some(t) = tech {
        println!(
            "  with {}: dps={:.2}  efficiency={:.5}",
            t.name,
            effective_dps(unit, level, Some(t)),
            efficiency(unit, level, Some(t))
        );
    }
    println!("\nData quality:");
    print_anomalies(&audit_unit(unit));
    Ok(())
}

fn severity_label(s: &AnomalySeverity) -> &'static str {
    match s {
        AnomalySeverity::Info => "INFO",
        AnomalySeverity::Warn => "WARN",
        AnomalySeverity::Crit => "CRIT",
    }
}

fn print_anomalies(anomalies: &[Anomaly]) {
    for a in anomalies {
        println!("  [{}] {} — {}", a.code, severity_label(&a.severity), a.summary);
    }
    if anomalies.is_empty() {
        println!("  None");
    }
}

fn run_audit(roster_path: &Path, out: Option<PathBuf>) -> Result<(), String> {
    let roster = load_roster(roster_path).map_err(|e| e.to_string())?;
    let anomalies = audit_roster(&roster);
    println!("Audited {} unit(s): {} finding(s)", roster.len(), anomalies.len());
    println!("Rarities: {}", distinct_rarities(&roster).join(", "));
    print_anomalies(&anomalies);
    if let Some(dir) = out {
        let mut report = Report::new(roster.len());
        report.anomalies = anomalies;
        let path = dir.join("audit.json");
        write_json_report(&report, &path)?;
        tracing::info!("wrote {}", path.display());
    }
    Ok(())
}

fn run_pool(path: &Path, action: PoolAction) -> Result<(), String> {
    let mut pool = load_pool(path)?;
    let before = pool.revision();
    match action {
        PoolAction::List => {
            let units = pool.list();
            println!("Collection: {} unit(s)", units.len());
            for u in units {
                println!("  {}  {}  lvl {}", u.instance_id, u.unit_id, u.level);
            }
        }
        PoolAction::Add { unit_id, level } => {
            let u = pool.add(&unit_id, level);
            println!("added {} ({})", u.unit_id, u.instance_id);
        }
        PoolAction::Update { instance_id, level } => {
            pool.update(&instance_id, level)
                .ok_or_else(|| format!("no pool entry: {}", instance_id))?;
            println!("updated {}", instance_id);
        }
        PoolAction::Remove { instance_id } => {
            if !pool.remove(&instance_id) {
                return Err(format!("no pool entry: {}", instance_id));
            }
            println!("removed {}", instance_id);
        }
    }
    if pool.revision() != before {
        let json = pool.to_json().map_err(|e| e.to_string())?;
        fs::write(path, json).map_err(|e| e.to_string())?;
        tracing::debug!("saved pool to {}", path.display());
    }
    Ok(())
}
