//! Roster and technique loading from the data service's JSON export.

use super::{Technique, Unit};
use crate::error::LoadError;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Parse a JSON array of units. Each unit's upgrade rows are sorted by level,
/// matching what the data service hands to the calculator.
pub fn parse_roster(json: &str) -> Result<Vec<Unit>, LoadError> {
    let mut units: Vec<Unit> =
        serde_json::from_str(json).map_err(|e| LoadError::json("roster", e))?;
    for u in &mut units {
        u.upgrades.sort_by_key(|s| s.level);
    }
    Ok(units)
}

pub fn load_roster(path: &Path) -> Result<Vec<Unit>, LoadError> {
    let s = fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
    let units = parse_roster(&s).map_err(|e| match e {
        LoadError::Json { source, .. } => LoadError::json(path.display().to_string(), source),
        other => other,
    })?;
    tracing::debug!("loaded {} unit(s) from {}", units.len(), path.display());
    Ok(units)
}

pub fn parse_techniques(json: &str) -> Result<Vec<Technique>, LoadError> {
    serde_json::from_str(json).map_err(|e| LoadError::json("techniques", e))
}

pub fn load_techniques(path: &Path) -> Result<Vec<Technique>, LoadError> {
    let s = fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
    let techniques = parse_techniques(&s).map_err(|e| match e {
        LoadError::Json { source, .. } => LoadError::json(path.display().to_string(), source),
        other => other,
    })?;
    tracing::debug!("loaded {} technique(s) from {}", techniques.len(), path.display());
    Ok(techniques)
}

/// Sorted, de-duplicated rarity tags present in the roster.
pub fn distinct_rarities(units: &[Unit]) -> Vec<String> {
    units
        .iter()
        .map(|u| u.rarity.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Narrow a roster the way the calculator's unit picker does.
#[derive(Debug, Clone, Default)]
pub struct RosterFilter {
    /// Case-insensitive substring of the unit name.
    pub search: Option<String>,
    /// Exact rarity tag.
    pub rarity: Option<String>,
    /// Drop units with an empty upgrade table.
    pub require_upgrades: bool,
}

impl RosterFilter {
    pub fn matches(&self, unit: &Unit) -> bool {
        if self.require_upgrades && unit.upgrades.is_empty() {
            return false;
        }
        if let Some(r) = &self.rarity {
            if &unit.rarity != r {
                return false;
            }
        }
        match &self.search {
            Some(q) => unit.name.to_lowercase().contains(&q.to_lowercase()),
            None => true,
        }
    }

    pub fn apply<'a>(&self, units: &'a [Unit]) -> Vec<&'a Unit> {
        units.iter().filter(|u| self.matches(u)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::unit;

    #[test]
    fn parse_roster_sorts_rows_by_level() {
        let json = r#"[{
            "id": "u1", "name": "One", "rarity": "Godly", "deploymentCost": 100,
            "upgrades": [
                {"level": 2, "upgradeCost": 50, "damage": 20, "range": 10, "spa": 1, "dps": 20},
                {"level": 1, "upgradeCost": 0, "damage": 10, "range": 10, "spa": 1, "dps": 10}
            ]
        }]"#;
        let units = parse_roster(json).unwrap();
        assert_eq!(units[0].upgrades[0].level, 1);
        assert_eq!(units[0].upgrades[1].level, 2);
    }

    #[test]
    fn parse_roster_rejects_bad_json() {
        assert!(matches!(parse_roster("{"), Err(LoadError::Json { .. })));
    }

    #[test]
    fn load_roster_missing_file_is_io_error() {
        let err = load_roster(Path::new("/nonexistent/roster.json")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn filter_by_search_rarity_and_rows() {
        let units = vec![
            unit("Sung Jin", "Godly", 100.0, &[(0.0, 10.0)]),
            unit("Song Bird", "Mythic", 100.0, &[(0.0, 10.0)]),
            unit("Empty Song", "Mythic", 100.0, &[]),
        ];
        let f = RosterFilter {
            search: Some("SONG".to_string()),
            rarity: None,
            require_upgrades: true,
        };
        let picked: Vec<_> = f.apply(&units).into_iter().map(|u| u.id.as_str()).collect();
        assert_eq!(picked, vec!["Song Bird"]);

        let f = RosterFilter {
            rarity: Some("Mythic".to_string()),
            ..RosterFilter::default()
        };
        assert_eq!(f.apply(&units).len(), 2);
    }

    #[test]
    fn parse_techniques_keeps_metadata() {
        let json = r#"[{"id": "t1", "name": "Overlord", "tier": 1, "effects": {"critChanceBonus": 20}}]"#;
        let t = parse_techniques(json).unwrap();
        assert_eq!(t[0].tier, 1);
        assert_eq!(t[0].effects.crit_chance_bonus, Some(20.0));
        assert!(t[0].description.is_empty());
    }

    #[test]
    fn load_techniques_reports_file_in_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("techniques.json");
        fs::write(&path, "[{").unwrap();
        match load_techniques(&path) {
            Err(LoadError::Json { context, .. }) => assert!(context.ends_with("techniques.json")),
            other => panic!("expected json error, got {:?}", other),
        }
    }

    #[test]
    fn rarities_sorted_unique() {
        let units = vec![
            unit("a", "Mythic", 1.0, &[]),
            unit("b", "Godly", 1.0, &[]),
            unit("c", "Mythic", 1.0, &[]),
        ];
        assert_eq!(distinct_rarities(&units), vec!["Godly", "Mythic"]);
    }
}
