//! The player's own unit collection ("my units").
//!
//! A keyed collection of owned unit instances with change notification. The
//! scoring engine never reads it; callers turn it into a roster and a level map.

use crate::error::LoadError;
use crate::model::Unit;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver, Sender};
use uuid::Uuid;

/// One owned copy of a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUnit {
    pub instance_id: String,
    pub unit_id: String,
    pub level: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolEvent {
    Added(UserUnit),
    Updated(UserUnit),
    Removed(String),
}

pub trait UnitPool {
    fn list(&self) -> Vec<UserUnit>;
    fn get(&self, instance_id: &str) -> Option<UserUnit>;
    fn add(&mut self, unit_id: &str, level: u32) -> UserUnit;
    /// `None` when the instance does not exist.
    fn update(&mut self, instance_id: &str, level: u32) -> Option<UserUnit>;
    /// `false` when the instance does not exist.
    fn remove(&mut self, instance_id: &str) -> bool;
    /// Bumped on every successful mutation; poll to detect changes.
    fn revision(&self) -> u64;
    fn subscribe(&mut self) -> Receiver<PoolEvent>;
}

#[derive(Debug, Default)]
pub struct MemoryPool {
    units: Vec<UserUnit>,
    revision: u64,
    subscribers: Vec<Sender<PoolEvent>>,
}

impl MemoryPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let units: Vec<UserUnit> =
            serde_json::from_str(json).map_err(|e| LoadError::json("unit pool", e))?;
        Ok(Self {
            units,
            ..Self::default()
        })
    }

    pub fn to_json(&self) -> Result<String, LoadError> {
        serde_json::to_string_pretty(&self.units).map_err(|e| LoadError::json("unit pool", e))
    }

    fn notify(&mut self, event: PoolEvent) {
        self.revision += 1;
        // Dropped receivers are pruned on the next send.
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Highest owned level per unit id, for use as optimizer level overrides.
    pub fn level_map(&self) -> HashMap<String, u32> {
        let mut out: HashMap<String, u32> = HashMap::new();
        for u in &self.units {
            let e = out.entry(u.unit_id.clone()).or_insert(u.level);
            *e = (*e).max(u.level);
        }
        out
    }

    /// Roster entries for owned unit ids, in roster order. Unknown ids are skipped.
    pub fn owned_units<'a>(&self, roster: &'a [Unit]) -> Vec<&'a Unit> {
        let owned = self.level_map();
        roster.iter().filter(|u| owned.contains_key(&u.id)).collect()
    }
}

impl UnitPool for MemoryPool {
    fn list(&self) -> Vec<UserUnit> {
        self.units.clone()
    }

    fn get(&self, instance_id: &str) -> Option<UserUnit> {
        self.units
            .iter()
            .find(|u| u.instance_id == instance_id)
            .cloned()
    }

    fn add(&mut self, unit_id: &str, level: u32) -> UserUnit {
        let u = UserUnit {
            instance_id: Uuid::new_v4().to_string(),
            unit_id: unit_id.to_string(),
            level,
        };
        self.units.push(u.clone());
        self.notify(PoolEvent::Added(u.clone()));
        u
    }

    fn update(&mut self, instance_id: &str, level: u32) -> Option<UserUnit> {
        let u = self.units.iter_mut().find(|u| u.instance_id == instance_id)?;
        u.level = level;
        let updated = u.clone();
        self.notify(PoolEvent::Updated(updated.clone()));
        Some(updated)
    }

    fn remove(&mut self, instance_id: &str) -> bool {
        let before = self.units.len();
        self.units.retain(|u| u.instance_id != instance_id);
        if self.units.len() == before {
            return false;
        }
        self.notify(PoolEvent::Removed(instance_id.to_string()));
        true
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn subscribe(&mut self) -> Receiver<PoolEvent> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }
}
