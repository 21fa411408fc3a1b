//! Team DPS calculator — library entry point.
//!
//! Exposes the scoring engine (dps, optimizer, advisor, role) and the glue
//! around it (model loading, audit, pool, config, report) for the CLI and tests.

pub mod advisor;
pub mod anomaly;
pub mod config;
pub mod dps;
pub mod error;
pub mod model;
pub mod optimizer;
pub mod pool;
pub mod report;
pub mod role;
pub mod util;
