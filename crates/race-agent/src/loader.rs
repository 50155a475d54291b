//! CSV roster loader.
//!
//! # CSV format
//!
//! One row per agent.  Only `name`, `x`, `y` and `z` are required; every
//! other column may be omitted or left empty to take the
//! [`AgentConfig::default`] value.
//!
//! ```csv
//! name,kind,x,y,z,mass,radius,behavior,max_speed,aggression,fuel_efficiency,waypoints
//! Red,vehicle,0,0,0,800,2,race,90,0.9,0.7,
//! Hawk,drone,10,20,0,5,0.5,patrol,30,0.2,0.95,0:20:0;100:20:0;100:20:100
//! ```
//!
//! **`waypoints`**: `;`-separated points, each `x:y:z`.
//! **`target`**: the follow target's `AgentId` as an integer.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use race_core::{AgentId, Vec3};

use crate::{AgentConfig, AgentError, AgentResult};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct AgentRecord {
    name:                 String,
    x:                    f64,
    y:                    f64,
    z:                    f64,
    #[serde(default)] kind:                 Option<String>,
    #[serde(default)] heading:              Option<f64>,
    #[serde(default)] vx:                   Option<f64>,
    #[serde(default)] vy:                   Option<f64>,
    #[serde(default)] vz:                   Option<f64>,
    #[serde(default)] mass:                 Option<f64>,
    #[serde(default)] radius:               Option<f64>,
    #[serde(default)] area:                 Option<f64>,
    #[serde(default)] drag_coefficient:     Option<f64>,
    #[serde(default)] friction_coefficient: Option<f64>,
    #[serde(default)] restitution:          Option<f64>,
    #[serde(default)] gravity_affected:     Option<bool>,
    #[serde(default)] max_speed:            Option<f64>,
    #[serde(default)] acceleration:         Option<f64>,
    #[serde(default)] turning_rate:         Option<f64>,
    #[serde(default)] sensor_range:         Option<f64>,
    #[serde(default)] aggression:           Option<f64>,
    #[serde(default)] fuel_efficiency:      Option<f64>,
    #[serde(default)] ai_enabled:           Option<bool>,
    #[serde(default)] behavior:             Option<String>,
    #[serde(default)] target:               Option<u32>,
    #[serde(default)] waypoints:            Option<String>,
    #[serde(default)] decision_interval:    Option<f64>,
}

impl AgentRecord {
    fn into_config(self) -> AgentResult<AgentConfig> {
        let d = AgentConfig::default();
        let velocity = Vec3::new(
            self.vx.unwrap_or(0.0),
            self.vy.unwrap_or(0.0),
            self.vz.unwrap_or(0.0),
        );
        Ok(AgentConfig {
            kind: match non_empty(self.kind.as_deref()) {
                Some(k) => k.parse()?,
                None => d.kind,
            },
            behavior: match non_empty(self.behavior.as_deref()) {
                Some(b) => b.parse()?,
                None => d.behavior,
            },
            waypoints: match non_empty(self.waypoints.as_deref()) {
                Some(w) => parse_waypoints(w)?,
                None => Vec::new(),
            },
            position:             Vec3::new(self.x, self.y, self.z),
            velocity,
            heading:              self.heading.unwrap_or(d.heading),
            mass:                 self.mass.unwrap_or(d.mass),
            radius:               self.radius.unwrap_or(d.radius),
            area:                 self.area.unwrap_or(d.area),
            drag_coefficient:     self.drag_coefficient,
            friction_coefficient: self.friction_coefficient,
            restitution:          self.restitution,
            gravity_affected:     self.gravity_affected.unwrap_or(d.gravity_affected),
            max_speed:            self.max_speed.unwrap_or(d.max_speed),
            acceleration:         self.acceleration.unwrap_or(d.acceleration),
            turning_rate:         self.turning_rate.unwrap_or(d.turning_rate),
            sensor_range:         self.sensor_range.unwrap_or(d.sensor_range),
            aggression:           self.aggression.unwrap_or(d.aggression),
            fuel_efficiency:      self.fuel_efficiency.unwrap_or(d.fuel_efficiency),
            ai_enabled:           self.ai_enabled.unwrap_or(d.ai_enabled),
            target:               self.target.map(AgentId),
            decision_interval:    self.decision_interval.unwrap_or(d.decision_interval),
            name:                 self.name,
        })
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_waypoints(s: &str) -> AgentResult<Vec<Vec3>> {
    s.split(';')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|point| {
            let coords: Vec<f64> = point
                .split(':')
                .map(|c| c.trim().parse::<f64>())
                .collect::<Result<_, _>>()
                .map_err(|e| AgentError::Parse(format!("waypoint `{point}`: {e}")))?;
            match coords.as_slice() {
                &[x, y, z] => Ok(Vec3::new(x, y, z)),
                _ => Err(AgentError::Parse(format!("waypoint `{point}` must be x:y:z"))),
            }
        })
        .collect()
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load and validate an agent roster from a CSV file.
pub fn load_agents_csv(path: &Path) -> AgentResult<Vec<AgentConfig>> {
    let file = std::fs::File::open(path).map_err(AgentError::Io)?;
    load_agents_reader(file)
}

/// Like [`load_agents_csv`] but accepts any `Read` source.
pub fn load_agents_reader<R: Read>(reader: R) -> AgentResult<Vec<AgentConfig>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut configs = Vec::new();

    for (row, result) in csv_reader.deserialize::<AgentRecord>().enumerate() {
        let record = result.map_err(|e| AgentError::Parse(e.to_string()))?;
        let cfg = record
            .into_config()
            .map_err(|e| AgentError::Parse(format!("row {}: {e}", row + 1)))?;
        cfg.validate()?;
        configs.push(cfg);
    }
    Ok(configs)
}
