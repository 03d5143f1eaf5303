//! # Circuit Files
//!
//! A circuit (placed components plus wires) stored as JSON, so a bench can
//! be saved from a [`Workspace`] and loaded back.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rusty_circuit::circuit_config::CircuitConfig;
//!
//! let config = CircuitConfig::load_json("configs/blink.json").expect("Could not load circuit!");
//! let workspace = config.build_workspace().expect("Invalid circuit!");
//! println!("Loaded {} with {} wires", config.name, workspace.wires().len());
//! ```
//!
//! ## File Format
//!
//! ```json
//! {
//!   "name": "Blink",
//!   "description": "On-board LED pin driving an external LED",
//!   "version": "1.0",
//!   "components": [
//!     {"id": "uno", "kind": "arduino-uno", "x": 40, "y": 60},
//!     {"id": "led", "kind": "led-red", "x": 600, "y": 40}
//!   ],
//!   "wires": [
//!     {
//!       "start": {"component": "uno", "pin": "D13"},
//!       "end": {"component": "led", "pin": "anode"},
//!       "bend_points": [{"x": 560, "y": 88}],
//!       "color": "green"
//!     }
//!   ]
//! }
//! ```
//!
//! Components are placed in file order, which fixes the driver order used
//! when two boards reach the same indicator.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use tracing::info;

use crate::component::{ComponentInstance, ComponentKind};
use crate::connection::{WireColor, WireStore};
use crate::error::{Result, SimError};
use crate::pin::Endpoint;
use crate::placement::PlacementStore;
use crate::types::Point;
use crate::workspace::Workspace;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub components: Vec<ComponentConfig>,
    #[serde(default)]
    pub wires: Vec<WireConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentConfig {
    pub id: String,
    pub kind: ComponentKind,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinReference {
    pub component: String,
    pub pin: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireConfig {
    pub start: PinReference,
    pub end: PinReference,
    #[serde(default)]
    pub bend_points: Vec<Point>,
    #[serde(default)]
    pub color: WireColor,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl PinReference {
    fn to_endpoint(&self) -> Endpoint {
        Endpoint::new(self.component.as_str(), self.pin.as_str())
    }

    fn from_endpoint(endpoint: &Endpoint) -> Self {
        PinReference {
            component: endpoint.component.to_string(),
            pin: endpoint.pin.clone(),
        }
    }
}

impl CircuitConfig {
    pub fn new(name: impl Into<String>) -> Self {
        CircuitConfig {
            name: name.into(),
            description: String::new(),
            version: default_version(),
            metadata: HashMap::new(),
            components: Vec::new(),
            wires: Vec::new(),
        }
    }

    pub fn from_json(content: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn load_json(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| SimError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| SimError::Json {
            path: path.to_string(),
            source,
        })
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Build a workspace, rejecting duplicate ids, dangling wire ends and
    /// same-component wires.
    pub fn build_workspace(&self) -> Result<Workspace> {
        let mut placement = PlacementStore::new();
        for component in &self.components {
            let instance = ComponentInstance::new(
                component.id.as_str(),
                component.kind,
                Point::new(component.x, component.y),
            );
            if !placement.insert(instance) {
                return Err(SimError::DuplicateComponent(component.id.clone()));
            }
        }

        let mut wires = WireStore::new();
        for wire in &self.wires {
            let start = wire.start.to_endpoint();
            let end = wire.end.to_endpoint();
            for endpoint in [&start, &end] {
                if !placement.contains(&endpoint.component) {
                    return Err(SimError::UnknownComponent(endpoint.component.to_string()));
                }
            }
            if wires
                .connect(start.clone(), end, wire.bend_points.clone(), wire.color)
                .is_none()
            {
                return Err(SimError::SameComponentWire(start.to_string()));
            }
        }

        info!(
            circuit = %self.name,
            components = placement.len(),
            wires = wires.len(),
            "built workspace from circuit"
        );
        Ok(Workspace::from_parts(placement, wires))
    }

    /// Snapshot a workspace. Wiring session and selection are not saved.
    pub fn from_workspace(name: impl Into<String>, workspace: &Workspace) -> Self {
        let mut config = CircuitConfig::new(name);
        config.components = workspace
            .placement()
            .iter()
            .map(|c| ComponentConfig {
                id: c.id.to_string(),
                kind: c.kind,
                x: c.position.x,
                y: c.position.y,
            })
            .collect();
        config.wires = workspace
            .wires()
            .iter()
            .map(|w| WireConfig {
                start: PinReference::from_endpoint(&w.start),
                end: PinReference::from_endpoint(&w.end),
                bend_points: w.bend_points.clone(),
                color: w.color,
            })
            .collect();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BENCH: &str = r#"{
        "name": "Bench",
        "components": [
            {"id": "uno", "kind": "arduino-uno", "x": 0, "y": 0},
            {"id": "r1", "kind": "resistor", "x": 500, "y": 0},
            {"id": "led", "kind": "led-yellow", "x": 600, "y": 0}
        ],
        "wires": [
            {"start": {"component": "uno", "pin": "D10"}, "end": {"component": "r1", "pin": "lead1"}},
            {"start": {"component": "r1", "pin": "lead2"}, "end": {"component": "led", "pin": "anode"},
             "bend_points": [{"x": 550, "y": 130}], "color": "blue"}
        ]
    }"#;

    #[test]
    fn test_build_workspace_from_json() {
        let config = CircuitConfig::from_json(BENCH).unwrap();
        assert_eq!(config.version, "1.0");

        let ws = config.build_workspace().unwrap();
        assert_eq!(ws.placement().len(), 3);
        assert_eq!(ws.wires().len(), 2);
        let blue = ws.wires().iter().find(|w| w.color == WireColor::Blue).unwrap();
        assert_eq!(blue.bend_points, vec![Point::new(550.0, 130.0)]);
    }

    #[test]
    fn test_export_then_rebuild_preserves_circuit() {
        let ws = CircuitConfig::from_json(BENCH).unwrap().build_workspace().unwrap();
        let exported = CircuitConfig::from_workspace("Bench", &ws);
        let rebuilt = CircuitConfig::from_json(&exported.to_json().unwrap())
            .unwrap()
            .build_workspace()
            .unwrap();

        assert_eq!(rebuilt.placement().len(), 3);
        assert_eq!(
            CircuitConfig::from_workspace("Bench", &rebuilt).wires,
            exported.wires
        );
    }

    #[test]
    fn test_validation_errors() {
        let mut config = CircuitConfig::from_json(BENCH).unwrap();
        config.components.push(config.components[0].clone());
        assert!(matches!(
            config.build_workspace(),
            Err(SimError::DuplicateComponent(id)) if id == "uno"
        ));

        let mut config = CircuitConfig::from_json(BENCH).unwrap();
        config.wires[0].end.component = "ghost".to_string();
        assert!(matches!(
            config.build_workspace(),
            Err(SimError::UnknownComponent(id)) if id == "ghost"
        ));

        let mut config = CircuitConfig::from_json(BENCH).unwrap();
        config.wires[0].end = PinReference {
            component: "uno".to_string(),
            pin: "GND_1".to_string(),
        };
        assert!(matches!(
            config.build_workspace(),
            Err(SimError::SameComponentWire(_))
        ));
    }

    #[test]
    fn test_unknown_kind_is_parse_error() {
        let json = r#"{"name": "x", "components": [{"id": "a", "kind": "lcd", "x": 0, "y": 0}]}"#;
        assert!(CircuitConfig::from_json(json).is_err());
    }
}
