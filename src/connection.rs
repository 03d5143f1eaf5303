use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

use crate::geometry::PinCatalogue;
use crate::pin::Endpoint;
use crate::placement::PlacementStore;
use crate::types::{ComponentId, Point, WireId};

/// Display colour of a wire; no electrical meaning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireColor {
    #[default]
    Red,
    Green,
    Blue,
    Yellow,
    Orange,
    Purple,
    White,
    Black,
}

impl WireColor {
    pub const ALL: [WireColor; 8] = [
        WireColor::Red,
        WireColor::Green,
        WireColor::Blue,
        WireColor::Yellow,
        WireColor::Orange,
        WireColor::Purple,
        WireColor::White,
        WireColor::Black,
    ];

    pub fn hex(&self) -> &'static str {
        match self {
            WireColor::Red => "#FF0000",
            WireColor::Green => "#00FF00",
            WireColor::Blue => "#0066FF",
            WireColor::Yellow => "#FFFF00",
            WireColor::Orange => "#FF6600",
            WireColor::Purple => "#9900FF",
            WireColor::White => "#FFFFFF",
            WireColor::Black => "#333333",
        }
    }

    pub fn next(&self) -> WireColor {
        let index = Self::ALL.iter().position(|c| c == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

/// Undirected edge between two named pins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wire {
    pub id: WireId,
    pub start: Endpoint,
    pub end: Endpoint,
    pub bend_points: Vec<Point>,
    pub color: WireColor,
}

impl Wire {
    pub fn touches(&self, component: &ComponentId) -> bool {
        self.start.is_on(component) || self.end.is_on(component)
    }

    /// The endpoint across the wire from `from`, if `from` is one of its ends.
    pub fn other_end(&self, from: &Endpoint) -> Option<&Endpoint> {
        if &self.start == from {
            Some(&self.end)
        } else if &self.end == from {
            Some(&self.start)
        } else {
            None
        }
    }

    /// Start pin, bend points, end pin. Empty if either component is gone.
    pub fn polyline(&self, catalogue: &PinCatalogue, placement: &PlacementStore) -> Vec<Point> {
        let (Some(start), Some(end)) = (
            catalogue.resolve_endpoint(placement, &self.start),
            catalogue.resolve_endpoint(placement, &self.end),
        ) else {
            return Vec::new();
        };

        let mut points = Vec::with_capacity(self.bend_points.len() + 2);
        points.push(start);
        points.extend_from_slice(&self.bend_points);
        points.push(end);
        points
    }
}

/// New wire to be created by a bulk replacement
#[derive(Debug, Clone, PartialEq)]
pub struct WireSpec {
    pub start: Endpoint,
    pub end: Endpoint,
    pub bend_points: Vec<Point>,
    pub color: WireColor,
}

impl WireSpec {
    pub fn new(start: Endpoint, end: Endpoint) -> Self {
        WireSpec {
            start,
            end,
            bend_points: Vec::new(),
            color: WireColor::default(),
        }
    }

    pub fn with_color(mut self, color: WireColor) -> Self {
        self.color = color;
        self
    }
}

/// Owns every wire on the canvas
#[derive(Debug, Clone, Default)]
pub struct WireStore {
    wires: Vec<Wire>,
    next_id: u64,
}

impl WireStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect two pins. Returns `None` (no-op) when both are on one component.
    pub fn connect(
        &mut self,
        start: Endpoint,
        end: Endpoint,
        bend_points: Vec<Point>,
        color: WireColor,
    ) -> Option<WireId> {
        if start.same_component(&end) {
            debug!(%start, %end, "rejected same-component wire");
            return None;
        }

        self.next_id += 1;
        let id = WireId::new(self.next_id);
        debug!(wire = %id, %start, %end, bends = bend_points.len(), "connected pins");
        self.wires.push(Wire {
            id,
            start,
            end,
            bend_points,
            color,
        });
        Some(id)
    }

    pub fn disconnect(&mut self, id: WireId) -> Option<Wire> {
        let index = self.wires.iter().position(|w| w.id == id)?;
        Some(self.wires.remove(index))
    }

    /// Remove every wire with an end on `component`.
    pub fn disconnect_all(&mut self, component: &ComponentId) -> Vec<Wire> {
        let (removed, kept): (Vec<Wire>, Vec<Wire>) =
            self.wires.drain(..).partition(|w| w.touches(component));
        self.wires = kept;
        removed
    }

    /// Replace every wire touching `component` with `specs` in one step.
    ///
    /// Specs joining two pins of one component are dropped. The old wires are
    /// gone and the new ones present before this returns.
    pub fn replace_incident(&mut self, component: &ComponentId, specs: Vec<WireSpec>) -> Vec<WireId> {
        let removed = self.disconnect_all(component);
        let created: Vec<WireId> = specs
            .into_iter()
            .filter_map(|spec| self.connect(spec.start, spec.end, spec.bend_points, spec.color))
            .collect();
        debug!(
            component = %component,
            removed = removed.len(),
            created = created.len(),
            "rewired component"
        );
        created
    }

    pub fn get(&self, id: WireId) -> Option<&Wire> {
        self.wires.iter().find(|w| w.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Wire> {
        self.wires.iter()
    }

    /// Endpoint -> neighbouring endpoints, one entry per wire end
    pub fn adjacency(&self) -> HashMap<&Endpoint, Vec<&Endpoint>> {
        let mut adjacency: HashMap<&Endpoint, Vec<&Endpoint>> = HashMap::new();
        for wire in &self.wires {
            adjacency.entry(&wire.start).or_default().push(&wire.end);
            adjacency.entry(&wire.end).or_default().push(&wire.start);
        }
        adjacency
    }

    /// Groups of endpoints joined directly by wires (components do not conduct here).
    pub fn connection_groups(&self) -> Vec<Vec<Endpoint>> {
        let adjacency = self.adjacency();
        let mut visited: HashSet<&Endpoint> = HashSet::new();
        let mut groups = Vec::new();

        // Walk wires in store order so group order is stable.
        let seeds = self.wires.iter().flat_map(|w| [&w.start, &w.end]);
        for seed in seeds {
            if visited.contains(seed) {
                continue;
            }
            let mut group = Vec::new();
            let mut queue = VecDeque::new();
            queue.push_back(seed);

            while let Some(current) = queue.pop_front() {
                if visited.insert(current) {
                    group.push(current.clone());
                    if let Some(neighbors) = adjacency.get(current) {
                        for &neighbor in neighbors {
                            if !visited.contains(neighbor) {
                                queue.push_back(neighbor);
                            }
                        }
                    }
                }
            }

            if group.len() > 1 {
                groups.push(group);
            }
        }

        groups
    }

    pub fn len(&self) -> usize {
        self.wires.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wires.is_empty()
    }
}
