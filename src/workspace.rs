//! # Workspace
//!
//! Owns the placement store, the wire store and the wiring session, and
//! applies canvas events to them. All mutation goes through here so that
//! deleting a component and its wires is a single step.

use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::component::ComponentKind;
use crate::connection::{WireColor, WireSpec, WireStore};
use crate::geometry::PinCatalogue;
use crate::netlist::{propagate, DriverLevels, NetState, Netlist};
use crate::pin::Endpoint;
use crate::placement::PlacementStore;
use crate::types::{ComponentId, Point, WireId};
use crate::wiring::{WiringEvent, WiringOutcome, WiringSession};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Component(ComponentId),
    Wire(WireId),
}

#[derive(Debug, Clone, Default)]
pub struct Workspace {
    placement: PlacementStore,
    wires: WireStore,
    session: WiringSession,
    selection: Selection,
    wire_color: WireColor,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(placement: PlacementStore, wires: WireStore) -> Self {
        Workspace {
            placement,
            wires,
            ..Self::default()
        }
    }

    pub fn placement(&self) -> &PlacementStore {
        &self.placement
    }

    pub fn wires(&self) -> &WireStore {
        &self.wires
    }

    pub fn session(&self) -> &WiringSession {
        &self.session
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn wire_color(&self) -> WireColor {
        self.wire_color
    }

    pub fn set_wire_color(&mut self, color: WireColor) {
        self.wire_color = color;
    }

    pub fn place(&mut self, kind: ComponentKind, position: Point) -> ComponentId {
        self.placement.place(kind, position)
    }

    pub fn move_component(&mut self, id: &ComponentId, position: Point) -> bool {
        self.placement.move_to(id, position)
    }

    /// Remove a component together with every wire touching it.
    ///
    /// A drawing session that started on the component is cancelled as well.
    /// Unknown ids are a no-op.
    pub fn delete_component(&mut self, id: &ComponentId) -> bool {
        if self.placement.remove(id).is_none() {
            debug!(component = %id, "delete of unknown component ignored");
            return false;
        }
        let removed = self.wires.disconnect_all(id);
        if self.session.started_on(id) {
            self.session.cancel();
        }
        if matches!(&self.selection, Selection::Component(selected) if selected == id)
            || matches!(&self.selection, Selection::Wire(w) if removed.iter().any(|r| r.id == *w))
        {
            self.selection = Selection::None;
        }
        info!(component = %id, wires = removed.len(), "deleted component");
        true
    }

    /// Remove a single wire. The wiring session is not affected.
    pub fn delete_wire(&mut self, id: WireId) -> bool {
        if self.wires.disconnect(id).is_none() {
            debug!(wire = %id, "delete of unknown wire ignored");
            return false;
        }
        if self.selection == Selection::Wire(id) {
            self.selection = Selection::None;
        }
        true
    }

    pub fn select(&mut self, selection: Selection) {
        self.selection = selection;
    }

    pub fn delete_selected(&mut self) -> bool {
        match std::mem::take(&mut self.selection) {
            Selection::None => false,
            Selection::Component(id) => self.delete_component(&id),
            Selection::Wire(id) => self.delete_wire(id),
        }
    }

    /// Pin click from the canvas. Clicks on components that are not placed
    /// are ignored.
    pub fn click_pin(&mut self, endpoint: Endpoint) -> WiringOutcome {
        if !self.placement.contains(&endpoint.component) {
            debug!(%endpoint, "pin click on unknown component ignored");
            return WiringOutcome::Ignored;
        }
        self.session.handle(
            WiringEvent::PinClicked(endpoint),
            &mut self.wires,
            self.wire_color,
        )
    }

    /// Empty-canvas click: a bend while drawing, otherwise clears the selection.
    pub fn click_canvas(&mut self, point: Point) -> WiringOutcome {
        let outcome = self.session.handle(
            WiringEvent::CanvasClicked(point),
            &mut self.wires,
            self.wire_color,
        );
        if outcome == WiringOutcome::Ignored {
            self.selection = Selection::None;
        }
        outcome
    }

    pub fn cancel_wiring(&mut self) -> WiringOutcome {
        self.session
            .handle(WiringEvent::Cancel, &mut self.wires, self.wire_color)
    }

    /// Replace all wiring of `component` with `connections` in one step.
    ///
    /// Connections naming components that are not placed are skipped.
    pub fn rewire(&mut self, component: &ComponentId, connections: Vec<WireSpec>) -> Vec<WireId> {
        if !self.placement.contains(component) {
            return Vec::new();
        }
        let connections = connections
            .into_iter()
            .filter(|spec| {
                self.placement.contains(&spec.start.component)
                    && self.placement.contains(&spec.end.component)
            })
            .collect();
        self.wires.replace_incident(component, connections)
    }

    /// Place a peripheral and wire it up as given.
    ///
    /// `wiring` pairs one of the new component's pins with a target endpoint.
    pub fn provision(
        &mut self,
        kind: ComponentKind,
        position: Point,
        wiring: &[(&str, Endpoint)],
    ) -> ComponentId {
        let id = self.place(kind, position);
        let specs = wiring
            .iter()
            .map(|(pin, target)| {
                WireSpec::new(Endpoint::new(id.clone(), *pin), target.clone())
                    .with_color(self.wire_color)
            })
            .collect();
        self.rewire(&id, specs);
        id
    }

    pub fn pin_position(&self, endpoint: &Endpoint, catalogue: &PinCatalogue) -> Option<Point> {
        catalogue.resolve_endpoint(&self.placement, endpoint)
    }

    pub fn net_state(&self, levels: &DriverLevels) -> NetState {
        propagate(levels, &self.wires, &self.placement)
    }

    /// Board digital pins a push button feeds when pressed.
    pub fn input_pins(&self, button: &ComponentId) -> BTreeSet<u8> {
        match self.placement.get(button) {
            Some(instance) if instance.kind == ComponentKind::PushButton => {
                Netlist::new(&self.wires, &self.placement).reachable_board_pins(instance)
            }
            _ => BTreeSet::new(),
        }
    }

    pub fn connection_groups(&self) -> Vec<Vec<Endpoint>> {
        self.wires.connection_groups()
    }
}
