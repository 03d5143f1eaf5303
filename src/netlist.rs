//! # Netlist Tracer
//!
//! Works out which indicator components are energized by which board pins.
//!
//! Traversal runs over the undirected wire graph with an explicit worklist.
//! Resistors (pass-through parts) carry the signal from one lead to the other;
//! indicators are recorded when reached but never conduct further. The
//! visited set is keyed by exact `(component, pin)` so each endpoint expands
//! at most once, which bounds the walk even when the wiring has cycles.
//!
//! [`propagate`] rebuilds a [`NetState`] from scratch on every call. When
//! several driver pins reach the same indicator, the last one processed wins:
//! boards in placement order, then pins in ascending number.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::component::ComponentInstance;
use crate::connection::WireStore;
use crate::pin::{digital_pin_name, digital_pin_number, Endpoint, PinValue};
use crate::placement::PlacementStore;
use crate::types::ComponentId;

/// Digital pin levels read from the execution core for one tick
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DriverLevels {
    levels: BTreeMap<u8, PinValue>,
}

impl DriverLevels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read pins `0..count` through `read`.
    pub fn read(count: u8, mut read: impl FnMut(u8) -> PinValue) -> Self {
        DriverLevels {
            levels: (0..count).map(|pin| (pin, read(pin))).collect(),
        }
    }

    pub fn set(&mut self, pin: u8, value: PinValue) {
        self.levels.insert(pin, value);
    }

    pub fn with(mut self, pin: u8, value: PinValue) -> Self {
        self.set(pin, value);
        self
    }

    pub fn get(&self, pin: u8) -> PinValue {
        self.levels.get(&pin).copied().unwrap_or(PinValue::HighZ)
    }

    /// Pins in ascending order
    pub fn iter(&self) -> impl Iterator<Item = (u8, PinValue)> + '_ {
        self.levels.iter().map(|(pin, value)| (*pin, *value))
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// Derived indicator states for one tick. Never patched, only replaced.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetState {
    energized: BTreeMap<ComponentId, bool>,
}

impl NetState {
    /// Every placed indicator, de-energized
    pub fn all_off(placement: &PlacementStore) -> Self {
        NetState {
            energized: placement.sinks().map(|c| (c.id.clone(), false)).collect(),
        }
    }

    fn set(&mut self, component: ComponentId, energized: bool) {
        self.energized.insert(component, energized);
    }

    /// Unknown and unreached components read as not energized.
    pub fn is_energized(&self, component: &ComponentId) -> bool {
        self.energized.get(component).copied().unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ComponentId, bool)> {
        self.energized.iter().map(|(id, on)| (id, *on))
    }

    pub fn energized_count(&self) -> usize {
        self.energized.values().filter(|on| **on).count()
    }

    pub fn len(&self) -> usize {
        self.energized.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energized.is_empty()
    }
}

/// Read-only view of the wire graph for one propagation pass
pub struct Netlist<'a> {
    adjacency: HashMap<&'a Endpoint, Vec<&'a Endpoint>>,
    placement: &'a PlacementStore,
}

impl<'a> Netlist<'a> {
    pub fn new(wires: &'a WireStore, placement: &'a PlacementStore) -> Self {
        Netlist {
            adjacency: wires.adjacency(),
            placement,
        }
    }

    /// Every endpoint reachable from `start`, including `start` itself.
    pub fn trace(&self, start: &Endpoint) -> HashSet<Endpoint> {
        let mut visited = HashSet::new();
        self.trace_into(start, &mut visited);
        visited
    }

    /// Depth-first walk from `start`, recording into `visited`.
    ///
    /// Endpoints already in `visited` are neither expanded nor re-recorded, so
    /// callers can share one set across several starting points.
    pub fn trace_into(&self, start: &Endpoint, visited: &mut HashSet<Endpoint>) {
        let mut stack = vec![start.clone()];

        while let Some(current) = stack.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }

            let kind = self.placement.kind_of(&current.component);

            // Indicators terminate the walk
            if &current != start && kind.is_some_and(|k| k.is_sink()) {
                continue;
            }

            if let Some(kind) = kind.filter(|k| k.is_pass_through()) {
                for lead in kind.pin_names() {
                    if *lead != current.pin {
                        let other = Endpoint::new(current.component.clone(), *lead);
                        if !visited.contains(&other) {
                            stack.push(other);
                        }
                    }
                }
            }

            if let Some(neighbors) = self.adjacency.get(&current) {
                for &neighbor in neighbors {
                    if !visited.contains(neighbor) {
                        stack.push(neighbor.clone());
                    }
                }
            }
        }
    }

    /// Board digital pins reachable from any pin of `source`.
    ///
    /// `source` itself does not conduct between its own pins unless it is a
    /// pass-through part.
    pub fn reachable_board_pins(&self, source: &ComponentInstance) -> BTreeSet<u8> {
        let mut visited = HashSet::new();
        for pin in source.kind.pin_names() {
            self.trace_into(&Endpoint::new(source.id.clone(), *pin), &mut visited);
        }

        visited
            .iter()
            .filter(|e| {
                self.placement
                    .kind_of(&e.component)
                    .is_some_and(|k| k.is_driver())
            })
            .filter_map(|e| digital_pin_number(&e.pin))
            .collect()
    }
}

/// Convenience wrapper for a single trace
pub fn trace(driver: &Endpoint, wires: &WireStore, placement: &PlacementStore) -> HashSet<Endpoint> {
    Netlist::new(wires, placement).trace(driver)
}

/// Recompute every indicator state from the driver levels.
pub fn propagate(levels: &DriverLevels, wires: &WireStore, placement: &PlacementStore) -> NetState {
    let netlist = Netlist::new(wires, placement);
    let mut state = NetState::all_off(placement);

    for board in placement.boards() {
        for (pin, level) in levels.iter() {
            let Some(high) = level.to_bool() else {
                continue;
            };
            let driver = Endpoint::new(board.id.clone(), digital_pin_name(pin));
            for reached in netlist.trace(&driver) {
                if placement
                    .kind_of(&reached.component)
                    .is_some_and(|k| k.is_sink())
                {
                    state.set(reached.component, high);
                }
            }
        }
    }

    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentKind;
    use crate::connection::WireColor;
    use crate::types::Point;

    struct Bench {
        placement: PlacementStore,
        wires: WireStore,
        board: ComponentId,
    }

    impl Bench {
        fn new() -> Self {
            let mut placement = PlacementStore::new();
            let board = placement.place(ComponentKind::ArduinoUno, Point::new(0.0, 0.0));
            Bench {
                placement,
                wires: WireStore::new(),
                board,
            }
        }

        fn add(&mut self, kind: ComponentKind) -> ComponentId {
            self.placement.place(kind, Point::new(0.0, 0.0))
        }

        fn wire(&mut self, a: (&ComponentId, &str), b: (&ComponentId, &str)) {
            self.wires.connect(
                Endpoint::new(a.0.clone(), a.1),
                Endpoint::new(b.0.clone(), b.1),
                vec![],
                WireColor::Red,
            );
        }

        fn pin(&self, name: &str) -> Endpoint {
            Endpoint::new(self.board.clone(), name)
        }
    }

    fn high(pin: u8) -> DriverLevels {
        DriverLevels::new().with(pin, PinValue::High)
    }

    #[test]
    fn test_led_on_driven_high_pin_is_energized() {
        let mut bench = Bench::new();
        let led = bench.add(ComponentKind::LedRed);
        let board = bench.board.clone();
        bench.wire((&board, "D10"), (&led, "anode"));
        bench.wire((&led, "cathode"), (&board, "GND_D"));

        let state = propagate(&high(10), &bench.wires, &bench.placement);
        assert!(state.is_energized(&led));
    }

    #[test]
    fn test_led_on_driven_low_pin_is_dark() {
        let mut bench = Bench::new();
        let led = bench.add(ComponentKind::LedRed);
        let board = bench.board.clone();
        bench.wire((&board, "D10"), (&led, "anode"));
        bench.wire((&led, "cathode"), (&board, "GND_D"));

        let levels = DriverLevels::new().with(10, PinValue::Low);
        let state = propagate(&levels, &bench.wires, &bench.placement);
        assert!(!state.is_energized(&led));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_resistor_is_transparent() {
        let mut bench = Bench::new();
        let resistor = bench.add(ComponentKind::Resistor);
        let led = bench.add(ComponentKind::LedGreen);
        let board = bench.board.clone();
        bench.wire((&board, "D10"), (&resistor, "lead1"));
        bench.wire((&resistor, "lead2"), (&led, "anode"));

        let reached = trace(&bench.pin("D10"), &bench.wires, &bench.placement);
        assert!(reached.contains(&Endpoint::new(resistor.clone(), "lead2")));
        assert!(reached.contains(&Endpoint::new(led.clone(), "anode")));

        let state = propagate(&high(10), &bench.wires, &bench.placement);
        assert!(state.is_energized(&led));
    }

    #[test]
    fn test_indicators_do_not_conduct() {
        let mut bench = Bench::new();
        let first = bench.add(ComponentKind::LedRed);
        let second = bench.add(ComponentKind::LedYellow);
        let board = bench.board.clone();
        bench.wire((&board, "D3"), (&first, "anode"));
        bench.wire((&first, "anode"), (&second, "anode"));

        let reached = trace(&bench.pin("D3"), &bench.wires, &bench.placement);
        assert!(reached.contains(&Endpoint::new(first.clone(), "anode")));
        assert!(!reached.contains(&Endpoint::new(second.clone(), "anode")));

        let state = propagate(&high(3), &bench.wires, &bench.placement);
        assert!(state.is_energized(&first));
        assert!(!state.is_energized(&second));
    }

    #[test]
    fn test_pushbutton_blocks_signal() {
        let mut bench = Bench::new();
        let button = bench.add(ComponentKind::PushButton);
        let led = bench.add(ComponentKind::LedRed);
        let board = bench.board.clone();
        bench.wire((&board, "D7"), (&button, "1a"));
        bench.wire((&button, "2a"), (&led, "anode"));

        let state = propagate(&high(7), &bench.wires, &bench.placement);
        assert!(!state.is_energized(&led));
    }

    #[test]
    fn test_later_driver_wins_shared_indicator() {
        let mut bench = Bench::new();
        let led = bench.add(ComponentKind::LedRed);
        let board = bench.board.clone();
        bench.wire((&board, "D9"), (&led, "anode"));
        bench.wire((&board, "D10"), (&led, "anode"));

        let both = DriverLevels::new()
            .with(9, PinValue::High)
            .with(10, PinValue::High);
        assert!(propagate(&both, &bench.wires, &bench.placement).is_energized(&led));

        let later_low = DriverLevels::new()
            .with(9, PinValue::High)
            .with(10, PinValue::Low);
        assert!(!propagate(&later_low, &bench.wires, &bench.placement).is_energized(&led));

        let later_high = DriverLevels::new()
            .with(9, PinValue::Low)
            .with(10, PinValue::High);
        assert!(propagate(&later_high, &bench.wires, &bench.placement).is_energized(&led));
    }

    #[test]
    fn test_cycle_through_resistor_terminates() {
        let mut bench = Bench::new();
        let r1 = bench.add(ComponentKind::Resistor);
        let r2 = bench.add(ComponentKind::Resistor);
        let led = bench.add(ComponentKind::LedRed);
        let board = bench.board.clone();
        bench.wire((&board, "D5"), (&r1, "lead1"));
        bench.wire((&r1, "lead2"), (&r2, "lead1"));
        bench.wire((&r2, "lead2"), (&r1, "lead1"));
        bench.wire((&r2, "lead2"), (&led, "anode"));

        let reached = trace(&bench.pin("D5"), &bench.wires, &bench.placement);
        assert_eq!(reached.len(), 6);
        assert!(propagate(&high(5), &bench.wires, &bench.placement).is_energized(&led));
    }

    #[test]
    fn test_unknown_levels_are_skipped() {
        let mut bench = Bench::new();
        let led = bench.add(ComponentKind::LedRed);
        let board = bench.board.clone();
        bench.wire((&board, "D2"), (&led, "anode"));

        let levels = DriverLevels::new().with(2, PinValue::HighZ);
        let state = propagate(&levels, &bench.wires, &bench.placement);
        assert!(!state.is_energized(&led));
    }

    #[test]
    fn test_unwired_indicators_default_off() {
        let mut bench = Bench::new();
        let led = bench.add(ComponentKind::LedRed);
        let buzzer = bench.add(ComponentKind::Buzzer);

        let levels = DriverLevels::read(14, |_| PinValue::High);
        let state = propagate(&levels, &bench.wires, &bench.placement);
        assert_eq!(state.len(), 2);
        assert!(!state.is_energized(&led));
        assert!(!state.is_energized(&buzzer));
        assert_eq!(state.energized_count(), 0);
    }

    #[test]
    fn test_reachable_board_pins() {
        let mut bench = Bench::new();
        let button = bench.add(ComponentKind::PushButton);
        let resistor = bench.add(ComponentKind::Resistor);
        let board = bench.board.clone();
        bench.wire((&button, "1a"), (&board, "5V"));
        bench.wire((&button, "2a"), (&resistor, "lead1"));
        bench.wire((&resistor, "lead2"), (&board, "D2"));

        let netlist = Netlist::new(&bench.wires, &bench.placement);
        let instance = bench.placement.get(&button).unwrap().clone();
        let pins: Vec<u8> = netlist.reachable_board_pins(&instance).into_iter().collect();
        assert_eq!(pins, vec![2]);
    }
}
