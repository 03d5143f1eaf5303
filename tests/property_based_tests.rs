//! Property-based tests for the netlist tracer
//!
//! Random benches (one board plus random peripherals) are wired with random
//! edges, cycles and self-loops through pass-through parts included.


use mocks::proptest_helpers::*;
use proptest::prelude::*;
use rusty_circuit::netlist::{propagate, DriverLevels, Netlist};
use rusty_circuit::{
    ComponentId, ComponentKind, Endpoint, PinValue, PlacementStore, Point, WireColor, WireStore,
};
use std::collections::HashSet;

struct RandomBench {
    placement: PlacementStore,
    wires: WireStore,
    board: ComponentId,
}

fn build_bench(kinds: &[ComponentKind], edges: &[(usize, usize, usize, usize)]) -> RandomBench {
    let mut placement = PlacementStore::new();
    let board = placement.place(ComponentKind::ArduinoUno, Point::default());
    let mut ids = vec![board.clone()];
    for kind in kinds {
        ids.push(placement.place(*kind, Point::new(500.0, 0.0)));
    }

    let endpoint = |component: usize, pin: usize| {
        let id = &ids[component % ids.len()];
        let pins = placement.kind_of(id).unwrap_or(ComponentKind::Resistor).pin_names();
        Endpoint::new(id.clone(), pins[pin % pins.len()])
    };

    let mut wires = WireStore::new();
    for &(a, pa, b, pb) in edges {
        // Same-component pairs are rejected by the store
        wires.connect(endpoint(a, pa), endpoint(b, pb), Vec::new(), WireColor::Red);
    }

    RandomBench {
        placement,
        wires,
        board,
    }
}

#[cfg(test)]
mod trace_properties {
    use super::*;

    proptest! {
        #[test]
        fn test_trace_terminates_with_known_endpoints(
            kinds in prop::collection::vec(arb_peripheral_kind(), 0..8),
            edges in arb_wires(40),
            pin in 0u8..14,
        ) {
            let bench = build_bench(&kinds, &edges);
            let netlist = Netlist::new(&bench.wires, &bench.placement);
            let start = Endpoint::new(bench.board.clone(), format!("D{}", pin));

            let reached = netlist.trace(&start);

            prop_assert!(reached.contains(&start));
            // Every reached endpoint is the start, a wire end, or a lead of a
            // pass-through part, so the result is bounded by the bench.
            let mut known: HashSet<Endpoint> = HashSet::new();
            known.insert(start.clone());
            for wire in bench.wires.iter() {
                known.insert(wire.start.clone());
                known.insert(wire.end.clone());
            }
            for part in bench.placement.iter().filter(|c| c.kind.is_pass_through()) {
                for lead in part.kind.pin_names() {
                    known.insert(Endpoint::new(part.id.clone(), *lead));
                }
            }
            prop_assert!(reached.is_subset(&known));
        }

        #[test]
        fn test_shared_visited_set_expands_each_endpoint_once(
            kinds in prop::collection::vec(arb_peripheral_kind(), 0..8),
            edges in arb_wires(40),
        ) {
            let bench = build_bench(&kinds, &edges);
            let netlist = Netlist::new(&bench.wires, &bench.placement);
            let start = Endpoint::new(bench.board.clone(), "D3");

            let mut visited = HashSet::new();
            netlist.trace_into(&start, &mut visited);
            let first = visited.clone();

            // A second walk over an exhausted set discovers nothing new
            netlist.trace_into(&start, &mut visited);
            prop_assert_eq!(first, visited);
        }

        #[test]
        fn test_net_state_is_idempotent(
            kinds in prop::collection::vec(arb_peripheral_kind(), 0..8),
            edges in arb_wires(40),
            levels in prop::collection::vec(arb_pin_value(), 14),
        ) {
            let bench = build_bench(&kinds, &edges);
            let mut driver_levels = DriverLevels::new();
            for (pin, level) in levels.iter().enumerate() {
                driver_levels.set(pin as u8, *level);
            }

            let first = propagate(&driver_levels, &bench.wires, &bench.placement);
            let second = propagate(&driver_levels, &bench.wires, &bench.placement);
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.len(), bench.placement.sinks().count());
        }

        #[test]
        fn test_all_low_or_floating_never_energizes(
            kinds in prop::collection::vec(arb_peripheral_kind(), 0..8),
            edges in arb_wires(40),
            floating in prop::bool::ANY,
        ) {
            let bench = build_bench(&kinds, &edges);
            let level = if floating { PinValue::HighZ } else { PinValue::Low };
            let levels = DriverLevels::read(14, |_| level);

            let state = propagate(&levels, &bench.wires, &bench.placement);
            prop_assert_eq!(state.energized_count(), 0);
        }
    }

    #[test]
    fn test_resistor_wired_back_to_itself_terminates() {
        let mut placement = PlacementStore::new();
        let board = placement.place(ComponentKind::ArduinoUno, Point::default());
        let r1 = placement.place(ComponentKind::Resistor, Point::default());
        let r2 = placement.place(ComponentKind::Resistor, Point::default());
        let mut wires = WireStore::new();
        wires.connect(
            Endpoint::new(board.clone(), "D4"),
            Endpoint::new(r1.clone(), "lead1"),
            Vec::new(),
            WireColor::Red,
        );
        wires.connect(
            Endpoint::new(r1.clone(), "lead2"),
            Endpoint::new(r2.clone(), "lead1"),
            Vec::new(),
            WireColor::Red,
        );
        wires.connect(
            Endpoint::new(r2.clone(), "lead2"),
            Endpoint::new(r1.clone(), "lead1"),
            Vec::new(),
            WireColor::Red,
        );

        let reached = Netlist::new(&wires, &placement).trace(&Endpoint::new(board, "D4"));
        assert_eq!(reached.len(), 5);
    }
}
