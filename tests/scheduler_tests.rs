//! Tick scheduler tests
//!
//! All runs happen inside a `LocalSet`, the same way the binary drives the
//! scheduler next to the console.


use mocks::*;
use rusty_circuit::config::SimulationConfig;
use rusty_circuit::execution::CompileRequest;
use rusty_circuit::{ComponentId, ComponentKind, Endpoint, PinValue, Point, SimError, TickScheduler, Workspace};
use std::cell::RefCell;
use std::rc::Rc;
use tokio::task::LocalSet;
use tokio_test::{assert_err, assert_ok};

struct Bench {
    workspace: Rc<RefCell<Workspace>>,
    led: ComponentId,
    button: ComponentId,
}

fn bench() -> Bench {
    let mut ws = Workspace::new();
    let uno = ws.place(ComponentKind::ArduinoUno, Point::new(0.0, 0.0));
    let led = ws.provision(
        ComponentKind::LedRed,
        Point::new(520.0, 40.0),
        &[
            ("anode", Endpoint::new(uno.clone(), "D13")),
            ("cathode", Endpoint::new(uno.clone(), "GND_D")),
        ],
    );
    let button = ws.provision(
        ComponentKind::PushButton,
        Point::new(520.0, 300.0),
        &[
            ("1b", Endpoint::new(uno.clone(), "5V")),
            ("2b", Endpoint::new(uno, "D2")),
        ],
    );
    Bench {
        workspace: Rc::new(RefCell::new(ws)),
        led,
        button,
    }
}

fn config() -> SimulationConfig {
    SimulationConfig {
        cycles_per_tick: 1_000,
        ..SimulationConfig::default()
    }
}

fn request() -> CompileRequest {
    CompileRequest::new("void setup() {}\nvoid loop() {}", "uno")
}

async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_run_reflects_core_outputs() {
    LocalSet::new()
        .run_until(async {
            let bench = bench();
            let probe = CoreProbe::new();
            let mut scheduler = TickScheduler::new(bench.workspace.clone(), config());
            let compiler = MockCompiler::succeeding(TINY_HEX);

            assert_ok!(scheduler.start(&compiler, &request(), |_| probe.core()));
            settle().await;
            assert!(!scheduler.net_state().is_energized(&bench.led));

            probe.drive(13, PinValue::High);
            settle().await;
            assert!(scheduler.net_state().is_energized(&bench.led));
            assert!(probe.events.borrow().contains(&CoreEvent::Step(1_000)));

            scheduler.shutdown().await;
            assert!(probe.stopped());
            assert_eq!(compiler.calls(), 1);
        })
        .await;
}

#[tokio::test]
async fn test_stop_lets_current_batch_finish() {
    LocalSet::new()
        .run_until(async {
            let bench = bench();
            let probe = CoreProbe::new();
            let mut scheduler = TickScheduler::new(bench.workspace.clone(), config());

            scheduler
                .start(&MockCompiler::succeeding(TINY_HEX), &request(), |_| probe.core())
                .unwrap();
            settle().await;

            assert!(scheduler.stop());
            assert!(!scheduler.is_running());
            let steps = probe.steps();
            settle().await;

            // Loop exits at the top of the next iteration without stepping
            assert_eq!(probe.steps(), steps);
            assert!(probe.stopped());
            assert!(!scheduler.stop());
        })
        .await;
}

#[tokio::test]
async fn test_shutdown_after_stop_halts_core() {
    let probe = CoreProbe::new();
    LocalSet::new()
        .run_until(async {
            let bench = bench();
            let mut scheduler = TickScheduler::new(bench.workspace.clone(), config());

            assert_ok!(scheduler.start(&MockCompiler::succeeding(TINY_HEX), &request(), |_| probe.core()));
            tokio::task::yield_now().await;

            assert!(scheduler.stop());
            scheduler.shutdown().await;
            assert!(probe.stopped());
        })
        .await;
    assert!(probe.stopped());
}

#[tokio::test]
async fn test_restart_stops_previous_run() {
    LocalSet::new()
        .run_until(async {
            let bench = bench();
            let first = CoreProbe::new();
            let second = CoreProbe::new();
            let mut scheduler = TickScheduler::new(bench.workspace.clone(), config());
            let compiler = MockCompiler::succeeding(TINY_HEX);

            scheduler.start(&compiler, &request(), |_| first.core()).unwrap();
            settle().await;
            scheduler.start(&compiler, &request(), |_| second.core()).unwrap();
            settle().await;

            let frozen = first.steps();
            settle().await;
            assert_eq!(first.steps(), frozen);
            assert!(first.stopped());
            assert!(second.steps() > 0);
            assert!(!second.stopped());

            scheduler.shutdown().await;
        })
        .await;
}

#[tokio::test]
async fn test_compile_failure_stops_prior_run_and_reports() {
    LocalSet::new()
        .run_until(async {
            let bench = bench();
            let probe = CoreProbe::new();
            let mut scheduler = TickScheduler::new(bench.workspace.clone(), config());

            scheduler
                .start(&MockCompiler::succeeding(TINY_HEX), &request(), |_| probe.core())
                .unwrap();
            settle().await;

            let mut built = false;
            let err = assert_err!(scheduler.start(
                &MockCompiler::failing("missing ';'"),
                &request(),
                |_| {
                    built = true;
                    probe.core()
                }
            ));

            assert!(matches!(err, SimError::Compile(ref msg) if msg == "missing ';'"));
            assert!(!built);
            assert!(!scheduler.is_running());
            settle().await;
            assert!(probe.stopped());
            assert_eq!(bench.workspace.borrow().wires().len(), 4);
        })
        .await;
}

#[tokio::test]
async fn test_empty_program_is_rejected() {
    LocalSet::new()
        .run_until(async {
            let bench = bench();
            let mut scheduler = TickScheduler::new(bench.workspace.clone(), config());
            let probe = CoreProbe::new();

            let err = scheduler
                .start(&MockCompiler::succeeding(""), &request(), |_| probe.core())
                .unwrap_err();
            assert!(matches!(err, SimError::MissingProgram));
            assert!(!scheduler.is_running());
        })
        .await;
}

#[tokio::test]
async fn test_button_press_writes_inputs_synchronously() {
    LocalSet::new()
        .run_until(async {
            let bench = bench();
            let probe = CoreProbe::new();
            let mut scheduler = TickScheduler::new(bench.workspace.clone(), config());

            assert!(scheduler.press_button(&bench.button).is_empty());

            scheduler
                .start(&MockCompiler::succeeding(TINY_HEX), &request(), |_| probe.core())
                .unwrap();

            let pins = scheduler.press_button(&bench.button);
            assert_eq!(pins.into_iter().collect::<Vec<_>>(), vec![2]);
            // Written before any further batch has run
            assert_eq!(probe.inputs(), vec![(2, PinValue::High)]);

            settle().await;
            scheduler.release_button(&bench.button);
            assert_eq!(
                probe.inputs(),
                vec![(2, PinValue::High), (2, PinValue::Low)]
            );

            let events = probe.events.borrow().clone();
            let press = events
                .iter()
                .position(|e| *e == CoreEvent::Input(2, PinValue::High))
                .unwrap();
            assert!(events[press + 1..]
                .iter()
                .any(|e| matches!(e, CoreEvent::Step(_))));

            scheduler.shutdown().await;
        })
        .await;
}

#[test]
fn test_single_tick_without_runtime() {
    let bench = bench();
    let probe = CoreProbe::new();
    let mut core = probe.core();
    probe.drive(13, PinValue::High);

    let state = rusty_circuit::scheduler::tick(core.as_mut(), &bench.workspace.borrow(), &config());
    assert!(state.is_energized(&bench.led));
    assert_eq!(probe.steps(), 1);
}
