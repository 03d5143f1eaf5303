//! # Tick Scheduler
//!
//! Drives an [`ExecutionCore`] in fixed cycle batches on the current
//! thread. After each batch the core's digital pins are read and the net
//! state is rebuilt from the workspace.
//!
//! The run loop is a `spawn_local` task, so [`TickScheduler::start`] must
//! be called from inside a `tokio::task::LocalSet`. Stopping is
//! cooperative: the flag is checked at the top of each iteration and a
//! batch in progress always completes.

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::rc::Rc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::SimulationConfig;
use crate::error::Result;
use crate::execution::{CompileRequest, CompileService, ExecutionCore};
use crate::hex::ProgramImage;
use crate::netlist::{DriverLevels, NetState};
use crate::pin::PinValue;
use crate::types::ComponentId;
use crate::workspace::Workspace;

pub type SharedCore = Rc<RefCell<Box<dyn ExecutionCore>>>;

struct Run {
    core: SharedCore,
    stop: Rc<Cell<bool>>,
    handle: JoinHandle<()>,
}

pub struct TickScheduler {
    config: SimulationConfig,
    workspace: Rc<RefCell<Workspace>>,
    net_state: Rc<RefCell<NetState>>,
    ticks: Rc<Cell<u64>>,
    run: Option<Run>,
    // Loops told to stop that may still be finishing their last batch
    stopping: Vec<JoinHandle<()>>,
}

impl TickScheduler {
    pub fn new(workspace: Rc<RefCell<Workspace>>, config: SimulationConfig) -> Self {
        let net_state = NetState::all_off(workspace.borrow().placement());
        TickScheduler {
            config,
            workspace,
            net_state: Rc::new(RefCell::new(net_state)),
            ticks: Rc::new(Cell::new(0)),
            run: None,
            stopping: Vec::new(),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn workspace(&self) -> Rc<RefCell<Workspace>> {
        Rc::clone(&self.workspace)
    }

    /// Snapshot of the last completed tick.
    pub fn net_state(&self) -> NetState {
        self.net_state.borrow().clone()
    }

    /// Ticks completed by the current (or last) run
    pub fn ticks(&self) -> u64 {
        self.ticks.get()
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Compile, load and start a new run.
    ///
    /// Any previous run is stopped first, also when compilation fails. On
    /// error nothing is started and the workspace is left untouched.
    pub fn start<F>(
        &mut self,
        compiler: &dyn CompileService,
        request: &CompileRequest,
        make_core: F,
    ) -> Result<()>
    where
        F: FnOnce(ProgramImage) -> Box<dyn ExecutionCore>,
    {
        self.stop();

        let image = compiler
            .compile(request)
            .and_then(|program| program.image())
            .map_err(|err| {
                warn!(board = %request.board, error = %err, "run not started");
                err
            })?;

        let core: SharedCore = Rc::new(RefCell::new(make_core(image)));
        let stop = Rc::new(Cell::new(false));
        *self.net_state.borrow_mut() = NetState::all_off(self.workspace.borrow().placement());
        self.ticks.set(0);

        let handle = tokio::task::spawn_local(run_loop(
            Rc::clone(&core),
            Rc::clone(&stop),
            Rc::clone(&self.workspace),
            Rc::clone(&self.net_state),
            Rc::clone(&self.ticks),
            self.config.clone(),
        ));
        info!(
            board = %request.board,
            cycles_per_tick = self.config.cycles_per_tick,
            "simulation started"
        );

        self.run = Some(Run { core, stop, handle });
        Ok(())
    }

    /// Request the current run to stop. Returns `false` if none was running.
    ///
    /// The loop's handle is kept so [`shutdown`](Self::shutdown) can still
    /// wait for the core to be halted.
    pub fn stop(&mut self) -> bool {
        self.stopping.retain(|handle| !handle.is_finished());
        match self.run.take() {
            Some(run) => {
                run.stop.set(true);
                self.stopping.push(run.handle);
                info!(ticks = self.ticks.get(), "simulation stop requested");
                true
            }
            None => false,
        }
    }

    /// Stop and wait until every run loop has exited and halted its core.
    pub async fn shutdown(&mut self) {
        self.stop();
        for handle in self.stopping.drain(..) {
            if let Err(err) = handle.await {
                warn!(error = %err, "run loop ended abnormally");
            }
        }
    }

    /// Write a digital input into the running core.
    ///
    /// Takes effect before the next batch. Returns `false` when idle.
    pub fn set_input(&self, pin: u8, value: PinValue) -> bool {
        let Some(run) = &self.run else {
            return false;
        };
        debug!(pin, %value, "digital input");
        run.core.borrow_mut().set_digital_input(pin, value);
        true
    }

    /// Drive every board pin wired to `button` high.
    pub fn press_button(&self, button: &ComponentId) -> BTreeSet<u8> {
        self.drive_button(button, PinValue::High)
    }

    pub fn release_button(&self, button: &ComponentId) -> BTreeSet<u8> {
        self.drive_button(button, PinValue::Low)
    }

    fn drive_button(&self, button: &ComponentId, value: PinValue) -> BTreeSet<u8> {
        let pins = self.workspace.borrow().input_pins(button);
        if !self.is_running() {
            return BTreeSet::new();
        }
        for &pin in &pins {
            self.set_input(pin, value);
        }
        pins
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// One scheduler iteration: run a batch, read the pins, rebuild the net state.
pub fn tick(core: &mut dyn ExecutionCore, workspace: &Workspace, config: &SimulationConfig) -> NetState {
    core.step(config.cycles_per_tick);
    let levels = DriverLevels::read(config.digital_pins, |pin| core.pin_state(pin));
    workspace.net_state(&levels)
}

async fn run_loop(
    core: SharedCore,
    stop: Rc<Cell<bool>>,
    workspace: Rc<RefCell<Workspace>>,
    net_state: Rc<RefCell<NetState>>,
    ticks: Rc<Cell<u64>>,
    config: SimulationConfig,
) {
    let interval = Duration::from_millis(config.tick_interval_ms);
    loop {
        if stop.get() {
            break;
        }

        let next = {
            let mut core = core.borrow_mut();
            tick(&mut **core, &workspace.borrow(), &config)
        };
        *net_state.borrow_mut() = next;
        ticks.set(ticks.get() + 1);

        if interval.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(interval).await;
        }
    }
    core.borrow_mut().stop();
    debug!(ticks = ticks.get(), "run loop exited");
}
