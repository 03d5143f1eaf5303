use clap::Parser;
use rusty_circuit::circuit_config::CircuitConfig;
use rusty_circuit::config::SimulationConfig;
use rusty_circuit::console::{component_rows, ConsoleApp, ConsoleConfig, CoreFactory};
use rusty_circuit::demo::{demo_workspace, BuiltinCompiler, DemoCore};
use rusty_circuit::execution::{CompileRequest, ExecutionCore};
use rusty_circuit::hex::ProgramImage;
use rusty_circuit::{SimError, TickScheduler, Workspace};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fs;
use std::process::ExitCode;
use std::rc::Rc;
use std::time::Duration;
use tokio::task::LocalSet;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Breadboard bench with live pin propagation
#[derive(Parser, Debug)]
#[command(name = "rusty_circuit", version, about)]
struct Args {
    /// Circuit JSON file; the built-in demo bench when omitted
    #[arg(long)]
    circuit: Option<String>,

    /// Simulation settings JSON file
    #[arg(long)]
    sim_config: Option<String>,

    /// Sketch source handed to the compiler
    #[arg(long)]
    sketch: Option<String>,

    /// Run this many ticks without the console and print indicator states
    #[arg(long, value_name = "TICKS")]
    headless: Option<u64>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_bench(args: &Args) -> Result<(Workspace, SimulationConfig, CompileRequest), SimError> {
    let workspace = match &args.circuit {
        Some(path) => {
            let circuit = CircuitConfig::load_json(path)?;
            info!(circuit = %circuit.name, "loaded circuit");
            circuit.build_workspace()?
        }
        None => demo_workspace(),
    };

    let config = match &args.sim_config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };

    let source = match &args.sketch {
        Some(path) => fs::read_to_string(path).map_err(|source| SimError::Io {
            path: path.clone(),
            source,
        })?,
        None => String::new(),
    };
    let request = CompileRequest::new(source, config.board.clone());

    Ok((workspace, config, request))
}

async fn run_headless(
    mut scheduler: TickScheduler,
    request: &CompileRequest,
    make_core: CoreFactory,
    ticks: u64,
) -> Result<(), SimError> {
    scheduler.start(&BuiltinCompiler, request, |image| make_core(image))?;

    // Paced runs are polled at their own interval instead of spinning
    let interval = Duration::from_millis(scheduler.config().tick_interval_ms);
    let mut seen = 0;
    while seen < ticks {
        if interval.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(interval).await;
        }
        let current = scheduler.ticks();
        if current == seen {
            continue;
        }
        seen = current;

        let workspace = scheduler.workspace();
        let rows = component_rows(&workspace.borrow(), &scheduler.net_state(), &BTreeSet::new(), false);
        println!("tick {:>5}: {}", seen, rows.join(" | "));
    }

    scheduler.shutdown().await;
    Ok(())
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let (workspace, config, request) = load_bench(&args)?;
    info!(
        components = workspace.placement().len(),
        wires = workspace.wires().len(),
        "bench ready"
    );

    // One full blink per second of simulated time
    let period = config.clock_hz;
    let make_core: CoreFactory =
        Rc::new(move |image: ProgramImage| Box::new(DemoCore::new(image, period)) as Box<dyn ExecutionCore>);
    let scheduler = TickScheduler::new(Rc::new(RefCell::new(workspace)), config);

    match args.headless {
        Some(ticks) => run_headless(scheduler, &request, make_core, ticks).await?,
        None => {
            let mut app = ConsoleApp::new(
                scheduler,
                Box::new(BuiltinCompiler),
                request,
                make_core,
                ConsoleConfig::default(),
            );
            app.run().await?;
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();

    let local = LocalSet::new();
    match local.run_until(run(args)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
