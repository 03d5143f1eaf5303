//! # Rusty Circuit Library
//!
//! A breadboard-style circuit bench: a microcontroller board and a handful
//! of peripherals are placed on a canvas, wired pin to pin, and a running
//! program's digital outputs are propagated onto the wired indicators.
//!
//! This library provides:
//! - Pin geometry for every supported component kind
//! - Placement and wire stores with cascade delete
//! - An interactive wiring state machine
//! - A netlist tracer that derives indicator states from driver pin levels
//! - A cooperative tick scheduler bridging an external execution core
//! - JSON circuit files and a terminal monitor

pub mod circuit_config;
pub mod component;
pub mod config;
pub mod connection;
pub mod console;
pub mod demo;
pub mod error;
pub mod execution;
pub mod geometry;
pub mod hex;
pub mod netlist;
pub mod pin;
pub mod placement;
pub mod scheduler;
pub mod types;
pub mod wiring;
pub mod workspace;

// Re-export commonly used items for easier importing
pub use component::{ComponentInstance, ComponentKind, Role};
pub use connection::{Wire, WireColor, WireSpec, WireStore};
pub use error::{HexError, Result, SimError};
pub use execution::{CompileRequest, CompileService, CompiledProgram, ExecutionCore};
pub use geometry::PinCatalogue;
pub use netlist::{propagate, trace, DriverLevels, NetState};
pub use pin::{Endpoint, PinValue};
pub use placement::PlacementStore;
pub use scheduler::TickScheduler;
pub use types::{ComponentId, Point, WireId};
pub use wiring::{WiringEvent, WiringOutcome, WiringSession};
pub use workspace::{Selection, Workspace};
