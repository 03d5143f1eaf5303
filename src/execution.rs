//! # Execution Core Boundary
//!
//! The microcontroller core and the program compiler are external
//! collaborators. This module only defines the seams the scheduler drives.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::hex::{self, ProgramImage};
use crate::pin::PinValue;

/// Pin-level view of a running microcontroller.
///
/// Pins are numbered like the board's digital header (`0` is `D0`).
/// Pins outside the core's range read as `Low`.
pub trait ExecutionCore {
    /// Advance by a batch of clock cycles. Runs to completion.
    fn step(&mut self, cycles: u64);

    fn pin_state(&self, pin: u8) -> PinValue;

    /// Write a digital input; visible to the next `step`.
    fn set_digital_input(&mut self, pin: u8, value: PinValue);

    fn stop(&mut self) {}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileRequest {
    pub source: String,
    pub board: String,
}

impl CompileRequest {
    pub fn new(source: impl Into<String>, board: impl Into<String>) -> Self {
        CompileRequest {
            source: source.into(),
            board: board.into(),
        }
    }
}

/// Compiler output as Intel HEX text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledProgram {
    pub hex: String,
}

impl CompiledProgram {
    pub fn new(hex: impl Into<String>) -> Self {
        CompiledProgram { hex: hex.into() }
    }

    pub fn is_empty(&self) -> bool {
        self.hex.trim().is_empty()
    }

    /// Decode into a flash image. An empty program is `MissingProgram`.
    pub fn image(&self) -> Result<ProgramImage> {
        if self.is_empty() {
            return Err(SimError::MissingProgram);
        }
        Ok(hex::parse(&self.hex)?)
    }
}

pub trait CompileService {
    /// Returns `SimError::Compile` with diagnostics on failure.
    fn compile(&self, request: &CompileRequest) -> Result<CompiledProgram>;
}
