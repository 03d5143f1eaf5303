//! Built-in stand-ins for the external collaborators, so a bench can run
//! without a real AVR core or a network compiler.

use tracing::{debug, info};

use crate::component::ComponentKind;
use crate::error::{Result, SimError};
use crate::execution::{CompileRequest, CompileService, CompiledProgram, ExecutionCore};
use crate::hex::ProgramImage;
use crate::pin::{Endpoint, PinValue};
use crate::types::Point;
use crate::workspace::Workspace;

/// Reference blink sketch for the Uno (toggles D13)
pub const BLINK_HEX: &str = "\
:100000000C9434000C943E000C943E000C943E004E
:100010000C943E000C943E000C943E000C943E0010
:100020000C943E000C943E000C943E000C943E0000
:100030000C943E000C943E000C943E000C943E00F0
:100040000C943E000C943E000C943E000C943E00E0
:100050000C943E000C943E000C943E000C943E00D0
:100060000C943E000C943E0011241FBECFEFD8E0A7
:10007000DEbfcDBF0E9440000C9443000C94000016
:100080008FE08093810080938000209A289A309A4D
:1000900088E190E00E94530020982898309888E14E
:1000A00090E00E945300F7CF3197F1F00895689405
:0400B00062F8089565
:00000001FF
";

const DIGITAL_PINS: usize = 14;
const LED_PIN: u8 = 13;
const MIRROR_OUT: u8 = 10;
const MIRROR_IN: usize = 2;

/// Pin-level model of the blink sketch plus a button echo.
///
/// D13 toggles every half period; D10 follows the input level of D2.
pub struct DemoCore {
    cycles: u64,
    half_period: u64,
    inputs: [PinValue; DIGITAL_PINS],
    program_len: usize,
    stopped: bool,
}

impl DemoCore {
    /// `period` is one full blink in clock cycles.
    pub fn new(image: ProgramImage, period: u64) -> Self {
        debug!(bytes = image.extent(), period, "demo core loaded");
        DemoCore {
            cycles: 0,
            half_period: (period / 2).max(1),
            inputs: [PinValue::Low; DIGITAL_PINS],
            program_len: image.extent(),
            stopped: false,
        }
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn program_len(&self) -> usize {
        self.program_len
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

impl ExecutionCore for DemoCore {
    fn step(&mut self, cycles: u64) {
        self.cycles = self.cycles.wrapping_add(cycles);
    }

    fn pin_state(&self, pin: u8) -> PinValue {
        match pin {
            LED_PIN => PinValue::from_bool((self.cycles / self.half_period) % 2 == 1),
            MIRROR_OUT => self.inputs[MIRROR_IN],
            _ => PinValue::Low,
        }
    }

    fn set_digital_input(&mut self, pin: u8, value: PinValue) {
        if let Some(slot) = self.inputs.get_mut(pin as usize) {
            *slot = value;
        }
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}

/// Returns the reference blink image for any Uno sketch.
#[derive(Debug, Default)]
pub struct BuiltinCompiler;

impl CompileService for BuiltinCompiler {
    fn compile(&self, request: &CompileRequest) -> Result<CompiledProgram> {
        if request.board != "uno" {
            return Err(SimError::Compile(format!(
                "unsupported board '{}'",
                request.board
            )));
        }
        info!(source_len = request.source.len(), "using built-in blink image");
        Ok(CompiledProgram::new(BLINK_HEX))
    }
}

/// Uno with a resistor-fed red LED on D13, a green LED on D10 and a push
/// button from 5V to D2.
pub fn demo_workspace() -> Workspace {
    let mut ws = Workspace::new();
    let uno = ws.place(ComponentKind::ArduinoUno, Point::new(40.0, 60.0));
    let resistor = ws.provision(
        ComponentKind::Resistor,
        Point::new(560.0, 20.0),
        &[("lead1", Endpoint::new(uno.clone(), "D13"))],
    );
    ws.provision(
        ComponentKind::LedRed,
        Point::new(660.0, 40.0),
        &[
            ("anode", Endpoint::new(resistor, "lead2")),
            ("cathode", Endpoint::new(uno.clone(), "GND_D")),
        ],
    );
    ws.provision(
        ComponentKind::LedGreen,
        Point::new(660.0, 180.0),
        &[
            ("anode", Endpoint::new(uno.clone(), "D10")),
            ("cathode", Endpoint::new(uno.clone(), "GND_1")),
        ],
    );
    ws.provision(
        ComponentKind::PushButton,
        Point::new(560.0, 320.0),
        &[
            ("1a", Endpoint::new(uno.clone(), "5V")),
            ("2a", Endpoint::new(uno, "D2")),
        ],
    );
    ws
}
