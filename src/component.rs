use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{ComponentId, Point};

/// How a component takes part in signal propagation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Exposes driver pins whose levels come from the execution core
    Driver,
    /// Indicator whose state is derived from an incoming signal
    Sink,
    /// Conducts between its leads unchanged
    PassThrough,
    /// User-operated input; does not conduct during tracing
    Input,
}

/// Closed set of supported component kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentKind {
    ArduinoUno,
    LedRed,
    LedGreen,
    LedYellow,
    Resistor,
    #[serde(rename = "pushbutton")]
    PushButton,
    Buzzer,
}

const BOARD_PINS: &[&str] = &[
    "D0", "D1", "D2", "D3", "D4", "D5", "D6", "D7", "D8", "D9", "D10", "D11", "D12", "D13",
    "A0", "A1", "A2", "A3", "A4", "A5", "AREF", "IOREF", "RESET", "3V3", "5V", "VIN", "GND_D",
    "GND_1", "GND_2",
];
const LED_PINS: &[&str] = &["anode", "cathode"];
const RESISTOR_PINS: &[&str] = &["lead1", "lead2"];
const BUTTON_PINS: &[&str] = &["1a", "1b", "2a", "2b"];
const BUZZER_PINS: &[&str] = &["1", "2"];

impl ComponentKind {
    pub const ALL: [ComponentKind; 7] = [
        ComponentKind::ArduinoUno,
        ComponentKind::LedRed,
        ComponentKind::LedGreen,
        ComponentKind::LedYellow,
        ComponentKind::Resistor,
        ComponentKind::PushButton,
        ComponentKind::Buzzer,
    ];

    pub fn role(&self) -> Role {
        match self {
            ComponentKind::ArduinoUno => Role::Driver,
            ComponentKind::LedRed
            | ComponentKind::LedGreen
            | ComponentKind::LedYellow
            | ComponentKind::Buzzer => Role::Sink,
            ComponentKind::Resistor => Role::PassThrough,
            ComponentKind::PushButton => Role::Input,
        }
    }

    pub fn is_sink(&self) -> bool {
        self.role() == Role::Sink
    }

    pub fn is_pass_through(&self) -> bool {
        self.role() == Role::PassThrough
    }

    pub fn is_driver(&self) -> bool {
        self.role() == Role::Driver
    }

    /// Catalogue tag, also used as the id prefix for new placements
    pub fn tag(&self) -> &'static str {
        match self {
            ComponentKind::ArduinoUno => "arduino-uno",
            ComponentKind::LedRed => "led-red",
            ComponentKind::LedGreen => "led-green",
            ComponentKind::LedYellow => "led-yellow",
            ComponentKind::Resistor => "resistor",
            ComponentKind::PushButton => "pushbutton",
            ComponentKind::Buzzer => "buzzer",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ComponentKind::ArduinoUno => "Arduino Uno",
            ComponentKind::LedRed => "LED Red",
            ComponentKind::LedGreen => "LED Green",
            ComponentKind::LedYellow => "LED Yellow",
            ComponentKind::Resistor => "Resistor",
            ComponentKind::PushButton => "Pushbutton",
            ComponentKind::Buzzer => "Buzzer",
        }
    }

    /// Artwork bounding box; its center is the fallback pin location.
    pub fn size(&self) -> Point {
        match self {
            ComponentKind::ArduinoUno => Point::new(480.0, 320.0),
            ComponentKind::LedRed | ComponentKind::LedGreen | ComponentKind::LedYellow => {
                Point::new(40.0, 80.0)
            }
            ComponentKind::Resistor => Point::new(50.0, 120.0),
            ComponentKind::PushButton => Point::new(70.0, 120.0),
            ComponentKind::Buzzer => Point::new(60.0, 60.0),
        }
    }

    /// Named pins, in catalogue order
    pub fn pin_names(&self) -> &'static [&'static str] {
        match self {
            ComponentKind::ArduinoUno => BOARD_PINS,
            ComponentKind::LedRed | ComponentKind::LedGreen | ComponentKind::LedYellow => {
                LED_PINS
            }
            ComponentKind::Resistor => RESISTOR_PINS,
            ComponentKind::PushButton => BUTTON_PINS,
            ComponentKind::Buzzer => BUZZER_PINS,
        }
    }

    pub fn has_pin(&self, pin: &str) -> bool {
        self.pin_names().contains(&pin)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A component dropped on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentInstance {
    pub id: ComponentId,
    pub kind: ComponentKind,
    pub position: Point,
}

impl ComponentInstance {
    pub fn new(id: impl Into<ComponentId>, kind: ComponentKind, position: Point) -> Self {
        ComponentInstance {
            id: id.into(),
            kind,
            position,
        }
    }

    pub fn name(&self) -> &str {
        self.id.as_str()
    }

    pub fn center(&self) -> Point {
        self.position + self.kind.size().half()
    }
}
