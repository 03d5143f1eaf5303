use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::ComponentId;

/// Logic level of a board pin as reported by the execution core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinValue {
    Low,
    High,
    HighZ, // Level not known / not driven
}

impl PinValue {
    pub fn to_str(&self) -> &'static str {
        match self {
            PinValue::Low => "Low",
            PinValue::High => "High",
            PinValue::HighZ => "HighZ",
        }
    }

    pub fn from_bool(value: bool) -> Self {
        if value {
            PinValue::High
        } else {
            PinValue::Low
        }
    }

    /// Core pin registers report 0 or 1; anything non-zero reads as high.
    pub fn from_level(level: u8) -> Self {
        PinValue::from_bool(level != 0)
    }

    pub fn to_bool(&self) -> Option<bool> {
        match self {
            PinValue::Low => Some(false),
            PinValue::High => Some(true),
            PinValue::HighZ => None,
        }
    }

    pub fn is_known(&self) -> bool {
        *self != PinValue::HighZ
    }
}

impl fmt::Display for PinValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

/// Electrical role of a named pin in the catalogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinCategory {
    Digital,
    Analog,
    Power,
    Ground,
    Reference,
    Control,
    Lead,
}

/// Attachment point: one named pin on one placed component
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Endpoint {
    pub component: ComponentId,
    pub pin: String,
}

impl Endpoint {
    pub fn new(component: impl Into<ComponentId>, pin: impl Into<String>) -> Self {
        Endpoint {
            component: component.into(),
            pin: pin.into(),
        }
    }

    pub fn is_on(&self, component: &ComponentId) -> bool {
        &self.component == component
    }

    pub fn same_component(&self, other: &Endpoint) -> bool {
        self.component == other.component
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.component, self.pin)
    }
}

/// Board pin name for a digital pin number (`D13` for 13).
pub fn digital_pin_name(number: u8) -> String {
    format!("D{}", number)
}

/// Inverse of [`digital_pin_name`]; `None` for power, analog and peripheral pins.
pub fn digital_pin_number(name: &str) -> Option<u8> {
    name.strip_prefix('D')?.parse().ok()
}
