//! # Pin Geometry
//!
//! Immutable registry of pin offsets keyed by `(kind, pin)`, and the resolver
//! that turns an offset plus an instance position into a canvas coordinate.
//!
//! Lookups are total: a pin that is not registered resolves to the center of
//! the component's artwork.
//!
//! ## Catalogue File Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "pins": [
//!     {"kind": "led-red", "pin": "anode", "x": 13.5, "y": 76, "category": "lead"}
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::warn;

use crate::component::{ComponentInstance, ComponentKind};
use crate::error::{Result, SimError};
use crate::pin::{Endpoint, PinCategory};
use crate::placement::PlacementStore;
use crate::types::Point;

pub const CATALOGUE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinDescriptor {
    pub kind: ComponentKind,
    pub pin: String,
    pub x: f64,
    pub y: f64,
    pub category: PinCategory,
}

impl PinDescriptor {
    pub fn offset(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogueFile {
    version: u32,
    pins: Vec<PinDescriptor>,
}

#[derive(Debug, Clone)]
pub struct PinCatalogue {
    version: u32,
    descriptors: HashMap<(ComponentKind, String), PinDescriptor>,
}

// Offsets are relative to the top-left corner of each component's artwork.
const BOARD_GEOMETRY: &[(&str, f64, f64, PinCategory)] = &[
    ("AREF", 178.0, 28.0, PinCategory::Reference),
    ("GND_D", 196.0, 28.0, PinCategory::Ground),
    ("D13", 214.0, 28.0, PinCategory::Digital),
    ("D12", 232.0, 28.0, PinCategory::Digital),
    ("D11", 250.0, 28.0, PinCategory::Digital),
    ("D10", 268.0, 28.0, PinCategory::Digital),
    ("D9", 286.0, 28.0, PinCategory::Digital),
    ("D8", 304.0, 28.0, PinCategory::Digital),
    ("D7", 330.0, 28.0, PinCategory::Digital),
    ("D6", 348.0, 28.0, PinCategory::Digital),
    ("D5", 366.0, 28.0, PinCategory::Digital),
    ("D4", 384.0, 28.0, PinCategory::Digital),
    ("D3", 402.0, 28.0, PinCategory::Digital),
    ("D2", 420.0, 28.0, PinCategory::Digital),
    ("D1", 438.0, 28.0, PinCategory::Digital),
    ("D0", 456.0, 28.0, PinCategory::Digital),
    ("IOREF", 160.0, 292.0, PinCategory::Reference),
    ("RESET", 178.0, 292.0, PinCategory::Control),
    ("3V3", 196.0, 292.0, PinCategory::Power),
    ("5V", 214.0, 292.0, PinCategory::Power),
    ("GND_1", 232.0, 292.0, PinCategory::Ground),
    ("GND_2", 250.0, 292.0, PinCategory::Ground),
    ("VIN", 268.0, 292.0, PinCategory::Power),
    ("A0", 330.0, 292.0, PinCategory::Analog),
    ("A1", 348.0, 292.0, PinCategory::Analog),
    ("A2", 366.0, 292.0, PinCategory::Analog),
    ("A3", 384.0, 292.0, PinCategory::Analog),
    ("A4", 402.0, 292.0, PinCategory::Analog),
    ("A5", 420.0, 292.0, PinCategory::Analog),
];

const LED_GEOMETRY: &[(&str, f64, f64, PinCategory)] = &[
    ("anode", 13.5, 76.0, PinCategory::Lead),
    ("cathode", 26.5, 70.0, PinCategory::Lead),
];

const RESISTOR_GEOMETRY: &[(&str, f64, f64, PinCategory)] = &[
    ("lead1", 25.0, 5.0, PinCategory::Lead),
    ("lead2", 25.0, 115.0, PinCategory::Lead),
];

const BUTTON_GEOMETRY: &[(&str, f64, f64, PinCategory)] = &[
    ("1b", 20.0, 15.0, PinCategory::Lead),
    ("2b", 50.0, 15.0, PinCategory::Lead),
    ("1a", 20.0, 105.0, PinCategory::Lead),
    ("2a", 50.0, 105.0, PinCategory::Lead),
];

impl PinCatalogue {
    pub fn empty() -> Self {
        PinCatalogue {
            version: CATALOGUE_VERSION,
            descriptors: HashMap::new(),
        }
    }

    /// Built-in catalogue, constructed on first use and shared afterwards.
    pub fn builtin() -> &'static PinCatalogue {
        static BUILTIN: OnceLock<PinCatalogue> = OnceLock::new();
        BUILTIN.get_or_init(Self::build_default)
    }

    fn build_default() -> Self {
        let mut catalogue = Self::empty();
        for kind in ComponentKind::ALL {
            let table: &[(&str, f64, f64, PinCategory)] = match kind {
                ComponentKind::ArduinoUno => BOARD_GEOMETRY,
                ComponentKind::LedRed | ComponentKind::LedGreen | ComponentKind::LedYellow => {
                    LED_GEOMETRY
                }
                ComponentKind::Resistor => RESISTOR_GEOMETRY,
                ComponentKind::PushButton => BUTTON_GEOMETRY,
                // No artwork offsets; always resolves to the center.
                ComponentKind::Buzzer => &[],
            };
            for (pin, x, y, category) in table {
                catalogue.register(PinDescriptor {
                    kind,
                    pin: pin.to_string(),
                    x: *x,
                    y: *y,
                    category: *category,
                });
            }
        }
        catalogue
    }

    /// Parse a catalogue file. Files written for another table version are
    /// rejected, since their offsets follow different artwork.
    pub fn from_json(content: &str) -> std::result::Result<Self, serde_json::Error> {
        let file: CatalogueFile = serde_json::from_str(content)?;
        if file.version != CATALOGUE_VERSION {
            warn!(found = file.version, expected = CATALOGUE_VERSION, "pin catalogue version mismatch");
            return Err(serde::de::Error::custom(format!(
                "pin catalogue version {} is not supported (expected {})",
                file.version, CATALOGUE_VERSION
            )));
        }
        let mut catalogue = PinCatalogue {
            version: file.version,
            descriptors: HashMap::new(),
        };
        for descriptor in file.pins {
            catalogue.register(descriptor);
        }
        Ok(catalogue)
    }

    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| SimError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| SimError::Json {
            path: path.to_string(),
            source,
        })
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        let mut pins: Vec<PinDescriptor> = self.descriptors.values().cloned().collect();
        pins.sort_by(|a, b| (a.kind, &a.pin).cmp(&(b.kind, &b.pin)));
        serde_json::to_string_pretty(&CatalogueFile {
            version: self.version,
            pins,
        })
    }

    fn register(&mut self, descriptor: PinDescriptor) {
        self.descriptors
            .insert((descriptor.kind, descriptor.pin.clone()), descriptor);
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn descriptor(&self, kind: ComponentKind, pin: &str) -> Option<&PinDescriptor> {
        self.descriptors.get(&(kind, pin.to_string()))
    }

    /// Local offset of a pin, or the artwork center when not registered.
    pub fn offset(&self, kind: ComponentKind, pin: &str) -> Point {
        self.descriptor(kind, pin)
            .map(PinDescriptor::offset)
            .unwrap_or_else(|| kind.size().half())
    }

    pub fn resolve(&self, kind: ComponentKind, pin: &str, position: Point) -> Point {
        position + self.offset(kind, pin)
    }

    pub fn resolve_on(&self, instance: &ComponentInstance, pin: &str) -> Point {
        self.resolve(instance.kind, pin, instance.position)
    }

    /// Absolute coordinate of an endpoint; `None` only when its component is gone.
    pub fn resolve_endpoint(&self, placement: &PlacementStore, endpoint: &Endpoint) -> Option<Point> {
        placement
            .get(&endpoint.component)
            .map(|instance| self.resolve_on(instance, &endpoint.pin))
    }
}

impl Default for PinCatalogue {
    fn default() -> Self {
        Self::build_default()
    }
}
