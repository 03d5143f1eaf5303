//! # Wiring Session
//!
//! Interactive, multi-click creation of a single wire.
//!
//! ```text
//!   Idle --pin--> Drawing{start, []}
//!   Drawing --canvas(p)--> Drawing{start, bends + p}
//!   Drawing --pin on start's component--> Drawing (unchanged, rejected)
//!   Drawing --pin elsewhere--> Idle, wire emitted
//!   Drawing --cancel--> Idle, bends discarded
//! ```

use tracing::debug;

use crate::connection::{WireColor, WireStore};
use crate::geometry::PinCatalogue;
use crate::pin::Endpoint;
use crate::placement::PlacementStore;
use crate::types::{ComponentId, Point, WireId};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum WiringSession {
    #[default]
    Idle,
    Drawing {
        start: Endpoint,
        bend_points: Vec<Point>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum WiringEvent {
    PinClicked(Endpoint),
    CanvasClicked(Point),
    Cancel,
}

/// What a single event did to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WiringOutcome {
    Started,
    BendAdded,
    Completed(WireId),
    /// Completion on the start component; session unchanged
    Rejected,
    Cancelled,
    /// Event has no meaning in the current state
    Ignored,
}

impl WiringSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self, WiringSession::Drawing { .. })
    }

    pub fn start(&self) -> Option<&Endpoint> {
        match self {
            WiringSession::Idle => None,
            WiringSession::Drawing { start, .. } => Some(start),
        }
    }

    pub fn bend_points(&self) -> &[Point] {
        match self {
            WiringSession::Idle => &[],
            WiringSession::Drawing { bend_points, .. } => bend_points,
        }
    }

    pub fn started_on(&self, component: &ComponentId) -> bool {
        self.start().is_some_and(|start| start.is_on(component))
    }

    /// Apply one event. A completed wire is written into `wires`.
    pub fn handle(&mut self, event: WiringEvent, wires: &mut WireStore, color: WireColor) -> WiringOutcome {
        match (std::mem::take(self), event) {
            (WiringSession::Idle, WiringEvent::PinClicked(start)) => {
                debug!(%start, "wire started");
                *self = WiringSession::Drawing {
                    start,
                    bend_points: Vec::new(),
                };
                WiringOutcome::Started
            }
            (WiringSession::Idle, _) => WiringOutcome::Ignored,
            (
                WiringSession::Drawing {
                    start,
                    mut bend_points,
                },
                WiringEvent::CanvasClicked(point),
            ) => {
                bend_points.push(point);
                *self = WiringSession::Drawing { start, bend_points };
                WiringOutcome::BendAdded
            }
            (WiringSession::Drawing { start, bend_points }, WiringEvent::PinClicked(end)) => {
                if end.same_component(&start) {
                    debug!(%start, %end, "wire end on start component ignored");
                    *self = WiringSession::Drawing { start, bend_points };
                    return WiringOutcome::Rejected;
                }
                match wires.connect(start.clone(), end, bend_points.clone(), color) {
                    Some(id) => WiringOutcome::Completed(id),
                    None => {
                        *self = WiringSession::Drawing { start, bend_points };
                        WiringOutcome::Rejected
                    }
                }
            }
            (WiringSession::Drawing { start, .. }, WiringEvent::Cancel) => {
                debug!(%start, "wire cancelled");
                WiringOutcome::Cancelled
            }
        }
    }

    pub fn cancel(&mut self) -> bool {
        let was_drawing = self.is_drawing();
        *self = WiringSession::Idle;
        was_drawing
    }

    /// Rubber-band feedback: start pin, bends so far, then the cursor.
    pub fn preview(&self, catalogue: &PinCatalogue, placement: &PlacementStore, cursor: Point) -> Vec<Point> {
        let WiringSession::Drawing { start, bend_points } = self else {
            return Vec::new();
        };
        let Some(origin) = catalogue.resolve_endpoint(placement, start) else {
            return Vec::new();
        };

        let mut points = Vec::with_capacity(bend_points.len() + 2);
        points.push(origin);
        points.extend_from_slice(bend_points);
        points.push(cursor);
        points
    }
}
