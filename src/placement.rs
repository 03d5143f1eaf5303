use tracing::debug;

use crate::component::{ComponentInstance, ComponentKind};
use crate::types::{ComponentId, Point};

/// Components currently on the canvas, in placement order.
///
/// Removal is crate-private: deleting a component must also remove its
/// wires, which only [`crate::workspace::Workspace`] can do atomically.
#[derive(Debug, Clone, Default)]
pub struct PlacementStore {
    instances: Vec<ComponentInstance>,
    next_serial: u64,
}

impl PlacementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a new instance and return its generated id (`<tag>-<serial>`).
    pub fn place(&mut self, kind: ComponentKind, position: Point) -> ComponentId {
        let id = loop {
            self.next_serial += 1;
            let candidate = ComponentId::new(format!("{}-{}", kind.tag(), self.next_serial));
            if !self.contains(&candidate) {
                break candidate;
            }
        };
        debug!(component = %id, kind = %kind, %position, "placed component");
        self.instances
            .push(ComponentInstance::new(id.clone(), kind, position));
        id
    }

    /// Insert an instance with a caller-chosen id; `false` if the id is taken.
    pub fn insert(&mut self, instance: ComponentInstance) -> bool {
        if self.contains(&instance.id) {
            return false;
        }
        self.instances.push(instance);
        true
    }

    pub fn move_to(&mut self, id: &ComponentId, position: Point) -> bool {
        match self.instances.iter_mut().find(|c| &c.id == id) {
            Some(instance) => {
                instance.position = position;
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove(&mut self, id: &ComponentId) -> Option<ComponentInstance> {
        let index = self.instances.iter().position(|c| &c.id == id)?;
        Some(self.instances.remove(index))
    }

    pub fn get(&self, id: &ComponentId) -> Option<&ComponentInstance> {
        self.instances.iter().find(|c| &c.id == id)
    }

    pub fn contains(&self, id: &ComponentId) -> bool {
        self.get(id).is_some()
    }

    pub fn kind_of(&self, id: &ComponentId) -> Option<ComponentKind> {
        self.get(id).map(|c| c.kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentInstance> {
        self.instances.iter()
    }

    /// Driver boards in placement order
    pub fn boards(&self) -> impl Iterator<Item = &ComponentInstance> {
        self.instances.iter().filter(|c| c.kind.is_driver())
    }

    pub fn sinks(&self) -> impl Iterator<Item = &ComponentInstance> {
        self.instances.iter().filter(|c| c.kind.is_sink())
    }

    pub fn of_kind(&self, kind: ComponentKind) -> impl Iterator<Item = &ComponentInstance> {
        self.instances.iter().filter(move |c| c.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
