//! DOM Events
//!
//! Listener registry and synthetic event dispatch.

use std::collections::HashMap;
use std::rc::Rc;

use crate::NodeId;

/// Event listener callback. Identity (for removal) is the `Rc` allocation.
pub type EventHandler = Rc<dyn Fn(&mut DomEvent)>;

/// DOM event
#[derive(Debug, Clone)]
pub struct DomEvent {
    pub event_type: String,
    pub target: NodeId,
    pub current_target: Option<NodeId>,
    pub bubbles: bool,
    pub cancelable: bool,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl DomEvent {
    /// Create an event that bubbles and can be cancelled, like a user click
    pub fn new(event_type: &str, target: NodeId) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            current_target: None,
            bubbles: true,
            cancelable: true,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Create an event that is delivered to its target only
    pub fn non_bubbling(event_type: &str, target: NodeId) -> Self {
        Self {
            bubbles: false,
            ..Self::new(event_type, target)
        }
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    /// Stop propagation
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Check if default was prevented
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Per-node listener lists
#[derive(Default)]
pub struct EventListeners {
    by_node: HashMap<NodeId, Vec<(String, EventHandler)>>,
}

impl EventListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Returns false if the same handler is already
    /// registered for this event type on this node.
    pub fn add(&mut self, node: NodeId, event_type: &str, handler: &EventHandler) -> bool {
        let list = self.by_node.entry(node).or_default();
        if list.iter().any(|(t, h)| t == event_type && Rc::ptr_eq(h, handler)) {
            return false;
        }
        list.push((event_type.to_string(), Rc::clone(handler)));
        true
    }

    /// Unregister a listener. Returns false if it was not registered.
    pub fn remove(&mut self, node: NodeId, event_type: &str, handler: &EventHandler) -> bool {
        let Some(list) = self.by_node.get_mut(&node) else {
            return false;
        };
        let before = list.len();
        list.retain(|(t, h)| !(t == event_type && Rc::ptr_eq(h, handler)));
        let removed = list.len() != before;
        if list.is_empty() {
            self.by_node.remove(&node);
        }
        removed
    }

    /// Handlers for one node and type, in registration order
    pub fn get(&self, node: NodeId, event_type: &str) -> Vec<EventHandler> {
        self.by_node.get(&node)
            .map(|list| {
                list.iter()
                    .filter(|(t, _)| t == event_type)
                    .map(|(_, h)| Rc::clone(h))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of listeners registered on a node
    pub fn count(&self, node: NodeId) -> usize {
        self.by_node.get(&node).map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for EventListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventListeners")
            .field("nodes", &self.by_node.len())
            .finish()
    }
}

/// Deliver an event along a precomputed path (target first, then ancestors).
///
/// The path carries cloned handlers so no document borrow is held while
/// listeners run. Returns false if a listener prevented the default action.
pub fn dispatch(path: Vec<(NodeId, Vec<EventHandler>)>, event: &mut DomEvent) -> bool {
    for (node, handlers) in path {
        event.current_target = Some(node);
        for handler in handlers {
            handler(event);
        }
        if event.is_propagation_stopped() || !event.bubbles {
            break;
        }
    }
    event.current_target = None;
    !event.is_default_prevented()
}
