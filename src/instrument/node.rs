//! Instrumentable object trees
//!
//! Nodes declare what can be listened to instead of being discovered by
//! reflection: their actions, their public signals and their children.

use super::signal::{Action, Signal};
use std::sync::Arc;

/// A node of an object tree that can be auto-instrumented
pub trait Instrumented {
    /// Triggerable actions attached to this node
    fn actions(&self) -> &[Arc<Action>] {
        &[]
    }

    /// Public signals this node emits
    fn signals(&self) -> &[Arc<Signal>] {
        &[]
    }

    /// Direct children, in a stable order
    fn children(&self) -> Vec<&dyn Instrumented> {
        Vec::new()
    }
}

/// General-purpose tree node
#[derive(Debug, Default)]
pub struct Node {
    name: String,
    actions: Vec<Arc<Action>>,
    signals: Vec<Arc<Signal>>,
    children: Vec<Node>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn with_action(mut self, action: Arc<Action>) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_signal(mut self, signal: Arc<Signal>) -> Self {
        self.signals.push(signal);
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Depth-first search by name
    pub fn find(&self, name: &str) -> Option<&Node> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }
}

impl Instrumented for Node {
    fn actions(&self) -> &[Arc<Action>] {
        &self.actions
    }

    fn signals(&self) -> &[Arc<Signal>] {
        &self.signals
    }

    fn children(&self) -> Vec<&dyn Instrumented> {
        self.children
            .iter()
            .map(|child| child as &dyn Instrumented)
            .collect()
    }
}
