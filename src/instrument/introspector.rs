//! Tree walk that subscribes to actions and signals
//!
//! Depth-first, pre-order: a node's actions, then (with deep inspection) its
//! signals, then each child in the node's own order. Every subscription
//! captures the identity of what it listens to, so the shared handling code
//! knows which member fired without looking it up at call time.
//!
//! The walk is not idempotent: walking the same tree twice subscribes twice.

use super::activation::{Activation, ActivationQueue};
use super::node::Instrumented;

pub struct TreeIntrospector {
    queue: ActivationQueue,
    signal_inspection: bool,
}

impl TreeIntrospector {
    pub fn new(queue: ActivationQueue, signal_inspection: bool) -> Self {
        Self {
            queue,
            signal_inspection,
        }
    }

    /// Subscribe to everything under `root`. Returns the number of subscriptions.
    pub fn listen(&self, root: &dyn Instrumented) -> usize {
        let mut count = 0;

        for action in root.actions() {
            let queue = self.queue.clone();
            let text = action.text().to_string();
            let object_name = action.object_name().to_string();
            action.triggered().connect(move || {
                queue.post(Activation::Action {
                    text: text.clone(),
                    object_name: object_name.clone(),
                });
            });
            count += 1;
        }

        if self.signal_inspection {
            for signal in root.signals() {
                let queue = self.queue.clone();
                let name = signal.name().to_string();
                signal.connect(move || {
                    queue.post(Activation::Signal { name: name.clone() });
                });
                count += 1;
            }
        }

        for child in root.children() {
            count += self.listen(child);
        }

        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::{Action, Node, Signal};
    use std::cell::RefCell;
    use std::sync::Arc;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn introspector(signal_inspection: bool) -> (TreeIntrospector, UnboundedReceiver<Activation>) {
        let (queue, rx) = ActivationQueue::channel();
        (TreeIntrospector::new(queue, signal_inspection), rx)
    }

    fn drain(rx: &mut UnboundedReceiver<Activation>) -> Vec<Activation> {
        let mut out = Vec::new();
        while let Ok(a) = rx.try_recv() {
            out.push(a);
        }
        out
    }

    #[test]
    fn test_two_actions_and_child_action_make_three_subscriptions() {
        let (walker, _rx) = introspector(false);
        let tree = Node::new("root")
            .with_action(Arc::new(Action::new("New", "actionNew")))
            .with_action(Arc::new(Action::new("Open", "actionOpen")))
            .with_signal(Arc::new(Signal::new("closed")))
            .with_child(Node::new("child").with_action(Arc::new(Action::new("Copy", "actionCopy"))));

        assert_eq!(walker.listen(&tree), 3);
    }

    #[test]
    fn test_signals_only_with_deep_inspection() {
        let clicked = Arc::new(Signal::new("clicked"));
        let tree = Node::new("button").with_signal(clicked.clone());

        let (shallow, _rx) = introspector(false);
        assert_eq!(shallow.listen(&tree), 0);
        assert_eq!(clicked.connection_count(), 0);

        let (deep, mut rx) = introspector(true);
        assert_eq!(deep.listen(&tree), 1);

        clicked.emit();
        assert_eq!(
            drain(&mut rx),
            vec![Activation::Signal {
                name: "clicked".into()
            }]
        );
    }

    #[test]
    fn test_empty_tree_is_noop() {
        let (walker, mut rx) = introspector(true);
        assert_eq!(walker.listen(&Node::new("empty")), 0);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_identity_captured_per_subscription() {
        let (walker, mut rx) = introspector(false);
        let cut = Arc::new(Action::new("Cut", "actionCut"));
        let paste = Arc::new(Action::new("Paste", "actionPaste"));
        let tree = Node::new("edit")
            .with_action(cut.clone())
            .with_action(paste.clone());
        walker.listen(&tree);

        paste.trigger();
        cut.trigger();

        assert_eq!(
            drain(&mut rx),
            vec![
                Activation::Action {
                    text: "Paste".into(),
                    object_name: "actionPaste".into()
                },
                Activation::Action {
                    text: "Cut".into(),
                    object_name: "actionCut".into()
                },
            ]
        );
    }

    /// Node that records when the walker inspects it
    struct Recorder<'a> {
        name: &'static str,
        log: &'a RefCell<Vec<String>>,
        children: Vec<Recorder<'a>>,
    }

    impl Instrumented for Recorder<'_> {
        fn actions(&self) -> &[Arc<Action>] {
            self.log.borrow_mut().push(format!("{}:actions", self.name));
            &[]
        }

        fn signals(&self) -> &[Arc<Signal>] {
            self.log.borrow_mut().push(format!("{}:signals", self.name));
            &[]
        }

        fn children(&self) -> Vec<&dyn Instrumented> {
            self.children
                .iter()
                .map(|child| child as &dyn Instrumented)
                .collect()
        }
    }

    #[test]
    fn test_walk_is_depth_first_pre_order() {
        let log = RefCell::new(Vec::new());
        let node = |name, children| Recorder {
            name,
            log: &log,
            children,
        };

        // root -> [x -> [y], z]
        let tree = node("root", vec![node("x", vec![node("y", vec![])]), node("z", vec![])]);

        let (walker, _rx) = introspector(true);
        assert_eq!(walker.listen(&tree), 0);

        assert_eq!(
            *log.borrow(),
            vec![
                "root:actions",
                "root:signals",
                "x:actions",
                "x:signals",
                "y:actions",
                "y:signals",
                "z:actions",
                "z:signals",
            ]
        );
    }

    #[test]
    fn test_shallow_walk_skips_signal_lookup() {
        let log = RefCell::new(Vec::new());
        let tree = Recorder {
            name: "root",
            log: &log,
            children: vec![],
        };

        let (walker, _rx) = introspector(false);
        walker.listen(&tree);

        assert_eq!(*log.borrow(), vec!["root:actions"]);
    }

    #[test]
    fn test_second_walk_duplicates_subscriptions() {
        let (walker, mut rx) = introspector(false);
        let action = Arc::new(Action::new("Run", "actionRun"));
        let tree = Node::new("root").with_action(action.clone());

        walker.listen(&tree);
        walker.listen(&tree);
        assert_eq!(action.triggered().connection_count(), 2);

        action.trigger();
        assert_eq!(drain(&mut rx).len(), 2);
    }
}
