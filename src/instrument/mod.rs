//! Auto-instrumentation of object trees
//!
//! - `Signal` / `Action` - named events and user-facing triggers
//! - `Instrumented` / `Node` - trees that declare what can be listened to
//! - `TreeIntrospector` - recursive walk that subscribes to every action and signal
//! - `ActivationQueue` / `ActivationPump` - queued delivery into the dispatcher

pub mod activation;
pub mod introspector;
pub mod node;
pub mod signal;

pub use activation::{Activation, ActivationPump, ActivationQueue};
pub use introspector::TreeIntrospector;
pub use node::{Instrumented, Node};
pub use signal::{Action, Signal};
