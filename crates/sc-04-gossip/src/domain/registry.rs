//! Message handler registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Identifies one open connection for the lifetime of the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Receives the payload of every inbound frame with a given name.
///
/// Runs on the connection's reader task: keep it short and never block on
/// I/O. Sending through the transport only enqueues, so replying is fine.
pub trait MessageHandler: Send + Sync {
    fn handle(&self, origin: ConnectionId, payload: &[u8]);
}

impl<F> MessageHandler for F
where
    F: Fn(ConnectionId, &[u8]) + Send + Sync,
{
    fn handle(&self, origin: ConnectionId, payload: &[u8]) {
        self(origin, payload)
    }
}

/// A registered handler and whether its message type floods.
#[derive(Clone)]
pub struct Registration {
    pub handler: Arc<dyn MessageHandler>,
    pub floods: bool,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("floods", &self.floods)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Registration>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `name`, replacing any previous one.
    pub fn register(&mut self, name: &str, handler: Arc<dyn MessageHandler>, floods: bool) {
        self.handlers
            .insert(name.to_string(), Registration { handler, floods });
    }

    pub fn get(&self, name: &str) -> Option<Registration> {
        self.handlers.get(name).cloned()
    }

    pub fn floods(&self, name: &str) -> bool {
        self.handlers.get(name).is_some_and(|r| r.floods)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
