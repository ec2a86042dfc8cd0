use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use chanwatch_irc::{Command, Message, Outbound};

/// A routed handler. Gets the dispatcher's state, the frame, and the
/// connection's send capability.
pub type Handler<S> = Arc<dyn Fn(&mut S, &Message, &dyn Outbound) + Send + Sync>;

/// Routes inbound frames to one handler per command tag.
///
/// Dispatch is strictly sequential: the dispatcher owns its state outright
/// and every handler runs to completion before the next frame is looked at.
pub struct EventDispatcher<S> {
    state: S,
    handlers: HashMap<Command, Handler<S>>,
    outbound: Arc<dyn Outbound>,
}

impl<S> EventDispatcher<S> {
    pub fn new(state: S, outbound: Arc<dyn Outbound>) -> Self {
        Self {
            state,
            handlers: HashMap::new(),
            outbound,
        }
    }

    /// Bind `handler` to `command`. A later registration for the same
    /// command replaces this one.
    pub fn register<F>(&mut self, command: Command, handler: F)
    where
        F: Fn(&mut S, &Message, &dyn Outbound) + Send + Sync + 'static,
    {
        self.handlers.insert(command, Arc::new(handler));
    }

    /// Bind one handler to several commands.
    pub fn register_all<F>(&mut self, commands: &[Command], handler: F)
    where
        F: Fn(&mut S, &Message, &dyn Outbound) + Send + Sync + 'static,
    {
        let handler: Handler<S> = Arc::new(handler);
        for command in commands {
            self.handlers.insert(command.clone(), handler.clone());
        }
    }

    /// Route `message` to its handler. Frames nobody registered for are
    /// dropped; returns whether a handler ran.
    pub fn dispatch(&mut self, message: &Message) -> bool {
        let Some(handler) = self.handlers.get(&message.command) else {
            trace!("No handler for {}", message.command);
            return false;
        };
        handler(&mut self.state, message, self.outbound.as_ref());
        true
    }

    pub fn state(&self) -> &S {
        &self.state
    }
}
