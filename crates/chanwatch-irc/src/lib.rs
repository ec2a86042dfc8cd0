//! IRC frame model and line transport.
//!
//! The collector only understands the handful of commands it routes, so
//! [`Command`] names those and carries everything else through verbatim.

pub mod client;
pub mod command;
pub mod message;

pub use client::{ConnectConfig, IrcSender};
pub use command::Command;
pub use message::{Message, Prefix};

/// Capability to write frames onto the live connection.
pub trait Outbound: Send + Sync {
    fn send(&self, message: Message);
}
