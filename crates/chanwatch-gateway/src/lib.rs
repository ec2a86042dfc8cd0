pub mod connection;
pub mod notifier;

pub use notifier::{ChangeNotifier, Relay, Subscriber, SubscriptionId};
