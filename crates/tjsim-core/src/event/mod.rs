//! Document-scoped event bus for the interception layer.

pub mod bus;

pub use bus::{EventBus, SubscriptionId};
