// Library crate for the in-process event bus
// This file exposes the public API for the demo binary and integration tests

pub mod config;
pub mod event;

// Re-export commonly used types for easier access in tests
pub use config::{BusConfig, FailurePolicy};
pub use event::{
    CallbackFailure, Delivery, DispatchError, EventBus, EventHandler, JsonEventBus, ListChange,
    NoOpEventHandler,
};
