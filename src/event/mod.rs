// Publish/subscribe infrastructure
//
// This module provides the registry that lets publishers notify subscribers
// of named events without either side knowing about the other.

// Public API - what other modules can use
pub use bus::{Delivery, EventBus, JsonEventBus};
pub use handler::{CallbackFailure, DispatchError, EventHandler, NoOpEventHandler};
pub use handler_list::{Callback, HandlerList, ListChange, ListObserver};

// Internal modules
mod bus;
mod dispatcher;
mod handler;
mod handler_list;
