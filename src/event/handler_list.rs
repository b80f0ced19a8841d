use serde::Serialize;
use std::sync::Arc;

use super::handler::EventHandler;

/// Shared reference to a registered subscriber
pub type Callback<T> = Arc<dyn EventHandler<T>>;

/// Observer hook for one event's handler list
pub type ListObserver = Arc<dyn Fn(&ListChange) + Send + Sync>;

/// Notification sent to observers when a handler list grows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListChange {
    /// Event whose handler list changed
    pub event: String,
    /// Name of the subscriber that was appended
    pub subscriber: &'static str,
    /// Length of the list after the append
    pub len: usize,
}

/// Ordered, observable list of the subscribers for a single event
///
/// Appends are the only mutation. Every append produces a [`ListChange`]
/// that the owner hands to [`HandlerList::observers`] once its lock is released.
pub struct HandlerList<T> {
    event: String,
    callbacks: Vec<Callback<T>>,
    observers: Vec<ListObserver>,
}

impl<T> HandlerList<T> {
    /// Creates an empty list for `event`, pre-attached to `observers`
    pub fn new(event: impl Into<String>, observers: Vec<ListObserver>) -> Self {
        Self {
            event: event.into(),
            callbacks: Vec::new(),
            observers,
        }
    }

    /// Appends a subscriber and describes the change
    pub fn push(&mut self, callback: Callback<T>) -> ListChange {
        let subscriber = callback.name();
        self.callbacks.push(callback);
        ListChange {
            event: self.event.clone(),
            subscriber,
            len: self.callbacks.len(),
        }
    }

    /// Attaches an observer that sees every later append
    pub fn observe(&mut self, observer: ListObserver) {
        self.observers.push(observer);
    }

    /// Clones the current subscribers, in registration order
    pub fn snapshot(&self) -> Vec<Callback<T>> {
        self.callbacks.clone()
    }

    /// Clones the attached observers
    pub fn observers(&self) -> Vec<ListObserver> {
        self.observers.clone()
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}
