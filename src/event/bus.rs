use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, error, warn};

use super::dispatcher;
use super::handler::{DispatchError, EventHandler, FnHandler};
use super::handler_list::{Callback, HandlerList, ListChange, ListObserver};
use crate::config::BusConfig;

/// Event bus carrying arbitrary JSON payloads
pub type JsonEventBus = EventBus<Value>;

/// Successful delivery of one published event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delivery {
    pub event: String,
    /// Number of subscribers invoked
    pub invoked: usize,
}

struct Registry<T> {
    /// Event name -> subscribers, in registration order
    events: HashMap<String, HandlerList<T>>,
    /// Observers waiting for an event's first subscriber
    pending_observers: HashMap<String, Vec<ListObserver>>,
}

/// Synchronous publish/subscribe registry
///
/// Handles are cheap to clone and all clones share one registry, so the
/// composition root builds a single bus and passes it to publishers and
/// subscribers alike. Subscriptions are never removed.
///
/// Dispatch snapshots the handler list and runs subscribers with no lock
/// held: a subscriber may publish or subscribe on the same bus, and
/// subscribers added mid-dispatch first see the next publish.
pub struct EventBus<T = Value> {
    registry: Arc<RwLock<Registry<T>>>,
    config: BusConfig,
}

impl<T: 'static> EventBus<T> {
    /// Creates an empty event bus with the default configuration
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    /// Creates an empty event bus with the given configuration
    pub fn with_config(config: BusConfig) -> Self {
        Self {
            registry: Arc::new(RwLock::new(Registry {
                events: HashMap::new(),
                pending_observers: HashMap::new(),
            })),
            config,
        }
    }

    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Registers `callback` to run on every later publish of `event`
    pub fn subscribe<F>(&self, event: impl Into<String>, callback: F)
    where
        F: Fn(Option<&T>) + Send + Sync + 'static,
    {
        self.subscribe_handler(event, Arc::new(FnHandler::new(callback)));
    }

    /// Registers a named handler to run on every later publish of `event`
    pub fn subscribe_handler(
        &self,
        event: impl Into<String>,
        handler: Arc<dyn EventHandler<T>>,
    ) {
        let event = event.into();

        let (change, observers) = {
            let mut registry = self.write();
            let Registry {
                events,
                pending_observers,
            } = &mut *registry;

            let list = events.entry(event.clone()).or_insert_with(|| {
                let observers = pending_observers.remove(&event).unwrap_or_default();
                HandlerList::new(event.clone(), observers)
            });

            (list.push(handler), list.observers())
        };

        debug!(
            event = %change.event,
            subscriber = change.subscriber,
            subscribers = change.len,
            "Subscribed to event"
        );

        // Subscribing is total: a failing observer is logged and the rest still run
        for observer in observers {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| observer(&change))) {
                error!(
                    event = %change.event,
                    subscriber = change.subscriber,
                    error = %dispatcher::panic_message(payload.as_ref()),
                    "Handler list observer failed"
                );
            }
        }
    }

    /// Watches the handler list of `event`
    ///
    /// The observer runs after every append to that list, including the
    /// first subscription when the event has none yet. Publishing never
    /// triggers it. A panicking observer is logged and does not affect the
    /// subscription or the other observers.
    ///
    /// Observers watching an event that never gets a subscriber are kept
    /// for the lifetime of the bus.
    pub fn watch<O>(&self, event: impl Into<String>, observer: O)
    where
        O: Fn(&ListChange) + Send + Sync + 'static,
    {
        let event = event.into();
        let observer: ListObserver = Arc::new(observer);
        let mut registry = self.write();
        let Registry {
            events,
            pending_observers,
        } = &mut *registry;

        match events.get_mut(&event) {
            Some(list) => list.observe(observer),
            None => pending_observers.entry(event).or_default().push(observer),
        }
    }

    /// Invokes every subscriber of `event` with `data`, in registration order
    ///
    /// Publishing an event with no subscribers only logs a warning. A
    /// panicking subscriber is handled per [`FailurePolicy`](crate::FailurePolicy):
    /// isolated and logged, or resumed out of this call after skipping the
    /// remaining subscribers.
    pub fn publish(&self, event: &str, data: impl Into<Option<T>>) {
        let data = data.into();

        let Some(callbacks) = self.snapshot(event) else {
            if self.config.warn_unrouted {
                warn!(event = %event, "No subscribers for event");
            }
            return;
        };

        let outcome = dispatcher::run(
            event,
            &callbacks,
            data.as_ref(),
            self.config.failure_policy,
        );

        if let Some(payload) = outcome.aborted {
            resume_unwind(payload);
        }
    }

    /// Delivers like [`publish`](Self::publish) but reports the outcome
    ///
    /// Never panics on a failing subscriber; under the fail-fast policy the
    /// dispatch stops and [`DispatchError::Aborted`] is returned instead.
    pub fn dispatch(
        &self,
        event: &str,
        data: impl Into<Option<T>>,
    ) -> Result<Delivery, DispatchError> {
        let data = data.into();

        let Some(callbacks) = self.snapshot(event) else {
            debug!(event = %event, "Dispatch found no subscribers");
            return Err(DispatchError::NoSubscribers(event.to_string()));
        };

        let total = callbacks.len();
        let mut outcome = dispatcher::run(
            event,
            &callbacks,
            data.as_ref(),
            self.config.failure_policy,
        );

        if outcome.failures.is_empty() {
            return Ok(Delivery {
                event: event.to_string(),
                invoked: outcome.invoked,
            });
        }

        if outcome.aborted.is_some() {
            let skipped = outcome.skipped(total);
            return Err(DispatchError::Aborted {
                event: event.to_string(),
                failure: outcome.failures.swap_remove(0),
                skipped,
            });
        }

        Err(DispatchError::SubscribersFailed {
            event: event.to_string(),
            total,
            failures: outcome.failures,
        })
    }

    pub fn has_subscribers(&self, event: &str) -> bool {
        self.read().events.contains_key(event)
    }

    /// Number of subscriptions for `event`, counting duplicates
    pub fn subscriber_count(&self, event: &str) -> usize {
        self.read().events.get(event).map_or(0, HandlerList::len)
    }

    /// Names of all events with at least one subscriber, sorted
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().events.keys().cloned().collect();
        names.sort();
        names
    }

    fn snapshot(&self, event: &str) -> Option<Vec<Callback<T>>> {
        self.read().events.get(event).map(HandlerList::snapshot)
    }

    // Subscribers never run under the lock, so poisoning can only come from
    // a panic inside the bus itself; the registry is still consistent then.
    fn read(&self) -> RwLockReadGuard<'_, Registry<T>> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registry<T>> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for EventBus<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            config: self.config.clone(),
        }
    }
}

impl<T> fmt::Debug for EventBus<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        let mut events: Vec<(&String, usize)> = registry
            .events
            .iter()
            .map(|(name, list)| (name, list.len()))
            .collect();
        events.sort();

        f.debug_struct("EventBus")
            .field("events", &events)
            .field("config", &self.config)
            .finish()
    }
}
