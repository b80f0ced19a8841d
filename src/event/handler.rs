use serde::Serialize;
use std::any::type_name;
use std::marker::PhantomData;
use thiserror::Error;

/// A subscriber that failed while handling a published event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallbackFailure {
    /// Name of the failing subscriber
    pub subscriber: String,
    /// Position of the subscriber in the event's handler list
    pub position: usize,
    /// Panic message, if the payload carried one
    pub message: String,
}

/// Errors reported by [`EventBus::dispatch`](super::EventBus::dispatch)
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("No subscribers for event: {0}")]
    NoSubscribers(String),

    #[error("{} of {total} subscribers failed for event: {event}", .failures.len())]
    SubscribersFailed {
        event: String,
        total: usize,
        failures: Vec<CallbackFailure>,
    },

    #[error("Dispatch of event {event} aborted at subscriber {}, {skipped} skipped", .failure.subscriber)]
    Aborted {
        event: String,
        failure: CallbackFailure,
        skipped: usize,
    },
}

impl DispatchError {
    /// The event name this error refers to
    pub fn event(&self) -> &str {
        match self {
            DispatchError::NoSubscribers(event) => event,
            DispatchError::SubscribersFailed { event, .. } => event,
            DispatchError::Aborted { event, .. } => event,
        }
    }

    /// Whether at least one subscriber ran and failed
    pub fn is_callback_failure(&self) -> bool {
        !matches!(self, DispatchError::NoSubscribers(_))
    }
}

/// Trait for components that react to published events
///
/// The payload is optional: publishers may notify without data.
/// Failures are signalled by panicking; the bus's failure policy decides
/// whether the remaining subscribers still run.
pub trait EventHandler<T>: Send + Sync {
    /// Handle a published payload
    fn handle(&self, data: Option<&T>);

    /// Get a human-readable name for this handler (for logging/debugging)
    fn name(&self) -> &'static str;
}

/// Adapts a plain closure into an [`EventHandler`], named after the closure's type
pub(crate) struct FnHandler<F, T> {
    callback: F,
    _payload: PhantomData<fn(&T)>,
}

impl<F, T> FnHandler<F, T>
where
    F: Fn(Option<&T>) + Send + Sync,
{
    pub(crate) fn new(callback: F) -> Self {
        Self {
            callback,
            _payload: PhantomData,
        }
    }
}

impl<F, T> EventHandler<T> for FnHandler<F, T>
where
    F: Fn(Option<&T>) + Send + Sync,
{
    fn handle(&self, data: Option<&T>) {
        (self.callback)(data)
    }

    fn name(&self) -> &'static str {
        type_name::<F>()
    }
}

/// A no-op event handler for testing
///
/// Useful where a subscription has to exist but its behavior is irrelevant.
pub struct NoOpEventHandler;

impl<T> EventHandler<T> for NoOpEventHandler {
    fn handle(&self, _data: Option<&T>) {}

    fn name(&self) -> &'static str {
        "NoOpEventHandler"
    }
}
