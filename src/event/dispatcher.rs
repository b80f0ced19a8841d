use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, error};

use super::handler::CallbackFailure;
use super::handler_list::Callback;
use crate::config::FailurePolicy;

/// Result of running one handler list
pub(crate) struct Outcome {
    pub invoked: usize,
    pub failures: Vec<CallbackFailure>,
    /// Panic payload of the subscriber that stopped a fail-fast dispatch
    pub aborted: Option<Box<dyn Any + Send>>,
}

impl Outcome {
    pub fn skipped(&self, total: usize) -> usize {
        total - self.invoked
    }
}

/// Invokes `callbacks` in order with `data`, applying `policy` to panics
///
/// Each subscriber runs on the calling thread and is fully initiated before
/// the next one starts.
pub(crate) fn run<T>(
    event: &str,
    callbacks: &[Callback<T>],
    data: Option<&T>,
    policy: FailurePolicy,
) -> Outcome {
    debug!(
        event = %event,
        subscribers = callbacks.len(),
        policy = %policy,
        "Dispatching event"
    );

    let mut outcome = Outcome {
        invoked: 0,
        failures: Vec::new(),
        aborted: None,
    };

    for (position, callback) in callbacks.iter().enumerate() {
        outcome.invoked += 1;

        let Err(payload) = catch_unwind(AssertUnwindSafe(|| callback.handle(data))) else {
            continue;
        };

        let failure = CallbackFailure {
            subscriber: callback.name().to_string(),
            position,
            message: panic_message(payload.as_ref()),
        };

        error!(
            event = %event,
            subscriber = %failure.subscriber,
            position = position,
            error = %failure.message,
            "Subscriber failed"
        );

        outcome.failures.push(failure);

        if policy == FailurePolicy::FailFast {
            outcome.aborted = Some(payload);
            break;
        }
    }

    outcome
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
