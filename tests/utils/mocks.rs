use std::sync::{Arc, Mutex};

use eventbus::EventHandler;

// ============================================================================
// Recording Subscribers
// ============================================================================

type Calls<T> = Arc<Mutex<Vec<(&'static str, Option<T>)>>>;

/// Collects every invocation of the callbacks it hands out, in call order
pub struct Recorder<T> {
    calls: Calls<T>,
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            calls: self.calls.clone(),
        }
    }
}

#[allow(dead_code)]
impl<T: Clone + Send + 'static> Recorder<T> {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A callback that records `tag` together with the payload it receives
    pub fn callback(&self, tag: &'static str) -> impl Fn(Option<&T>) + Send + Sync + 'static {
        let calls = self.calls.clone();
        move |data: Option<&T>| {
            calls.lock().unwrap().push((tag, data.cloned()));
        }
    }

    /// A named handler that records into this recorder
    pub fn handler(&self, name: &'static str) -> Arc<NamedHandler<T>> {
        Arc::new(NamedHandler {
            name,
            calls: self.calls.clone(),
        })
    }

    pub fn calls(&self) -> Vec<(&'static str, Option<T>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn tags(&self) -> Vec<&'static str> {
        self.calls().into_iter().map(|(tag, _)| tag).collect()
    }

    pub fn payloads(&self) -> Vec<Option<T>> {
        self.calls().into_iter().map(|(_, data)| data).collect()
    }
}

/// Trait-object subscriber backed by a [`Recorder`]
pub struct NamedHandler<T> {
    name: &'static str,
    calls: Calls<T>,
}

impl<T: Clone + Send> EventHandler<T> for NamedHandler<T> {
    fn handle(&self, data: Option<&T>) {
        self.calls.lock().unwrap().push((self.name, data.cloned()));
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
