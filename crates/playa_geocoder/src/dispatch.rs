//! Completion contexts
//!
//! Where asynchronous lookup results are delivered. The geocoder never runs
//! callbacks on its own worker; it hands them to a [`CompletionContext`].

use crate::worker::SerialWorker;
use crate::GeocoderError;
use std::sync::{mpsc, Arc};

/// A deferred callback.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Something that can run tasks on the caller's behalf.
pub trait CompletionContext: Send + Sync {
    fn dispatch(&self, task: Task);

    /// Wait until every task dispatched so far has run, where the context
    /// can tell. Default: return at once.
    fn flush(&self) {}
}

impl<C: CompletionContext + ?Sized> CompletionContext for Arc<C> {
    fn dispatch(&self, task: Task) {
        (**self).dispatch(task)
    }

    fn flush(&self) {
        (**self).flush()
    }
}

/// Callbacks run as tasks on a tokio runtime.
impl CompletionContext for tokio::runtime::Handle {
    fn dispatch(&self, task: Task) {
        self.spawn(async move { task() });
    }
}

/// A named thread running tasks one at a time, in order.
///
/// The geocoder's default context; plays the part of an application's main
/// queue. Dropping it never waits: the thread finishes what is queued on its
/// own, so the last handle can go away on any thread.
pub struct SerialQueue {
    worker: SerialWorker<()>,
}

impl SerialQueue {
    pub fn new(name: &str) -> Result<Self, GeocoderError> {
        let worker =
            SerialWorker::spawn(name, || ()).map_err(|source| GeocoderError::ThreadSpawn {
                name: name.to_owned(),
                source,
            })?;
        Ok(Self { worker })
    }

    pub fn name(&self) -> &str {
        self.worker.name()
    }
}

impl CompletionContext for SerialQueue {
    fn dispatch(&self, task: Task) {
        if !self.worker.submit(move |_| task()) {
            tracing::warn!(queue = %self.name(), "Completion queue is closed; task dropped");
        }
    }

    fn flush(&self) {
        if self.worker.is_current() {
            return;
        }
        let (sender, receiver) = mpsc::sync_channel(1);
        if self.worker.submit(move |_| {
            let _ = sender.send(());
        }) {
            // Disconnects instead if the thread is gone
            let _ = receiver.recv();
        }
    }
}

impl Drop for SerialQueue {
    fn drop(&mut self) {
        self.worker.detach();
    }
}

/// One pending callback, delivered exactly once.
///
/// If dropped before [`Delivery::deliver`] (the work panicked, or never ran),
/// the "no result" value is delivered instead.
pub(crate) struct Delivery<T: Default + Send + 'static> {
    context: Arc<dyn CompletionContext>,
    callback: Option<Box<dyn FnOnce(T) + Send>>,
}

impl<T: Default + Send + 'static> Delivery<T> {
    pub(crate) fn new<F>(context: Arc<dyn CompletionContext>, callback: F) -> Self
    where
        F: FnOnce(T) + Send + 'static,
    {
        Self {
            context,
            callback: Some(Box::new(callback)),
        }
    }

    pub(crate) fn deliver(mut self, value: T) {
        self.send(value);
    }

    fn send(&mut self, value: T) {
        if let Some(callback) = self.callback.take() {
            self.context.dispatch(Box::new(move || callback(value)));
        }
    }
}

impl<T: Default + Send + 'static> Drop for Delivery<T> {
    fn drop(&mut self) {
        self.send(T::default());
    }
}
