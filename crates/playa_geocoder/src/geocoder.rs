//! Public facade
//!
//! Every lookup, blocking or not, is marshaled onto one serial worker that
//! alone owns the [`LookupEngine`]. Results come back to the caller directly
//! (`sync_*`), through a callback on a [`CompletionContext`] (`async_*`), or
//! as a future (`forward_lookup` / `reverse_lookup`).
//!
//! No lookup ever fails: missing data, a broken asset, a script fault and a
//! malformed result all read as [`Coordinate::INVALID`] or `None`.

use crate::dispatch::{CompletionContext, Delivery, SerialQueue};
use crate::stats::{Direction, LookupStats, StatsSnapshot};
use crate::worker::SerialWorker;
use crate::{GeocoderConfig, GeocoderError};
use playa_core::{extract_coordinate, Coordinate, LookupEngine};
use playa_script::ScriptHost;
use std::sync::{mpsc, Arc};
use tokio::sync::oneshot;

type EngineFactory = Box<dyn FnOnce() -> Box<dyn LookupEngine> + Send>;

/// Worker-side state: the engine and its diagnostics.
struct Session {
    engine: Box<dyn LookupEngine>,
    stats: LookupStats,
}

impl Session {
    fn forward(&mut self, address: &str) -> Coordinate {
        let engine = &mut self.engine;
        let coordinate = self.stats.time(Direction::Forward, || {
            extract_coordinate(engine.forward_geocode(address).as_ref())
        });
        self.stats.record(Direction::Forward, coordinate.is_valid());
        tracing::debug!(%address, found = coordinate.is_valid(), "Forward lookup");
        coordinate
    }

    fn reverse(&mut self, coordinate: Coordinate) -> Option<String> {
        let engine = &mut self.engine;
        let address = self
            .stats
            .time(Direction::Reverse, || engine.reverse_geocode(coordinate));
        self.stats.record(Direction::Reverse, address.is_some());
        tracing::debug!(%coordinate, found = address.is_some(), "Reverse lookup");
        address
    }
}

/// Offline geocoder.
///
/// Cheap to share behind an `Arc`; callable from any number of threads.
/// Dropping it finishes every lookup already submitted, joins the worker,
/// then waits for the completion context to run the callbacks.
pub struct Geocoder {
    worker: SerialWorker<Session>,
    completion: Arc<dyn CompletionContext>,
}

impl Geocoder {
    pub fn builder() -> GeocoderBuilder {
        GeocoderBuilder::default()
    }

    /// Script-backed geocoder for `config`. A missing asset does not fail
    /// here; the geocoder answers "no result" instead.
    pub fn from_config(config: GeocoderConfig) -> Result<Self, GeocoderError> {
        Self::builder().config(config).build()
    }

    /// Address to coordinate, blocking until the worker answers.
    ///
    /// Waits behind every lookup submitted before it.
    pub fn sync_forward_lookup(&self, address: &str) -> Coordinate {
        if is_blank(address) {
            return Coordinate::INVALID;
        }
        let address = address.to_owned();
        self.call(move |session| session.forward(&address))
    }

    /// Coordinate to address, blocking until the worker answers.
    ///
    /// Invalid input (out of range or a zero component) answers `None`
    /// without reaching the worker.
    pub fn sync_reverse_lookup(&self, coordinate: Coordinate) -> Option<String> {
        if !coordinate.is_valid() {
            tracing::debug!(%coordinate, "Rejected reverse lookup input");
            return None;
        }
        self.call(move |session| session.reverse(coordinate))
    }

    /// Like [`Geocoder::async_forward_lookup_on`], delivering on the default context.
    pub fn async_forward_lookup<F>(&self, address: &str, callback: F)
    where
        F: FnOnce(Coordinate) + Send + 'static,
    {
        self.async_forward_lookup_on(address, Arc::clone(&self.completion), callback)
    }

    /// Submit a forward lookup and return at once; `callback` runs on `context`.
    pub fn async_forward_lookup_on<F>(
        &self,
        address: &str,
        context: Arc<dyn CompletionContext>,
        callback: F,
    ) where
        F: FnOnce(Coordinate) + Send + 'static,
    {
        let delivery = Delivery::new(context, callback);
        if is_blank(address) {
            delivery.deliver(Coordinate::INVALID);
            return;
        }
        let address = address.to_owned();
        self.post(move |session| delivery.deliver(session.forward(&address)));
    }

    /// Like [`Geocoder::async_reverse_lookup_on`], delivering on the default context.
    pub fn async_reverse_lookup<F>(&self, coordinate: Coordinate, callback: F)
    where
        F: FnOnce(Option<String>) + Send + 'static,
    {
        self.async_reverse_lookup_on(coordinate, Arc::clone(&self.completion), callback)
    }

    /// Submit a reverse lookup and return at once; `callback` runs on `context`.
    ///
    /// Invalid input skips the worker but is still delivered through `context`.
    pub fn async_reverse_lookup_on<F>(
        &self,
        coordinate: Coordinate,
        context: Arc<dyn CompletionContext>,
        callback: F,
    ) where
        F: FnOnce(Option<String>) + Send + 'static,
    {
        let delivery = Delivery::new(context, callback);
        if !coordinate.is_valid() {
            tracing::debug!(%coordinate, "Rejected reverse lookup input");
            delivery.deliver(None);
            return;
        }
        self.post(move |session| delivery.deliver(session.reverse(coordinate)));
    }

    /// Forward lookup as a future. Submitted when first polled.
    pub async fn forward_lookup(&self, address: &str) -> Coordinate {
        if is_blank(address) {
            return Coordinate::INVALID;
        }
        let address = address.to_owned();
        self.request(move |session| session.forward(&address)).await
    }

    /// Reverse lookup as a future. Submitted when first polled.
    pub async fn reverse_lookup(&self, coordinate: Coordinate) -> Option<String> {
        if !coordinate.is_valid() {
            return None;
        }
        self.request(move |session| session.reverse(coordinate)).await
    }

    /// False when the engine could not load its data.
    pub fn sync_is_available(&self) -> bool {
        self.call(|session| !session.engine.is_degraded())
    }

    /// Diagnostics collected on the worker so far.
    pub fn sync_stats(&self) -> StatsSnapshot {
        self.call(|session| session.stats.snapshot())
    }

    /// Where `async_*` callbacks go unless told otherwise.
    pub fn completion_context(&self) -> Arc<dyn CompletionContext> {
        Arc::clone(&self.completion)
    }

    fn post<F>(&self, job: F)
    where
        F: FnOnce(&mut Session) + Send + 'static,
    {
        if !self.worker.submit(job) {
            tracing::error!(
                worker = %self.worker.name(),
                "Geocoder worker is gone; lookup dropped"
            );
        }
    }

    fn call<T, F>(&self, work: F) -> T
    where
        T: Default + Send + 'static,
        F: FnOnce(&mut Session) -> T + Send + 'static,
    {
        if self.worker.is_current() {
            tracing::error!("Blocking lookup from the geocoder worker itself; answering no result");
            return T::default();
        }

        let (sender, receiver) = mpsc::sync_channel(1);
        self.post(move |session| {
            let _ = sender.send(work(session));
        });
        receiver.recv().unwrap_or_default()
    }

    async fn request<T, F>(&self, work: F) -> T
    where
        T: Default + Send + 'static,
        F: FnOnce(&mut Session) -> T + Send + 'static,
    {
        let (sender, receiver) = oneshot::channel();
        self.post(move |session| {
            let _ = sender.send(work(session));
        });
        receiver.await.unwrap_or_default()
    }
}

impl Drop for Geocoder {
    fn drop(&mut self) {
        self.worker.shutdown();
        if !self.worker.is_current() {
            self.completion.flush();
        }
    }
}

fn is_blank(address: &str) -> bool {
    address.trim().is_empty()
}

/// Builds a [`Geocoder`]; defaults to the script host and a dedicated
/// completion queue.
#[derive(Default)]
pub struct GeocoderBuilder {
    config: GeocoderConfig,
    engine: Option<EngineFactory>,
    completion: Option<Arc<dyn CompletionContext>>,
}

impl GeocoderBuilder {
    pub fn config(mut self, config: GeocoderConfig) -> Self {
        self.config = config;
        self
    }

    /// Use another engine. `factory` runs once, on the worker thread.
    pub fn engine<F, E>(mut self, factory: F) -> Self
    where
        F: FnOnce() -> E + Send + 'static,
        E: LookupEngine + 'static,
    {
        self.engine = Some(Box::new(move || Box::new(factory()) as Box<dyn LookupEngine>));
        self
    }

    /// Default context for `async_*` callbacks.
    pub fn completion_context(mut self, context: Arc<dyn CompletionContext>) -> Self {
        self.completion = Some(context);
        self
    }

    pub fn build(self) -> Result<Geocoder, GeocoderError> {
        let GeocoderBuilder {
            config,
            engine,
            completion,
        } = self;

        let completion = match completion {
            Some(context) => context,
            None => Arc::new(SerialQueue::new(&config.completion_thread_name)?),
        };

        let factory: EngineFactory = match engine {
            Some(factory) => factory,
            None => {
                let options = config.script.clone();
                Box::new(move || Box::new(ScriptHost::load(options)) as Box<dyn LookupEngine>)
            }
        };
        let latency_window = config.latency_window;
        let worker = SerialWorker::spawn(&config.worker_thread_name, move || Session {
            engine: factory(),
            stats: LookupStats::new(latency_window),
        })
        .map_err(|source| GeocoderError::ThreadSpawn {
            name: config.worker_thread_name.clone(),
            source,
        })?;

        tracing::info!(worker = %config.worker_thread_name, "Geocoder started");
        Ok(Geocoder { worker, completion })
    }
}
