//! Serial execution worker
//!
//! One named OS thread owning a piece of state, fed by a FIFO channel of
//! closures. The state is built on the worker thread itself, so it never has
//! to be `Send`, and nothing but the worker ever touches it.

use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle, ThreadId};
use tokio::sync::mpsc;

type Job<S> = Box<dyn FnOnce(&mut S) + Send>;

pub struct SerialWorker<S> {
    sender: Option<mpsc::UnboundedSender<Job<S>>>,
    thread: Option<JoinHandle<()>>,
    thread_id: ThreadId,
    name: String,
}

impl<S: 'static> SerialWorker<S> {
    /// Start the thread. `init` runs on it before any job.
    pub fn spawn<F>(name: &str, init: F) -> io::Result<Self>
    where
        F: FnOnce() -> S + Send + 'static,
    {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job<S>>();
        let thread_name = name.to_owned();

        let thread = thread::Builder::new().name(name.to_owned()).spawn(move || {
            let mut state = match panic::catch_unwind(AssertUnwindSafe(init)) {
                Ok(state) => state,
                Err(panic) => {
                    // Queued jobs are dropped with the receiver; their owners see "no result"
                    tracing::error!(
                        worker = %thread_name,
                        reason = panic_message(panic.as_ref()),
                        "Worker state failed to initialize"
                    );
                    return;
                }
            };
            tracing::debug!(worker = %thread_name, "Serial worker started");

            while let Some(job) = receiver.blocking_recv() {
                if let Err(panic) = panic::catch_unwind(AssertUnwindSafe(|| job(&mut state))) {
                    tracing::error!(
                        worker = %thread_name,
                        reason = panic_message(panic.as_ref()),
                        "Unit of work panicked"
                    );
                }
            }

            tracing::debug!(worker = %thread_name, "Serial worker stopped");
        })?;

        Ok(Self {
            sender: Some(sender),
            thread_id: thread.thread().id(),
            thread: Some(thread),
            name: name.to_owned(),
        })
    }

    /// Enqueue `job` behind everything already submitted.
    ///
    /// Returns `false` if the worker is gone; `job` is dropped unrun.
    pub fn submit<F>(&self, job: F) -> bool
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        match &self.sender {
            Some(sender) => sender.send(Box::new(job)).is_ok(),
            None => false,
        }
    }
}

impl<S> SerialWorker<S> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True when called from the worker thread.
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    /// Close the queue, let the thread drain it, and wait for it to exit.
    ///
    /// From the worker thread itself this only closes the queue.
    pub fn shutdown(&mut self) {
        // Closing the channel lets the thread drain what is queued, then exit
        self.sender.take();

        let Some(thread) = self.thread.take() else {
            return;
        };
        if self.is_current() {
            // Called from one of our own jobs; joining would wait on ourselves
            return;
        }
        if thread.join().is_err() {
            tracing::error!(worker = %self.name, "Serial worker thread panicked");
        }
    }

    /// Close the queue without waiting. The thread still drains what is
    /// queued before it exits.
    pub fn detach(&mut self) {
        self.sender.take();
        self.thread.take();
    }
}

impl<S> Drop for SerialWorker<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc as std_mpsc;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[test]
    fn test_jobs_run_in_submission_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let worker = SerialWorker::spawn("test-fifo", Vec::<usize>::new).unwrap();

        for i in 0..50 {
            let log = Arc::clone(&log);
            assert!(worker.submit(move |seen: &mut Vec<usize>| {
                seen.push(i);
                log.lock().unwrap().push(i);
            }));
        }
        drop(worker);

        let log = log.lock().unwrap();
        assert_eq!(*log, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_state_is_built_on_worker_thread() {
        let worker =
            SerialWorker::spawn("test-init", || thread::current().name().map(str::to_owned))
                .unwrap();
        let (tx, rx) = std_mpsc::channel();
        worker.submit(move |name: &mut Option<String>| {
            tx.send(name.clone()).unwrap();
        });

        let name = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(name.as_deref(), Some("test-init"));
        assert_eq!(worker.name(), "test-init");
        assert!(!worker.is_current());
    }

    #[test]
    fn test_panicking_job_does_not_stop_worker() {
        let worker = SerialWorker::spawn("test-panic", || 0usize).unwrap();
        worker.submit(|_: &mut usize| panic!("job failed"));

        let (tx, rx) = std_mpsc::channel();
        worker.submit(move |count: &mut usize| {
            *count += 1;
            tx.send(*count).unwrap();
        });
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 1);
    }

    #[test]
    fn test_failed_init_drops_jobs() {
        let worker = SerialWorker::<usize>::spawn("test-bad-init", || panic!("no state")).unwrap();
        let (tx, rx) = std_mpsc::channel::<usize>();
        worker.submit(move |count: &mut usize| {
            tx.send(*count).unwrap();
        });

        // Sender is dropped unrun, so the receiver disconnects instead of hanging
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_err());
    }

    #[test]
    fn test_drop_drains_queue() {
        let (tx, rx) = std_mpsc::channel();
        let worker = SerialWorker::spawn("test-drain", || ()).unwrap();
        for i in 0..10 {
            let tx = tx.clone();
            worker.submit(move |_: &mut ()| {
                thread::sleep(Duration::from_millis(1));
                tx.send(i).unwrap();
            });
        }
        drop(tx);
        drop(worker);

        assert_eq!(rx.iter().count(), 10);
    }

    #[test]
    fn test_detach_does_not_wait_for_running_job() {
        let (release_tx, release_rx) = std_mpsc::channel::<()>();
        let (done_tx, done_rx) = std_mpsc::channel();
        let mut worker = SerialWorker::spawn("test-detach", || ()).unwrap();
        let first_tx = done_tx.clone();
        worker.submit(move |_: &mut ()| {
            release_rx.recv().unwrap();
            first_tx.send("first").unwrap();
        });
        let queued_tx = done_tx.clone();
        worker.submit(move |_: &mut ()| queued_tx.send("second").unwrap());
        drop(done_tx);

        // Returns while the first job is still blocked
        worker.detach();
        assert!(!worker.submit(|_: &mut ()| {}));
        drop(worker);

        release_tx.send(()).unwrap();
        assert_eq!(done_rx.recv_timeout(Duration::from_secs(5)).unwrap(), "first");
        assert_eq!(done_rx.recv_timeout(Duration::from_secs(5)).unwrap(), "second");
    }
}
