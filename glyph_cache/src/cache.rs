use std::{
    collections::HashMap,
    fmt::{Debug, Display},
    future::Future,
    hash::Hash,
    panic::{self, AssertUnwindSafe},
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Instant,
};

use log::{debug, warn};
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::{Aborted, ComputeStream, Retention};

/// What every waiter of a key receives.
pub type Outcome<V, E> = Result<Arc<V>, E>;

type Waiter<V, E> = Box<dyn FnOnce(Outcome<V, E>) + Send + 'static>;

enum Entry<V, E> {
    Pending(Vec<Waiter<V, E>>),
    Complete { value: Arc<V>, at: Instant },
}

/// How a submission was served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// No computation was running for the key, a new one was queued.
    Started,
    /// A computation for the key was already running, the sink will get its result.
    Joined,
    /// A retained result was delivered right away.
    Cached,
}

struct Inner<K, V, E> {
    entries: Mutex<HashMap<K, Entry<V, E>>>,
    stream: ComputeStream,
    retention: Retention,
}

/// Coalesces requests for the same key into a single computation.
///
/// The first submission for a key queues its computation on the `ComputeStream`,
/// every submission for that key that arrives while it runs only registers its
/// sink. When the computation ends, sinks are called in registration order with
/// the same outcome, a sink that panics doesn't keep the rest from theirs.
/// Failures are never retained, successes are retained according to the
/// `Retention` policy and expired ones are swept on the next submission.
pub struct RequestCache<K, V, E> {
    inner: Arc<Inner<K, V, E>>,
}

impl<K, V, E> Clone for RequestCache<K, V, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V, E> RequestCache<K, V, E>
where
    K: Hash + Eq + Clone + Debug + Send + 'static,
    V: Send + Sync + 'static,
    E: Clone + Display + From<Aborted> + Send + 'static,
{
    /// Creates a new `RequestCache`.
    ///
    /// # Arguments
    /// * `stream` - Where computations are queued.
    /// * `retention` - What to do with results once delivered.
    ///
    /// # Returns
    /// A new `RequestCache` instance.
    pub fn new(stream: ComputeStream, retention: Retention) -> Self {
        let inner = Inner {
            entries: Mutex::new(HashMap::new()),
            stream,
            retention,
        };

        Self {
            inner: Arc::new(inner),
        }
    }

    /// Requests the value for `key`, computing it only if nobody else is.
    ///
    /// # Arguments
    /// * `key` - The identity of the request.
    /// * `priority` - Scheduling priority of the computation if one is started.
    /// * `compute` - Produces the value, it's dropped without running unless the
    ///   submission is `Started`.
    /// * `sink` - Receives the outcome.
    ///
    /// # Returns
    /// How the submission was served.
    pub fn submit<F, S>(&self, key: K, priority: i32, compute: F, sink: S) -> Submission
    where
        F: FnOnce() -> Result<V, E> + Send + 'static,
        S: FnOnce(Outcome<V, E>) + Send + 'static,
    {
        let mut entries = self.inner.entries.lock();
        let retention = self.inner.retention;
        if retention.keeps() {
            sweep(&mut entries, retention);
        }

        let retained = match entries.get_mut(&key) {
            Some(Entry::Pending(waiters)) => {
                waiters.push(Box::new(sink));
                debug!("joined in-flight computation for {key:?}");
                return Submission::Joined;
            }
            Some(Entry::Complete { value, .. }) => Some(Arc::clone(value)),
            _ => None,
        };

        if let Some(value) = retained {
            drop(entries);
            debug!("serving retained result for {key:?}");
            sink(Ok(value));
            return Submission::Cached;
        }

        entries.insert(key.clone(), Entry::Pending(vec![Box::new(sink)]));
        drop(entries);
        debug!(priority = priority; "starting computation for {key:?}");

        let cache = self.clone();
        let job_key = key.clone();
        let queued = self.inner.stream.enqueue(priority, move || {
            let result = panic::catch_unwind(AssertUnwindSafe(compute))
                .unwrap_or_else(|_| Err(E::from(Aborted::new("computation panicked"))));

            cache.complete(job_key, result);
        });

        if let Err(aborted) = queued {
            self.complete(key, Err(E::from(aborted)));
        }

        Submission::Started
    }

    /// Same as `submit`, but the outcome is awaited through the returned `Ticket`.
    pub fn fetch<F>(&self, key: K, priority: i32, compute: F) -> Ticket<V, E>
    where
        F: FnOnce() -> Result<V, E> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let submission = self.submit(key, priority, compute, move |outcome| {
            // The caller stopped waiting.
            let _ = tx.send(outcome);
        });

        Ticket { rx, submission }
    }

    /// Hands the result of a computation to every waiter of `key`.
    fn complete(&self, key: K, result: Result<V, E>) {
        let outcome = result.map(Arc::new);

        // The result is in place before anyone hears of it.
        let previous = {
            let mut entries = self.inner.entries.lock();
            match &outcome {
                Ok(value) if self.inner.retention.keeps() => entries.insert(
                    key.clone(),
                    Entry::Complete {
                        value: Arc::clone(value),
                        at: Instant::now(),
                    },
                ),
                _ => entries.remove(&key),
            }
        };

        let waiters = match previous {
            Some(Entry::Pending(waiters)) => waiters,
            _ => Vec::new(),
        };

        match &outcome {
            Ok(_) => debug!(waiters = waiters.len(); "computation for {key:?} finished"),
            Err(e) => warn!(
                "computation failed, notifying {} waiter(s): {e}",
                waiters.len()
            ),
        }

        for (i, waiter) in waiters.into_iter().enumerate() {
            let outcome = outcome.clone();
            if panic::catch_unwind(AssertUnwindSafe(move || waiter(outcome))).is_err() {
                warn!("waiter {i} of {key:?} panicked while receiving its outcome");
            }
        }
    }

    /// Drops every retained result that can't be served anymore.
    ///
    /// # Returns
    /// The amount of entries removed.
    pub fn purge_expired(&self) -> usize {
        sweep(&mut self.inner.entries.lock(), self.inner.retention)
    }
}

/// Drops the retained results that expired, returning how many were dropped.
fn sweep<K, V, E>(entries: &mut HashMap<K, Entry<V, E>>, retention: Retention) -> usize {
    let before = entries.len();

    entries.retain(|_, entry| match entry {
        Entry::Pending(_) => true,
        Entry::Complete { at, .. } => retention.is_fresh(*at),
    });

    before - entries.len()
}

impl<K, V, E> RequestCache<K, V, E> {
    /// Amount of keys tracked, in flight or retained.
    pub fn len(&self) -> usize {
        self.inner.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Amount of keys with a computation in flight.
    pub fn in_flight(&self) -> usize {
        self.inner
            .entries
            .lock()
            .values()
            .filter(|entry| matches!(entry, Entry::Pending(_)))
            .count()
    }

    pub fn retention(&self) -> Retention {
        self.inner.retention
    }

    pub fn stream(&self) -> &ComputeStream {
        &self.inner.stream
    }
}

/// The pending outcome of a `RequestCache::fetch`.
///
/// Dropping a ticket doesn't cancel the computation, the outcome is just discarded.
pub struct Ticket<V, E> {
    rx: oneshot::Receiver<Outcome<V, E>>,
    submission: Submission,
}

impl<V, E> Ticket<V, E> {
    /// How the request was served.
    pub fn submission(&self) -> Submission {
        self.submission
    }
}

impl<V, E: From<Aborted>> Future for Ticket<V, E> {
    type Output = Outcome<V, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|received| {
            received.unwrap_or_else(|_| Err(E::from(Aborted::new("the compute stream went away"))))
        })
    }
}
