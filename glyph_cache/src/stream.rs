use std::{
    cmp::Ordering as CmpOrdering,
    collections::BinaryHeap,
    sync::{
        Arc,
        atomic::{AtomicU64, AtomicUsize, Ordering},
    },
};

use log::{debug, warn};
use tokio::{
    sync::{mpsc, watch},
    task,
};

use crate::Aborted;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A job waiting for its turn on the stream.
struct Queued {
    priority: i32,
    seq: u64,
    job: Job,
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == CmpOrdering::Equal
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    // Max-heap: higher priority first, then lower sequence number.
    fn cmp(&self, other: &Self) -> CmpOrdering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// A single logical compute stream.
///
/// Jobs run one at a time on the blocking thread pool, the highest priority
/// job goes first and equal priorities run in arrival order. The stream stops
/// once every handle is dropped and the queue is drained.
#[derive(Clone)]
pub struct ComputeStream {
    tx: mpsc::UnboundedSender<Queued>,
    paused: Arc<watch::Sender<bool>>,
    pending: Arc<AtomicUsize>,
    seq: Arc<AtomicU64>,
}

impl ComputeStream {
    /// Spawns the stream's driver task.
    ///
    /// # Panics
    /// If called outside of a tokio runtime.
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (paused, paused_rx) = watch::channel(false);
        let pending = Arc::new(AtomicUsize::new(0));

        tokio::spawn(run(rx, paused_rx, Arc::clone(&pending)));

        Self {
            tx,
            paused: Arc::new(paused),
            pending,
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Queues a blocking job.
    ///
    /// # Arguments
    /// * `priority` - Higher values run earlier.
    /// * `job` - The work to run, it must report its own result.
    ///
    /// # Returns
    /// `Aborted` if the driver task is gone, the job is dropped without running.
    pub fn enqueue<F>(&self, priority: i32, job: F) -> Result<(), Aborted>
    where
        F: FnOnce() + Send + 'static,
    {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let queued = Queued {
            priority,
            seq,
            job: Box::new(job),
        };

        self.pending.fetch_add(1, Ordering::AcqRel);
        if self.tx.send(queued).is_err() {
            // The runtime the driver was spawned on shut down.
            self.pending.fetch_sub(1, Ordering::AcqRel);
            warn!("compute stream is gone, dropping job {seq}");
            return Err(Aborted::new("compute stream is gone"));
        }

        Ok(())
    }

    /// Amount of jobs that haven't started yet.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Holds every job that hasn't started yet until `resume` is called.
    pub fn pause(&self) {
        self.paused.send_replace(true);
    }

    pub fn resume(&self) {
        self.paused.send_replace(false);
    }
}

/// Drives the stream until every `ComputeStream` handle is dropped.
async fn run(
    mut rx: mpsc::UnboundedReceiver<Queued>,
    mut paused: watch::Receiver<bool>,
    pending: Arc<AtomicUsize>,
) {
    let mut queue = BinaryHeap::new();

    loop {
        if queue.is_empty() {
            match rx.recv().await {
                Some(queued) => queue.push(queued),
                None => break,
            }
        }

        if paused.wait_for(|paused| !*paused).await.is_err() {
            break;
        }

        while let Ok(queued) = rx.try_recv() {
            queue.push(queued);
        }

        let Some(Queued { priority, seq, job }) = queue.pop() else {
            continue;
        };

        pending.fetch_sub(1, Ordering::AcqRel);
        debug!(priority = priority, seq = seq; "running job");

        if let Err(e) = task::spawn_blocking(job).await {
            warn!("job {seq} did not finish: {e}");
        }
    }

    debug!("compute stream stopped");
}
