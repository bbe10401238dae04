//! Per-kind executors for remote calls.
//!
//! A [`Lane`] owns the concurrency discipline of one operation kind. Every job
//! resolves to exactly one outcome action, which the lane hands to the store.

use std::{
    future::Future,
    pin::Pin,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tracing::Instrument;

use crate::store::{Action, OpKind, Store};

pub type Job = Pin<Box<dyn Future<Output = Action> + Send + 'static>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcurrencyPolicy {
    /// Drop new intents while one is outstanding.
    IgnoreWhileInFlight,
    /// Run one at a time, in arrival order.
    Queue,
    /// Start every intent immediately; outcomes land in completion order.
    Concurrent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatched {
    Started,
    Queued,
    Dropped,
}

/// Counts jobs that have been accepted but whose outcome is not applied yet.
#[derive(Clone)]
pub struct Tracker {
    pending: Arc<watch::Sender<usize>>,
}

impl Default for Tracker {
    fn default() -> Self {
        let (pending, _) = watch::channel(0);
        Self {
            pending: Arc::new(pending),
        }
    }
}

impl Tracker {
    fn begin(&self) {
        self.pending.send_modify(|n| *n += 1);
    }

    fn end(&self) {
        self.pending.send_modify(|n| *n = n.saturating_sub(1));
    }

    pub fn pending(&self) -> usize {
        *self.pending.borrow()
    }

    /// Resolves once every accepted job has had its outcome applied.
    pub async fn idle(&self) {
        let mut rx = self.pending.subscribe();
        // the sender lives in self, so this cannot fail
        let _ = rx.wait_for(|n| *n == 0).await;
    }
}

pub struct Lane {
    kind: OpKind,
    policy: ConcurrencyPolicy,
    store: Arc<Store>,
    tracker: Tracker,
    busy: Arc<AtomicBool>,
    queue: Option<mpsc::UnboundedSender<Job>>,
}

impl Lane {
    /// Must be called from within a tokio runtime when `policy` is `Queue`.
    pub fn new(
        kind: OpKind,
        policy: ConcurrencyPolicy,
        store: Arc<Store>,
        tracker: Tracker,
    ) -> Lane {
        let queue = match policy {
            ConcurrencyPolicy::Queue => {
                let (job_tx, job_rx) = mpsc::unbounded_channel();
                tokio::spawn(start_queue(kind, job_rx, store.clone(), tracker.clone()));
                Some(job_tx)
            }
            _ => None,
        };

        Lane {
            kind,
            policy,
            store,
            tracker,
            busy: Arc::new(AtomicBool::new(false)),
            queue,
        }
    }

    pub fn policy(&self) -> ConcurrencyPolicy {
        self.policy
    }

    pub fn submit(&self, job: Job) -> Dispatched {
        let kind = self.kind;
        let job: Job = Box::pin(job.instrument(tracing::debug_span!("lane", %kind)));

        match self.policy {
            ConcurrencyPolicy::IgnoreWhileInFlight => {
                if self.busy.swap(true, Ordering::AcqRel) {
                    log::debug!("{kind} already in flight, dropping intent");
                    return Dispatched::Dropped;
                }

                self.tracker.begin();
                let store = self.store.clone();
                let tracker = self.tracker.clone();
                let busy = self.busy.clone();
                tokio::spawn(async move {
                    let outcome = run_job(kind, job).await;
                    store.dispatch(outcome);
                    busy.store(false, Ordering::Release);
                    tracker.end();
                });
                Dispatched::Started
            }

            ConcurrencyPolicy::Concurrent => {
                self.tracker.begin();
                let store = self.store.clone();
                let tracker = self.tracker.clone();
                tokio::spawn(async move {
                    let outcome = run_job(kind, job).await;
                    store.dispatch(outcome);
                    tracker.end();
                });
                Dispatched::Started
            }

            ConcurrencyPolicy::Queue => {
                let Some(queue) = &self.queue else {
                    log::error!("{kind} lane has no queue");
                    return Dispatched::Dropped;
                };

                self.tracker.begin();
                if queue.send(job).is_err() {
                    log::error!("{kind} queue is closed, dropping intent");
                    self.tracker.end();
                    return Dispatched::Dropped;
                }
                Dispatched::Queued
            }
        }
    }
}

async fn start_queue(
    kind: OpKind,
    mut job_rx: mpsc::UnboundedReceiver<Job>,
    store: Arc<Store>,
    tracker: Tracker,
) {
    log::debug!("{kind} queue: waiting for jobs");
    while let Some(job) = job_rx.recv().await {
        let outcome = run_job(kind, job).await;
        store.dispatch(outcome);
        tracker.end();
    }
    log::debug!("{kind} queue: closed");
}

/// A job that panics resolves to the kind's default failure.
async fn run_job(kind: OpKind, job: Job) -> Action {
    match tokio::spawn(job).await {
        Ok(outcome) => outcome,
        Err(err) => {
            log::error!("{kind} job did not finish: {err}");
            Action::failed(kind, kind.default_failure().to_string())
        }
    }
}
