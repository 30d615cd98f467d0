//! Threader: bounded job queue + rayon pool + per-label profiling.
//! - n_threads = available_parallelism() (fallback num_cpus)
//! - results come back on tokio oneshot receivers (await or blocking_recv)
//! - reports: job_report(label), all_job_reports(), reset_*()

use crossbeam_channel::{bounded, Sender};
use dashmap::DashMap;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::debug;

type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, Error)]
pub enum ThreadError {
    #[error("failed to build worker pool: {0}")]
    PoolBuild(#[from] rayon::ThreadPoolBuildError),
    #[error("failed to spawn dispatcher thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("dispatcher stopped")]
    Stopped,
}

// ---------- Profiling ----------
#[derive(Clone, Debug)]
pub struct JobReport {
    pub label: String,
    pub runs: u64,
    pub avg_ms: f64,
    pub max_ms: f64,
    pub total_ms: f64,
}

#[derive(Default, Debug)]
struct RawStats {
    runs: u64,
    total_ns: u128,
    max_ns: u128,
}

type Stats = Arc<DashMap<String, RawStats>>;

#[inline]
fn record_duration(stats: &Stats, label: &str, dur: Duration) {
    let ns = dur.as_nanos();
    let mut e = stats.entry(label.to_string()).or_default();
    e.runs += 1;
    e.total_ns += ns;
    if ns > e.max_ns {
        e.max_ns = ns;
    }
}

#[inline]
fn to_report(label: &str, s: &RawStats) -> JobReport {
    let total_ms = s.total_ns as f64 / 1e6;
    let avg_ms = if s.runs > 0 {
        total_ms / s.runs as f64
    } else {
        0.0
    };
    JobReport {
        label: label.to_string(),
        runs: s.runs,
        avg_ms,
        max_ms: s.max_ns as f64 / 1e6,
        total_ms,
    }
}

fn auto_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or_else(|_| num_cpus::get())
        .max(1)
}

// ---------- Threader ----------
pub struct Threader {
    tx: Sender<Job>,
    stats: Stats,
    _dispatcher: JoinHandle<()>,
}

impl Threader {
    pub fn new(queue_cap: usize) -> Result<Self, ThreadError> {
        Self::with_threads(queue_cap, auto_threads())
    }

    pub fn with_threads(queue_cap: usize, threads: usize) -> Result<Self, ThreadError> {
        let pool: ThreadPool = ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|i| format!("planet-worker-{i}"))
            .build()?;

        let (tx, rx) = bounded::<Job>(queue_cap.max(1));

        let dispatcher = thread::Builder::new()
            .name("planet-dispatcher".into())
            .spawn(move || {
                while let Ok(job) = rx.recv() {
                    // FIFO keeps bursts from starving early jobs
                    pool.spawn_fifo(job);
                }
                debug!("threader dispatcher exiting");
            })?;

        Ok(Self {
            tx,
            stats: Arc::new(DashMap::new()),
            _dispatcher: dispatcher,
        })
    }

    /// Enqueue a job, blocking while the queue is full.
    pub fn submit<F>(&self, f: F) -> Result<(), ThreadError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.tx.send(Box::new(f)).map_err(|_| ThreadError::Stopped)
    }

    pub fn submit_profiled_do<F>(&self, label: &'static str, f: F) -> Result<(), ThreadError>
    where
        F: FnOnce() + Send + 'static,
    {
        let stats = self.stats.clone();
        self.submit(move || {
            let t0 = Instant::now();
            f();
            record_duration(&stats, label, t0.elapsed());
        })
    }

    /// Profiled job with a result. Dropping the receiver does not cancel the job.
    pub fn submit_profiled_result<F, T>(
        &self,
        label: &'static str,
        f: F,
    ) -> Result<oneshot::Receiver<T>, ThreadError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (rtx, rrx) = oneshot::channel();
        let stats = self.stats.clone();
        self.submit(move || {
            let t0 = Instant::now();
            let out = f();
            record_duration(&stats, label, t0.elapsed());
            let _ = rtx.send(out);
        })?;
        Ok(rrx)
    }

    pub fn job_report(&self, label: &str) -> Option<JobReport> {
        self.stats.get(label).map(|g| to_report(label, &g))
    }

    pub fn all_job_reports(&self) -> Vec<JobReport> {
        self.stats
            .iter()
            .map(|kv| to_report(kv.key(), kv.value()))
            .collect()
    }

    pub fn reset_job_report(&self, label: &str) {
        self.stats.remove(label);
    }

    pub fn reset_all_job_reports(&self) {
        self.stats.clear();
    }
}
