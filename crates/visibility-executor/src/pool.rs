//! The Job Executor: worker pool, dispatch, and retry scheduling
//! (`spec.md` §4.3).

use crate::events::ExecutorEvent;
use crate::executor::Executor;
use crate::queue::JobQueue;
use crate::registry::QueryableAdapter;
use crate::request::{JobExecutionRequest, JobExecutionResult, JobMetrics};
use crate::retry::RetryStrategy;
use crate::stats::ExecutorStats;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::{Notify, Semaphore};
use tokio::task::JoinHandle;
use visibility_adapter::{AdapterError, AdapterRequest, ErrorCode};
use visibility_core::{EventListener, EventListeners, SurfaceId};

/// Static sizing for a [`JobExecutor`]'s worker pool (`spec.md` §4.3:
/// "Configured size `workerCount`; each worker has
/// `maxConcurrentJobsPerWorker`").
#[derive(Debug, Clone, Copy)]
pub struct ExecutorConfig {
    pub worker_count: usize,
    pub max_concurrent_jobs_per_worker: usize,
    /// Per-job timeout, default 120s (`spec.md` §4.3 Dispatch step 2).
    pub job_timeout: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            worker_count: 4,
            max_concurrent_jobs_per_worker: 4,
            job_timeout: Duration::from_secs(120),
        }
    }
}

struct Inner {
    queue: Mutex<JobQueue>,
    notify: Notify,
    adapters: RwLock<HashMap<SurfaceId, Arc<dyn QueryableAdapter>>>,
    stats: Mutex<ExecutorStats>,
    events: Mutex<EventListeners<ExecutorEvent>>,
    config: ExecutorConfig,
    retry_strategy: Arc<dyn RetryStrategy>,
    shutting_down: AtomicBool,
    queue_reported_empty: AtomicBool,
}

impl Inner {
    fn push_job(&self, job: JobExecutionRequest) {
        self.queue.lock().expect("queue poisoned").push(job);
        self.queue_reported_empty.store(false, Ordering::SeqCst);
        self.notify.notify_one();
    }
}

/// Executes submitted jobs against registered adapters, respecting
/// priority, concurrency limits, timeouts and retry policy (`spec.md`
/// §4.3).
///
/// The orchestrator owns job-graph truth (pending/executing/complete);
/// this executor owns dispatch mechanics, including retry scheduling —
/// that split is what lets `getNextJobs` stay a pure read (`spec.md`
/// §4.4: "This deliberately separates graph-truth from execution
/// concurrency").
pub struct JobExecutor {
    inner: Arc<Inner>,
    worker_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl JobExecutor {
    pub fn new(config: ExecutorConfig, retry_strategy: Arc<dyn RetryStrategy>) -> Self {
        Self {
            inner: Arc::new(Inner {
                queue: Mutex::new(JobQueue::new()),
                notify: Notify::new(),
                adapters: RwLock::new(HashMap::new()),
                stats: Mutex::new(ExecutorStats::new()),
                events: Mutex::new(EventListeners::new()),
                config,
                retry_strategy,
                shutting_down: AtomicBool::new(false),
                queue_reported_empty: AtomicBool::new(false),
            }),
            worker_handles: Mutex::new(Vec::new()),
        }
    }

    /// Registers an adapter for a surface, replacing any prior registration.
    pub fn register_adapter(&self, surface_id: SurfaceId, adapter: Arc<dyn QueryableAdapter>) {
        self.inner
            .adapters
            .write()
            .expect("adapter registry poisoned")
            .insert(surface_id, adapter);
    }

    /// Removes a surface's adapter registration, if any.
    pub fn unregister_adapter(&self, surface_id: &SurfaceId) {
        self.inner
            .adapters
            .write()
            .expect("adapter registry poisoned")
            .remove(surface_id);
    }

    /// Registers an event listener.
    pub fn on_event<L>(&self, listener: L)
    where
        L: EventListener<ExecutorEvent> + 'static,
    {
        self.inner.events.lock().expect("event listeners poisoned").add(listener);
    }

    /// Enqueues one job.
    pub fn submit_job(&self, request: JobExecutionRequest) {
        self.inner.push_job(request);
    }

    /// Enqueues several jobs.
    pub fn submit_jobs(&self, requests: Vec<JobExecutionRequest>) {
        for request in requests {
            self.inner.push_job(request);
        }
    }

    /// A snapshot copy of the running statistics.
    pub fn get_stats(&self) -> ExecutorStats {
        *self.inner.stats.lock().expect("stats poisoned")
    }

    /// Number of jobs currently queued (not yet dispatched).
    pub fn get_queue_length(&self) -> usize {
        self.inner.queue.lock().expect("queue poisoned").len()
    }

    /// Empties the queue atomically. In-flight dispatches are unaffected.
    pub fn clear_queue(&self) {
        self.inner.queue.lock().expect("queue poisoned").clear();
    }

    /// Starts `config.worker_count` worker loops on the given executor.
    pub fn start<E: Executor>(&self, executor: &E) {
        self.inner.shutting_down.store(false, Ordering::SeqCst);
        let mut handles = self.worker_handles.lock().expect("worker handles poisoned");
        for worker_id in 0..self.inner.config.worker_count {
            let inner = Arc::clone(&self.inner);
            handles.push(executor.spawn(run_worker(inner, worker_id)));
        }
    }

    /// Signals every worker to stop accepting new jobs and waits up to
    /// `grace` for in-flight workers to drain before returning.
    pub async fn stop(&self, grace: Duration) {
        self.inner.shutting_down.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();

        let handles = std::mem::take(&mut *self.worker_handles.lock().expect("worker handles poisoned"));
        let join_all = futures::future::join_all(handles);
        if tokio::time::timeout(grace, join_all).await.is_err() {
            #[cfg(feature = "tracing")]
            tracing::warn!("executor stop() exceeded its grace period; workers may still be finishing in-flight jobs");
        }
    }
}

async fn run_worker(inner: Arc<Inner>, worker_id: usize) {
    inner.stats.lock().expect("stats poisoned").record_worker_started();
    inner.events.lock().expect("event listeners poisoned").emit(&ExecutorEvent::WorkerStarted {
        worker_id,
        timestamp: Instant::now(),
    });

    let semaphore = Arc::new(Semaphore::new(inner.config.max_concurrent_jobs_per_worker));

    while !inner.shutting_down.load(Ordering::SeqCst) {
        let job = inner.queue.lock().expect("queue poisoned").pop();
        match job {
            Some(job) => {
                let permit = Arc::clone(&semaphore)
                    .acquire_owned()
                    .await
                    .expect("worker semaphore closed");
                let inner = Arc::clone(&inner);
                tokio::spawn(async move {
                    dispatch(Arc::clone(&inner), worker_id, job).await;
                    drop(permit);
                });
            }
            None => {
                if !inner.queue_reported_empty.swap(true, Ordering::SeqCst) {
                    inner.events.lock().expect("event listeners poisoned").emit(&ExecutorEvent::QueueEmpty {
                        timestamp: Instant::now(),
                    });
                }
                tokio::select! {
                    _ = inner.notify.notified() => {},
                    _ = tokio::time::sleep(Duration::from_millis(50)) => {},
                }
            }
        }
    }

    inner.stats.lock().expect("stats poisoned").record_worker_stopped();
    inner.events.lock().expect("event listeners poisoned").emit(&ExecutorEvent::WorkerStopped {
        worker_id,
        timestamp: Instant::now(),
    });
}

async fn dispatch(inner: Arc<Inner>, worker_id: usize, mut request: JobExecutionRequest) {
    let job_id = request.job_id;
    let study_id = request.study_id;

    inner.stats.lock().expect("stats poisoned").record_job_started();
    inner.events.lock().expect("event listeners poisoned").emit(&ExecutorEvent::JobStarted {
        job_id,
        study_id,
        worker_id,
        timestamp: Instant::now(),
    });

    let started = Instant::now();
    let adapter = inner
        .adapters
        .read()
        .expect("adapter registry poisoned")
        .get(&request.surface_id)
        .cloned();

    let (success, response_text, error, token_usage) = match adapter {
        None => (
            false,
            None,
            Some(AdapterError {
                code: ErrorCode::AdapterMissing,
                message: format!("no adapter registered for surface {}", request.surface_id),
                retryable: false,
                retry_delay_ms: 0,
            }),
            None,
        ),
        Some(adapter) => {
            let adapter_request = AdapterRequest::new(request.query_text.clone());
            match tokio::time::timeout(inner.config.job_timeout, adapter.query(adapter_request)).await {
                Ok(response) if response.success => (true, response.response_text, None, response.token_usage),
                Ok(response) => (false, None, response.error, response.token_usage),
                Err(_) => (
                    false,
                    None,
                    Some(AdapterError {
                        code: ErrorCode::Timeout,
                        message: format!("job exceeded the configured timeout of {:?}", inner.config.job_timeout),
                        retryable: true,
                        retry_delay_ms: 0,
                    }),
                    None,
                ),
            }
        }
    };

    let latency_ms = started.elapsed().as_millis() as u64;
    let result = JobExecutionResult {
        job_id,
        study_id,
        success,
        response_text,
        error: error.clone(),
        metrics: JobMetrics { latency_ms, token_usage },
        attempt_number: request.attempt_number,
        worker_id,
    };

    if success {
        inner.stats.lock().expect("stats poisoned").record_job_completed(latency_ms);
        inner.events.lock().expect("event listeners poisoned").emit(&ExecutorEvent::JobCompleted {
            result,
            timestamp: Instant::now(),
        });
        return;
    }

    inner.stats.lock().expect("stats poisoned").record_job_failed(latency_ms);
    let should_retry = inner
        .retry_strategy
        .should_retry(request.attempt_number, request.max_attempts, error.as_ref());

    if should_retry {
        let delay = inner.retry_strategy.get_delay(request.attempt_number);
        inner.events.lock().expect("event listeners poisoned").emit(&ExecutorEvent::JobRetrying {
            job_id,
            study_id,
            attempt: request.attempt_number + 1,
            delay_ms: delay.as_millis() as u64,
            timestamp: Instant::now(),
        });
        let inner = Arc::clone(&inner);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            request.attempt_number += 1;
            inner.push_job(request);
        });
    } else {
        inner.events.lock().expect("event listeners poisoned").emit(&ExecutorEvent::JobFailed {
            result,
            timestamp: Instant::now(),
        });
    }
}
