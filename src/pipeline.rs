//! Batching audit pipeline built on pluggable sinks
//!
//! `AuditPipeline` accepts events from call sites, redacts sensitive
//! fields, buffers them in memory, and flushes batches to an `AuditSink`
//! when the batch size is reached or on a timer. `record` never awaits
//! sink I/O; persistence runs on a background flusher task that retries
//! failed batches with backoff and reports drops via a `FailureHandler`.

use crate::config::AuditConfig;
use crate::error::{AuditError, Result};
use crate::failure::{FailedBatch, FailureHandler, LogFailureHandler};
use crate::sanitize::sanitize_metadata;
use crate::sink::AuditSink;
use crate::types::AuditEvent;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Mutex, Notify};
use tokio::task::JoinHandle;

/// Work items for the background flusher
///
/// Each `Flush` owns a disjoint batch; the flusher consumes jobs in
/// queue order, so batches persist in the order they were formed.
enum FlushJob {
    Flush {
        batch: Vec<AuditEvent>,
        done: Option<oneshot::Sender<Result<()>>>,
    },
    Shutdown,
}

/// Asynchronous batching audit-log pipeline
///
/// The buffer is the single shared mutable resource; append and
/// swap-and-clear happen under one lock, and batches are handed to the
/// flusher before the lock is released, so no event is lost or
/// duplicated across a swap. Thread-safe; share via `Arc`.
pub struct AuditPipeline {
    config: Arc<AuditConfig>,
    sink_name: String,

    /// Buffered events awaiting flush, in `record` call order
    buffer: Arc<Mutex<Vec<AuditEvent>>>,

    /// Queue feeding the background flusher
    jobs: mpsc::UnboundedSender<FlushJob>,

    /// Resets the interval timer after any flush
    timer_reset: Arc<Notify>,

    timer: Mutex<Option<JoinHandle<()>>>,
    flusher: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl AuditPipeline {
    /// Create a pipeline with the default (log-only) failure handler
    pub fn new(config: AuditConfig, sink: impl AuditSink + 'static) -> Result<Self> {
        Self::with_failure_handler(config, sink, LogFailureHandler)
    }

    /// Create a pipeline with a custom dropped-batch handler
    pub fn with_failure_handler(
        config: AuditConfig,
        sink: impl AuditSink + 'static,
        failure: impl FailureHandler + 'static,
    ) -> Result<Self> {
        config.validate()?;

        let config = Arc::new(config);
        let sink: Arc<dyn AuditSink> = Arc::new(sink);
        let failure: Arc<dyn FailureHandler> = Arc::new(failure);
        let sink_name = sink.name().to_string();

        let buffer = Arc::new(Mutex::new(Vec::new()));
        let timer_reset = Arc::new(Notify::new());
        let (jobs, rx) = mpsc::unbounded_channel();

        let flusher = tokio::spawn(run_flusher(rx, sink, Arc::clone(&config), failure));

        let timer = tokio::spawn(run_timer(
            Arc::clone(&config),
            Arc::clone(&buffer),
            jobs.clone(),
            Arc::clone(&timer_reset),
        ));

        Ok(Self {
            config,
            sink_name,
            buffer,
            jobs,
            timer_reset,
            timer: Mutex::new(Some(timer)),
            flusher: Mutex::new(Some(flusher)),
            closed: AtomicBool::new(false),
        })
    }

    /// Get the sink name
    pub fn sink_name(&self) -> &str {
        &self.sink_name
    }

    /// Get the pipeline configuration
    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Number of buffered events not yet handed to the flusher
    pub async fn buffered(&self) -> usize {
        self.buffer.lock().await.len()
    }

    /// Record an audit event — fire-and-forget
    ///
    /// Returns immediately when the pipeline is disabled, shut down, or
    /// the event's level is below the configured minimum. Otherwise the
    /// event is sanitized, merged with static metadata, and buffered;
    /// reaching `batch_size` hands the full buffer to the flusher before
    /// this call returns. Never surfaces storage errors.
    pub async fn record(&self, mut event: AuditEvent) {
        if !self.config.enabled || self.closed.load(Ordering::Acquire) {
            return;
        }
        if event.level < self.config.level {
            return;
        }

        sanitize_metadata(&self.config.sanitize, &mut event.metadata);

        // Static context; call-site keys win on collision
        for (key, value) in &self.config.metadata {
            event
                .metadata
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }

        if event.timestamp_unset() {
            event.timestamp = Utc::now();
        }

        let mut buffer = self.buffer.lock().await;
        buffer.push(event);

        if buffer.len() >= self.config.batch_size {
            let batch = std::mem::take(&mut *buffer);
            // Send while holding the lock so batches enqueue in formation order
            if self
                .jobs
                .send(FlushJob::Flush { batch, done: None })
                .is_err()
            {
                tracing::warn!("Failed to queue audit batch, flusher is gone");
            }
            self.timer_reset.notify_one();
        }
    }

    /// Drain all buffered events and wait for the sink outcome
    ///
    /// Resolves `Ok` once the batch is durably persisted (or the buffer
    /// was empty). Resolves `Err` when the flusher exhausted its retry
    /// budget and dropped the batch — the events are not re-buffered.
    pub async fn flush(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(AuditError::Closed);
        }

        let rx = {
            let mut buffer = self.buffer.lock().await;
            if buffer.is_empty() {
                return Ok(());
            }
            let batch = std::mem::take(&mut *buffer);

            let (tx, rx) = oneshot::channel();
            self.jobs
                .send(FlushJob::Flush {
                    batch,
                    done: Some(tx),
                })
                .map_err(|_| AuditError::Closed)?;
            self.timer_reset.notify_one();
            rx
        };

        rx.await.map_err(|_| AuditError::Closed)?
    }

    /// Stop the timer, flush remaining events, and join the flusher
    ///
    /// Best-effort: the result reflects the final flush. Idempotent;
    /// `record` becomes a no-op and `flush` returns `Closed` afterwards.
    pub async fn shutdown(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        if let Some(timer) = self.timer.lock().await.take() {
            timer.abort();
        }

        // Final drain, bypassing the closed check
        let result = {
            let batch = {
                let mut buffer = self.buffer.lock().await;
                std::mem::take(&mut *buffer)
            };
            if batch.is_empty() {
                Ok(())
            } else {
                let (tx, rx) = oneshot::channel();
                match self.jobs.send(FlushJob::Flush {
                    batch,
                    done: Some(tx),
                }) {
                    Ok(()) => rx.await.unwrap_or(Err(AuditError::Closed)),
                    Err(_) => Err(AuditError::Closed),
                }
            }
        };

        let _ = self.jobs.send(FlushJob::Shutdown);
        if let Some(flusher) = self.flusher.lock().await.take() {
            let _ = flusher.await;
        }

        tracing::debug!(sink = %self.sink_name, "Audit pipeline shut down");
        result
    }
}

/// Background flusher — single consumer, one persist in flight at a time
async fn run_flusher(
    mut rx: mpsc::UnboundedReceiver<FlushJob>,
    sink: Arc<dyn AuditSink>,
    config: Arc<AuditConfig>,
    failure: Arc<dyn FailureHandler>,
) {
    while let Some(job) = rx.recv().await {
        match job {
            FlushJob::Flush { batch, done } => {
                let result = persist_with_retry(&*sink, &config, &*failure, batch).await;
                if let Some(done) = done {
                    let _ = done.send(result);
                }
            }
            FlushJob::Shutdown => break,
        }
    }
}

/// Persist a batch, retrying per the configured policy
///
/// Total attempts = `max_retries + 1`, identical batch contents each
/// time. On exhaustion the batch goes to the failure handler and is
/// dropped.
async fn persist_with_retry(
    sink: &dyn AuditSink,
    config: &AuditConfig,
    failure: &dyn FailureHandler,
    batch: Vec<AuditEvent>,
) -> Result<()> {
    let attempts = config.max_retries + 1;
    let mut last_error = String::new();

    for attempt in 0..attempts {
        match sink.persist(&batch).await {
            Ok(()) => {
                tracing::debug!(
                    count = batch.len(),
                    sink = sink.name(),
                    attempt,
                    "Audit batch persisted"
                );
                return Ok(());
            }
            Err(e) => {
                last_error = e.to_string();
                if attempt + 1 < attempts {
                    let delay = config.backoff.delay_for(config.retry_delay(), attempt);
                    tracing::warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %last_error,
                        "Audit persist failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    tracing::error!(
        count = batch.len(),
        attempts,
        error = %last_error,
        "Audit batch dropped after exhausting retries"
    );

    if let Err(e) = failure
        .handle(FailedBatch::new(batch, last_error.clone()))
        .await
    {
        tracing::warn!(error = %e, "Failure handler rejected dropped batch");
    }

    Err(AuditError::Persist {
        attempts,
        reason: last_error,
    })
}

/// Interval timer — flushes a non-empty buffer every `flush_interval`,
/// restarting the countdown whenever any flush is triggered
async fn run_timer(
    config: Arc<AuditConfig>,
    buffer: Arc<Mutex<Vec<AuditEvent>>>,
    jobs: mpsc::UnboundedSender<FlushJob>,
    reset: Arc<Notify>,
) {
    let interval = config.flush_interval();
    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {
                let mut buffer = buffer.lock().await;
                if buffer.is_empty() {
                    continue;
                }
                let batch = std::mem::take(&mut *buffer);
                // Send while holding the lock so batches enqueue in formation order
                if jobs.send(FlushJob::Flush { batch, done: None }).is_err() {
                    break;
                }
            }
            _ = reset.notified() => {}
        }
    }
}
