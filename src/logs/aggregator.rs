//! Single-flight log aggregator
//!
//! Producers call [`RequestLog::record`] from anywhere in a request. Each entry
//! is appended to the response buffer and to a pending queue in one step, so
//! both see the same order. The pending queue is drained in FIFO order by at
//! most one drainer at a time:
//!
//! - Inside a tokio runtime the drainer is a spawned task that pauses briefly
//!   between entries.
//! - Outside a runtime the caller drains inline.
//!
//! A `drain` call made while another drain is in flight returns immediately.

use super::{LogEntry, LogLevel, LogSink, TracingSink};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::Notify;

/// Ordered, request-scoped diagnostic log
///
/// Cloning is cheap and every clone writes into the same buffer.
#[derive(Clone)]
pub struct RequestLog {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<LogState>,
    draining: AtomicBool,
    idle: Notify,
    pause: Duration,
    sink: Arc<dyn LogSink>,
}

#[derive(Default)]
struct LogState {
    pending: VecDeque<LogEntry>,
    entries: Vec<LogEntry>,
}

impl RequestLog {
    /// Creates an empty log that drains into `sink`
    ///
    /// # Arguments
    ///
    /// * `sink` - Destination for drained entries
    /// * `pause` - Delay between two emitted entries when draining on a runtime
    pub fn new(sink: Arc<dyn LogSink>, pause: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(LogState::default()),
                draining: AtomicBool::new(false),
                idle: Notify::new(),
                pause,
                sink,
            }),
        }
    }

    /// Creates an empty log that drains into `tracing`
    pub fn with_tracing(pause: Duration) -> Self {
        Self::new(Arc::new(TracingSink), pause)
    }

    pub fn info(&self, message: impl Into<String>) {
        self.record(LogLevel::Info, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.record(LogLevel::Error, message);
    }

    /// Appends an entry to the buffer and the pending queue, then triggers a drain
    pub fn record(&self, level: LogLevel, message: impl Into<String>) {
        let entry = LogEntry::new(level, message);
        {
            let mut state = self.inner.lock();
            state.entries.push(entry.clone());
            state.pending.push_back(entry);
        }
        self.drain();
    }

    /// Starts draining the pending queue unless a drain is already running
    pub fn drain(&self) {
        if self.inner.draining.swap(true, Ordering::AcqRel) {
            return;
        }

        match Handle::try_current() {
            Ok(handle) => {
                let inner = Arc::clone(&self.inner);
                handle.spawn(async move { inner.drain_paced().await });
            }
            Err(_) => self.inner.drain_inline(),
        }
    }

    /// Waits until every recorded entry has reached the sink
    pub async fn flush(&self) {
        loop {
            let notified = self.inner.idle.notified();
            if self.inner.is_idle() {
                return;
            }
            notified.await;
        }
    }

    /// Snapshot of every entry recorded so far, in emission order
    pub fn entries(&self) -> Vec<LogEntry> {
        self.inner.lock().entries.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn error_count(&self) -> usize {
        self.inner
            .lock()
            .entries
            .iter()
            .filter(|entry| entry.is_error())
            .count()
    }
}

impl std::fmt::Debug for RequestLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestLog")
            .field("entries", &self.len())
            .field("draining", &self.inner.draining.load(Ordering::Acquire))
            .finish()
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, LogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn pop(&self) -> Option<LogEntry> {
        self.lock().pending.pop_front()
    }

    fn has_pending(&self) -> bool {
        !self.lock().pending.is_empty()
    }

    fn is_idle(&self) -> bool {
        !self.draining.load(Ordering::Acquire) && !self.has_pending()
    }

    /// Releases the in-flight flag; returns true if this drainer must go on
    fn release(&self) -> bool {
        self.draining.store(false, Ordering::Release);
        self.idle.notify_waiters();

        // An entry queued between the last pop and the release has no drainer yet.
        self.has_pending() && !self.draining.swap(true, Ordering::AcqRel)
    }

    async fn drain_paced(self: Arc<Self>) {
        loop {
            while let Some(entry) = self.pop() {
                self.sink.emit(&entry);
                if !self.pause.is_zero() {
                    tokio::time::sleep(self.pause).await;
                }
            }
            if !self.release() {
                return;
            }
        }
    }

    fn drain_inline(&self) {
        loop {
            while let Some(entry) = self.pop() {
                self.sink.emit(&entry);
            }
            if !self.release() {
                return;
            }
        }
    }
}
