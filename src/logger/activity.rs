//! Activity logger: a dedicated thread owns the [`JsonlWriter`].
//!
//! Every other thread sends [`ActivityEvent`]s through a bounded crossbeam
//! channel. `try_send()` keeps the session loop from ever blocking on log
//! back-pressure; overflow is counted and reported on the next write.

#![allow(missing_docs)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use parking_lot::Mutex;

use crate::core::errors::{NofomoError, Result};
use crate::logger::jsonl::{EventType, JsonlConfig, JsonlWriter, LogEntry, Severity};

const CHANNEL_CAPACITY: usize = 1024;

// ──────────────────── events ────────────────────

/// Everything the dashboard records about a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityEvent {
    SessionStarted {
        version: String,
        config_hash: String,
    },
    SessionStopped {
        reason: String,
        uptime_ms: u64,
    },
    ViewMounted {
        tab: &'static str,
        user_type: &'static str,
    },
    ViewUnmounted,
    FetchResolved {
        key: String,
        rows: usize,
    },
    FetchFailed {
        key: String,
        code: String,
        message: String,
    },
    TabSwitched {
        from: &'static str,
        to: &'static str,
    },
    UserTypeChanged {
        to: &'static str,
    },
    SearchHit {
        symbol: String,
    },
    /// Only the length of the search text is kept.
    SearchMiss {
        chars: usize,
    },
    ChatSent {
        chars: usize,
    },
    ChatReplied {
        rule: &'static str,
    },
    RefreshRequested,
    TimersCancelled {
        count: usize,
    },
    Error {
        code: String,
        message: String,
    },
    /// Asks the logger thread to flush and exit.
    Shutdown,
}

impl From<&NofomoError> for ActivityEvent {
    fn from(err: &NofomoError) -> Self {
        Self::Error {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

// ──────────────────── handle ────────────────────

/// Cloneable, non-blocking sender for activity events.
#[derive(Clone)]
pub struct ActivityLoggerHandle {
    tx: Sender<ActivityEvent>,
    dropped_events: Arc<AtomicU64>,
    join: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl ActivityLoggerHandle {
    /// Queue an event. A full channel drops it and bumps the dropped counter.
    pub fn send(&self, event: ActivityEvent) {
        if let Err(TrySendError::Full(_)) = self.tx.try_send(event) {
            self.dropped_events.fetch_add(1, Ordering::Relaxed);
        }
        // Disconnected is expected after shutdown.
    }

    /// Events dropped since the last report written by the logger thread.
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events.load(Ordering::Relaxed)
    }

    /// Flush, stop the logger thread, and wait for it. Idempotent: only the
    /// first caller across all clones joins the thread.
    pub fn shutdown(&self) {
        let _ = self.tx.send(ActivityEvent::Shutdown);
        let join = self.join.lock().take();
        if let Some(join) = join
            && join.join().is_err()
        {
            eprintln!("[NFM-LOG] logger thread panicked");
        }
    }
}

impl std::fmt::Debug for ActivityLoggerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityLoggerHandle")
            .field("queued", &self.tx.len())
            .field("dropped_events", &self.dropped_events())
            .finish_non_exhaustive()
    }
}

// ──────────────────── spawn ────────────────────

/// Start the logger thread writing to `config`.
pub fn spawn_logger(config: JsonlConfig) -> Result<ActivityLoggerHandle> {
    spawn_logger_with_capacity(config, CHANNEL_CAPACITY)
}

/// Like [`spawn_logger`] with an explicit channel bound.
pub fn spawn_logger_with_capacity(
    config: JsonlConfig,
    capacity: usize,
) -> Result<ActivityLoggerHandle> {
    let (tx, rx) = bounded::<ActivityEvent>(capacity.max(1));
    let dropped = Arc::new(AtomicU64::new(0));
    let dropped_clone = Arc::clone(&dropped);

    let join = thread::Builder::new()
        .name("nofomo-logger".to_string())
        .spawn(move || logger_thread_main(&rx, config, &dropped_clone))
        .map_err(|e| NofomoError::Runtime {
            details: format!("failed to spawn logger thread: {e}"),
        })?;

    Ok(ActivityLoggerHandle {
        tx,
        dropped_events: dropped,
        join: Arc::new(Mutex::new(Some(join))),
    })
}

// ──────────────────── logger thread ────────────────────

fn logger_thread_main(rx: &Receiver<ActivityEvent>, config: JsonlConfig, dropped: &AtomicU64) {
    let mut jsonl = JsonlWriter::open(config);

    while let Ok(event) = rx.recv() {
        let d = dropped.swap(0, Ordering::Relaxed);
        if d > 0 {
            let mut warn = LogEntry::new(EventType::Error, Severity::Warning);
            warn.details = Some(format!("{d} activity events dropped due to back-pressure"));
            jsonl.write_entry(&warn);
        }

        if event == ActivityEvent::Shutdown {
            break;
        }
        jsonl.write_entry(&event_to_log_entry(&event));
    }

    jsonl.flush();
    jsonl.fsync();
}

// ──────────────────── conversion ────────────────────

/// Map an event onto its JSONL line.
pub fn event_to_log_entry(event: &ActivityEvent) -> LogEntry {
    match event {
        ActivityEvent::SessionStarted {
            version,
            config_hash,
        } => {
            let mut e = LogEntry::new(EventType::SessionStart, Severity::Info);
            e.details = Some(format!("version={version} config_hash={config_hash}"));
            e.ok = Some(true);
            e
        }
        ActivityEvent::SessionStopped { reason, uptime_ms } => {
            let mut e = LogEntry::new(EventType::SessionStop, Severity::Info);
            e.details = Some(format!("reason={reason}"));
            e.duration_ms = Some(*uptime_ms);
            e.ok = Some(true);
            e
        }
        ActivityEvent::ViewMounted { tab, user_type } => {
            let mut e = LogEntry::new(EventType::ViewMount, Severity::Info);
            e.tab = Some((*tab).to_string());
            e.user_type = Some((*user_type).to_string());
            e
        }
        ActivityEvent::ViewUnmounted => LogEntry::new(EventType::ViewUnmount, Severity::Info),
        ActivityEvent::FetchResolved { key, rows } => {
            let mut e = LogEntry::new(EventType::FetchResolve, Severity::Info);
            e.key = Some(key.clone());
            e.rows = Some(*rows);
            e.ok = Some(true);
            e
        }
        ActivityEvent::FetchFailed { key, code, message } => {
            let mut e = LogEntry::new(EventType::FetchFail, Severity::Warning);
            e.key = Some(key.clone());
            e.ok = Some(false);
            e.error_code = Some(code.clone());
            e.error_message = Some(message.clone());
            e
        }
        ActivityEvent::TabSwitched { from, to } => {
            let mut e = LogEntry::new(EventType::TabSwitch, Severity::Info);
            e.tab = Some(format!("{from}->{to}"));
            e
        }
        ActivityEvent::UserTypeChanged { to } => {
            let mut e = LogEntry::new(EventType::UserTypeChange, Severity::Info);
            e.user_type = Some((*to).to_string());
            e
        }
        ActivityEvent::SearchHit { symbol } => {
            let mut e = LogEntry::new(EventType::SearchHit, Severity::Info);
            e.symbol = Some(symbol.clone());
            e.ok = Some(true);
            e
        }
        ActivityEvent::SearchMiss { chars } => {
            let mut e = LogEntry::new(EventType::SearchMiss, Severity::Info);
            e.chars = Some(*chars);
            e.ok = Some(false);
            e
        }
        ActivityEvent::ChatSent { chars } => {
            let mut e = LogEntry::new(EventType::ChatSend, Severity::Info);
            e.chars = Some(*chars);
            e
        }
        ActivityEvent::ChatReplied { rule } => {
            let mut e = LogEntry::new(EventType::ChatReply, Severity::Info);
            e.rule = Some((*rule).to_string());
            e
        }
        ActivityEvent::RefreshRequested => {
            LogEntry::new(EventType::SentimentRefresh, Severity::Info)
        }
        ActivityEvent::TimersCancelled { count } => {
            let mut e = LogEntry::new(EventType::TimersCancel, Severity::Info);
            e.count = Some(*count);
            e
        }
        ActivityEvent::Error { code, message } => {
            let mut e = LogEntry::new(EventType::Error, Severity::Critical);
            e.error_code = Some(code.clone());
            e.error_message = Some(message.clone());
            e.ok = Some(false);
            e
        }
        // Handled by the thread loop; never written.
        ActivityEvent::Shutdown => LogEntry::new(EventType::SessionStop, Severity::Info),
    }
}
