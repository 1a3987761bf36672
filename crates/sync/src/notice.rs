//! User-facing notices backed by a `tokio::sync::broadcast` channel.
//!
//! Sessions and the field watcher publish a [`Notice`] whenever something
//! the author should see happens, most often a failed backend call. Any
//! front end subscribes and renders them as it likes. Share the bus via
//! `Arc<NoticeBus>`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};

// ---------------------------------------------------------------------------
// Notice
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A message shown to the author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

// ---------------------------------------------------------------------------
// NoticeBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 64;

/// Fan-out channel for [`Notice`]s.
pub struct NoticeBus {
    sender: broadcast::Sender<Notice>,
}

impl NoticeBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// Slow receivers observe `RecvError::Lagged` once the buffer is full.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a notice. Dropped silently when nobody is subscribed.
    pub fn publish(&self, notice: Notice) {
        let _ = self.sender.send(notice);
    }

    pub fn error(&self, message: impl Into<String>) {
        let notice = Notice::new(NoticeLevel::Error, message);
        tracing::warn!(message = %notice.message, "Error notice");
        self.publish(notice);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.publish(Notice::new(NoticeLevel::Info, message));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.sender.subscribe()
    }
}

impl Default for NoticeBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Write each notice's message as a line to `out` until every sender of
/// the bus is dropped, then return the writer.
///
/// Notices lost to lag are skipped.
pub async fn relay<W: std::io::Write>(mut rx: broadcast::Receiver<Notice>, mut out: W) -> W {
    loop {
        match rx.recv().await {
            Ok(notice) => {
                if let Err(e) = writeln!(out, "{}", notice.message) {
                    tracing::warn!(error = %e, "Failed to write notice");
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Notice relay lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
    let _ = out.flush();
    out
}
