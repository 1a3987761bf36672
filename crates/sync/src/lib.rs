//! Debounced backend sync and module authoring sessions.

pub mod config;
pub mod notice;
pub mod scheduler;
pub mod session;
pub mod watcher;

pub use notice::{Notice, NoticeBus, NoticeLevel};
pub use scheduler::KeyedDebouncer;
pub use session::{ModuleSession, SessionError};
pub use watcher::FieldWatcher;
