//! Debounced sync of a module's name, price and repetition.
//!
//! [`FieldWatcher`] is fed every new [`ModuleView`] snapshot. When a
//! transition is a user edit of a watched field, it schedules one partial
//! update under that field's key after the debounce delay. A later edit of
//! the same key replaces the waiting update. Failures become notices and
//! are never retried.

use std::sync::Arc;
use std::time::Duration;

use crowdsource_core::module::ModuleView;
use crowdsource_core::patch::{compute_patch, edit_transition, FieldPatch, WatchedField};
use crowdsource_core::remote::{EntityKind, RemoteUpdate};
use crowdsource_core::types::DbId;

use crate::notice::NoticeBus;
use crate::scheduler::KeyedDebouncer;

/// Delay between the last edit of a field and its remote update.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(2048);

pub struct FieldWatcher {
    remote: Arc<dyn RemoteUpdate>,
    notices: Arc<NoticeBus>,
    debouncer: KeyedDebouncer<WatchedField>,
    delay: Duration,
    previous: ModuleView,
}

impl FieldWatcher {
    pub fn new(
        remote: Arc<dyn RemoteUpdate>,
        notices: Arc<NoticeBus>,
        delay: Duration,
        initial: ModuleView,
    ) -> Self {
        Self {
            remote,
            notices,
            debouncer: KeyedDebouncer::new(),
            delay,
            previous: initial,
        }
    }

    /// Record a new snapshot, scheduling an update if it is a watched edit.
    ///
    /// Returns the scheduled patch.
    pub fn observe(&mut self, next: &ModuleView) -> Option<FieldPatch> {
        let planned = edit_transition(&self.previous, next)
            .and_then(|(old, new)| compute_patch(old, new).zip(new.id));
        self.previous = next.clone();

        let (patch, module_id) = planned?;
        self.schedule(module_id, &patch);
        Some(patch)
    }

    fn schedule(&self, module_id: DbId, patch: &FieldPatch) {
        let key = patch.key;
        let fields = patch.fields.clone();
        let remote = Arc::clone(&self.remote);
        let notices = Arc::clone(&self.notices);

        tracing::debug!(
            module_id,
            %key,
            delay_ms = self.delay.as_millis() as u64,
            "Scheduling field update",
        );

        self.debouncer.schedule(key, self.delay, async move {
            match remote.update(module_id, fields, EntityKind::Module).await {
                Ok(()) => tracing::info!(module_id, %key, "Field update sent"),
                Err(e) => {
                    tracing::warn!(module_id, %key, error = %e, "Field update failed");
                    notices.error(key.failure_message());
                }
            }
        });
    }

    pub fn is_pending(&self, key: WatchedField) -> bool {
        self.debouncer.is_pending(&key)
    }

    pub fn pending_count(&self) -> usize {
        self.debouncer.pending_count()
    }

    /// Wait for every scheduled update to be sent.
    pub async fn flush(&self) {
        self.debouncer.flush().await;
    }
}
