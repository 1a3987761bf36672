//! An authoring session for one module.
//!
//! [`ModuleSession`] loads a module from the backend, routes local edits
//! through the [`FieldWatcher`], and runs the explicit module actions:
//! publish, delete, and batch file attach/detach. Every failed backend
//! call publishes one notice and leaves local state untouched.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Map, Value};

use crowdsource_core::cache::LocalCache;
use crowdsource_core::error::CoreError;
use crowdsource_core::module::{
    publish_blockers, BatchFile, Module, ModuleStatus, ModuleView, PublishBlocker,
    STATUS_PUBLISHED,
};
use crowdsource_core::patch::FieldPatch;
use crowdsource_core::project::ProjectDraft;
use crowdsource_core::remote::{EntityKind, ModuleBackend, RemoteError};
use crowdsource_core::types::DbId;

use crate::notice::NoticeBus;
use crate::watcher::FieldWatcher;

pub const LOAD_FAILED: &str = "Could not get project.";
pub const PUBLISH_FAILED: &str = "Could not update module status.";
pub const DELETE_FAILED: &str = "Could not delete project.";
pub const ATTACH_FAILED: &str = "Could not upload file.";
pub const DETACH_FAILED: &str = "Could not remove file.";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Module is not ready to publish: {}", join_blockers(.0))]
    NotPublishable(Vec<PublishBlocker>),

    #[error("Module has no id")]
    Unsaved,

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

fn join_blockers(blockers: &[PublishBlocker]) -> String {
    blockers
        .iter()
        .map(|b| b.message())
        .collect::<Vec<_>>()
        .join(" ")
}

pub struct ModuleSession<B> {
    backend: Arc<B>,
    notices: Arc<NoticeBus>,
    module: Module,
    watcher: FieldWatcher,
}

impl<B> std::fmt::Debug for ModuleSession<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleSession")
            .field("module", &self.module)
            .finish_non_exhaustive()
    }
}

impl<B: ModuleBackend + 'static> ModuleSession<B> {
    /// Retrieve module `module_id` and start watching it for edits.
    pub async fn load(
        backend: Arc<B>,
        notices: Arc<NoticeBus>,
        module_id: DbId,
        debounce: Duration,
    ) -> Result<Self, SessionError> {
        let module = match backend.retrieve_module(module_id).await {
            Ok(module) => module,
            Err(e) => {
                tracing::error!(module_id, error = %e, "Failed to load module");
                notices.error(LOAD_FAILED);
                return Err(e.into());
            }
        };
        tracing::info!(module_id, name = %module.name, "Module loaded");

        let mut watcher = FieldWatcher::new(
            backend.clone(),
            Arc::clone(&notices),
            debounce,
            ModuleView::Pending { pk: module_id },
        );
        watcher.observe(&ModuleView::Loaded(module.clone()));

        Ok(Self {
            backend,
            notices,
            module,
            watcher,
        })
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn notices(&self) -> &Arc<NoticeBus> {
        &self.notices
    }

    pub fn watcher(&self) -> &FieldWatcher {
        &self.watcher
    }

    /// Apply a local edit and hand the new snapshot to the watcher.
    ///
    /// Returns the patch scheduled for debounced sync, if any.
    pub fn edit<F>(&mut self, f: F) -> Option<FieldPatch>
    where
        F: FnOnce(&mut Module),
    {
        f(&mut self.module);
        self.observe()
    }

    fn observe(&mut self) -> Option<FieldPatch> {
        self.watcher.observe(&ModuleView::Loaded(self.module.clone()))
    }

    fn id(&self) -> Result<DbId, SessionError> {
        self.module.id.ok_or(SessionError::Unsaved)
    }

    /// Mark the module published once it passes the readiness check.
    ///
    /// Each unmet condition publishes its own notice and nothing is sent.
    pub async fn publish(&mut self) -> Result<(), SessionError> {
        let blockers = publish_blockers(&self.module);
        if !blockers.is_empty() {
            for blocker in &blockers {
                self.notices.error(blocker.message());
            }
            return Err(SessionError::NotPublishable(blockers));
        }

        let id = self.id()?;
        let mut fields = Map::new();
        fields.insert("status".into(), json!(STATUS_PUBLISHED));

        match self.backend.update(id, fields, EntityKind::Module).await {
            Ok(()) => {
                tracing::info!(module_id = id, "Module published");
                self.module.status = ModuleStatus::Published;
                self.observe();
                Ok(())
            }
            Err(e) => {
                tracing::error!(module_id = id, error = %e, "Failed to publish module");
                self.notices.error(PUBLISH_FAILED);
                Err(e.into())
            }
        }
    }

    pub async fn delete(&self) -> Result<(), SessionError> {
        let id = self.id()?;
        self.backend.delete_module(id).await.map_err(|e| {
            tracing::error!(module_id = id, error = %e, "Failed to delete module");
            self.notices.error(DELETE_FAILED);
            SessionError::from(e)
        })?;
        tracing::info!(module_id = id, "Module deleted");
        Ok(())
    }

    /// Attach an uploaded batch file and record it locally.
    pub async fn attach_file(&mut self, file: BatchFile) -> Result<(), SessionError> {
        let id = self.id()?;
        if let Err(e) = self.backend.attach_file(id, file.id).await {
            tracing::error!(module_id = id, file_id = file.id, error = %e, "Failed to attach file");
            self.notices.error(ATTACH_FAILED);
            return Err(e.into());
        }
        self.module.batch_files.push(file);
        self.observe();
        Ok(())
    }

    /// Detach a batch file and drop it locally.
    pub async fn remove_file(&mut self, file_id: DbId) -> Result<(), SessionError> {
        let id = self.id()?;
        if let Err(e) = self.backend.delete_file(id, file_id).await {
            tracing::error!(module_id = id, file_id, error = %e, "Failed to remove file");
            self.notices.error(DETACH_FAILED);
            return Err(e.into());
        }
        self.module.batch_files.retain(|f| f.id != file_id);
        self.observe();
        Ok(())
    }

    /// Wait until every debounced field update has been sent.
    pub async fn flush(&self) {
        self.watcher.flush().await;
    }

    /// End the session, persisting the project draft locally.
    ///
    /// Field updates still waiting keep running and are sent on schedule.
    pub fn teardown(self, cache: &dyn LocalCache, draft: &ProjectDraft) -> Result<(), SessionError> {
        draft.save(cache)?;
        tracing::debug!(module_id = ?self.module.id, "Session closed");
        Ok(())
    }
}

/// Publish readiness of a module as JSON, for status output.
pub fn readiness_summary(module: &Module) -> Value {
    let blockers = publish_blockers(module);
    json!({
        "module_id": module.id,
        "name": module.name,
        "published": module.is_published(),
        "ready": blockers.is_empty(),
        "blockers": blockers.iter().map(|b| b.message()).collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_publishable_lists_every_blocker() {
        let err = SessionError::NotPublishable(vec![
            PublishBlocker::MissingPrice,
            PublishBlocker::EmptyTemplate,
        ]);
        assert_eq!(
            err.to_string(),
            "Module is not ready to publish: Please enter task price ($/task). \
             Please add at least one item to the template."
        );
    }

    #[test]
    fn readiness_summary_for_blank_module() {
        let summary = readiness_summary(&Module::default());
        assert_eq!(summary["ready"], false);
        assert_eq!(summary["blockers"].as_array().unwrap().len(), 3);
    }
}
