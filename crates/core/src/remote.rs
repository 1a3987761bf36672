//! Backend seams used by the authoring session.
//!
//! The session never talks HTTP directly. It calls these traits, which the
//! REST client implements and tests replace with in-memory fakes.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::module::Module;
use crate::types::DbId;

/// Backend entity kind, used as the first URL path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Project,
    Module,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Module => "module",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed backend call. The reason is informational only.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RemoteError {
    /// The request never produced a response (network, DNS, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("Invalid response: {0}")]
    Decode(String),
}

/// Partial update of one backend entity.
#[async_trait]
pub trait RemoteUpdate: Send + Sync {
    async fn update(
        &self,
        id: DbId,
        fields: Map<String, Value>,
        kind: EntityKind,
    ) -> Result<(), RemoteError>;
}

/// Module operations used by an authoring session.
#[async_trait]
pub trait ModuleBackend: RemoteUpdate {
    async fn retrieve_module(&self, id: DbId) -> Result<Module, RemoteError>;

    async fn delete_module(&self, id: DbId) -> Result<(), RemoteError>;

    /// Attach an already-uploaded batch file to a module.
    async fn attach_file(&self, id: DbId, file_id: DbId) -> Result<(), RemoteError>;

    /// Detach a batch file from a module.
    async fn delete_file(&self, id: DbId, file_id: DbId) -> Result<(), RemoteError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_path_segments() {
        assert_eq!(EntityKind::Module.as_str(), "module");
        assert_eq!(EntityKind::Project.to_string(), "project");
    }

    #[test]
    fn status_error_message_carries_body() {
        let err = RemoteError::Status {
            status: 400,
            body: "bad price".into(),
        };
        assert_eq!(err.to_string(), "Backend returned HTTP 400: bad price");
    }
}
