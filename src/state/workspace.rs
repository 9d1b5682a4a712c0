use tracing::{debug, warn};

use super::AppState;
use crate::error::{AppResult, ModelResult, StorageResult};
use crate::export::decode_link_or_token;
use crate::model::Analysis;
use crate::storage::{DocumentStore, KeyValueStore};

/// Key the front end keeps the active document id under, outside the
/// documents themselves.
pub const ACTIVE_ID_KEY: &str = "activeAnalysisId";

/// Editor state bound to durable storage.
///
/// Every successful change is followed by a save of the whole collection. A
/// failed save is reported but leaves the in-memory state as edited.
pub struct Workspace<S> {
    state: AppState,
    store: DocumentStore<S>,
}

impl<S: KeyValueStore> Workspace<S> {
    /// Load the saved collection from `backend`.
    pub async fn open(backend: S) -> Self {
        let store = DocumentStore::new(backend);
        let state = AppState::from_documents(store.load().await);
        Self { state, store }
    }

    /// In-memory editor state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Underlying document store.
    pub fn store(&self) -> &DocumentStore<S> {
        &self.store
    }

    /// Save the current collection.
    pub async fn persist(&self) -> StorageResult<()> {
        self.store
            .save(self.state.analyses())
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to save analyses");
                e
            })
    }

    /// Apply a change to the state and save it.
    ///
    /// Nothing is saved when the change itself fails.
    pub async fn apply<T>(
        &mut self,
        change: impl FnOnce(&mut AppState) -> ModelResult<T>,
    ) -> AppResult<T> {
        let result = change(&mut self.state)?;
        self.persist().await?;
        Ok(result)
    }

    /// Apply an edit to the active document and save it.
    pub async fn edit_active<T>(
        &mut self,
        edit: impl FnOnce(&mut Analysis) -> ModelResult<T>,
    ) -> AppResult<T> {
        self.apply(|state| state.update_active(edit)).await
    }

    /// Switch the active document. View state only, nothing is saved.
    pub fn set_active(&mut self, id: &str) -> ModelResult<()> {
        self.state.set_active(id)
    }

    /// Re-select the document that was active in a previous session.
    ///
    /// A remembered id that no longer exists is ignored.
    pub async fn restore_active(&mut self) {
        match self.store.backend().get(ACTIVE_ID_KEY).await {
            Ok(Some(id)) => {
                if self.state.set_active(&id).is_err() {
                    debug!(analysis_id = %id, "Remembered analysis no longer exists");
                }
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Failed to read active analysis id"),
        }
    }

    /// Remember the active document for the next session.
    pub async fn remember_active(&self) -> StorageResult<()> {
        self.store
            .backend()
            .set(ACTIVE_ID_KEY, self.state.active_id())
            .await
    }

    /// Create a blank document, make it active and save.
    pub async fn add_blank(&mut self, name: Option<&str>) -> AppResult<String> {
        self.apply(|state| Ok(state.add_blank(name))).await
    }

    /// Delete a document; `false` when it was the last one.
    pub async fn remove(&mut self, id: &str) -> AppResult<bool> {
        let removed = self.state.remove(id)?;
        if removed {
            self.persist().await?;
        }
        Ok(removed)
    }

    /// Replace the collection with a shared document.
    ///
    /// A link or token that cannot be decoded is logged and returned as an
    /// error; the existing documents are left untouched.
    pub async fn open_shared(&mut self, link_or_token: &str) -> AppResult<String> {
        let analysis = decode_link_or_token(link_or_token).map_err(|e| {
            warn!(error = %e, "Failed to decode shared link");
            e
        })?;
        let id = analysis.id.clone();
        self.state.install_shared(analysis);
        self.persist().await?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, StorageError};
    use crate::model::FieldPath;
    use crate::storage::MockKeyValueStore;

    fn failing_backend() -> MockKeyValueStore {
        let mut backend = MockKeyValueStore::new();
        backend.expect_get().returning(|_| Ok(None));
        backend.expect_set().returning(|_, _| {
            Err(StorageError::Query {
                message: "database is locked".to_string(),
            })
        });
        backend
    }

    #[tokio::test]
    async fn test_failed_save_keeps_in_memory_edit() {
        let mut workspace = Workspace::open(failing_backend()).await;

        let err = workspace
            .edit_active(|a| a.set_field(FieldPath::FeatureName, "Search"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Storage(_)));
        assert_eq!(workspace.state().active().overview.feature_name, "Search");
    }

    #[tokio::test]
    async fn test_failed_edit_does_not_save() {
        let mut backend = MockKeyValueStore::new();
        backend.expect_get().returning(|_| Ok(None));
        backend.expect_set().never();

        let mut workspace = Workspace::open(backend).await;
        let err = workspace
            .edit_active(|a| a.set_field(FieldPath::Confidence, "Certain"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Model(_)));
    }

    #[tokio::test]
    async fn test_bad_share_token_leaves_documents() {
        let mut backend = MockKeyValueStore::new();
        backend.expect_get().returning(|_| Ok(None));
        backend.expect_set().never();

        let mut workspace = Workspace::open(backend).await;
        let before = workspace.state().analyses().to_vec();

        let err = workspace.open_shared("not-a-token%%").await.unwrap_err();
        assert!(matches!(err, AppError::Share(_)));
        assert_eq!(workspace.state().analyses(), before.as_slice());
    }

    #[tokio::test]
    async fn test_restore_active_ignores_stale_id() {
        let mut backend = MockKeyValueStore::new();
        backend.expect_get().returning(|key| {
            if key.to_string() == ACTIVE_ID_KEY {
                Ok(Some("deleted-id".to_string()))
            } else {
                Ok(None)
            }
        });

        let mut workspace = Workspace::open(backend).await;
        let before = workspace.state().active_id().to_string();
        workspace.restore_active().await;
        assert_eq!(workspace.state().active_id(), before);
    }

    #[tokio::test]
    async fn test_removing_last_document_does_not_save() {
        let mut backend = MockKeyValueStore::new();
        backend.expect_get().returning(|_| Ok(None));
        backend.expect_set().never();

        let mut workspace = Workspace::open(backend).await;
        let id = workspace.state().active_id().to_string();
        assert!(!workspace.remove(&id).await.unwrap());
    }
}
