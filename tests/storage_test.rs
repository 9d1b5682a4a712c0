//! Integration tests for SQLite-backed document storage
//!
//! Covers the key-value table, the `requirementAnalyses` collection layout
//! and workspaces reopened against the same database file.

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use requirement_analysis::config::DatabaseConfig;
use requirement_analysis::model::{Analysis, EdgeCaseKind, FieldPath, ScopeItem, VersionPhase};
use requirement_analysis::state::{Workspace, ACTIVE_ID_KEY};
use requirement_analysis::storage::{DocumentStore, KeyValueStore, SqliteStorage, ANALYSES_KEY};

/// Create an in-memory storage instance for testing
async fn create_test_storage() -> SqliteStorage {
    SqliteStorage::new_in_memory()
        .await
        .expect("Failed to create in-memory storage")
}

fn file_config(dir: &tempfile::TempDir) -> DatabaseConfig {
    DatabaseConfig {
        path: dir.path().join("nested").join("analyses.db"),
        max_connections: 1,
    }
}

#[cfg(test)]
mod kv_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_get_missing_key() {
        let storage = create_test_storage().await;
        assert_eq!(storage.get("nothing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let storage = create_test_storage().await;
        storage.set("k", "v1").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("v1"));
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let storage = create_test_storage().await;
        storage.set("k", "v1").await.unwrap();
        storage.set("k", "v2").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("v2"));

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM kv_entries")
            .fetch_one(storage.pool())
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_file_database_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = file_config(&dir);

        let storage = SqliteStorage::new(&config).await.unwrap();
        storage.set("k", "v").await.unwrap();
        assert!(config.path.exists());
    }
}

#[cfg(test)]
mod document_store_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_empty_database_loads_one_blank() {
        let store = DocumentStore::new(create_test_storage().await);
        let analyses = store.load().await;
        assert_eq!(analyses.len(), 1);
        assert_eq!(analyses[0].name, "Untitled Analysis");
        assert_eq!(analyses[0].edges.len(), 10);
    }

    #[tokio::test]
    async fn test_collection_is_one_json_array() {
        let store = DocumentStore::new(create_test_storage().await);
        let docs = vec![Analysis::blank(Some("One")), Analysis::blank(Some("Two"))];
        store.save(&docs).await.unwrap();

        let raw = store.backend().get(ANALYSES_KEY).await.unwrap().unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        let entries = value.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["name"], "One");
        assert!(entries[0]["overview"]["featureName"].is_string());
        assert!(entries[0]["problem"]["ifNotBuilt"].is_string());
        assert!(entries[0]["edges"]["firstTime"]["considered"].is_boolean());
        assert!(entries[0]["scope"]["items"].is_array());
    }

    #[tokio::test]
    async fn test_save_then_load_preserves_documents() {
        let store = DocumentStore::new(create_test_storage().await);
        let mut doc = Analysis::blank(Some("Checkout"));
        doc.set_field(FieldPath::Who, "Returning buyers").unwrap();
        doc.add_assumption("Users have saved cards");
        doc.toggle_edge(EdgeCaseKind::Offline);
        doc.add_scope_item(ScopeItem::new("One-click pay").with_version(VersionPhase::V1));
        store.save(&[doc.clone()]).await.unwrap();

        let loaded = store.load().await;
        assert_eq!(loaded, vec![doc]);
    }

    #[tokio::test]
    async fn test_corrupt_value_loads_one_blank() {
        let storage = create_test_storage().await;
        storage.set(ANALYSES_KEY, "{not json").await.unwrap();

        let loaded = DocumentStore::new(storage).load().await;
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "Untitled Analysis");
    }

    #[tokio::test]
    async fn test_legacy_documents_are_backfilled() {
        let storage = create_test_storage().await;
        let legacy = json!([{
            "id": "legacy-1",
            "name": "Old doc",
            "phase": "Beta",
            "edges": {"empty": {"considered": true, "notes": "shown"}},
            "scope": {"items": [{"item": "Thing", "version": "V3"}]}
        }]);
        storage
            .set(ANALYSES_KEY, &legacy.to_string())
            .await
            .unwrap();

        let loaded = DocumentStore::new(storage).load().await;
        let doc = &loaded[0];
        assert_eq!(doc.id, "legacy-1");
        assert_eq!(doc.phase, "Beta");
        assert_eq!(doc.edges.len(), 10);
        assert!(doc.edges.is_considered(EdgeCaseKind::Empty));
        assert_eq!(doc.scope.items[0].version, "V3");
        assert!(!doc.scope.items[0].id.is_empty());
        assert_eq!(doc.scope.affected, "");
    }
}

#[cfg(test)]
mod workspace_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_edits_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = file_config(&dir);

        {
            let storage = SqliteStorage::new(&config).await.unwrap();
            let mut workspace = Workspace::open(storage).await;
            workspace
                .edit_active(|a| a.set_field(FieldPath::FeatureName, "Bulk import"))
                .await
                .unwrap();
            workspace.add_blank(Some("Second")).await.unwrap();
        }

        let storage = SqliteStorage::new(&config).await.unwrap();
        let workspace = Workspace::open(storage).await;
        let names: Vec<&str> = workspace
            .state()
            .analyses()
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["Untitled Analysis", "Second"]);
        assert_eq!(
            workspace.state().analyses()[0].overview.feature_name,
            "Bulk import"
        );
    }

    #[tokio::test]
    async fn test_active_document_is_remembered() {
        let dir = tempfile::tempdir().unwrap();
        let config = file_config(&dir);

        let second_id = {
            let storage = SqliteStorage::new(&config).await.unwrap();
            let mut workspace = Workspace::open(storage).await;
            let id = workspace.add_blank(Some("Second")).await.unwrap();
            workspace.remember_active().await.unwrap();
            id
        };

        let storage = SqliteStorage::new(&config).await.unwrap();
        assert_eq!(
            storage.get(ACTIVE_ID_KEY).await.unwrap().as_deref(),
            Some(second_id.as_str())
        );

        let mut workspace = Workspace::open(storage).await;
        assert_ne!(workspace.state().active_id(), second_id);
        workspace.restore_active().await;
        assert_eq!(workspace.state().active_id(), second_id);
    }

    #[tokio::test]
    async fn test_delete_is_persisted() {
        let storage = create_test_storage().await;
        let mut workspace = Workspace::open(storage.clone()).await;
        let first = workspace.state().active_id().to_string();
        workspace.add_blank(Some("Keep")).await.unwrap();

        assert!(workspace.remove(&first).await.unwrap());

        let reloaded = DocumentStore::new(storage).load().await;
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded[0].name, "Keep");
    }
}
