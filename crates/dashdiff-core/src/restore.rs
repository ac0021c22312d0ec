//! Restoring a document to an earlier version
//!
//! A restore never rewinds history. It appends a new version whose payload
//! is the target version's payload, stamped with the new version number and
//! the version it was restored from, and points the live document at it.
//! The update and the append go through the store's single atomic write.

use serde_json::Value;
use tracing::{debug, info};

use crate::models::{now, stamp_version, Document, Version, RESTORED_FROM_FIELD};
use crate::storage::{StorageResult, VersionStore};

/// Runs restores against a version store
pub struct RestoreCoordinator<'a, S: VersionStore + ?Sized> {
    store: &'a mut S,
}

impl<'a, S: VersionStore + ?Sized> RestoreCoordinator<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    /// Restore `document_id` to the payload of `target_version`
    ///
    /// Fails with `VersionNotFound` or `DocumentNotFound` before anything is
    /// written, and with `Conflict` if another writer took the version number
    /// first. Returns the updated live document.
    pub fn restore(
        &mut self,
        document_id: i64,
        target_version: i64,
        actor_id: i64,
    ) -> StorageResult<Document> {
        let target = self.store.get_version(document_id, target_version)?;
        let current = self.store.get_document(document_id)?;
        let next = self.store.next_version_number(document_id)?;

        debug!(
            document_id,
            current = current.version,
            target = target_version,
            next,
            "Restoring document"
        );

        let document = Document {
            id: document_id,
            version: next,
            data: restored_payload(target.data, next, target_version),
            updated_at: now(),
            updated_by: actor_id,
        };

        let mut version = Version::snapshot(&document, Some(target_version), "");
        version.restored_from = Some(target_version);

        self.store.update_and_append(&document, &version)?;

        info!(
            document_id,
            version = next,
            restored_from = target_version,
            "Restored document"
        );
        Ok(document)
    }
}

/// Stamp the new version number and provenance into an object payload
fn restored_payload(mut data: Value, version: i64, restored_from: i64) -> Value {
    stamp_version(&mut data, version);
    if let Value::Object(map) = &mut data {
        map.insert(RESTORED_FROM_FIELD.to_string(), Value::from(restored_from));
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VersionQuery;
    use crate::storage::{SqliteVersionStore, StorageError};
    use serde_json::json;

    fn two_version_store() -> SqliteVersionStore {
        let mut store = SqliteVersionStore::open_in_memory().unwrap();
        store.save_document(1, json!({"a": 1}), 10, "").unwrap();
        store
            .save_document(1, json!({"a": 2, "b": 3}), 10, "add b")
            .unwrap();
        store
    }

    fn without_stamps(mut data: Value) -> Value {
        if let Value::Object(map) = &mut data {
            map.remove(crate::models::VERSION_FIELD);
            map.remove(RESTORED_FROM_FIELD);
        }
        data
    }

    #[test]
    fn test_restore_appends_new_version() {
        let mut store = two_version_store();

        let document = RestoreCoordinator::new(&mut store).restore(1, 1, 20).unwrap();

        assert_eq!(document.version, 3);
        assert_eq!(document.updated_by, 20);
        assert_eq!(document.data, json!({"a": 1, "version": 3, "restoredFrom": 1}));

        let version = store.get_version(1, 3).unwrap();
        assert_eq!(version.parent_version, Some(1));
        assert_eq!(version.restored_from, Some(1));
        assert_eq!(version.message, "");
        assert_eq!(version.created_by, 20);
        assert_eq!(version.data, document.data);

        assert_eq!(store.get_document(1).unwrap(), document);
    }

    #[test]
    fn test_restoring_twice_keeps_full_lineage() {
        let mut store = two_version_store();
        let original_v1 = store.get_version(1, 1).unwrap();
        let original_v2 = store.get_version(1, 2).unwrap();

        let first = RestoreCoordinator::new(&mut store).restore(1, 1, 20).unwrap();
        let second = RestoreCoordinator::new(&mut store).restore(1, 1, 20).unwrap();

        assert_eq!(first.version, 3);
        assert_eq!(second.version, 4);
        for number in [3, 4] {
            assert_eq!(store.get_version(1, number).unwrap().restored_from, Some(1));
        }

        assert_eq!(without_stamps(second.data), original_v1.data);
        assert_eq!(store.get_version(1, 1).unwrap(), original_v1);
        assert_eq!(store.get_version(1, 2).unwrap(), original_v2);
        assert_eq!(
            store.list_versions(1, &VersionQuery::default()).unwrap().len(),
            4
        );
    }

    #[test]
    fn test_missing_version_writes_nothing() {
        let mut store = two_version_store();

        let err = RestoreCoordinator::new(&mut store)
            .restore(1, 9, 20)
            .unwrap_err();

        assert!(matches!(
            err,
            StorageError::VersionNotFound {
                document_id: 1,
                version: 9
            }
        ));
        assert_eq!(store.version_count(1).unwrap(), 2);
        assert_eq!(store.get_document(1).unwrap().version, 2);
    }

    #[test]
    fn test_missing_document_writes_nothing() {
        let mut store = two_version_store();
        store
            .connection()
            .execute("DELETE FROM document WHERE id = 1", [])
            .unwrap();

        let err = RestoreCoordinator::new(&mut store)
            .restore(1, 1, 20)
            .unwrap_err();

        assert!(matches!(err, StorageError::DocumentNotFound { document_id: 1 }));
        assert_eq!(store.version_count(1).unwrap(), 2);
    }

    #[test]
    fn test_non_object_payload_is_restored_verbatim() {
        let mut store = SqliteVersionStore::open_in_memory().unwrap();
        store.save_document(5, json!([1, 2]), 1, "").unwrap();
        store.save_document(5, json!([3]), 1, "").unwrap();

        let document = RestoreCoordinator::new(&mut store).restore(5, 1, 1).unwrap();
        assert_eq!(document.version, 3);
        assert_eq!(document.data, json!([1, 2]));
    }

    /// Store whose atomic write loses a race against a concurrent save
    struct RacingStore {
        inner: SqliteVersionStore,
    }

    impl VersionStore for RacingStore {
        fn get_version(&self, document_id: i64, version: i64) -> StorageResult<Version> {
            self.inner.get_version(document_id, version)
        }

        fn list_versions(
            &self,
            document_id: i64,
            query: &VersionQuery,
        ) -> StorageResult<Vec<Version>> {
            self.inner.list_versions(document_id, query)
        }

        fn get_document(&self, document_id: i64) -> StorageResult<Document> {
            self.inner.get_document(document_id)
        }

        fn document_exists(&self, document_id: i64) -> StorageResult<bool> {
            self.inner.document_exists(document_id)
        }

        fn next_version_number(&self, document_id: i64) -> StorageResult<i64> {
            self.inner.next_version_number(document_id)
        }

        fn insert_document(&mut self, document: &Document, first: &Version) -> StorageResult<()> {
            self.inner.insert_document(document, first)
        }

        fn update_and_append(
            &mut self,
            document: &Document,
            version: &Version,
        ) -> StorageResult<()> {
            self.inner
                .save_document(document.id, json!({"saved": "concurrently"}), 99, "racer")?;
            self.inner.update_and_append(document, version)
        }
    }

    #[test]
    fn test_concurrent_save_wins_and_restore_is_rejected() {
        let mut store = RacingStore {
            inner: two_version_store(),
        };

        let err = RestoreCoordinator::new(&mut store)
            .restore(1, 1, 20)
            .unwrap_err();
        assert!(err.is_conflict());

        let live = store.inner.get_document(1).unwrap();
        assert_eq!(live.version, 3);
        assert_eq!(live.data, json!({"saved": "concurrently"}));

        let versions = store
            .inner
            .list_versions(1, &VersionQuery::default())
            .unwrap();
        assert_eq!(versions.len(), 3);
        assert!(versions.iter().all(|v| v.restored_from.is_none()));
    }
}
