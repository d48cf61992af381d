use restaurant_accounts::storage::{AssetStore, LocalAssetStore, MockAssetStore, StorageError};
use std::path::PathBuf;
use uuid::Uuid;

fn temp_root() -> PathBuf {
    std::env::temp_dir().join(format!("restaurant-accounts-{}", Uuid::new_v4()))
}

#[cfg(test)]
mod mock_tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_store_and_delete() {
        let mock = MockAssetStore::new();
        let path = mock.store(b"png", "users", "me.png").await.unwrap();

        assert!(path.starts_with("users/users_"));
        assert!(path.ends_with(".png"));
        assert!(mock.exists(&path).await);
        assert_eq!(mock.len(), 1);

        mock.delete(&path).await.unwrap();
        assert!(mock.is_empty());
    }

    #[tokio::test]
    async fn test_mock_second_delete_is_not_found() {
        let mock = MockAssetStore::new();
        let path = mock.store(b"png", "admins", "a.png").await.unwrap();
        mock.delete(&path).await.unwrap();

        let err = mock.delete(&path).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let mock = MockAssetStore::new_failing();
        assert!(mock.store(b"png", "users", "a.png").await.is_err());
        let err = mock.delete("users/a.png").await.unwrap_err();
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn test_mock_rejects_bad_category() {
        let mock = MockAssetStore::new();
        let err = mock.store(b"png", "../users", "a.png").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidPath(_)));
    }
}

#[cfg(test)]
mod local_tests {
    use super::*;

    #[tokio::test]
    async fn test_local_store_writes_under_category() {
        let root = temp_root();
        let store = LocalAssetStore::new(&root);

        let path = store.store(b"vendor-logo", "vendors", "logo.jpg").await.unwrap();

        assert!(path.starts_with("vendors/vendors_"));
        assert!(path.ends_with(".jpg"));
        let on_disk = tokio::fs::read(root.join(&path)).await.unwrap();
        assert_eq!(on_disk, b"vendor-logo");
        assert!(store.exists(&path).await);

        tokio::fs::remove_dir_all(&root).await.ok();
    }

    #[tokio::test]
    async fn test_local_delete_then_not_found() {
        let root = temp_root();
        let store = LocalAssetStore::new(&root);
        let path = store.store(b"x", "users", "x.png").await.unwrap();

        store.delete(&path).await.unwrap();
        assert!(!store.exists(&path).await);

        let err = store.delete(&path).await.unwrap_err();
        assert!(err.is_not_found());

        tokio::fs::remove_dir_all(&root).await.ok();
    }

    #[tokio::test]
    async fn test_local_names_do_not_collide() {
        let root = temp_root();
        let store = LocalAssetStore::new(&root);

        let mut paths = Vec::new();
        for _ in 0..5 {
            paths.push(store.store(b"x", "users", "x.png").await.unwrap());
        }
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), 5);

        tokio::fs::remove_dir_all(&root).await.ok();
    }

    #[tokio::test]
    async fn test_local_delete_stays_inside_root() {
        let root = temp_root();
        let store = LocalAssetStore::new(&root);

        // Traversal segments are stripped, so this resolves to `root/etc/passwd`.
        let err = store.delete("../../etc/passwd").await.unwrap_err();
        assert!(err.is_not_found());

        let err = store.delete("../..").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidPath(_)));
    }
}
