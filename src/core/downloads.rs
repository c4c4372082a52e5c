use crate::core::object_url::ObjectUrlStore;
use crate::domain::ports::Storage;
use crate::utils::error::Result;

/// Follows a revealed download anchor: resolves its object URL and writes the
/// blob to storage under the server-provided filename.
pub async fn save_download<S: Storage>(
    object_urls: &ObjectUrlStore,
    href: &str,
    storage: &S,
) -> Result<String> {
    let file = object_urls.resolve(href)?;
    let file_name = file.file_name.as_deref().unwrap_or("download");

    let saved = storage.write_file(file_name, &file.data).await?;
    tracing::info!("Saved {} ({} bytes)", saved, file.data.len());
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::LocalStorage;
    use crate::domain::model::DownloadedFile;
    use crate::utils::error::RecapError;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_download_uses_file_name() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());
        let store = ObjectUrlStore::new("http://localhost:5000");
        let href = store.create(DownloadedFile {
            data: b"PK\x03\x04".to_vec(),
            content_type: "application/zip".to_string(),
            file_name: Some("user_stories_20240309_140507.xlsx".to_string()),
        });

        let saved = save_download(&store, &href, &storage).await.unwrap();

        assert!(saved.ends_with("user_stories_20240309_140507.xlsx"));
        assert_eq!(std::fs::read(saved).unwrap(), b"PK\x03\x04");
    }

    #[tokio::test]
    async fn test_save_revoked_download_fails() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());
        let store = ObjectUrlStore::new("http://localhost:5000");
        let href = store.create(DownloadedFile {
            data: vec![],
            content_type: "application/octet-stream".to_string(),
            file_name: None,
        });
        store.revoke(&href);

        assert!(matches!(
            save_download(&store, &href, &storage).await,
            Err(RecapError::UnknownObjectUrl { .. })
        ));
    }
}
