use crate::domain::model::DownloadedFile;
use crate::utils::error::{RecapError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// In-process stand-in for browser object URLs.
///
/// Each `create` returns a fresh `blob:<origin>/<uuid>` URL that resolves to
/// the stored file until it is revoked. Clones share the same registry.
#[derive(Debug, Clone)]
pub struct ObjectUrlStore {
    origin: String,
    entries: Arc<Mutex<HashMap<String, Arc<DownloadedFile>>>>,
}

impl ObjectUrlStore {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into().trim_end_matches('/').to_string(),
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Arc<DownloadedFile>>> {
        // 持鎖期間不會 panic，中毒時沿用內部資料
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn create(&self, file: DownloadedFile) -> String {
        let url = format!("blob:{}/{}", self.origin, Uuid::new_v4());
        tracing::debug!(
            "Created object URL {} ({} bytes, {})",
            url,
            file.data.len(),
            file.content_type
        );
        self.entries().insert(url.clone(), Arc::new(file));
        url
    }

    pub fn resolve(&self, url: &str) -> Result<Arc<DownloadedFile>> {
        self.entries()
            .get(url)
            .cloned()
            .ok_or_else(|| RecapError::UnknownObjectUrl {
                url: url.to_string(),
            })
    }

    /// Releases the blob behind `url`. Returns whether it was still live.
    pub fn revoke(&self, url: &str) -> bool {
        let removed = self.entries().remove(url).is_some();
        if removed {
            tracing::debug!("Revoked object URL {}", url);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(data: &[u8]) -> DownloadedFile {
        DownloadedFile {
            data: data.to_vec(),
            content_type: "application/octet-stream".to_string(),
            file_name: None,
        }
    }

    #[test]
    fn test_create_and_resolve() {
        let store = ObjectUrlStore::new("http://localhost:5000/");
        let url = store.create(file(b"docx bytes"));

        assert!(url.starts_with("blob:http://localhost:5000/"));
        assert_eq!(store.resolve(&url).unwrap().data, b"docx bytes");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_urls_are_unique() {
        let store = ObjectUrlStore::new("http://localhost");
        let first = store.create(file(b"a"));
        let second = store.create(file(b"a"));
        assert_ne!(first, second);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_revoke() {
        let store = ObjectUrlStore::new("http://localhost");
        let url = store.create(file(b"xlsx"));

        assert!(store.revoke(&url));
        assert!(!store.revoke(&url));
        assert!(store.is_empty());
        assert!(matches!(
            store.resolve(&url),
            Err(RecapError::UnknownObjectUrl { .. })
        ));
    }
}
