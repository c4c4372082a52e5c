use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

/// Saves downloads under a base directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<String> {
        // 只取檔名，避免伺服器給的名稱跳出輸出目錄
        let file_name = Path::new(path)
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "download".into());
        let full_path = self.base_path.join(file_name);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&full_path, data).await?;
        Ok(full_path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().join("downloads"));

        let saved = storage
            .write_file("requirements_1.docx", b"docx")
            .await
            .unwrap();

        assert!(saved.ends_with("requirements_1.docx"));
        assert_eq!(std::fs::read(&saved).unwrap(), b"docx");
    }

    #[tokio::test]
    async fn test_write_strips_directories_from_name() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());

        let saved = storage
            .write_file("../../etc/user_stories.xlsx", b"xlsx")
            .await
            .unwrap();

        assert_eq!(
            Path::new(&saved),
            temp_dir.path().join("user_stories.xlsx").as_path()
        );
    }
}
