use directories::ProjectDirs;
use std::{collections::BTreeMap, fs, path::PathBuf};

use crate::error::StoreError;

use super::PositionStore;

/// On-disk key/value store: a single JSON map under the platform cache
/// directory. One write per `multi_set`, so the three position keys land
/// together.
#[derive(Debug, Clone)]
pub struct FilePositionStore {
    path: PathBuf,
}

impl FilePositionStore {
    pub fn new() -> Result<Self, StoreError> {
        let dirs =
            ProjectDirs::from("dev", "climato", "climato").ok_or(StoreError::NoProjectDirs)?;

        Ok(Self { path: dirs.cache_dir().join("position.json") })
    }

    /// Store rooted at an explicit path; used by tests.
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn load_map(&self) -> Result<BTreeMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let contents = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn save_map(&self, map: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(map)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl PositionStore for FilePositionStore {
    async fn multi_get(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StoreError> {
        let map = self.load_map()?;
        Ok(keys.iter().map(|key| map.get(*key).cloned()).collect())
    }

    async fn multi_set(&self, pairs: &[(&str, String)]) -> Result<(), StoreError> {
        let mut map = self.load_map()?;
        for (key, value) in pairs {
            map.insert((*key).to_string(), value.clone());
        }
        self.save_map(&map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{KEY_ADDRESS, KEY_LATITUDE, KEY_LONGITUDE};

    fn temp_store() -> (tempfile::TempDir, FilePositionStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FilePositionStore::with_path(dir.path().join("position.json"));
        (dir, store)
    }

    #[tokio::test]
    async fn missing_file_reads_as_absent_keys() {
        let (_dir, store) = temp_store();

        let values = store.multi_get(&[KEY_LATITUDE, KEY_LONGITUDE, KEY_ADDRESS]).await.unwrap();
        assert_eq!(values, vec![None, None, None]);
    }

    #[tokio::test]
    async fn multi_set_then_multi_get_roundtrips() {
        let (_dir, store) = temp_store();

        store
            .multi_set(&[
                (KEY_LATITUDE, "-23.5".to_string()),
                (KEY_LONGITUDE, "-46.6".to_string()),
                (KEY_ADDRESS, "{}".to_string()),
            ])
            .await
            .unwrap();

        let values = store.multi_get(&[KEY_LATITUDE, KEY_LONGITUDE, KEY_ADDRESS]).await.unwrap();
        assert_eq!(
            values,
            vec![Some("-23.5".to_string()), Some("-46.6".to_string()), Some("{}".to_string())]
        );
    }

    #[tokio::test]
    async fn rewrite_overwrites_previous_values() {
        let (_dir, store) = temp_store();

        store.multi_set(&[(KEY_LATITUDE, "1".to_string())]).await.unwrap();
        store.multi_set(&[(KEY_LATITUDE, "2".to_string())]).await.unwrap();

        let values = store.multi_get(&[KEY_LATITUDE]).await.unwrap();
        assert_eq!(values, vec![Some("2".to_string())]);
    }
}
