//! Key/value string storage
//!
//! LocalStorage in the browser, one JSON file per key natively.

use std::cell::RefCell;
use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::persistence::StoreError;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Read and decode a JSON value. A missing key is `Ok(None)`.
    fn load_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError>
    where
        Self: Sized,
    {
        match self.get(key)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn save_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError>
    where
        Self: Sized,
    {
        let json = serde_json::to_string(value)?;
        self.set(key, &json)
    }
}

/// In-memory store (tests, or when no durable storage exists)
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::LocalStore as PlatformStore;

#[cfg(not(target_arch = "wasm32"))]
pub use native::FileStore as PlatformStore;

#[cfg(target_arch = "wasm32")]
mod web {
    use super::{KeyValueStore, StoreError};

    /// `window.localStorage`
    #[derive(Debug, Default, Clone, Copy)]
    pub struct LocalStore;

    impl LocalStore {
        pub fn new() -> Self {
            Self
        }

        fn storage() -> Result<web_sys::Storage, StoreError> {
            web_sys::window()
                .and_then(|w| w.local_storage().ok())
                .flatten()
                .ok_or_else(|| StoreError::Unavailable("localStorage".into()))
        }
    }

    impl KeyValueStore for LocalStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            Self::storage()?.get_item(key).map_err(StoreError::from_js)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            Self::storage()?
                .set_item(key, value)
                .map_err(StoreError::from_js)
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::fs;
    use std::io::ErrorKind;
    use std::path::{Path, PathBuf};

    use directories::ProjectDirs;

    use super::{KeyValueStore, StoreError};

    /// Directory of `<key>.json` files
    #[derive(Debug, Clone)]
    pub struct FileStore {
        dir: PathBuf,
    }

    impl FileStore {
        /// Platform data directory, or the working directory as a fallback
        pub fn new() -> Self {
            let dir = ProjectDirs::from("", "", "aim-trainer")
                .map(|pd| pd.data_local_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."));
            Self { dir }
        }

        pub fn with_dir<P: AsRef<Path>>(dir: P) -> Self {
            Self {
                dir: dir.as_ref().to_path_buf(),
            }
        }

        fn path_for(&self, key: &str) -> PathBuf {
            self.dir.join(format!("{key}.json"))
        }
    }

    impl Default for FileStore {
        fn default() -> Self {
            Self::new()
        }
    }

    impl KeyValueStore for FileStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            match fs::read_to_string(self.path_for(key)) {
                Ok(data) => Ok(Some(data)),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            }
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            fs::create_dir_all(&self.dir)?;
            // Write then rename so a crash never leaves a half-written file
            let path = self.path_for(key);
            let tmp = path.with_extension("json.tmp");
            fs::write(&tmp, value)?;
            fs::rename(&tmp, &path)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.save_json("k", &vec![1, 2, 3]).unwrap();
        let loaded: Option<Vec<i32>> = store.load_json("k").unwrap();
        assert_eq!(loaded, Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_corrupt_json_is_error() {
        let store = MemoryStore::new();
        store.set("k", "{not json").unwrap();
        let loaded: Result<Option<Vec<i32>>, _> = store.load_json("k");
        assert!(matches!(loaded, Err(StoreError::Json(_))));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let store = PlatformStore::with_dir(dir.path().join("nested"));
        assert_eq!(store.get("scores").unwrap(), None);
        store.set("scores", "[1]").unwrap();

        let reopened = PlatformStore::with_dir(dir.path().join("nested"));
        assert_eq!(reopened.get("scores").unwrap().as_deref(), Some("[1]"));
    }
}
