//! Key/value storage file holding the persisted bearer token.
//!
//! The file is a flat JSON object, the on-disk analogue of browser local
//! storage. Only the `access_token` key is managed here; any other keys
//! written by other tools are left untouched.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use hearth_core::error::{Error, StorageError};
use hearth_core::{ACCESS_TOKEN_KEY, Result, TokenStorage};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

fn map_io(path: &Path, err: io::Error) -> Error {
    Error::Storage(StorageError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}

fn corrupt(path: &Path, message: impl Into<String>) -> Error {
    Error::Storage(StorageError::Corrupt {
        path: path.display().to_string(),
        message: message.into(),
    })
}

/// Durable token storage backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    /// Create storage at `path`. The file and its parent directories are
    /// created on first write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the storage file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(suffix);
        self.path.with_file_name(name)
    }

    /// Run `f` while holding an exclusive lock on the sibling lock file.
    fn with_lock<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let lock_path = self.sibling(".lock");

        if let Some(parent) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| map_io(parent, e))?;
        }

        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| map_io(&lock_path, e))?;

        lock_file
            .lock_exclusive()
            .map_err(|e| map_io(&lock_path, e))?;

        let result = f();

        lock_file.unlock().map_err(|e| map_io(&lock_path, e))?;

        result
    }

    fn read_entries(&self) -> Result<Map<String, Value>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(map_io(&self.path, e)),
        };

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(entries)) => Ok(entries),
            Ok(_) => Err(corrupt(&self.path, "expected a JSON object")),
            Err(e) => Err(corrupt(&self.path, e.to_string())),
        }
    }

    fn write_entries(&self, entries: &Map<String, Value>) -> Result<()> {
        if entries.is_empty() {
            return match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(map_io(&self.path, e)),
            };
        }

        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| corrupt(&self.path, e.to_string()))?;

        let tmp_path = self.sibling(".tmp");
        fs::write(&tmp_path, json).map_err(|e| map_io(&tmp_path, e))?;

        // Set restrictive permissions (Unix only)
        #[cfg(unix)]
        {
            let mut perms = fs::metadata(&tmp_path)
                .map_err(|e| map_io(&tmp_path, e))?
                .permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&tmp_path, perms).map_err(|e| map_io(&tmp_path, e))?;
        }

        fs::rename(&tmp_path, &self.path).map_err(|e| map_io(&self.path, e))
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<Option<String>> {
        let entries = self.read_entries()?;

        match entries.get(ACCESS_TOKEN_KEY) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(token)) if token.is_empty() => Ok(None),
            Some(Value::String(token)) => Ok(Some(token.clone())),
            Some(_) => Err(corrupt(
                &self.path,
                format!("'{}' is not a string", ACCESS_TOKEN_KEY),
            )),
        }
    }

    #[instrument(skip(self, token), fields(path = %self.path.display()))]
    fn store(&self, token: &str) -> Result<()> {
        self.with_lock(|| {
            let mut entries = self.read_entries()?;
            entries.insert(
                ACCESS_TOKEN_KEY.to_string(),
                Value::String(token.to_string()),
            );
            self.write_entries(&entries)?;
            debug!("Stored access token");
            Ok(())
        })
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn remove(&self) -> Result<()> {
        self.with_lock(|| {
            let (mut entries, was_corrupt) = match self.read_entries() {
                Ok(entries) => (entries, false),
                // A file we cannot parse holds nothing worth keeping.
                Err(Error::Storage(StorageError::Corrupt { .. })) => (Map::new(), true),
                Err(e) => return Err(e),
            };

            if entries.remove(ACCESS_TOKEN_KEY).is_none() && !was_corrupt {
                return Ok(());
            }

            self.write_entries(&entries)?;
            debug!("Removed access token");
            Ok(())
        })
    }
}
