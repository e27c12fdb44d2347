//! Credential store for the Enable Banking application identity
//!
//! Secrets live as one file per key under the platform config directory
//! (e.g., `~/.config/centime` on Linux), deliberately apart from the
//! primary data store so a database backup never carries the signing key.
//! Absence is indistinguishable from never-set: `read` returns `None` and
//! `delete` is a no-op for missing keys.

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{Error, Result};

/// Key under which the Enable Banking application id is stored
pub const APP_ID_KEY: &str = "banking_app_id";

/// Key under which the PEM-encoded RSA private key is stored
pub const PRIVATE_KEY_KEY: &str = "banking_private_key";

/// File-backed secret store scoped to the application identity
#[derive(Debug, Clone)]
pub struct CredentialStore {
    dir: PathBuf,
}

impl CredentialStore {
    /// Open the store at the default platform location
    pub fn open() -> Result<Self> {
        let dir = dirs::config_dir()
            .ok_or_else(|| Error::InvalidData("No config directory available".into()))?
            .join("centime");
        Self::open_at(dir)
    }

    /// Open the store at an explicit directory (used by tests)
    pub fn open_at(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Save a secret, overwriting any existing value for `key`
    pub fn save(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        fs::write(&path, value)?;

        // Secrets are owner-readable only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }

        debug!("Saved credential {}", key);
        Ok(())
    }

    /// Read a secret; `None` if absent (failures are silent by contract)
    pub fn read(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    /// Delete a secret; missing keys are not an error
    pub fn delete(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_read_delete_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::open_at(dir.path().to_path_buf()).unwrap();

        assert_eq!(store.read(APP_ID_KEY), None);

        store.save(APP_ID_KEY, "app-123").unwrap();
        assert_eq!(store.read(APP_ID_KEY), Some("app-123".to_string()));

        // Overwrite
        store.save(APP_ID_KEY, "app-456").unwrap();
        assert_eq!(store.read(APP_ID_KEY), Some("app-456".to_string()));

        store.delete(APP_ID_KEY).unwrap();
        assert_eq!(store.read(APP_ID_KEY), None);

        // Deleting a missing key is not an error
        store.delete(APP_ID_KEY).unwrap();
    }
}
