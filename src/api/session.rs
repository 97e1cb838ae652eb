//! Keeps the backend's session cookie between CLI invocations.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored cookie header, or `None` when logged out.
    pub fn load(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(s) if !s.trim().is_empty() => Ok(Some(s.trim().to_string())),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn save(&self, cookie_header: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, cookie_header)?;
        debug!("Session saved to {:?}", self.path);
        Ok(())
    }

    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("tradenexus-test-{}-{}", std::process::id(), name))
            .join("session.cookie")
    }

    #[test]
    fn test_save_load_clear() {
        let store = SessionStore::new(temp_path("cycle"));
        assert_eq!(store.load().unwrap(), None);

        store.save("access_token=xyz").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("access_token=xyz"));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        // clearing twice is fine
        store.clear().unwrap();
    }
}
