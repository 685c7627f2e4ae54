use crate::core::data::Ruleset;
use crate::core::game_state::GameState;
use directories::ProjectDirs;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Manages saving and loading game state as pretty-printed JSON.
pub struct SaveManager {
    save_path: PathBuf,
}

impl SaveManager {
    /// Creates a SaveManager at the platform config directory.
    ///
    /// The directory is resolved with the `directories` crate and created if
    /// it does not exist yet.
    pub fn new() -> io::Result<Self> {
        let project_dirs = ProjectDirs::from("", "", "cult-battle").ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "Could not determine config directory",
            )
        })?;

        let config_dir = project_dirs.config_dir();
        fs::create_dir_all(config_dir)?;

        Ok(Self {
            save_path: config_dir.join("save.json"),
        })
    }

    /// Creates a SaveManager writing to an explicit file.
    pub fn with_path(save_path: impl Into<PathBuf>) -> Self {
        Self {
            save_path: save_path.into(),
        }
    }

    /// Creates a SaveManager for testing with a unique temporary directory
    #[cfg(test)]
    fn new_for_test() -> io::Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

        let test_id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let temp_dir = std::env::temp_dir().join(format!(
            "cult-battle-test-{}-{}",
            std::process::id(),
            test_id
        ));
        fs::create_dir_all(&temp_dir)?;

        Ok(Self::with_path(temp_dir.join("save.json")))
    }

    pub fn path(&self) -> &Path {
        &self.save_path
    }

    /// Writes the full snapshot, replacing any previous save.
    pub fn save(&self, state: &GameState) -> io::Result<()> {
        let json = state
            .to_json()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        if let Some(parent) = self.save_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.save_path, json)
    }

    /// Loads and migrates the saved snapshot.
    ///
    /// Returns `None` when no save exists or when the file cannot be read or
    /// parsed. Only the latter two are logged.
    pub fn load(&self, ruleset: &Ruleset) -> Option<GameState> {
        let json = match fs::read_to_string(&self.save_path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.save_path.display(), error = %e, "failed to read save");
                return None;
            }
        };
        GameState::from_json(&json, ruleset)
    }

    /// Checks if a save file exists
    pub fn save_exists(&self) -> bool {
        self.save_path.exists()
    }

    /// Removes the save file. Succeeds when there was nothing to remove.
    pub fn delete(&self) -> io::Result<()> {
        match fs::remove_file(&self.save_path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}
