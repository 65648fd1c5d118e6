use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("home directory not found, set the HOME environment variable")]
    HomeNotFound,
}

/// Centralized path construction for the `~/.agentboard/` directory layout.
///
/// Single source of truth for every path under `~/.agentboard/`. Use `resolve()`
/// in production code and `from_dir()` in tests.
#[derive(Debug, Clone)]
pub struct BoardPaths {
    board_dir: PathBuf,
}

impl BoardPaths {
    /// Resolve paths from the user's home directory (`~/.agentboard`).
    pub fn resolve() -> Result<Self, PathError> {
        let home = dirs::home_dir().ok_or(PathError::HomeNotFound)?;
        Ok(Self {
            board_dir: home.join(".agentboard"),
        })
    }

    /// Create paths from an explicit base directory. Use in tests.
    pub fn from_dir(board_dir: PathBuf) -> Self {
        Self { board_dir }
    }

    /// The base `~/.agentboard` directory.
    pub fn board_dir(&self) -> &Path {
        &self.board_dir
    }

    // --- Top-level files ---

    pub fn user_config(&self) -> PathBuf {
        self.board_dir.join("config.toml")
    }

    /// Durable store of merged/closed review statuses.
    pub fn terminal_cache_file(&self) -> PathBuf {
        self.board_dir.join("terminal-cache.json")
    }

    // --- Static helpers (no self) ---

    /// Project-level config: `<project_root>/.agentboard/config.toml`.
    pub fn project_config(project_root: &Path) -> PathBuf {
        project_root.join(".agentboard").join("config.toml")
    }
}
