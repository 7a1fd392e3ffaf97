// State path utilities.
// Locates the persisted settings and cache blob on disk.

use std::path::PathBuf;

use directories::ProjectDirs;

const STATE_FILE: &str = "data.json";

/// Get the base data directory (~/.local/share/starcount on Linux).
fn data_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "starcount").map(|dirs| dirs.data_dir().to_path_buf())
}

/// Path to the persisted state file.
pub fn state_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join(STATE_FILE))
}
