use std::path::PathBuf;

use tempfile::TempDir;

/// Lay out a temporary project directory. The caller must hold onto the
/// `TempDir` to keep it alive.
pub fn setup_project() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Write `content` at `rel` inside the project, creating parent dirs.
pub fn write_file(dir: &TempDir, rel: &str, content: &str) -> PathBuf {
    let path = dir.path().join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

/// Canonicalized project root, matching what the CLI pipeline does.
pub fn root(dir: &TempDir) -> PathBuf {
    std::fs::canonicalize(dir.path()).unwrap()
}
