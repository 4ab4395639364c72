use std::path::{Path, PathBuf};

/// Resolve the warehouse root directory.
///
/// Priority:
/// 1. `--root` flag / `ALMOX_ROOT` env var (passed in as `explicit`)
/// 2. Nearest ancestor of `cwd` containing `.almox/`
/// 3. Nearest ancestor of `cwd` containing `.git/`
/// 4. `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_upward(&cwd, ".almox")
        .or_else(|| find_upward(&cwd, ".git"))
        .unwrap_or(cwd)
}

fn find_upward(start: &Path, marker: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(marker).is_dir())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        assert_eq!(resolve_root(Some(dir.path())), dir.path());
    }

    #[test]
    fn finds_almox_dir_from_subdirectory() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".almox")).unwrap();
        let deep = dir.path().join("estoque/prateleira");
        std::fs::create_dir_all(&deep).unwrap();
        assert_eq!(find_upward(&deep, ".almox").unwrap(), dir.path());
    }

    #[test]
    fn almox_marker_beats_git_marker() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        let inner = dir.path().join("warehouse");
        std::fs::create_dir_all(inner.join(".almox")).unwrap();
        assert_eq!(find_upward(&inner, ".almox").unwrap(), inner);
        assert_eq!(find_upward(&inner, ".git").unwrap(), dir.path());
    }
}
