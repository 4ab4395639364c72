use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const ALMOX_DIR: &str = ".almox";
pub const CONFIG_FILE: &str = ".almox/config.yaml";
pub const DEFAULT_DB_FILE: &str = ".almox/items.redb";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn almox_dir(root: &Path) -> PathBuf {
    root.join(ALMOX_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Resolve a configured store path; relative paths are taken from `root`.
pub fn store_path(root: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        root.join(configured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_store_path_is_rooted() {
        let root = Path::new("/srv/almox");
        assert_eq!(
            store_path(root, Path::new(DEFAULT_DB_FILE)),
            PathBuf::from("/srv/almox/.almox/items.redb")
        );
    }

    #[test]
    fn absolute_store_path_is_kept() {
        let root = Path::new("/srv/almox");
        assert_eq!(
            store_path(root, Path::new("/var/lib/almox/items.redb")),
            PathBuf::from("/var/lib/almox/items.redb")
        );
    }
}
