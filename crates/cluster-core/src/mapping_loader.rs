use std::fs;
use std::path::{Path, PathBuf};

use cluster_types::Mappings;

/// Reads default and per-index mapping files from `<root>/mappings` and produces a
/// `type -> source` map (C3, §4.3).
///
/// Filesystem access happens once, synchronously, on the cluster-state update queue's
/// worker thread (§5), so this loader is plain blocking I/O rather than async.
#[derive(Debug, Clone)]
pub struct MappingLoader {
    root: PathBuf,
}

impl MappingLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Loads `_default/*` then `<index_name>/*`, then overlays `request_mappings` on top.
    ///
    /// Each directory is read in isolation (first-read-wins within that directory, see
    /// `read_directory`) and the per-directory results are layered with `overlay` so a later
    /// layer overwrites an earlier one — first-read-wins applies only *within* one directory,
    /// never across directories (§4.3).
    pub fn load(&self, index_name: &str, request_mappings: &Mappings) -> Mappings {
        let mappings_dir = self.root.join("mappings");
        let defaults = self.read_directory(&mappings_dir.join("_default"));
        let per_index = self.read_directory(&mappings_dir.join(index_name));
        defaults.overlay(&per_index).overlay(request_mappings)
    }

    /// Reads every file directly under `dir` into a fresh `Mappings`, first-read-wins within
    /// this one directory. Missing directories are silently treated as empty — not every
    /// index has per-index overrides.
    fn read_directory(&self, dir: &Path) -> Mappings {
        let mut accumulator = Mappings::new();
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(_) => return accumulator,
        };
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(?err, dir = %dir.display(), "failed to read a mapping directory entry");
                    continue;
                }
            };
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let type_name = match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) => stem.to_owned(),
                None => {
                    // No extension: the basename IS the whole filename in this case,
                    // `file_stem` already returns it unchanged, so this branch only guards
                    // against non-UTF-8 names.
                    tracing::warn!(path = %path.display(), "skipping a mapping file with a non-UTF-8 name");
                    continue;
                }
            };
            match fs::read_to_string(&path) {
                Ok(source) => accumulator.insert_if_absent(type_name, source),
                Err(err) => {
                    tracing::warn!(?err, path = %path.display(), "failed to read mapping file, ignoring it");
                }
            }
        }
        accumulator
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn defaults_then_per_index_then_request_in_that_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let default_dir = dir.path().join("mappings/_default");
        let index_dir = dir.path().join("mappings/logs");
        fs::create_dir_all(&default_dir).unwrap();
        fs::create_dir_all(&index_dir).unwrap();
        fs::write(default_dir.join("doc.json"), "A").unwrap();
        fs::write(index_dir.join("doc.json"), "B").unwrap();

        let loader = MappingLoader::new(dir.path());
        let mut request_mappings = Mappings::new();
        request_mappings.set("doc", "C");

        let merged = loader.load("logs", &request_mappings);
        assert_eq!(merged.get("doc"), Some("C"));
    }

    #[test]
    fn per_index_override_wins_over_default_without_a_request_override() {
        let dir = tempfile::tempdir().unwrap();
        let default_dir = dir.path().join("mappings/_default");
        let index_dir = dir.path().join("mappings/logs");
        fs::create_dir_all(&default_dir).unwrap();
        fs::create_dir_all(&index_dir).unwrap();
        fs::write(default_dir.join("doc.json"), "A").unwrap();
        fs::write(index_dir.join("doc.json"), "B").unwrap();

        let loader = MappingLoader::new(dir.path());
        let merged = loader.load("logs", &Mappings::new());
        assert_eq!(merged.get("doc"), Some("B"));
    }

    #[test]
    fn missing_mappings_directory_yields_an_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        let loader = MappingLoader::new(dir.path());
        let merged = loader.load("logs", &Mappings::new());
        assert!(merged.is_empty());
    }

    #[test]
    fn a_file_with_no_extension_is_used_as_its_own_type_name() {
        let dir = tempfile::tempdir().unwrap();
        let default_dir = dir.path().join("mappings/_default");
        fs::create_dir_all(&default_dir).unwrap();
        fs::write(default_dir.join("doc"), "A").unwrap();

        let loader = MappingLoader::new(dir.path());
        let merged = loader.load("logs", &Mappings::new());
        assert_eq!(merged.get("doc"), Some("A"));
    }
}
