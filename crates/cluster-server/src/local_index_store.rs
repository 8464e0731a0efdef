use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use cluster_core::{IndexService, LocalIndexStore, MapperService};
use cluster_types::{NodeId, Settings};
use uuid::Uuid;

/// A filesystem-backed [`LocalIndexStore`] reference implementation: each index gets a
/// UUID-named directory, the same indirection `IndexMapper` uses in the reference stack so an
/// index can be renamed or recreated without reusing a stale path.
///
/// This is demonstration plumbing, not a production storage engine: settings are written as
/// plain JSON and mapping sources are written verbatim, with no on-disk index format beyond
/// that. It exists so the crate is runnable end-to-end (§6).
pub struct FileSystemIndexStore {
    base_dir: PathBuf,
    uuids: Mutex<HashMap<String, Uuid>>,
}

impl FileSystemIndexStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)
            .with_context(|| format!("failed to create the index store root at {}", base_dir.display()))?;
        Ok(Self { base_dir, uuids: Mutex::new(HashMap::new()) })
    }

    fn index_dir(&self, uuid: Uuid) -> PathBuf {
        self.base_dir.join(uuid.to_string())
    }
}

impl LocalIndexStore for FileSystemIndexStore {
    fn create(&self, name: &str, settings: &Settings, _local_node_id: NodeId) -> anyhow::Result<()> {
        let uuid = Uuid::new_v4();
        let dir = self.index_dir(uuid);
        fs::create_dir_all(dir.join("mappings"))
            .with_context(|| format!("failed to create the local directory for index `{name}`"))?;
        let serialized = serde_json::to_vec_pretty(settings)?;
        fs::write(dir.join("settings.json"), serialized)?;
        self.uuids.lock().unwrap().insert(name.to_owned(), uuid);
        Ok(())
    }

    fn delete(&self, name: &str) -> anyhow::Result<()> {
        if let Some(uuid) = self.uuids.lock().unwrap().remove(name) {
            let dir = self.index_dir(uuid);
            if dir.exists() {
                fs::remove_dir_all(dir)?;
            }
        }
        Ok(())
    }

    fn index_service(&self, name: &str) -> anyhow::Result<Box<dyn IndexService>> {
        let uuid = *self
            .uuids
            .lock()
            .unwrap()
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("index `{name}` has not been created"))?;
        Ok(Box::new(FileSystemIndexService { mappings_dir: self.index_dir(uuid).join("mappings") }))
    }
}

struct FileSystemIndexService {
    mappings_dir: PathBuf,
}

impl IndexService for FileSystemIndexService {
    fn mapper_service(&self) -> Box<dyn MapperService + '_> {
        Box::new(FileSystemMapperService { mappings_dir: &self.mappings_dir, accepted: Vec::new() })
    }
}

/// Stands in for the real mapping parser (out of scope, §1): it accepts any non-empty source
/// verbatim as its own canonical form, and rejects a blank source the same way a real parser
/// would reject unparseable input.
struct FileSystemMapperService<'a> {
    mappings_dir: &'a PathBuf,
    accepted: Vec<(String, String)>,
}

impl MapperService for FileSystemMapperService<'_> {
    fn add(&mut self, type_name: &str, source: &str) -> anyhow::Result<()> {
        let canonical = source.trim();
        if canonical.is_empty() {
            anyhow::bail!("mapping source for type `{type_name}` is empty");
        }
        fs::write(self.mappings_dir.join(format!("{type_name}.json")), canonical)?;
        self.accepted.push((type_name.to_owned(), canonical.to_owned()));
        Ok(())
    }

    fn canonical_mappings(&self) -> Vec<(String, String)> {
        self.accepted.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_materialize_then_delete_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSystemIndexStore::new(dir.path()).unwrap();

        store.create("logs", &Settings::new(), NodeId::new()).unwrap();
        let service = store.index_service("logs").unwrap();
        let mut mapper = service.mapper_service();
        mapper.add("doc", "A").unwrap();
        assert_eq!(mapper.canonical_mappings(), vec![("doc".to_string(), "A".to_string())]);

        store.delete("logs").unwrap();
        assert!(store.index_service("logs").is_err());
    }

    #[test]
    fn rejects_an_empty_mapping_source() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSystemIndexStore::new(dir.path()).unwrap();
        store.create("logs", &Settings::new(), NodeId::new()).unwrap();
        let service = store.index_service("logs").unwrap();
        let mut mapper = service.mapper_service();
        assert!(mapper.add("doc", "   ").is_err());
    }
}
