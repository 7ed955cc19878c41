// File: src/persistence.rs
use crate::core::context::VerbContexts;
use crate::core::model::EquivalenceModel;
use crate::error::PersistenceError;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tempfile::NamedTempFile;
use tracing::{info, warn};

/// Writes `contents` to a temp file beside `path`, then renames it over
/// `path` so readers never see a partial file.
fn write_atomically<F>(path: &Path, contents: F) -> Result<(), PersistenceError>
where
    F: FnOnce(&mut BufWriter<&NamedTempFile>) -> Result<(), PersistenceError>,
{
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir).map_err(|e| PersistenceError::io(parent_dir, e))?;

    let temp_file = NamedTempFile::new_in(parent_dir).map_err(|e| PersistenceError::io(parent_dir, e))?;
    {
        let mut writer = BufWriter::new(&temp_file);
        contents(&mut writer)?;
        writer.flush().map_err(|e| PersistenceError::io(path, e))?;
    }
    temp_file
        .persist(path)
        .map_err(|e| PersistenceError::io(path, e.error))?;
    Ok(())
}

/// Saves the model as pretty-printed JSON, replacing any previous file.
pub fn save_model(model: &EquivalenceModel, path: &Path) -> Result<(), PersistenceError> {
    write_atomically(path, |writer| {
        serde_json::to_writer_pretty(writer, model)?;
        Ok(())
    })?;
    info!(path = %path.display(), equivalences = model.equivalences.len(), "DIRT model saved");
    Ok(())
}

/// Loads a model. A missing or malformed file yields `None`, never an error.
pub fn load_model(path: &Path) -> Option<EquivalenceModel> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "No DIRT model found");
            return None;
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not open DIRT model");
            return None;
        }
    };

    let model: EquivalenceModel = match serde_json::from_reader(BufReader::new(file)) {
        Ok(model) => model,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Invalid DIRT model, ignoring it");
            return None;
        }
    };
    if model.equivalence_count != model.equivalences.len() {
        warn!(
            declared = model.equivalence_count,
            actual = model.equivalences.len(),
            "DIRT model count does not match its equivalence list"
        );
    }
    Some(model)
}

/// Write-once model cache. The first successful load wins for the lifetime
/// of the cache; later calls never touch the disk again, even for a
/// different path or a rebuilt file.
#[derive(Debug, Default)]
pub struct ModelCache {
    model: OnceLock<Arc<EquivalenceModel>>,
}

impl ModelCache {
    pub const fn new() -> Self {
        Self { model: OnceLock::new() }
    }

    pub fn get(&self) -> Option<Arc<EquivalenceModel>> {
        self.model.get().cloned()
    }

    /// Returns the cached model, or tries to load `path`. Failed loads are
    /// not cached, so a model built later in the process is still picked up.
    pub fn get_or_load(&self, path: &Path) -> Option<Arc<EquivalenceModel>> {
        if let Some(model) = self.model.get() {
            return Some(Arc::clone(model));
        }
        let loaded = Arc::new(load_model(path)?);
        Some(Arc::clone(self.model.get_or_init(|| loaded)))
    }
}

static GLOBAL_CACHE: ModelCache = ModelCache::new();

/// The process-wide cache used by `DirtEngine::from_cache`.
pub fn global_cache() -> &'static ModelCache {
    &GLOBAL_CACHE
}

/// Saves aggregated contexts as a compact bincode snapshot.
pub fn save_contexts(contexts: &VerbContexts, path: &Path) -> Result<(), PersistenceError> {
    write_atomically(path, |writer| {
        bincode::serialize_into(writer, contexts)?;
        Ok(())
    })?;
    info!(path = %path.display(), verbs = contexts.len(), "Verb context snapshot saved");
    Ok(())
}

pub fn load_contexts(path: &Path) -> Result<VerbContexts, PersistenceError> {
    let file = File::open(path).map_err(|e| PersistenceError::io(path, e))?;
    let contexts = bincode::deserialize_from(BufReader::new(file))?;
    Ok(contexts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::EquivalenceRecord;
    use crate::core::types::Triple;

    fn model() -> EquivalenceModel {
        EquivalenceModel::new(vec![
            EquivalenceRecord {
                verb_a: "crear".into(),
                verb_b: "fundar".into(),
                score: 0.325,
                shared_context_count: 1,
                freq_a: 1,
                freq_b: 2,
            },
            EquivalenceRecord {
                verb_a: "ganar".into(),
                verb_b: "recibir".into(),
                score: 0.3,
                shared_context_count: 2,
                freq_a: 3,
                freq_b: 4,
            },
        ])
    }

    #[test]
    fn model_round_trips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("modelo.json");
        let original = model();
        save_model(&original, &path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"a\": \"crear\""));
        assert!(raw.contains("\"equivalence_count\": 2"));
        assert_eq!(load_model(&path), Some(original));
    }

    #[test]
    fn missing_and_malformed_models_are_absent() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_model(&dir.path().join("missing.json")), None);

        let bad = dir.path().join("bad.json");
        fs::write(&bad, r#"{"version": "1.0", "equivalences": {"a": "b"}}"#).unwrap();
        assert_eq!(load_model(&bad), None);

        let no_list = dir.path().join("no_list.json");
        fs::write(&no_list, r#"{"version": "1.0"}"#).unwrap();
        assert_eq!(load_model(&no_list), None);
    }

    #[test]
    fn cache_keeps_first_successful_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("modelo.json");
        let cache = ModelCache::new();

        assert!(cache.get_or_load(&path).is_none());
        assert!(cache.get().is_none());

        save_model(&model(), &path).unwrap();
        let first = cache.get_or_load(&path).unwrap();
        assert_eq!(first.equivalences.len(), 2);

        save_model(&EquivalenceModel::new(Vec::new()), &path).unwrap();
        let second = cache.get_or_load(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.equivalences.len(), 2);
    }

    #[test]
    fn contexts_snapshot_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contexts.bin");
        let contexts = VerbContexts::from_triples(&[
            Triple::new("científica", "fundar", Some("instituto")),
            Triple::new("investigador", "crear", None),
        ]);
        save_contexts(&contexts, &path).unwrap();
        assert_eq!(load_contexts(&path).unwrap(), contexts);
        assert!(load_contexts(&dir.path().join("missing.bin")).is_err());
    }
}
