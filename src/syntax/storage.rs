//! Where highlighter definitions live
//!
//! A [`SpecStorage`] enumerates the specs it holds (metadata only) and
//! loads or saves single specs on demand. [`FileStorage`] works on a
//! directory of `.phl` files, [`BundledStorage`] on the definitions
//! compiled into the crate and is read-only.

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, warn};

use super::builtin;
use super::loader;
use super::spec::{Meta, Spec, SpecResult};
use crate::error::{PhlError, Result};

/// Default file extension of highlighter definitions
pub const SPEC_EXTENSION: &str = "phl";

/// A place highlighter definitions are loaded from and saved to
pub trait SpecStorage {
    /// Name of the storage, for diagnostics
    fn name(&self) -> &str;

    /// Whether saving and deleting are supported
    fn read_only(&self) -> bool;

    /// Metadata of every loadable spec
    ///
    /// Specs whose header cannot be read are skipped with a warning.
    /// The caller assigns [`Meta::storage`] if it wants to save later,
    /// see [`collect_metas`].
    fn load_metas(&self) -> Vec<Meta>;

    /// Load the full spec a meta points to
    fn load_spec(&self, meta: &Meta, with_raw_data: bool) -> Result<SpecResult>;

    /// Write a spec back to the location recorded in its meta
    fn save_spec(&self, spec: &Spec) -> Result<()>;

    /// Remove the spec a meta points to
    fn delete_spec(&self, meta: &Meta) -> Result<()>;
}

/// Parse spec text and keep the identity of the meta it was found by
fn parse_with_meta(text: &str, meta: &Meta, with_raw_data: bool) -> SpecResult {
    let (mut spec, warnings) = loader::load_spec(text, with_raw_data);
    spec.meta.source = meta.source.clone();
    spec.meta.storage = meta.storage.clone();
    SpecResult {
        spec: Rc::new(spec),
        warnings,
    }
}

/// Load a spec directly from a file
pub fn load_spec_file(path: impl AsRef<Path>, with_raw_data: bool) -> Result<SpecResult> {
    let path = path.as_ref();
    let source = path.to_string_lossy().into_owned();
    let text = fs::read_to_string(path).map_err(|e| {
        warn!(file = %source, error = %e, "failed to load highlighter");
        PhlError::file(source.clone(), e)
    })?;
    let meta = Meta {
        source,
        ..Default::default()
    };
    Ok(parse_with_meta(&text, &meta, with_raw_data))
}

/// Storage over a directory of spec files
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
    extension: String,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            extension: SPEC_EXTENSION.to_string(),
        }
    }

    /// Builder: use another file extension (without the dot)
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Spec files in the directory, sorted by path
    fn spec_files(&self) -> Vec<PathBuf> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %self.dir.display(), error = %e, "highlighter directory is not readable");
                return Vec::new();
            }
        };
        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext == self.extension)
            })
            .collect();
        files.sort();
        files
    }
}

impl SpecStorage for FileStorage {
    fn name(&self) -> &str {
        "default-storage"
    }

    fn read_only(&self) -> bool {
        false
    }

    fn load_metas(&self) -> Vec<Meta> {
        let mut metas = Vec::new();
        for path in self.spec_files() {
            let text = match fs::read_to_string(&path) {
                Ok(text) => text,
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "failed to read highlighter");
                    continue;
                }
            };
            match loader::load_meta(&text) {
                (Some(mut meta), _) => {
                    meta.source = path.to_string_lossy().into_owned();
                    debug!(name = %meta.name, file = %meta.source, "found highlighter");
                    metas.push(meta);
                }
                (None, _) => warn!(file = %path.display(), "highlighter meta not loaded"),
            }
        }
        metas
    }

    fn load_spec(&self, meta: &Meta, with_raw_data: bool) -> Result<SpecResult> {
        let text = fs::read_to_string(&meta.source).map_err(|e| {
            warn!(file = %meta.source, error = %e, "failed to load highlighter");
            PhlError::file(meta.source.clone(), e)
        })?;
        Ok(parse_with_meta(&text, meta, with_raw_data))
    }

    fn save_spec(&self, spec: &Spec) -> Result<()> {
        if spec.meta.source.is_empty() {
            return Err(PhlError::Message(format!(
                "Highlighter \"{}\" has no file to save to",
                spec.meta.name
            )));
        }
        if spec.raw.is_none() {
            return Err(PhlError::Message(format!(
                "Highlighter \"{}\" was loaded without its source text",
                spec.meta.name
            )));
        }
        fs::write(&spec.meta.source, spec.storable_string())
            .map_err(|e| PhlError::file(spec.meta.source.clone(), e))?;
        debug!(name = %spec.meta.name, file = %spec.meta.source, "saved highlighter");
        Ok(())
    }

    fn delete_spec(&self, meta: &Meta) -> Result<()> {
        fs::remove_file(&meta.source).map_err(|e| PhlError::file(meta.source.clone(), e))
    }
}

/// Read-only storage over the definitions compiled into the crate
#[derive(Debug, Clone)]
pub struct BundledStorage {
    ids: Vec<String>,
}

impl BundledStorage {
    /// Storage over an explicit list of bundled resource ids
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Storage over every bundled definition
    pub fn all() -> Self {
        Self::new(builtin::ids())
    }
}

impl SpecStorage for BundledStorage {
    fn name(&self) -> &str {
        "bundled-storage"
    }

    fn read_only(&self) -> bool {
        true
    }

    fn load_metas(&self) -> Vec<Meta> {
        let mut metas = Vec::new();
        for id in &self.ids {
            let Some(text) = builtin::bundled(id) else {
                warn!(id = %id, "no bundled highlighter");
                continue;
            };
            match loader::load_meta(text) {
                (Some(mut meta), _) => {
                    meta.source = id.clone();
                    metas.push(meta);
                }
                (None, _) => warn!(id = %id, "highlighter meta not loaded"),
            }
        }
        metas
    }

    fn load_spec(&self, meta: &Meta, with_raw_data: bool) -> Result<SpecResult> {
        let text = builtin::bundled(&meta.source)
            .ok_or_else(|| PhlError::SpecNotFound(meta.source.clone()))?;
        Ok(parse_with_meta(text, meta, with_raw_data))
    }

    fn save_spec(&self, spec: &Spec) -> Result<()> {
        Err(PhlError::ReadOnly(format!(
            "{} cannot save \"{}\"",
            self.name(),
            spec.meta.name
        )))
    }

    fn delete_spec(&self, _meta: &Meta) -> Result<()> {
        Ok(())
    }
}

/// Enumerate several storages, linking each meta back to its storage
pub fn collect_metas(storages: &[Rc<dyn SpecStorage>]) -> Vec<Meta> {
    let mut metas = Vec::new();
    for storage in storages {
        for mut meta in storage.load_metas() {
            meta.storage = Some(Rc::downgrade(storage));
            metas.push(meta);
        }
    }
    metas
}

/// Load the spec a meta points to through its own storage
pub fn load_spec(meta: &Meta, with_raw_data: bool) -> Result<SpecResult> {
    let storage = meta
        .storage()
        .ok_or_else(|| PhlError::StorageGone(meta.name.clone()))?;
    storage.load_spec(meta, with_raw_data)
}

/// Save a spec to the storage it was loaded from
pub fn save_spec(spec: &Spec) -> Result<()> {
    let storage = spec
        .meta
        .storage()
        .ok_or_else(|| PhlError::StorageGone(spec.meta.name.clone()))?;
    storage.save_spec(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, file: &str, text: &str) -> PathBuf {
        let path = dir.path().join(file);
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_file_storage_load_metas() {
        let dir = TempDir::new().unwrap();
        write(&dir, "b.phl", "name: beta\nrule: r\nexpr: x\n");
        write(&dir, "a.phl", "name: alpha\ntitle: Alpha\n");
        write(&dir, "broken.phl", "title: no name\n");
        write(&dir, "notes.txt", "name: ignored\n");

        let storage = FileStorage::new(dir.path());
        let metas = storage.load_metas();
        let names: Vec<_> = metas.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta"]);
        assert_eq!(metas[0].display_title(), "Alpha");
        assert!(metas[0].source.ends_with("a.phl"));
        assert!(metas[0].storage.is_none());
    }

    #[test]
    fn test_file_storage_custom_extension() {
        let dir = TempDir::new().unwrap();
        write(&dir, "x.ohl", "name: x\n");
        write(&dir, "y.phl", "name: y\n");
        let storage = FileStorage::new(dir.path()).with_extension("ohl");
        let metas = storage.load_metas();
        assert_eq!(metas.len(), 1);
        assert_eq!(metas[0].name, "x");
    }

    #[test]
    fn test_missing_directory_yields_nothing() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("missing"));
        assert!(storage.load_metas().is_empty());
    }

    #[test]
    fn test_file_storage_load_and_save() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "t.phl",
            "name: t\nrule: r\nexpr: x\n\n---\nx sample\n",
        );
        let storage: Rc<dyn SpecStorage> = Rc::new(FileStorage::new(dir.path()));
        let metas = collect_metas(&[storage.clone()]);
        assert_eq!(metas.len(), 1);
        assert_eq!(metas[0].storage().unwrap().name(), "default-storage");

        let result = load_spec(&metas[0], true).unwrap();
        assert!(result.warnings.is_empty());
        assert_eq!(result.spec.rules.len(), 1);
        assert_eq!(result.spec.raw_sample(), "x sample");

        let mut edited = (*result.spec).clone();
        edited.set_raw_sample("new sample");
        save_spec(&edited).unwrap();
        let saved = fs::read_to_string(&path).unwrap();
        assert_eq!(saved, "name: t\nrule: r\nexpr: x\n\n---\nnew sample");
    }

    #[test]
    fn test_save_requires_raw_data() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "t.phl", "name: t\n");
        let storage = FileStorage::new(dir.path());
        let result = load_spec_file(&path, false).unwrap();
        assert!(storage.save_spec(&result.spec).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "name: t\n");
    }

    #[test]
    fn test_file_storage_delete() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "gone.phl", "name: gone\n");
        let storage = FileStorage::new(dir.path());
        let metas = storage.load_metas();
        storage.delete_spec(&metas[0]).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_load_spec_file_missing() {
        let dir = TempDir::new().unwrap();
        let err = load_spec_file(dir.path().join("nope.phl"), false).unwrap_err();
        assert!(matches!(err, PhlError::File { .. }));
    }

    #[test]
    fn test_bundled_storage_metas() {
        let storage = BundledStorage::new(["c", "unknown", "python"]);
        let metas = storage.load_metas();
        let names: Vec<_> = metas.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["c", "python"]);
        assert_eq!(metas[1].source, "python");
    }

    #[test]
    fn test_bundled_storage_is_read_only() {
        let storage: Rc<dyn SpecStorage> = Rc::new(BundledStorage::all());
        assert!(storage.read_only());
        let metas = collect_metas(&[storage.clone()]);
        let meta = metas.iter().find(|m| m.name == "rust").unwrap();
        let result = load_spec(meta, true).unwrap();
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);

        let err = save_spec(&result.spec).unwrap_err();
        assert!(matches!(err, PhlError::ReadOnly(_)));
        assert!(storage.delete_spec(meta).is_ok());
        assert_eq!(storage.load_metas().len(), builtin::ids().count());
    }

    #[test]
    fn test_every_bundled_spec_loads_cleanly() {
        for id in builtin::ids() {
            let (spec, warnings) = loader::load_spec(builtin::bundled(id).unwrap(), true);
            assert!(warnings.is_empty(), "{}: {:?}", id, warnings);
            assert!(!spec.rules.is_empty(), "{}", id);
            assert!(!spec.raw_sample().is_empty(), "{}", id);
        }
    }

    #[test]
    fn test_dropped_storage_cannot_save() {
        let metas = {
            let storage: Rc<dyn SpecStorage> = Rc::new(BundledStorage::all());
            collect_metas(&[storage])
        };
        assert!(metas[0].storage().is_none());
        assert!(matches!(load_spec(&metas[0], false), Err(PhlError::StorageGone(_))));
    }
}
