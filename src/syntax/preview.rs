//! Live editing of highlighter definitions
//!
//! [`SpecEditor`] keeps the source code of a definition and its sample
//! text. Applying the code parses it into a new [`Spec`] and hands the
//! new value to every subscriber, so preview highlighters switch over
//! explicitly instead of watching a spec change under them.

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};

use tracing::debug;

use super::loader;
use super::spec::{Spec, SpecWarnings};
use super::storage::{self, load_spec_file, SpecStorage};
use crate::error::{PhlError, Result};

type Subscriber = Box<dyn FnMut(&Rc<Spec>)>;

/// Editing session for one highlighter definition
pub struct SpecEditor {
    code: String,
    sample: String,
    source: Option<PathBuf>,
    /// Storage the definition came from; saves without a path go there
    storage: Option<Weak<dyn SpecStorage>>,
    spec: Rc<Spec>,
    subscribers: Vec<Subscriber>,
}

impl SpecEditor {
    /// Start with an empty definition
    pub fn new() -> Self {
        Self {
            code: String::new(),
            sample: String::new(),
            source: None,
            storage: None,
            spec: Rc::new(Spec::default()),
            subscribers: Vec::new(),
        }
    }

    /// Start from a spec that was loaded with raw data
    pub fn from_spec(spec: Rc<Spec>) -> Self {
        let mut editor = Self::new();
        editor.code = spec.raw_code().to_string();
        editor.sample = spec.raw_sample().to_string();
        editor.storage = spec.meta.storage.clone();
        if editor.storage.is_none() && !spec.meta.source.is_empty() {
            editor.source = Some(PathBuf::from(&spec.meta.source));
        }
        editor.spec = spec;
        editor
    }

    /// Load a definition file and notify subscribers
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<SpecWarnings> {
        let path = path.as_ref();
        let result = load_spec_file(path, true)?;
        self.code = result.spec.raw_code().to_string();
        self.sample = result.spec.raw_sample().to_string();
        self.source = Some(path.to_path_buf());
        self.storage = None;
        self.spec = result.spec;
        self.notify();
        Ok(result.warnings)
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn set_code(&mut self, code: impl Into<String>) {
        self.code = code.into();
    }

    pub fn sample(&self) -> &str {
        &self.sample
    }

    pub fn set_sample(&mut self, sample: impl Into<String>) {
        self.sample = sample.into();
    }

    /// File the definition was opened from or last saved to
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Spec produced by the last `open` or `apply`
    pub fn spec(&self) -> &Rc<Spec> {
        &self.spec
    }

    /// Register a callback that receives every newly applied spec
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&Rc<Spec>) + 'static,
    {
        self.subscribers.push(Box::new(callback));
    }

    /// Parse the current code into a new spec and publish it
    pub fn apply(&mut self) -> SpecWarnings {
        let (mut spec, warnings) = loader::load_spec(&self.code, true);
        spec.set_raw_sample(self.sample.clone());
        spec.meta.source = match (&self.storage, &self.source) {
            (Some(_), _) => self.spec.meta.source.clone(),
            (None, Some(path)) => path.to_string_lossy().into_owned(),
            (None, None) => String::new(),
        };
        spec.meta.storage = self.storage.clone();
        debug!(name = %spec.meta.name, warnings = warnings.len(), "applied highlighter");
        self.spec = Rc::new(spec);
        self.notify();
        warnings
    }

    /// Apply the code and write the definition with its sample
    ///
    /// Without `path` the definition goes back where it came from: its
    /// storage when it was loaded through one, its file otherwise. A
    /// read-only storage rejects the save. Saving to `path` detaches
    /// the definition from its storage.
    pub fn save(&mut self, path: Option<&Path>) -> Result<SpecWarnings> {
        match path {
            Some(path) => {
                self.source = Some(path.to_path_buf());
                self.storage = None;
            }
            None if self.storage.is_some() => {
                let warnings = self.apply();
                storage::save_spec(&self.spec)?;
                return Ok(warnings);
            }
            None => {}
        }
        let Some(target) = self.source.clone() else {
            return Err(PhlError::Message("No file selected for highlighter".into()));
        };
        let warnings = self.apply();
        fs::write(&target, self.spec.storable_string())
            .map_err(|e| PhlError::file(target.to_string_lossy(), e))?;
        Ok(warnings)
    }

    fn notify(&mut self) {
        let spec = self.spec.clone();
        for subscriber in &mut self.subscribers {
            subscriber(&spec);
        }
    }
}

impl Default for SpecEditor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::document::Document;
    use crate::syntax::storage::{collect_metas, BundledStorage, FileStorage};
    use crate::syntax::Highlighter;
    use std::cell::RefCell;
    use tempfile::TempDir;

    #[test]
    fn test_apply_publishes_new_spec() {
        let mut editor = SpecEditor::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        editor.subscribe(move |spec| sink.borrow_mut().push(spec.meta.name.clone()));

        editor.set_code("name: first\nrule: r\nexpr: x\n");
        let before = editor.spec().clone();
        assert!(editor.apply().is_empty());
        editor.set_code("name: second\n");
        editor.apply();

        assert_eq!(*seen.borrow(), vec!["first", "second"]);
        assert_eq!(editor.spec().meta.name, "second");
        // Specs handed out earlier are never changed
        assert_eq!(before.meta.name, "");
    }

    #[test]
    fn test_preview_highlighter_follows_edits() {
        let mut editor = SpecEditor::new();
        let highlighter = Rc::new(RefCell::new(Highlighter::new(editor.spec().clone())));
        let hl = highlighter.clone();
        editor.subscribe(move |spec| hl.borrow_mut().set_spec(spec.clone()));

        let mut doc = Document::from_text("abc");
        editor.set_code("name: t\nrule: b\nexpr: b\n");
        editor.apply();
        highlighter.borrow().rehighlight(&mut doc);
        let formats = doc.block(0).unwrap().formats();
        assert_eq!((formats[0].start, formats[0].end), (1, 2));
    }

    #[test]
    fn test_apply_reports_warnings() {
        let mut editor = SpecEditor::new();
        editor.set_code("name: t\nrule: r\nexpr: (\n");
        let warnings = editor.apply();
        assert_eq!(warnings.keys().copied().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn test_open_and_save() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.phl");
        fs::write(&path, "name: t\nrule: r\nexpr: x\n---\nold sample\n").unwrap();

        let mut editor = SpecEditor::new();
        let warnings = editor.open(&path).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(editor.sample(), "old sample");
        assert_eq!(editor.source(), Some(path.as_path()));

        editor.set_sample("new sample\n");
        editor.save(None).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "name: t\nrule: r\nexpr: x\n\n---\nnew sample"
        );

        let copy = dir.path().join("copy.phl");
        editor.save(Some(&copy)).unwrap();
        assert!(copy.exists());
        assert_eq!(editor.spec().meta.source, copy.to_string_lossy());
    }

    #[test]
    fn test_save_without_source_fails() {
        let mut editor = SpecEditor::new();
        editor.set_code("name: t\n");
        assert!(editor.save(None).is_err());
    }

    #[test]
    fn test_from_spec_keeps_code() {
        let (spec, _) = loader::load_spec("name: t\nrule: r\nexpr: x\n---\nsample\n", true);
        let editor = SpecEditor::from_spec(Rc::new(spec));
        assert_eq!(editor.code(), "name: t\nrule: r\nexpr: x");
        assert_eq!(editor.sample(), "sample");
        assert!(editor.source().is_none());
    }

    #[test]
    fn test_bundled_spec_save_is_rejected() {
        let bundled: Rc<dyn SpecStorage> = Rc::new(BundledStorage::all());
        let metas = collect_metas(&[bundled.clone()]);
        let meta = metas.iter().find(|m| m.name == "rust").unwrap();
        let result = storage::load_spec(meta, true).unwrap();

        let mut editor = SpecEditor::from_spec(result.spec);
        assert!(editor.source().is_none());
        editor.set_sample("changed");
        let err = editor.save(None).unwrap_err();
        assert!(matches!(err, PhlError::ReadOnly(_)));
        assert!(!Path::new(&meta.source).exists());
        assert_eq!(editor.spec().meta.source, "rust");
    }

    #[test]
    fn test_bundled_spec_saved_to_path_is_detached() {
        let dir = TempDir::new().unwrap();
        let bundled: Rc<dyn SpecStorage> = Rc::new(BundledStorage::all());
        let metas = collect_metas(&[bundled.clone()]);
        let meta = metas.iter().find(|m| m.name == "c").unwrap();
        let result = storage::load_spec(meta, true).unwrap();

        let mut editor = SpecEditor::from_spec(result.spec);
        let copy = dir.path().join("c.phl");
        editor.save(Some(&copy)).unwrap();
        assert!(fs::read_to_string(&copy).unwrap().starts_with("name: c"));
        assert!(editor.spec().meta.storage().is_none());

        editor.set_sample("int x;");
        editor.save(None).unwrap();
        assert!(fs::read_to_string(&copy).unwrap().ends_with("\n---\nint x;"));
    }

    #[test]
    fn test_file_storage_spec_saved_through_storage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.phl");
        fs::write(&path, "name: t\nrule: r\nexpr: x\n---\nold\n").unwrap();
        let files: Rc<dyn SpecStorage> = Rc::new(FileStorage::new(dir.path()));
        let metas = collect_metas(&[files.clone()]);
        let result = storage::load_spec(&metas[0], true).unwrap();

        let mut editor = SpecEditor::from_spec(result.spec);
        editor.set_sample("new");
        editor.save(None).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "name: t\nrule: r\nexpr: x\n\n---\nnew"
        );
        assert!(editor.spec().meta.storage().is_some());
    }
}
