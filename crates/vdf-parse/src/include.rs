//! Resolution of `#base` / `#include` directives.
//!
//! A directive names another document. An [`Includer`] turns that name into a
//! byte source plus the includer to use for directives inside it. Every
//! includer here remembers which sources are open along the current chain and
//! refuses to open one of them again.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Keys that make the parser splice in another document.
pub const INCLUDE_KEYS: [&str; 2] = ["#base", "#include"];

/// Whether `key` is an include directive.
pub fn is_include_key(key: &str) -> bool {
    INCLUDE_KEYS.contains(&key)
}

/// Turns include names into byte sources.
pub trait Includer {
    /// Resolve `name` to a source and the includer for directives inside it.
    fn resolve(&self, name: &str) -> Result<Resolved, IncludeError>;
}

/// A successfully resolved include.
pub struct Resolved {
    /// The document bytes.
    pub reader: Box<dyn Read + Send>,
    /// Identifier stamped on positions inside the included document.
    pub file: Option<Arc<str>>,
    /// Includer for directives inside the included document.
    pub includer: Box<dyn Includer>,
}

/// Why an include could not be resolved.
#[derive(Debug, Clone)]
pub enum IncludeError {
    /// Nothing readable under that name. The directive is kept as a plain value.
    NotFound {
        /// The requested name.
        name: String,
        /// The underlying failure, if there was one.
        source: Option<Arc<io::Error>>,
    },
    /// The source is already open further up the include chain.
    Cycle {
        /// The source that would have been opened again.
        path: PathBuf,
    },
}

impl IncludeError {
    fn not_found(name: &str, source: Option<io::Error>) -> Self {
        IncludeError::NotFound {
            name: name.to_string(),
            source: source.map(Arc::new),
        }
    }
}

impl fmt::Display for IncludeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncludeError::NotFound { name, .. } => write!(f, "cannot include `{}`", name),
            IncludeError::Cycle { path } => {
                write!(f, "include cycle detected at `{}`", path.display())
            }
        }
    }
}

impl PartialEq for IncludeError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (IncludeError::NotFound { name: a, .. }, IncludeError::NotFound { name: b, .. }) => {
                a == b
            }
            (IncludeError::Cycle { path: a }, IncludeError::Cycle { path: b }) => a == b,
            _ => false,
        }
    }
}

impl std::error::Error for IncludeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IncludeError::NotFound {
                source: Some(e), ..
            } => Some(e.as_ref()),
            _ => None,
        }
    }
}

/// Resolves includes as files relative to a directory.
///
/// Names are joined onto the root and canonicalized. Nested includers are
/// rooted at the directory of the file they were resolved from.
#[derive(Debug, Clone)]
pub struct FileIncluder {
    root: PathBuf,
    open: HashSet<PathBuf>,
}

impl FileIncluder {
    /// Resolve names relative to `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            open: HashSet::new(),
        }
    }

    /// Includer for directives inside `path`: rooted at its directory, with
    /// `path` itself already open.
    pub fn for_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().canonicalize()?;
        let root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(Self::new(root).excluding(path))
    }

    /// Treat `path` as already open.
    pub fn excluding(mut self, path: impl Into<PathBuf>) -> Self {
        self.open.insert(path.into());
        self
    }

    /// Directory names are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether `path` is open along the current chain.
    pub fn is_open(&self, path: &Path) -> bool {
        self.open.contains(path)
    }
}

impl Includer for FileIncluder {
    fn resolve(&self, name: &str) -> Result<Resolved, IncludeError> {
        let candidate = self.root.join(name);
        let path = candidate
            .canonicalize()
            .map_err(|e| IncludeError::not_found(name, Some(e)))?;
        if self.open.contains(&path) {
            return Err(IncludeError::Cycle { path });
        }
        if !path.is_file() {
            return Err(IncludeError::not_found(name, None));
        }
        let file = File::open(&path).map_err(|e| IncludeError::not_found(name, Some(e)))?;

        let root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());
        let mut open = self.open.clone();
        open.insert(path);

        Ok(Resolved {
            reader: Box::new(file),
            file: Some(Arc::from(candidate.display().to_string())),
            includer: Box::new(FileIncluder { root, open }),
        })
    }
}

/// Resolves includes from documents held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryIncluder {
    files: Arc<HashMap<String, String>>,
    open: HashSet<String>,
}

impl MemoryIncluder {
    /// Create an includer with no documents.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document under `name`.
    pub fn with_file(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.files).insert(name.into(), text.into());
        self
    }

    /// Treat `name` as already open.
    pub fn excluding(mut self, name: impl Into<String>) -> Self {
        self.open.insert(name.into());
        self
    }
}

impl Includer for MemoryIncluder {
    fn resolve(&self, name: &str) -> Result<Resolved, IncludeError> {
        if self.open.contains(name) {
            return Err(IncludeError::Cycle { path: name.into() });
        }
        let text = self
            .files
            .get(name)
            .ok_or_else(|| IncludeError::not_found(name, None))?;

        let mut open = self.open.clone();
        open.insert(name.to_string());

        Ok(Resolved {
            reader: Box::new(Cursor::new(text.clone().into_bytes())),
            file: Some(Arc::from(name)),
            includer: Box::new(MemoryIncluder {
                files: self.files.clone(),
                open,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    fn read_all(mut resolved: Resolved) -> String {
        let mut text = String::new();
        resolved.reader.read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn test_include_keys() {
        assert!(is_include_key("#base"));
        assert!(is_include_key("#include"));
        assert!(!is_include_key("#Include"));
        assert!(!is_include_key("include"));
    }

    #[test]
    fn test_memory_resolve() {
        let includer = MemoryIncluder::new().with_file("a.vdf", "\"a\" \"1\"");
        let resolved = includer.resolve("a.vdf").unwrap();
        assert_eq!(resolved.file.as_deref(), Some("a.vdf"));
        assert_eq!(read_all(resolved), "\"a\" \"1\"");
    }

    #[test]
    fn test_memory_not_found() {
        let err = MemoryIncluder::new().resolve("missing.vdf").err().unwrap();
        assert!(matches!(err, IncludeError::NotFound { ref name, .. } if name == "missing.vdf"));
    }

    #[test]
    fn test_memory_cycle_through_nested_includer() {
        let includer = MemoryIncluder::new()
            .with_file("a.vdf", "")
            .with_file("b.vdf", "");
        let a = includer.resolve("a.vdf").unwrap();
        let b = a.includer.resolve("b.vdf").unwrap();
        assert!(matches!(
            b.includer.resolve("a.vdf").err(),
            Some(IncludeError::Cycle { .. })
        ));
    }

    #[test]
    fn test_siblings_do_not_share_open_set() {
        let includer = MemoryIncluder::new()
            .with_file("a.vdf", "")
            .with_file("b.vdf", "");
        let _a = includer.resolve("a.vdf").unwrap();
        // Resolving a.vdf did not mark it open for the parent includer.
        assert!(includer.resolve("a.vdf").is_ok());
        assert!(includer.resolve("b.vdf").is_ok());
    }

    #[test]
    fn test_memory_excluding() {
        let includer = MemoryIncluder::new()
            .with_file("root.vdf", "")
            .excluding("root.vdf");
        assert!(matches!(
            includer.resolve("root.vdf").err(),
            Some(IncludeError::Cycle { .. })
        ));
    }

    #[test]
    fn test_file_resolve_and_cycle() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.vdf"), "\"a\" \"1\"").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/b.vdf"), "\"b\" \"2\"").unwrap();

        let includer = FileIncluder::new(dir.path());
        let b = includer.resolve("sub/b.vdf").unwrap();
        // Nested includer is rooted at sub/, so ../a.vdf is the sibling file.
        let a = b.includer.resolve("../a.vdf").unwrap();
        assert_eq!(read_all(a), "\"a\" \"1\"");

        let nested = includer.resolve("sub/b.vdf").unwrap();
        assert!(matches!(
            nested.includer.resolve("b.vdf").err(),
            Some(IncludeError::Cycle { .. })
        ));
    }

    #[test]
    fn test_file_for_file_excludes_itself() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("self.vdf");
        std::fs::write(&path, "").unwrap();
        let includer = FileIncluder::for_file(&path).unwrap();
        assert!(includer.is_open(&path.canonicalize().unwrap()));
        assert!(matches!(
            includer.resolve("self.vdf").err(),
            Some(IncludeError::Cycle { .. })
        ));
    }

    #[test]
    fn test_file_not_found_and_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("folder")).unwrap();
        let includer = FileIncluder::new(dir.path());
        assert!(matches!(
            includer.resolve("nope.vdf").err(),
            Some(IncludeError::NotFound { source: Some(_), .. })
        ));
        assert!(matches!(
            includer.resolve("folder").err(),
            Some(IncludeError::NotFound { source: None, .. })
        ));
    }
}
