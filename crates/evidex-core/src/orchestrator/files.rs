//! The set of evidence files handed to one parse run

use crate::config::ScanConfig;
use crate::error::{EvidexError, Result};
use crate::parser::ParserRegistry;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Unique absolute file paths, iterated in sorted order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    files: BTreeSet<PathBuf>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from explicit file paths. Relative paths are resolved against the
    /// current directory; duplicates collapse.
    pub fn from_paths<I, P>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut set = Self::new();
        for path in paths {
            set.insert(path.as_ref())?;
        }
        Ok(set)
    }

    /// Collect evidence from files and directories. Directories are scanned.
    pub fn collect(sources: &[PathBuf], options: &ScanConfig) -> Result<Self> {
        let mut set = Self::new();
        for source in sources {
            if source.is_dir() {
                set.files.extend(Self::scan(source, options)?.files);
            } else if source.is_file() {
                set.insert(source)?;
            } else {
                return Err(EvidexError::InvalidInput(format!(
                    "evidence source not found: {}",
                    source.display()
                )));
            }
        }
        Ok(set)
    }

    /// Scan a directory tree for files
    pub fn scan(root: &Path, options: &ScanConfig) -> Result<Self> {
        let root = absolutize(root)?;
        let mut set = Self::new();

        let walker = WalkDir::new(&root)
            .follow_links(options.follow_symlinks)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !should_skip(e, options));

        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_file() {
                set.files.insert(entry.into_path());
            }
        }

        Ok(set)
    }

    /// Add one path, returns false if it was already present
    pub fn insert(&mut self, path: &Path) -> Result<bool> {
        Ok(self.files.insert(absolutize(path)?))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.files.iter()
    }

    pub fn to_vec(&self) -> Vec<PathBuf> {
        self.files.iter().cloned().collect()
    }

    /// How many files of this set the named parser will be invoked on
    pub fn expected_files(&self, registry: &ParserRegistry, parser: &str) -> usize {
        self.files
            .iter()
            .filter(|f| registry.parsers_for_path(f).iter().any(|p| p.name() == parser))
            .count()
    }

    /// For every registered parser, how many files of this set it will be invoked on
    pub fn expected_counts(&self, registry: &ParserRegistry) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for file in &self.files {
            for parser in registry.parsers_for_path(file) {
                *counts.entry(parser.name().to_string()).or_insert(0) += 1;
            }
        }
        counts
    }
}

impl<'a> IntoIterator for &'a FileSet {
    type Item = &'a PathBuf;
    type IntoIter = std::collections::btree_set::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(EvidexError::InvalidInput("empty file path".to_string()));
    }
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

fn should_skip(entry: &DirEntry, options: &ScanConfig) -> bool {
    let name = entry.file_name().to_string_lossy();

    if options.exclude_hidden && name.starts_with('.') {
        return true;
    }

    if entry.file_type().is_dir() && options.exclude_dirs.iter().any(|d| name == *d) {
        return true;
    }

    false
}
