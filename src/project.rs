use crate::analyzer::metadata::DocumentationSchema;
use crate::extractor::Extractor;
use crate::options::ExtractionOptions;
use crate::parser::{ParseError, PropParser};
use rayon::prelude::*;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Directories never descended into.
const SKIPPED_DIRS: &[&str] = &["node_modules", "dist", "build", ".git", "target"];

const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx"];

pub fn find_source_files(root: &Path) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0 || !e.file_type().is_dir() || !SKIPPED_DIRS.iter().any(|d| e.file_name() == *d)
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
        })
        .collect();
    out.sort();
    out
}

/// Expand directories into the source files below them; files pass through.
pub fn expand_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for path in paths {
        if path.is_dir() {
            out.extend(find_source_files(path));
        } else {
            out.push(path.clone());
        }
    }
    out
}

/// Extraction results for a set of files, in input order.
#[derive(Debug, Default)]
pub struct Report {
    pub schemas: Vec<(PathBuf, Arc<DocumentationSchema>)>,
    pub failures: Vec<(PathBuf, ParseError)>,
}

impl Report {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.schemas.len()))?;
        for (path, schema) in &self.schemas {
            map.serialize_entry(&path.to_string_lossy(), &**schema)?;
        }
        map.end()
    }
}

/// Extract every file in parallel against the extractor's shared cache.
pub fn extract_files<P: PropParser>(
    extractor: &Extractor<P>,
    files: &[PathBuf],
    options: &ExtractionOptions,
) -> Report {
    let results: Vec<_> = files
        .par_iter()
        .map(|file| (file.clone(), extractor.extract_exclusive(file, options)))
        .collect();

    let mut report = Report::default();
    for (file, result) in results {
        match result {
            Ok(schema) => report.schemas.push((file, schema)),
            Err(err) => report.failures.push((file, err)),
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn walks_sources_and_skips_dependency_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/button")).unwrap();
        fs::create_dir_all(root.join("node_modules/lib")).unwrap();
        fs::write(root.join("src/button/index.tsx"), "").unwrap();
        fs::write(root.join("src/types.ts"), "").unwrap();
        fs::write(root.join("src/readme.md"), "").unwrap();
        fs::write(root.join("node_modules/lib/index.d.ts"), "").unwrap();

        let files = find_source_files(root);
        assert_eq!(files, vec![root.join("src/button/index.tsx"), root.join("src/types.ts")]);
    }

    #[test]
    fn expand_keeps_explicit_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Alert.tsx");
        fs::write(&file, "").unwrap();
        assert_eq!(expand_paths(&[file.clone()]), vec![file]);
    }
}
