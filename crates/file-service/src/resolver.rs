//! Resolution of remote-supplied logical paths against local search roots.
//!
//! A logical path arrives as untrusted wire bytes. Resolution decodes it,
//! consults the exact-match override table, translates the protocol
//! separator, normalizes the result, and then walks the ordered search
//! roots until an existing regular file is found. Successful resolutions
//! are tallied per resolved path.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

use buslink_protocol::FilePath;

use crate::error::ServiceError;

/// Resolves logical paths to local files.
pub struct PathResolver {
    search_roots: Vec<PathBuf>,
    path_map: HashMap<String, PathBuf>,
    hit_counters: Mutex<HashMap<PathBuf, u64>>,
}

impl PathResolver {
    /// Creates a resolver over the given search roots and override table.
    ///
    /// Root order is significant: the first root yielding an existing
    /// regular file wins. An override-table hit short-circuits the roots
    /// entirely.
    pub fn new(search_roots: Vec<PathBuf>, path_map: HashMap<String, PathBuf>) -> Self {
        Self {
            search_roots,
            path_map,
            hit_counters: Mutex::new(HashMap::new()),
        }
    }

    /// Resolves a wire path to a local file.
    ///
    /// On success the hit counter for the resolved path is incremented,
    /// unless the path came from the override table (overrides are trusted
    /// as-is, with no existence check and no tally).
    pub fn resolve(&self, path: &FilePath) -> Result<PathBuf, ServiceError> {
        let decoded = path
            .decode()
            .map_err(|e| ServiceError::InvalidPath(e.to_string()))?;

        if let Some(mapped) = self.path_map.get(decoded) {
            return Ok(mapped.clone());
        }

        let translated: String = decoded
            .chars()
            .map(|c| {
                if c == FilePath::SEPARATOR as char {
                    std::path::MAIN_SEPARATOR
                } else {
                    c
                }
            })
            .collect();
        let rel = normalize_relative(&translated)?;

        let resolved = self.search(&rel).ok_or(ServiceError::NotFound)?;

        let mut counters = self.hit_counters.lock().unwrap();
        *counters.entry(resolved.clone()).or_insert(0) += 1;

        Ok(resolved)
    }

    /// Snapshot of the per-path hit counters.
    pub fn hit_counters(&self) -> HashMap<PathBuf, u64> {
        self.hit_counters.lock().unwrap().clone()
    }

    fn search(&self, rel: &Path) -> Option<PathBuf> {
        for root in &self.search_roots {
            let root = std::path::absolute(root).unwrap_or_else(|_| root.clone());
            // A root that already names the file itself matches without
            // appending the relative path again. Lets callers put fully
            // qualified file paths into the root list.
            if ends_with_path(&root, rel) && root.is_file() {
                return Some(root);
            }
            let joined = root.join(rel);
            if joined.is_file() {
                return Some(joined);
            }
        }
        None
    }
}

/// Lexically normalizes a separator-translated relative path.
///
/// Drops `.` components, collapses `..` against prior components, and
/// case-folds on case-insensitive hosts. Paths that are absolute, carry a
/// prefix component, or climb above their origin are rejected outright.
fn normalize_relative(rel: &str) -> Result<PathBuf, ServiceError> {
    let rel = fold_case(rel);
    let path = Path::new(&rel);

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::Normal(c) => out.push(c),
            Component::ParentDir => {
                if !out.pop() {
                    return Err(ServiceError::InvalidPath(format!(
                        "path climbs above its origin: {rel}"
                    )));
                }
            }
            Component::RootDir => {
                return Err(ServiceError::InvalidPath(format!(
                    "absolute path not allowed: {rel}"
                )));
            }
            Component::Prefix(_) => {
                return Err(ServiceError::InvalidPath(format!(
                    "path prefix not allowed: {rel}"
                )));
            }
        }
    }

    if out.as_os_str().is_empty() {
        return Err(ServiceError::InvalidPath("empty path".into()));
    }
    Ok(out)
}

/// Text-level suffix check between an absolute root and a relative path.
fn ends_with_path(root: &Path, rel: &Path) -> bool {
    let root = fold_case(&root.to_string_lossy());
    root.ends_with(&*rel.to_string_lossy())
}

#[cfg(windows)]
fn fold_case(s: &str) -> String {
    s.to_lowercase()
}

#[cfg(not(windows))]
fn fold_case(s: &str) -> String {
    s.to_string()
}
