use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use alto_core::FileId;
use parking_lot::RwLock;
use thiserror::Error;

use crate::SyntaxTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("syntax tree for document version {version} has been superseded")]
pub struct StaleTree {
    pub version: i32,
}

/// A shared handle to one immutable tree version.
///
/// Cloning is cheap. Once the owning [`TreeCache`] replaces or invalidates the
/// entry, every clone reports itself as stale and refuses to hand out the
/// tree.
#[derive(Debug, Clone)]
pub struct SyntaxSnapshot {
    tree: Arc<SyntaxTree>,
    superseded: Arc<AtomicBool>,
}

impl SyntaxSnapshot {
    /// A snapshot that is not tracked by any cache and therefore never goes stale.
    pub fn detached(tree: SyntaxTree) -> Self {
        Self {
            tree: Arc::new(tree),
            superseded: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn version(&self) -> i32 {
        self.tree.version()
    }

    pub fn is_stale(&self) -> bool {
        self.superseded.load(Ordering::Acquire)
    }

    pub fn tree(&self) -> Result<&SyntaxTree, StaleTree> {
        if self.is_stale() {
            return Err(StaleTree {
                version: self.version(),
            });
        }
        Ok(&self.tree)
    }

    fn supersede(&self) {
        self.superseded.store(true, Ordering::Release);
    }
}

/// Per-document cache of syntax trees keyed by document identity and version.
///
/// One writer (the document-sync path) replaces entries on every edit; any
/// number of analyses read snapshots concurrently.
#[derive(Debug, Default)]
pub struct TreeCache {
    entries: RwLock<HashMap<FileId, SyntaxSnapshot>>,
}

impl TreeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot for `file` if the cached tree was built from `version`.
    pub fn get(&self, file: &FileId, version: i32) -> Option<SyntaxSnapshot> {
        self.entries
            .read()
            .get(file)
            .filter(|snapshot| snapshot.version() == version && !snapshot.is_stale())
            .cloned()
    }

    /// Returns the cached snapshot for `version` or builds and caches a new one.
    pub fn get_or_insert_with(
        &self,
        file: &FileId,
        version: i32,
        build: impl FnOnce() -> SyntaxTree,
    ) -> SyntaxSnapshot {
        if let Some(snapshot) = self.get(file, version) {
            return snapshot;
        }
        self.insert(file.clone(), build())
    }

    /// Caches `tree` as the current version of `file`, superseding the previous one.
    pub fn insert(&self, file: FileId, tree: SyntaxTree) -> SyntaxSnapshot {
        let snapshot = SyntaxSnapshot::detached(tree);
        let previous = self.entries.write().insert(file.clone(), snapshot.clone());
        if let Some(previous) = previous {
            tracing::debug!(
                file = %file,
                old = previous.version(),
                new = snapshot.version(),
                "superseding cached syntax tree"
            );
            previous.supersede();
        }
        snapshot
    }

    /// Drops the cached tree for `file`; outstanding snapshots become stale.
    pub fn invalidate(&self, file: &FileId) {
        if let Some(previous) = self.entries.write().remove(file) {
            tracing::debug!(file = %file, version = previous.version(), "invalidated syntax tree");
            previous.supersede();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SyntaxKind, SyntaxTreeBuilder};
    use alto_core::TextSize;

    fn tree(text: &str, version: i32) -> SyntaxTree {
        let mut builder = SyntaxTreeBuilder::new(text, version);
        builder.start_node(SyntaxKind::CompilationUnit, TextSize::from(0), TextSize::from(0));
        builder.finish_node(TextSize::from(text.len() as u32));
        builder.finish().unwrap()
    }

    #[test]
    fn new_version_supersedes_old_snapshot() {
        let cache = TreeCache::new();
        let file = FileId::new("file:///a.al");
        let v1 = cache.insert(file.clone(), tree("a", 1));
        assert!(v1.tree().is_ok());

        let v2 = cache.get_or_insert_with(&file, 2, || tree("ab", 2));
        assert_eq!(v2.version(), 2);
        assert_eq!(v1.tree().unwrap_err(), StaleTree { version: 1 });
        assert!(cache.get(&file, 1).is_none());
    }

    #[test]
    fn same_version_is_served_from_cache() {
        let cache = TreeCache::new();
        let file = FileId::new("file:///a.al");
        cache.insert(file.clone(), tree("a", 1));
        let snapshot = cache.get_or_insert_with(&file, 1, || panic!("must not rebuild"));
        assert_eq!(snapshot.tree().unwrap().text(), "a");
    }

    #[test]
    fn invalidate_marks_outstanding_snapshots_stale() {
        let cache = TreeCache::new();
        let file = FileId::new("file:///a.al");
        let snapshot = cache.insert(file.clone(), tree("a", 7));
        cache.invalidate(&file);
        assert!(snapshot.is_stale());
        assert!(cache.get(&file, 7).is_none());
    }
}
