use dashmap::DashSet;
use std::path::{Path, PathBuf};

/// Concurrent set of canonicalized paths already visited during a tree walk.
///
/// `absorb` (store materialization) and the symlink planner's link passes
/// both walk `node_modules/` subtrees that may contain a self-loop symlink.
/// Without a guard the walk never terminates; [`VisitedPaths::visit`] makes
/// that a one-line check at the top of the recursive step.
#[derive(Debug, Default)]
pub struct VisitedPaths(DashSet<PathBuf>);

impl VisitedPaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path` as visited. Returns `true` the first time a given
    /// canonical path is seen, `false` on every subsequent visit (i.e. a
    /// cycle or a diamond-shaped dependency graph revisiting the same node).
    ///
    /// Falls back to the path as given, uncanonicalized, if canonicalization
    /// fails (e.g. the path was already removed by a racing absorb); this
    /// keeps the guard conservative rather than panicking mid-walk.
    pub fn visit(&self, path: &Path) -> bool {
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        self.0.insert(canonical)
    }
}
