// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! External resources a sculpting run depends on

use super::HeightMap;
use crate::error::SculptResult;
use crate::io;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Cache of height maps keyed by the path the pass names.
///
/// Maps can be registered up front (tests, embedded assets); anything else is
/// loaded from disk the first time a pass asks for it.
#[derive(Debug, Default)]
pub struct AssetStore {
    height_maps: HashMap<PathBuf, HeightMap>,
    search_root: Option<PathBuf>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative image paths against `root`
    pub fn with_search_root(root: impl Into<PathBuf>) -> Self {
        Self {
            height_maps: HashMap::new(),
            search_root: Some(root.into()),
        }
    }

    pub fn insert_height_map(&mut self, path: impl Into<PathBuf>, map: HeightMap) {
        self.height_maps.insert(path.into(), map);
    }

    /// Return the cached map or load it; a missing file yields `AssetMissing`
    pub fn height_map(&mut self, path: &Path) -> SculptResult<&HeightMap> {
        if !self.height_maps.contains_key(path) {
            let resolved = match &self.search_root {
                Some(root) if path.is_relative() => root.join(path),
                _ => path.to_path_buf(),
            };
            debug!(path = %resolved.display(), "loading height map");
            let map = io::load_height_map(&resolved)?;
            self.height_maps.insert(path.to_path_buf(), map);
        }
        Ok(&self.height_maps[path])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SculptError;

    #[test]
    fn test_registered_map_is_returned() {
        let mut store = AssetStore::new();
        store.insert_height_map("logo.png", HeightMap::uniform(2, 2, 0.5).unwrap());
        let map = store.height_map(Path::new("logo.png")).unwrap();
        assert_eq!(map.width(), 2);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let mut store = AssetStore::with_search_root("/nonexistent-root");
        match store.height_map(Path::new("missing.png")) {
            Err(SculptError::AssetMissing { path }) => {
                assert_eq!(path, PathBuf::from("/nonexistent-root/missing.png"));
            }
            other => panic!("expected AssetMissing, got {:?}", other.map(|_| ())),
        }
    }
}
