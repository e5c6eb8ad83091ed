// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Height map loading

use crate::error::{SculptError, SculptResult};
use crate::sculpt::HeightMap;
use std::path::Path;
use tracing::debug;

/// Decode an image file into a luminance height map in `[0, 1]`
pub fn load_height_map(path: &Path) -> SculptResult<HeightMap> {
    if !path.is_file() {
        return Err(SculptError::AssetMissing {
            path: path.to_path_buf(),
        });
    }

    let image = image::open(path).map_err(|e| SculptError::ImageDecode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let luma = image.to_luma32f();
    let (width, height) = luma.dimensions();
    debug!(path = %path.display(), width, height, "decoded height map");

    HeightMap::new(width, height, luma.into_raw()).map_err(|e| SculptError::ImageDecode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
