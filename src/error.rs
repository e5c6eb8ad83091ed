// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error taxonomy shared by sculpt passes, the pipeline and exporters

use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by the sculpting core and its collaborators
#[derive(Debug, Error)]
pub enum SculptError {
    /// A required external resource (height map) does not exist
    #[error("asset missing: {}", path.display())]
    AssetMissing { path: PathBuf },

    /// A pass left fewer vertices than the pipeline accepts
    #[error(
        "pass `{pass}` left {remaining_vertices} vertices (minimum {min_vertices})"
    )]
    EmptyMeshResult {
        pass: String,
        remaining_vertices: usize,
        min_vertices: usize,
    },

    /// The exporter rejected the mesh or failed to write the file
    #[error("{format} export to {} failed: {reason}", path.display())]
    Export {
        format: String,
        path: PathBuf,
        reason: String,
    },

    #[error("failed to decode image {}: {reason}", path.display())]
    ImageDecode { path: PathBuf, reason: String },

    #[error("pass `{pass}` requires UV coordinates but the mesh has none")]
    MissingUvs { pass: String },

    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    #[error("invalid parameter for `{pass}`: {reason}")]
    InvalidParameter { pass: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SculptError {
    /// Short machine-friendly name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            SculptError::AssetMissing { .. } => "asset_missing",
            SculptError::EmptyMeshResult { .. } => "empty_mesh_result",
            SculptError::Export { .. } => "export_error",
            SculptError::ImageDecode { .. } => "image_decode",
            SculptError::MissingUvs { .. } => "missing_uvs",
            SculptError::InvalidMesh(_) => "invalid_mesh",
            SculptError::InvalidParameter { .. } => "invalid_parameter",
            SculptError::Io(_) => "io",
        }
    }

    /// Whether the batch runner should treat this as an empty asset rather than a failure
    pub fn is_empty_result(&self) -> bool {
        matches!(self, SculptError::EmptyMeshResult { .. })
    }
}

pub type SculptResult<T> = std::result::Result<T, SculptError>;
