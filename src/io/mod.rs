// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - height map loading and mesh export

mod export_gltf;
mod export_obj;
mod export_stl;
mod exporter;
mod image_loader;

pub use exporter::{export, export_with_fallback, ExportFormat, ExportOptions, MaterialDesc};
pub use image_loader::load_height_map;
