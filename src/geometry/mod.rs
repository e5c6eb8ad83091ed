// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - mesh representation, primitives and topology

mod bbox;
mod mesh;
pub mod mesh_utils;
mod primitives;
pub mod subdivide;

pub use bbox::BoundingBox;
pub use mesh::{Face, Mesh, Vertex};
pub use primitives::{CapFill, Primitive};
pub use subdivide::subdivide;
