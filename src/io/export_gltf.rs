// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! GLTF/GLB exporter

use super::ExportOptions;
use crate::geometry::Mesh;
use anyhow::{Context, Result};
use serde_json::json;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const GLB_MAGIC: u32 = 0x46546C67; // "glTF"
const CHUNK_JSON: u32 = 0x4E4F534A; // "JSON"
const CHUNK_BIN: u32 = 0x004E4942; // "BIN\0"

const FLOAT: u32 = 5126;
const UNSIGNED_INT: u32 = 5125;
const ARRAY_BUFFER: u32 = 34962;
const ELEMENT_ARRAY_BUFFER: u32 = 34963;

/// Export mesh to GLB (binary GLTF, single file)
pub fn export_glb(mesh: &Mesh, path: &Path, options: &ExportOptions) -> Result<()> {
    let (gltf_json_val, buffer_data) = create_gltf_json(mesh, options, None);

    let json_string = serde_json::to_string(&gltf_json_val)?;
    let mut json_offset = json_string.len();
    align_to_multiple_of_four(&mut json_offset);
    let json_padding = json_offset - json_string.len();

    let mut buffer_offset = buffer_data.len();
    align_to_multiple_of_four(&mut buffer_offset);
    let buffer_padding = buffer_offset - buffer_data.len();

    let total_length = 12 + 8 + json_offset + 8 + buffer_offset;

    let file = File::create(path)
        .with_context(|| format!("Failed to create GLB file {}", path.display()))?;
    let mut file = BufWriter::new(file);

    // GLB header
    file.write_all(&GLB_MAGIC.to_le_bytes())?;
    file.write_all(&2u32.to_le_bytes())?; // version
    file.write_all(&(total_length as u32).to_le_bytes())?;

    // JSON chunk, padded with spaces
    file.write_all(&(json_offset as u32).to_le_bytes())?;
    file.write_all(&CHUNK_JSON.to_le_bytes())?;
    file.write_all(json_string.as_bytes())?;
    file.write_all(&b"   "[..json_padding])?;

    // BIN chunk, padded with zeros
    file.write_all(&(buffer_offset as u32).to_le_bytes())?;
    file.write_all(&CHUNK_BIN.to_le_bytes())?;
    file.write_all(&buffer_data)?;
    file.write_all(&[0u8; 3][..buffer_padding])?;

    file.flush()?;
    Ok(())
}

/// Export mesh to GLTF with separate .bin file
pub fn export_gltf(mesh: &Mesh, path: &Path, options: &ExportOptions) -> Result<()> {
    let bin_path = path.with_extension("bin");
    let bin_name = bin_path
        .file_name()
        .and_then(|n| n.to_str())
        .context("GLTF path has no file name")?;
    let (gltf_json_val, buffer_data) = create_gltf_json(mesh, options, Some(bin_name));

    let json_string = serde_json::to_string_pretty(&gltf_json_val)?;
    std::fs::write(path, json_string)
        .with_context(|| format!("Failed to write GLTF file {}", path.display()))?;
    std::fs::write(&bin_path, buffer_data)
        .with_context(|| format!("Failed to write GLTF buffer {}", bin_path.display()))?;

    Ok(())
}

fn push_f32s(buffer: &mut Vec<u8>, values: &[f64]) {
    for &value in values {
        buffer.extend_from_slice(&(value as f32).to_le_bytes());
    }
}

fn create_gltf_json(
    mesh: &Mesh,
    options: &ExportOptions,
    buffer_uri: Option<&str>,
) -> (serde_json::Value, Vec<u8>) {
    let mut buffer_data = Vec::new();
    let vertex_count = mesh.vertices.len();

    // Positions
    let position_offset = buffer_data.len();
    let (min_pos, max_pos) = calculate_bounds(mesh);
    for vertex in &mesh.vertices {
        let p = vertex.position;
        push_f32s(&mut buffer_data, &[p.x, p.y, p.z]);
    }
    let position_length = buffer_data.len() - position_offset;

    // Normals
    let normal_offset = buffer_data.len();
    for vertex in &mesh.vertices {
        let n = vertex.normal;
        push_f32s(&mut buffer_data, &[n.x, n.y, n.z]);
    }
    let normal_length = buffer_data.len() - normal_offset;

    let mut attributes = json!({ "POSITION": 0, "NORMAL": 1 });
    let mut accessors = vec![
        json!({
            "bufferView": 0,
            "componentType": FLOAT,
            "count": vertex_count,
            "type": "VEC3",
            "min": min_pos,
            "max": max_pos
        }),
        json!({
            "bufferView": 1,
            "componentType": FLOAT,
            "count": vertex_count,
            "type": "VEC3"
        }),
    ];
    let mut buffer_views = vec![
        json!({
            "buffer": 0,
            "byteOffset": position_offset,
            "byteLength": position_length,
            "target": ARRAY_BUFFER
        }),
        json!({
            "buffer": 0,
            "byteOffset": normal_offset,
            "byteLength": normal_length,
            "target": ARRAY_BUFFER
        }),
    ];

    // Texture coordinates; glTF puts v = 0 at the top of the image
    if let Some(uvs) = &mesh.uvs {
        let uv_offset = buffer_data.len();
        for uv in uvs {
            push_f32s(&mut buffer_data, &[uv.x, 1.0 - uv.y]);
        }
        attributes["TEXCOORD_0"] = json!(accessors.len());
        accessors.push(json!({
            "bufferView": buffer_views.len(),
            "componentType": FLOAT,
            "count": uvs.len(),
            "type": "VEC2"
        }));
        buffer_views.push(json!({
            "buffer": 0,
            "byteOffset": uv_offset,
            "byteLength": buffer_data.len() - uv_offset,
            "target": ARRAY_BUFFER
        }));
    }

    // Indices, polygons fan-triangulated
    let indices_offset = buffer_data.len();
    let mut index_count = 0usize;
    for face in &mesh.faces {
        for triangle in face.triangles() {
            for index in triangle {
                buffer_data.extend_from_slice(&(index as u32).to_le_bytes());
            }
            index_count += 3;
        }
    }
    let indices_accessor = accessors.len();
    accessors.push(json!({
        "bufferView": buffer_views.len(),
        "componentType": UNSIGNED_INT,
        "count": index_count,
        "type": "SCALAR"
    }));
    buffer_views.push(json!({
        "buffer": 0,
        "byteOffset": indices_offset,
        "byteLength": buffer_data.len() - indices_offset,
        "target": ELEMENT_ARRAY_BUFFER
    }));

    let mut primitive = json!({
        "attributes": attributes,
        "indices": indices_accessor,
        "mode": 4
    });

    let mut buffer = json!({ "byteLength": buffer_data.len() });
    if let Some(uri) = buffer_uri {
        buffer["uri"] = json!(uri);
    }

    let mut gltf = json!({
        "asset": {
            "generator": concat!("sculptor ", env!("CARGO_PKG_VERSION")),
            "version": "2.0"
        },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "mesh": 0 }],
        "meshes": [{ "primitives": [] }],
        "accessors": accessors,
        "bufferViews": buffer_views,
        "buffers": [buffer]
    });

    if let Some(material) = &options.material {
        let [r, g, b] = material.base_color;
        gltf["materials"] = json!([{
            "name": material.name,
            "pbrMetallicRoughness": {
                "baseColorFactor": [r, g, b, 1.0],
                "metallicFactor": material.metallic,
                "roughnessFactor": material.roughness
            }
        }]);
        primitive["material"] = json!(0);
    }
    gltf["meshes"][0]["primitives"] = json!([primitive]);

    (gltf, buffer_data)
}

fn calculate_bounds(mesh: &Mesh) -> ([f32; 3], [f32; 3]) {
    let mut min = [f32::MAX, f32::MAX, f32::MAX];
    let mut max = [f32::MIN, f32::MIN, f32::MIN];

    for vertex in &mesh.vertices {
        for axis in 0..3 {
            let value = vertex.position[axis] as f32;
            min[axis] = min[axis].min(value);
            max[axis] = max[axis].max(value);
        }
    }

    (min, max)
}

fn align_to_multiple_of_four(n: &mut usize) {
    *n = (*n + 3) & !3;
}
