// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Export tests across every supported format

use anyhow::Result;
use sculptor::geometry::Primitive;
use sculptor::io::{export, export_with_fallback, ExportFormat, ExportOptions, MaterialDesc};
use sculptor::sculpt::{AssetStore, NoiseDisplace, NoiseField, Pipeline, RecalculateNormals};
use sculptor::{Mesh, SculptError};
use std::fs;
use tempfile::TempDir;

fn rock() -> Mesh {
    Pipeline::new()
        .with_pass(NoiseDisplace::new(NoiseField::cellular(5, 2.0), 0.15))
        .with_pass(RecalculateNormals::default())
        .run(Primitive::icosphere(1.0, 1).to_mesh(), &mut AssetStore::new())
        .unwrap()
        .mesh
}

fn gold() -> ExportOptions {
    ExportOptions::with_material(MaterialDesc::new(
        "coin_gold",
        [0.831, 0.686, 0.216],
        1.0,
        0.15,
    ))
}

#[test]
fn test_obj_export_with_material() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("rock.obj");
    let mesh = rock();

    export(&mesh, &path, ExportFormat::Obj, &gold())?;

    let obj = fs::read_to_string(&path)?;
    assert!(obj.contains("mtllib rock.mtl"));
    assert!(obj.contains("usemtl coin_gold"));
    assert_eq!(obj.lines().filter(|l| l.starts_with("v ")).count(), 42);
    assert_eq!(obj.lines().filter(|l| l.starts_with("vn ")).count(), 42);
    assert_eq!(obj.lines().filter(|l| l.starts_with("f ")).count(), 80);
    // Icospheres carry no UVs
    assert!(!obj.lines().any(|l| l.starts_with("vt ")));

    let mtl = fs::read_to_string(dir.path().join("rock.mtl"))?;
    assert!(mtl.contains("newmtl coin_gold"));
    assert!(mtl.contains("Kd 0.831000 0.686000 0.216000"));
    Ok(())
}

#[test]
fn test_stl_export_reads_back() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("rock.stl");
    let mesh = rock();

    export(&mesh, &path, ExportFormat::Stl, &ExportOptions::default())?;

    let mut file = fs::File::open(&path)?;
    let indexed = stl_io::read_stl(&mut file)?;
    assert_eq!(indexed.faces.len(), 80);
    Ok(())
}

#[test]
fn test_glb_has_binary_header() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("rock.glb");

    export(&rock(), &path, ExportFormat::Glb, &gold())?;

    let bytes = fs::read(&path)?;
    assert_eq!(&bytes[0..4], b"glTF");
    assert_eq!(u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), 2);
    let declared = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
    assert_eq!(declared, bytes.len());
    assert_eq!(declared % 4, 0);
    Ok(())
}

#[test]
fn test_gltf_writes_sidecar_buffer() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("rock.gltf");

    export(&rock(), &path, ExportFormat::Gltf, &gold())?;

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
    assert_eq!(json["asset"]["version"], "2.0");
    assert_eq!(json["materials"][0]["name"], "coin_gold");
    let uri = json["buffers"][0]["uri"].as_str().unwrap();
    assert!(dir.path().join(uri).is_file());
    Ok(())
}

#[test]
fn test_fallback_after_primary_failure() -> Result<()> {
    let dir = TempDir::new()?;
    // A directory where the GLB should go makes the primary write fail
    fs::create_dir(dir.path().join("rock_0.glb"))?;

    let path = export_with_fallback(
        &rock(),
        dir.path(),
        "rock_0",
        ExportFormat::Glb,
        Some(ExportFormat::Obj),
        &ExportOptions::default(),
    )?;

    assert_eq!(path, dir.path().join("rock_0.obj"));
    assert!(path.is_file());
    Ok(())
}

#[test]
fn test_export_error_names_format_and_path() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("missing").join("rock.stl");

    let err = export(&rock(), &target, ExportFormat::Stl, &ExportOptions::default()).unwrap_err();
    match err {
        SculptError::Export { format, path, .. } => {
            assert_eq!(format, "stl");
            assert_eq!(path, target);
        }
        other => panic!("unexpected error {:?}", other),
    }
}
