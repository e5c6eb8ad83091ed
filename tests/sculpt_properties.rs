// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Behavioural tests for the sculpt passes and the pipeline

use anyhow::Result;
use approx::assert_relative_eq;
use sculptor::geometry::mesh_utils::{is_closed, is_manifold};
use sculptor::geometry::Primitive;
use sculptor::sculpt::{
    AssetStore, Axis, HeightMap, ImageDisplace, MeshPass, NoiseDisplace, NoiseField,
    PassDetail, Pipeline, RecalculateNormals, Smooth, Solidify, ThresholdCarve,
};
use sculptor::SculptError;

fn asteroid_pipeline() -> Pipeline {
    Pipeline::new()
        .with_pass(NoiseDisplace::new(NoiseField::cellular(42, 3.0), 0.2))
        .with_pass(RecalculateNormals::default())
}

#[test]
fn test_noise_displacement_is_reproducible() -> Result<()> {
    let base = Primitive::icosphere(1.0, 1).to_mesh();

    let a = asteroid_pipeline().run(base.clone(), &mut AssetStore::new())?;
    let b = asteroid_pipeline().run(base, &mut AssetStore::new())?;

    assert_eq!(a.mesh, b.mesh);
    assert_eq!(a.manifest.fingerprint, b.manifest.fingerprint);

    Ok(())
}

#[test]
fn test_cellular_displacement_golden_positions() -> Result<()> {
    let mut mesh = Primitive::icosphere(1.0, 1).to_mesh();
    NoiseDisplace::new(NoiseField::cellular(42, 3.0), 0.2).apply(&mut mesh, &mut AssetStore::new())?;

    // Icosahedron corners, clear of Worley cell boundaries at this scale
    let golden = [
        (0, [-0.5742421668484101, 0.9291433437341158, 0.0]),
        (3, [0.5501346119068438, -0.890136500453006, 0.0]),
        (7, [0.0, 0.5820101924176126, -0.9417122731305637]),
        (9, [0.8331726469140743, 0.0, 0.5149290142896131]),
    ];
    for (index, [x, y, z]) in golden {
        let p = mesh.vertices[index].position;
        assert_relative_eq!(p.x, x, epsilon = 1e-9);
        assert_relative_eq!(p.y, y, epsilon = 1e-9);
        assert_relative_eq!(p.z, z, epsilon = 1e-9);
    }
    Ok(())
}

#[test]
fn test_noise_displacement_follows_normals() -> Result<()> {
    let base = Primitive::icosphere(1.0, 1).to_mesh();
    let mut mesh = base.clone();
    NoiseDisplace::new(NoiseField::cellular(42, 3.0), 0.2).apply(&mut mesh, &mut AssetStore::new())?;

    assert_eq!(mesh.vertex_count(), base.vertex_count());
    assert_eq!(mesh.faces, base.faces);

    assert_eq!(base.vertex_count(), 42);
    let mut moved = 0;
    for (before, after) in base.vertices.iter().zip(&mesh.vertices) {
        let delta = after.position - before.position;
        assert!(delta.norm() <= 0.2 + 1e-9, "displacement {} exceeds strength", delta.norm());
        assert!(delta.cross(&before.normal).norm() < 1e-9, "displacement left the normal");
        if delta.norm() > 1e-6 {
            moved += 1;
        }
    }
    assert!(moved > base.vertex_count() / 2);

    Ok(())
}

#[test]
fn test_different_seeds_give_different_meshes() -> Result<()> {
    let base = Primitive::icosphere(1.0, 2).to_mesh();
    let a = Pipeline::new()
        .with_pass(NoiseDisplace::new(NoiseField::clouds(1, 2.0), 0.2))
        .run(base.clone(), &mut AssetStore::new())?;
    let b = Pipeline::new()
        .with_pass(NoiseDisplace::new(NoiseField::clouds(2, 2.0), 0.2))
        .run(base, &mut AssetStore::new())?;

    assert_ne!(a.manifest.fingerprint, b.manifest.fingerprint);
    Ok(())
}

fn black_store() -> AssetStore {
    let mut assets = AssetStore::new();
    assets.insert_height_map("black.png", HeightMap::uniform(8, 8, 0.0).unwrap());
    assets
}

#[test]
fn test_black_map_sinks_grid_uniformly() -> Result<()> {
    let grid = Primitive::plane(2.0, 10, 10).to_mesh();
    assert_eq!(grid.vertex_count(), 121);

    let output = Pipeline::new()
        .with_pass(ImageDisplace::new("black.png", 0.5, 0.1))
        .run(grid, &mut black_store())?;

    for vertex in &output.mesh.vertices {
        assert_relative_eq!(vertex.position.z, -0.05, epsilon = 1e-12);
    }
    Ok(())
}

#[test]
fn test_carving_everything_is_an_empty_result() {
    let grid = Primitive::plane(2.0, 10, 10).to_mesh();
    assert_eq!(grid.vertex_count(), 121);
    let result = Pipeline::new()
        .with_pass(ImageDisplace::new("black.png", 0.5, 0.1))
        .with_pass(ThresholdCarve::new(Axis::Z, -0.04))
        .with_pass(RecalculateNormals::default())
        .run(grid, &mut black_store());

    match result {
        Err(SculptError::EmptyMeshResult {
            pass,
            remaining_vertices,
            ..
        }) => {
            assert_eq!(pass, "threshold_carve");
            assert_eq!(remaining_vertices, 0);
        }
        other => panic!("expected EmptyMeshResult, got {:?}", other.map(|o| o.manifest)),
    }
}

#[test]
fn test_full_carve_report_counts_every_vertex() -> Result<()> {
    let mut mesh = Pipeline::new()
        .with_pass(ImageDisplace::new("black.png", 0.5, 0.1))
        .run(Primitive::plane(2.0, 10, 10).to_mesh(), &mut black_store())?
        .mesh;

    let report = ThresholdCarve::new(Axis::Z, -0.04).carve(&mut mesh);
    assert_eq!(report.marked, 121);
    assert_eq!(report.remaining_vertices, 0);
    assert_eq!(report.remaining_faces, 0);
    assert!(report.is_empty_result());
    assert!(mesh.is_empty());
    Ok(())
}

#[test]
fn test_carve_keeps_raised_half() -> Result<()> {
    let mut grid = Primitive::plane(2.0, 8, 8).to_mesh();
    for vertex in &mut grid.vertices {
        if vertex.position.x > 0.0 {
            vertex.position.z = 0.1;
        }
    }

    let output = Pipeline::new()
        .with_pass(ThresholdCarve::new(Axis::Z, 0.05))
        .run(grid, &mut AssetStore::new())?;

    // Columns x = 0.25..1.0 survive: 4 columns of 9 vertices, 3 columns of 8 quads
    assert_eq!(output.mesh.vertex_count(), 36);
    assert_eq!(output.mesh.face_count(), 24);
    match output.manifest.passes[0].detail {
        PassDetail::Carve(report) => assert_eq!(report.marked, 45),
        PassDetail::None => panic!("carve pass recorded no report"),
    }
    Ok(())
}

#[test]
fn test_smooth_preserves_topology_and_shrinks_noise() -> Result<()> {
    let base = Primitive::icosphere(1.0, 2).to_mesh();
    let rough = Pipeline::new()
        .with_pass(NoiseDisplace::new(NoiseField::clouds(9, 4.0), 0.2))
        .run(base, &mut AssetStore::new())?
        .mesh;

    let smooth = Pipeline::new()
        .with_pass(Smooth::new(0.5, 5))
        .run(rough.clone(), &mut AssetStore::new())?
        .mesh;

    assert_eq!(smooth.faces, rough.faces);
    let spread = |m: &sculptor::Mesh| {
        let radii: Vec<f64> = m.vertices.iter().map(|v| v.position.coords.norm()).collect();
        let mean = radii.iter().sum::<f64>() / radii.len() as f64;
        radii.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / radii.len() as f64
    };
    assert!(spread(&smooth) < spread(&rough));
    Ok(())
}

#[test]
fn test_solidified_plane_is_closed_shell() -> Result<()> {
    let output = Pipeline::new()
        .with_pass(Solidify::new(0.05, 0.0))
        .run(Primitive::plane(2.0, 4, 4).to_mesh(), &mut AssetStore::new())?;

    let mesh = &output.mesh;
    assert_eq!(mesh.vertex_count(), 50);
    assert!(is_manifold(mesh));
    assert!(is_closed(mesh));
    assert_relative_eq!(mesh.signed_volume().abs(), 4.0 * 0.05, epsilon = 1e-9);
    Ok(())
}

#[test]
fn test_cylinder_base_counts() {
    let mesh = Primitive::cylinder(1.0, 0.1, 64).to_mesh();
    assert_eq!(mesh.vertex_count(), 130);
    assert_eq!(mesh.face_count(), 256);
    assert!(is_closed(&mesh));
}

#[test]
fn test_pipeline_from_toml() -> Result<()> {
    let pipeline: Pipeline = toml::from_str(
        r#"
        min_vertices = 4

        [[passes]]
        pass = "noise_displace"
        strength = 0.1
        [passes.field]
        kind = "clouds"
        seed = 3
        noise_scale = 2.0

        [[passes]]
        pass = "smooth"
        factor = 0.5
        repeat = 2

        [[passes]]
        pass = "recalculate_normals"
        "#,
    )?;

    assert_eq!(pipeline.len(), 3);
    let output = pipeline.run(Primitive::icosphere(1.0, 1).to_mesh(), &mut AssetStore::new())?;
    let names: Vec<&str> = output.manifest.passes.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["noise_displace", "smooth", "recalculate_normals"]);
    assert_eq!(output.manifest.passes[0].params["strength"], 0.1);
    Ok(())
}
