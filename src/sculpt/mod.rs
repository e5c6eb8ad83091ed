// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Sculpt passes and the pipeline that runs them
//!
//! A pass is a pure transformation of a [`Mesh`]: it owns no scene state and
//! sees only the mesh it is handed plus the asset store for external images.

mod assets;
mod carve;
mod displace;
mod field;
mod height_map;
pub mod manifest;
mod normals;
mod pipeline;
mod smooth;
mod solidify;
mod transform;

pub use assets::AssetStore;
pub use carve::{Axis, CarveReport, ThresholdCarve};
pub use displace::{ImageDisplace, NoiseDisplace, RadialJitter};
pub use field::{FieldSampler, NoiseField, NoiseKind};
pub use height_map::HeightMap;
pub use manifest::{Manifest, PassRecord};
pub use normals::{make_consistent, RecalculateNormals};
pub use pipeline::{Pipeline, SculptOutput};
pub use smooth::Smooth;
pub use solidify::Solidify;
pub use transform::{Scale, Subdivide};

use crate::error::SculptResult;
use crate::geometry::Mesh;
use serde::{Deserialize, Serialize};

/// A single mesh transformation step
pub trait MeshPass {
    /// Stable snake_case identifier used in manifests and errors
    fn name(&self) -> &'static str;

    fn apply(&self, mesh: &mut Mesh, assets: &mut AssetStore) -> SculptResult<PassDetail>;
}

/// Pass-specific facts worth keeping in the manifest
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PassDetail {
    #[default]
    None,
    Carve(CarveReport),
}

impl PassDetail {
    pub fn is_none(&self) -> bool {
        matches!(self, PassDetail::None)
    }
}

/// Every pass the pipeline knows about, tagged by `pass` in TOML/JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "pass", rename_all = "snake_case")]
pub enum SculptPass {
    NoiseDisplace(NoiseDisplace),
    ImageDisplace(ImageDisplace),
    ThresholdCarve(ThresholdCarve),
    Smooth(Smooth),
    Solidify(Solidify),
    RecalculateNormals(RecalculateNormals),
    Scale(Scale),
    Subdivide(Subdivide),
    RadialJitter(RadialJitter),
}

impl SculptPass {
    fn inner(&self) -> &dyn MeshPass {
        match self {
            SculptPass::NoiseDisplace(p) => p,
            SculptPass::ImageDisplace(p) => p,
            SculptPass::ThresholdCarve(p) => p,
            SculptPass::Smooth(p) => p,
            SculptPass::Solidify(p) => p,
            SculptPass::RecalculateNormals(p) => p,
            SculptPass::Scale(p) => p,
            SculptPass::Subdivide(p) => p,
            SculptPass::RadialJitter(p) => p,
        }
    }

    /// Parameters as a JSON object, without the `pass` tag
    pub fn params(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or(serde_json::Value::Null);
        if let Some(object) = value.as_object_mut() {
            object.remove("pass");
        }
        value
    }
}

impl MeshPass for SculptPass {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn apply(&self, mesh: &mut Mesh, assets: &mut AssetStore) -> SculptResult<PassDetail> {
        self.inner().apply(mesh, assets)
    }
}

macro_rules! impl_from_pass {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for SculptPass {
                fn from(pass: $variant) -> Self {
                    SculptPass::$variant(pass)
                }
            }
        )*
    };
}

impl_from_pass!(
    NoiseDisplace,
    ImageDisplace,
    ThresholdCarve,
    Smooth,
    Solidify,
    RecalculateNormals,
    Scale,
    Subdivide,
    RadialJitter,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_list_from_toml() {
        #[derive(Deserialize)]
        struct Passes {
            passes: Vec<SculptPass>,
        }

        let parsed: Passes = toml::from_str(
            r#"
            [[passes]]
            pass = "noise_displace"
            strength = 0.2
            field = { kind = "cellular", seed = 42, noise_scale = 3.0 }

            [[passes]]
            pass = "threshold_carve"
            threshold = 0.01

            [[passes]]
            pass = "smooth"
            factor = 0.5
            repeat = 3
            "#,
        )
        .unwrap();

        assert_eq!(parsed.passes.len(), 3);
        assert_eq!(parsed.passes[0].name(), "noise_displace");
        match &parsed.passes[1] {
            SculptPass::ThresholdCarve(carve) => assert_eq!(carve.axis, Axis::Z),
            other => panic!("unexpected pass {:?}", other),
        }
    }

    #[test]
    fn test_params_drop_tag() {
        let pass = SculptPass::from(Smooth::new(0.5, 3));
        let params = pass.params();
        assert!(params.get("pass").is_none());
        assert_eq!(params["repeat"], 3);
    }
}
