// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Height maps: greyscale images sampled by UV

use crate::error::{SculptError, SculptResult};
use nalgebra::Point2;

/// Row-major luminance grid; row 0 is the top of the image
#[derive(Debug, Clone, PartialEq)]
pub struct HeightMap {
    width: u32,
    height: u32,
    luminance: Vec<f32>,
}

impl HeightMap {
    pub fn new(width: u32, height: u32, luminance: Vec<f32>) -> SculptResult<Self> {
        if width == 0 || height == 0 {
            return Err(SculptError::InvalidParameter {
                pass: "height_map".into(),
                reason: format!("image has zero size ({}x{})", width, height),
            });
        }
        let expected = width as usize * height as usize;
        if luminance.len() != expected {
            return Err(SculptError::InvalidParameter {
                pass: "height_map".into(),
                reason: format!("{} samples for a {}x{} image", luminance.len(), width, height),
            });
        }
        Ok(Self {
            width,
            height,
            luminance,
        })
    }

    /// A map with the same luminance everywhere
    pub fn uniform(width: u32, height: u32, value: f32) -> SculptResult<Self> {
        Self::new(width, height, vec![value; width as usize * height as usize])
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Luminance of a pixel, coordinates clamped to the image
    pub fn pixel(&self, x: i64, y: i64) -> f32 {
        let x = x.clamp(0, self.width as i64 - 1) as usize;
        let y = y.clamp(0, self.height as i64 - 1) as usize;
        self.luminance[y * self.width as usize + x]
    }

    /// Bilinear luminance at a UV coordinate (v = 0 is the bottom edge).
    /// Samples outside the image repeat the nearest edge pixel.
    pub fn sample(&self, uv: &Point2<f64>) -> f64 {
        // Pixel centres sit at half-integer coordinates
        let fx = uv.x * self.width as f64 - 0.5;
        let fy = (1.0 - uv.y) * self.height as f64 - 0.5;

        let x0 = fx.floor();
        let y0 = fy.floor();
        let tx = fx - x0;
        let ty = fy - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);

        let top = lerp(self.pixel(x0, y0) as f64, self.pixel(x0 + 1, y0) as f64, tx);
        let bottom = lerp(
            self.pixel(x0, y0 + 1) as f64,
            self.pixel(x0 + 1, y0 + 1) as f64,
            tx,
        );
        lerp(top, bottom, ty)
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    if a == b {
        a
    } else {
        a + (b - a) * t
    }
}
