// Copyright @yucwang 2026

use crate::math::constants::{Float, MIN_GGX_ALPHA};
use crate::math::spectrum::RGBSpectrum;

// Specular reflectance of common dielectrics at normal incidence.
const DIELECTRIC_F0: Float = 0.04;

/// Per-point shading inputs supplied by the surrounding renderer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MaterialDescription {
    pub diffuse: RGBSpectrum,
    pub specular: RGBSpectrum,
    /// Tint applied to specular transmission.
    pub transmission: RGBSpectrum,
    pub linear_roughness: Float,
    /// Relative index of refraction, wo side over wi side.
    pub eta: Float,
    pub metallic: Float,
    pub specular_transmission: Float,
}

impl Default for MaterialDescription {
    fn default() -> Self {
        Self {
            diffuse: RGBSpectrum::splat(0.5),
            specular: RGBSpectrum::splat(DIELECTRIC_F0),
            transmission: RGBSpectrum::one(),
            linear_roughness: 0.5,
            eta: 1.0 / 1.5,
            metallic: 0.0,
            specular_transmission: 0.0,
        }
    }
}

impl MaterialDescription {
    /// Metal/roughness parameterization: metals have no diffuse term and
    /// tint their specular reflectance with the base color.
    pub fn from_metal_rough(base_color: RGBSpectrum, linear_roughness: Float, metallic: Float) -> Self {
        let metallic = metallic.max(0.0).min(1.0);
        Self {
            diffuse: base_color * (1.0 - metallic),
            specular: RGBSpectrum::lerp(RGBSpectrum::splat(DIELECTRIC_F0), base_color, metallic),
            linear_roughness,
            metallic,
            ..Default::default()
        }
    }

    /// Sets `eta` for a surface of index `ior` seen from a medium of index
    /// `outside_ior`.
    pub fn with_ior(mut self, ior: Float, outside_ior: Float) -> Self {
        self.eta = outside_ior / ior;
        self
    }

    /// GGX width remapped from linear roughness and floored.
    pub fn alpha(&self) -> Float {
        (self.linear_roughness * self.linear_roughness).max(MIN_GGX_ALPHA)
    }
}
