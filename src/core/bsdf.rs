// Copyright @yucwang 2023

use crate::core::rng::SampleGenerator;
use crate::math::constants::{ Float, Vector3f };
use crate::math::spectrum::RGBSpectrum;

// Definitions of types used in BSDF sampling and eval
// processes
pub type BSDFValue = RGBSpectrum;

bitflags::bitflags! {
    /// Classification of a scattering event.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct LobeType: u32 {
        const DIFFUSE_REFLECTION = 0x1;
        const SPECULAR_REFLECTION = 0x2;
        const DIFFUSE_TRANSMISSION = 0x4;
        const SPECULAR_TRANSMISSION = 0x8;

        const DIFFUSE = Self::DIFFUSE_REFLECTION.bits() | Self::DIFFUSE_TRANSMISSION.bits();
        const SPECULAR = Self::SPECULAR_REFLECTION.bits() | Self::SPECULAR_TRANSMISSION.bits();
        const REFLECTION = Self::DIFFUSE_REFLECTION.bits() | Self::SPECULAR_REFLECTION.bits();
        const TRANSMISSION = Self::DIFFUSE_TRANSMISSION.bits() | Self::SPECULAR_TRANSMISSION.bits();
        const ALL = Self::REFLECTION.bits() | Self::TRANSMISSION.bits();
    }
}

/// Result of a successful BSDF sample.
///
/// `weight` is `eval(wo, wi) / pdf`, already including the foreshortening
/// cosine.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BSDFSample {
    pub wi: Vector3f,
    pub pdf: Float,
    pub weight: BSDFValue,
    pub lobe: LobeType,
}

impl BSDFSample {
    pub fn new(wi: Vector3f, pdf: Float, weight: BSDFValue, lobe: LobeType) -> Self {
        Self { wi, pdf, weight, lobe }
    }
}

/// Shared contract of every scattering lobe and of the composite model.
///
/// Directions live in the local shading frame, both pointing away from the
/// surface. `eval` returns the BSDF times `|wi.z|`.
pub trait BxDF {
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn eval(&self, wo: &Vector3f, wi: &Vector3f) -> BSDFValue;

    fn sample(&self, wo: &Vector3f, sg: &mut dyn SampleGenerator) -> Option<BSDFSample>;

    fn eval_pdf(&self, wo: &Vector3f, wi: &Vector3f) -> Float;
}

#[cfg(test)]
mod tests {
    use super::LobeType;

    #[test]
    fn test_lobe_type_groups() {
        assert!(LobeType::DIFFUSE.contains(LobeType::DIFFUSE_REFLECTION));
        assert!(LobeType::TRANSMISSION.contains(LobeType::SPECULAR_TRANSMISSION));
        assert!(!LobeType::REFLECTION.intersects(LobeType::TRANSMISSION));
        assert_eq!(LobeType::ALL.bits(), 0xF);
    }
}
