// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFSample, BSDFValue, BxDF, LobeType};
use crate::core::rng::SampleGenerator;
use crate::materials::fresnel::eval_fresnel_schlick_scalar;
use crate::math::constants::{ Float, INV_PI, MIN_COS_THETA, Vector3f };
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{ sample_cosine_hemisphere_concentric, sample_cosine_hemisphere_pdf };

fn lerp(a: Float, b: Float, t: Float) -> Float {
    a + (b - a) * t
}

/// Disney diffuse with the energy renormalization of Lagarde and
/// de Rousiers, "Moving Frostbite to PBR" (2014).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrostbiteDiffuseBRDF {
    pub albedo: RGBSpectrum,
    pub roughness: Float,
}

impl FrostbiteDiffuseBRDF {
    pub fn new(albedo: RGBSpectrum, roughness: Float) -> Self {
        Self { albedo, roughness }
    }

    fn eval_weight(&self, wo: &Vector3f, wi: &Vector3f) -> RGBSpectrum {
        let h = (wo + wi).normalize();
        let wo_dot_h = wo.dot(&h);
        let energy_bias = lerp(0.0, 0.5, self.roughness);
        let energy_factor = lerp(1.0, 1.0 / 1.51, self.roughness);
        let fd90 = energy_bias + 2.0 * wo_dot_h * wo_dot_h * self.roughness;
        let wi_scatter = eval_fresnel_schlick_scalar(1.0, fd90, wi.z);
        let wo_scatter = eval_fresnel_schlick_scalar(1.0, fd90, wo.z);
        self.albedo * (wi_scatter * wo_scatter * energy_factor)
    }
}

impl BxDF for FrostbiteDiffuseBRDF {
    fn eval(&self, wo: &Vector3f, wi: &Vector3f) -> BSDFValue {
        if wo.z.min(wi.z) < MIN_COS_THETA {
            return RGBSpectrum::zero();
        }

        self.eval_weight(wo, wi) * (INV_PI * wi.z)
    }

    fn sample(&self, wo: &Vector3f, sg: &mut dyn SampleGenerator) -> Option<BSDFSample> {
        let (wi, pdf) = sample_cosine_hemisphere_concentric(&sg.next_2d());
        if wo.z.min(wi.z) < MIN_COS_THETA {
            return None;
        }

        Some(BSDFSample::new(wi, pdf, self.eval_weight(wo, &wi), LobeType::DIFFUSE_REFLECTION))
    }

    fn eval_pdf(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        if wo.z.min(wi.z) < MIN_COS_THETA {
            return 0.0;
        }

        sample_cosine_hemisphere_pdf(wi.z)
    }
}
