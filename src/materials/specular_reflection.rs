// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFSample, BSDFValue, BxDF, LobeType};
use crate::core::rng::SampleGenerator;
use crate::materials::fresnel::eval_fresnel_schlick;
use crate::materials::microfacet::{eval_ndf_ggx, reflect, HalfVectorSampling, MaskingFunction};
use crate::math::constants::{Float, MIN_COS_THETA, Vector3f};
use crate::math::spectrum::RGBSpectrum;

/// GGX microfacet reflection with Schlick Fresnel tinted by `albedo`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SpecularReflectionMicrofacet {
    pub albedo: RGBSpectrum,
    pub alpha: Float,
    pub masking: MaskingFunction,
    pub sampling: HalfVectorSampling,
}

impl SpecularReflectionMicrofacet {
    pub fn new(albedo: RGBSpectrum, alpha: Float, masking: MaskingFunction, sampling: HalfVectorSampling) -> Self {
        Self { albedo, alpha, masking, sampling }
    }
}

impl BxDF for SpecularReflectionMicrofacet {
    fn eval(&self, wo: &Vector3f, wi: &Vector3f) -> BSDFValue {
        if wo.z.min(wi.z) < MIN_COS_THETA {
            return RGBSpectrum::zero();
        }

        let h = (wo + wi).normalize();
        let wo_dot_h = wo.dot(&h);

        let d = eval_ndf_ggx(self.alpha, h.z);
        let g = self.masking.eval(self.alpha, wo.z, wi.z);
        let f = eval_fresnel_schlick(self.albedo, RGBSpectrum::one(), wo_dot_h);
        f * (d * g * 0.25 / wo.z)
    }

    fn sample(&self, wo: &Vector3f, sg: &mut dyn SampleGenerator) -> Option<BSDFSample> {
        if wo.z < MIN_COS_THETA {
            return None;
        }

        let (h, pdf_h) = self.sampling.sample(self.alpha, wo, &sg.next_2d());
        let wo_dot_h = wo.dot(&h);
        if wo_dot_h <= 0.0 {
            return None;
        }

        let wi = reflect(wo, &h);
        if wi.z < MIN_COS_THETA {
            return None;
        }

        // Jacobian of the reflection operator.
        let pdf = pdf_h / (4.0 * wo_dot_h);
        let f = eval_fresnel_schlick(self.albedo, RGBSpectrum::one(), wo_dot_h);
        let weight = f * self.sampling.weight_factor(self.alpha, self.masking, wo, wi.z, &h);
        Some(BSDFSample::new(wi, pdf, weight, LobeType::SPECULAR_REFLECTION))
    }

    fn eval_pdf(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        if wo.z.min(wi.z) < MIN_COS_THETA {
            return 0.0;
        }

        let h = (wo + wi).normalize();
        let wo_dot_h = wo.dot(&h);
        self.sampling.pdf(self.alpha, wo, &h) / (4.0 * wo_dot_h)
    }
}
