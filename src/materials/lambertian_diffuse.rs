// Copyright @yucwang 2023

use crate::core::bsdf::{BSDFSample, BSDFValue, BxDF, LobeType};
use crate::core::rng::SampleGenerator;
use crate::math::constants::{ Float, INV_PI, MIN_COS_THETA, Vector3f };
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{ sample_cosine_hemisphere_concentric, sample_cosine_hemisphere_pdf };

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LambertianDiffuseBRDF {
    pub albedo: RGBSpectrum
}

impl BxDF for LambertianDiffuseBRDF {
    fn eval(&self, wo: &Vector3f, wi: &Vector3f) -> BSDFValue {
        if wo.z.min(wi.z) < MIN_COS_THETA {
            return RGBSpectrum::zero();
        }

        self.albedo * (INV_PI * wi.z)
    }

    fn sample(&self, wo: &Vector3f, sg: &mut dyn SampleGenerator) -> Option<BSDFSample> {
        let (wi, pdf) = sample_cosine_hemisphere_concentric(&sg.next_2d());
        if wo.z.min(wi.z) < MIN_COS_THETA {
            return None;
        }

        Some(BSDFSample::new(wi, pdf, self.albedo, LobeType::DIFFUSE_REFLECTION))
    }

    fn eval_pdf(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        if wo.z.min(wi.z) < MIN_COS_THETA {
            return 0.0;
        }

        sample_cosine_hemisphere_pdf(wi.z)
    }
}

impl LambertianDiffuseBRDF {
    pub fn new(albedo: RGBSpectrum) -> Self {
        Self { albedo }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::{LcgRng, SampleGenerator};
    use crate::math::warp::sample_uniform_hemisphere;

    fn assert_close(a: Float, b: Float) {
        assert!((a - b).abs() < 1e-5, "expected {} ≈ {}", a, b);
    }

    #[test]
    fn test_eval_matches_cosine_over_pi() {
        let brdf = LambertianDiffuseBRDF::new(RGBSpectrum::new(0.2, 0.5, 0.8));
        let wo = Vector3f::new(0.0, 0.6, 0.8);
        let wi = Vector3f::new(0.6, 0.0, 0.8);
        let value = brdf.eval(&wo, &wi);
        assert_close(value[1], 0.5 * 0.8 * INV_PI);
        assert_close(brdf.eval_pdf(&wo, &wi), 0.8 * INV_PI);
    }

    #[test]
    fn test_reciprocity() {
        let brdf = LambertianDiffuseBRDF::new(RGBSpectrum::new(0.2, 0.5, 0.8));
        let mut rng = LcgRng::new(37);
        for _ in 0..10000 {
            let wo = sample_uniform_hemisphere(&rng.next_2d());
            let wi = sample_uniform_hemisphere(&rng.next_2d());
            if wo.z.min(wi.z) < 1e-3 {
                continue;
            }
            let a = brdf.eval(&wo, &wi) / wi.z;
            let b = brdf.eval(&wi, &wo) / wo.z;
            for c in 0..3 {
                assert!((a[c] - b[c]).abs() <= 1e-5 * a[c].max(b[c]));
            }
        }
    }

    #[test]
    fn test_lower_hemisphere_is_zero() {
        let brdf = LambertianDiffuseBRDF::new(RGBSpectrum::one());
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        let wi = Vector3f::new(0.0, 0.6, -0.8);
        assert!(brdf.eval(&wo, &wi).is_black());
        assert_eq!(brdf.eval_pdf(&wo, &wi), 0.0);
        assert!(brdf.sample(&-wo, &mut LcgRng::new(1)).is_none());
    }

    #[test]
    fn test_sample_weight_is_albedo() {
        let albedo = RGBSpectrum::new(0.3, 0.6, 0.9);
        let brdf = LambertianDiffuseBRDF::new(albedo);
        let wo = Vector3f::new(0.3, 0.1, 0.9).normalize();
        let mut rng = LcgRng::new(5);
        for _ in 0..256 {
            if let Some(sample) = brdf.sample(&wo, &mut rng) {
                assert_eq!(sample.weight, albedo);
                assert_eq!(sample.lobe, LobeType::DIFFUSE_REFLECTION);
                assert_close(sample.pdf, brdf.eval_pdf(&wo, &sample.wi));
            }
        }
    }
}
