// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFSample, BSDFValue, BxDF, LobeType};
use crate::core::rng::SampleGenerator;
use crate::materials::fresnel::eval_fresnel_dielectric;
use crate::materials::microfacet::{eval_ndf_ggx, reflect, refract, HalfVectorSampling, MaskingFunction};
use crate::math::constants::{Float, MIN_COS_THETA, Vector3f};
use crate::math::spectrum::RGBSpectrum;

/// Rough dielectric interface (Walter et al. 2007). Reflection and
/// refraction are chosen with probability given by the dielectric Fresnel
/// term at the sampled microfacet.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SpecularReflectionTransmissionMicrofacet {
    pub transmission_albedo: RGBSpectrum,
    pub alpha: Float,
    /// Relative index of refraction, wo side over wi side.
    pub eta: Float,
    pub masking: MaskingFunction,
    pub sampling: HalfVectorSampling,
}

// Microfacet normal of a (wo, wi) pair, oriented into the upper hemisphere.
// None for a degenerate refraction configuration.
fn half_vector(wo: &Vector3f, wi: &Vector3f, eta: Float) -> Option<Vector3f> {
    if wi.z > 0.0 {
        return Some((wo + wi).normalize());
    }

    let ht = -(wo * eta + wi);
    if ht.norm_squared() <= 1e-12 {
        return None;
    }
    let h = ht.normalize();
    Some(if h.z < 0.0 { -h } else { h })
}

impl SpecularReflectionTransmissionMicrofacet {
    pub fn new(transmission_albedo: RGBSpectrum,
               alpha: Float,
               eta: Float,
               masking: MaskingFunction,
               sampling: HalfVectorSampling) -> Self {
        Self { transmission_albedo, alpha, eta, masking, sampling }
    }
}

impl BxDF for SpecularReflectionTransmissionMicrofacet {
    fn eval(&self, wo: &Vector3f, wi: &Vector3f) -> BSDFValue {
        if wo.z.min(wi.z.abs()) < MIN_COS_THETA {
            return RGBSpectrum::zero();
        }

        let h = match half_vector(wo, wi, self.eta) {
            Some(h) => h,
            None => return RGBSpectrum::zero(),
        };
        let wo_dot_h = wo.dot(&h);
        let wi_dot_h = wi.dot(&h);
        let is_reflection = wi.z > 0.0;
        if wo_dot_h <= 0.0 || (!is_reflection && wi_dot_h >= 0.0) {
            return RGBSpectrum::zero();
        }

        let d = eval_ndf_ggx(self.alpha, h.z);
        let g = self.masking.eval(self.alpha, wo.z, wi.z.abs());
        let (f, _) = eval_fresnel_dielectric(self.eta, wo_dot_h);

        if is_reflection {
            return RGBSpectrum::splat(f * d * g * 0.25 / wo.z);
        }

        // Refraction Jacobian times eta^2 radiance compression.
        let denom = self.eta * wo_dot_h + wi_dot_h;
        let value = (1.0 - f) * d * g * wi_dot_h.abs() * wo_dot_h * self.eta * self.eta / (wo.z * denom * denom);
        self.transmission_albedo * value
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

        let (f, cos_theta_t) = eval_fresnel_dielectric(self.eta, wo_dot_h);
        let is_reflection = sg.next_1d() < f;
        let wi = if is_reflection {
            reflect(wo, &h)
        } else {
            refract(wo, &h, self.eta, cos_theta_t)
        };
        if wi.z.abs() < MIN_COS_THETA || (wi.z > 0.0) != is_reflection {
            return None;
        }

        let factor = self.sampling.weight_factor(self.alpha, self.masking, wo, wi.z.abs(), &h);
        let (pdf, weight, lobe) = if is_reflection {
            let pdf = f * pdf_h / (4.0 * wo_dot_h);
            (pdf, RGBSpectrum::splat(factor), LobeType::SPECULAR_REFLECTION)
        } else {
            let wi_dot_h = wi.dot(&h);
            let denom = self.eta * wo_dot_h + wi_dot_h;
            let pdf = (1.0 - f) * pdf_h * wi_dot_h.abs() / (denom * denom);
            let weight = self.transmission_albedo * (self.eta * self.eta * factor);
            (pdf, weight, LobeType::SPECULAR_TRANSMISSION)
        };

        if !pdf.is_finite() || pdf <= 0.0 {
            return None;
        }
        Some(BSDFSample::new(wi, pdf, weight, lobe))
    }

    fn eval_pdf(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        if wo.z.min(wi.z.abs()) < MIN_COS_THETA {
            return 0.0;
        }

        let h = match half_vector(wo, wi, self.eta) {
            Some(h) => h,
            None => return 0.0,
        };
        let wo_dot_h = wo.dot(&h);
        let wi_dot_h = wi.dot(&h);
        let is_reflection = wi.z > 0.0;
        if wo_dot_h <= 0.0 || (!is_reflection && wi_dot_h >= 0.0) {
            return 0.0;
        }

        let pdf_h = self.sampling.pdf(self.alpha, wo, &h);
        let (f, _) = eval_fresnel_dielectric(self.eta, wo_dot_h);
        if is_reflection {
            return f * pdf_h / (4.0 * wo_dot_h);
        }

        let denom = self.eta * wo_dot_h + wi_dot_h;
        (1.0 - f) * pdf_h * wi_dot_h.abs() / (denom * denom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::LcgRng;

    fn glass(alpha: Float, eta: Float, sampling: HalfVectorSampling) -> SpecularReflectionTransmissionMicrofacet {
        SpecularReflectionTransmissionMicrofacet::new(RGBSpectrum::one(), alpha, eta, MaskingFunction::SmithGGXCorrelated, sampling)
    }

    #[test]
    fn test_refraction_at_normal_incidence() {
        let lobe = glass(0.1, 1.0 / 1.5, HalfVectorSampling::Ndf);
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        let wi = Vector3f::new(0.0, 0.0, -1.0);
        assert!(lobe.eval(&wo, &wi)[0] > 0.0);
        assert!(lobe.eval_pdf(&wo, &wi) > 0.0);
    }

    #[test]
    fn test_both_branches_are_sampled() {
        let wo = Vector3f::new(0.3, 0.2, 0.93).normalize();
        for sampling in [HalfVectorSampling::Ndf, HalfVectorSampling::Vndf].iter() {
            let lobe = glass(0.3, 1.0 / 1.5, *sampling);
            let mut rng = LcgRng::new(23);
            let mut reflected = 0;
            let mut transmitted = 0;
            for _ in 0..4000 {
                if let Some(s) = lobe.sample(&wo, &mut rng) {
                    if s.lobe == LobeType::SPECULAR_REFLECTION {
                        assert!(s.wi.z > 0.0);
                        reflected += 1;
                    } else {
                        assert_eq!(s.lobe, LobeType::SPECULAR_TRANSMISSION);
                        assert!(s.wi.z < 0.0);
                        transmitted += 1;
                    }
                    let pdf = lobe.eval_pdf(&wo, &s.wi);
                    assert!((s.pdf - pdf).abs() <= 1e-3 * pdf, "{} vs {}", s.pdf, pdf);
                    let expected = lobe.eval(&wo, &s.wi) / s.pdf;
                    assert!((s.weight[0] - expected[0]).abs() <= 1e-3 * expected[0].max(1e-3));
                }
            }
            assert!(reflected > 0);
            assert!(transmitted > reflected);
        }
    }

    #[test]
    fn test_total_internal_reflection_only_reflects() {
        // Grazing view from inside glass: most microfacets are past the
        // critical angle.
        let lobe = glass(0.01, 1.5, HalfVectorSampling::Ndf);
        let wo = Vector3f::new(0.9, 0.0, 0.43588989).normalize();
        let mut rng = LcgRng::new(29);
        for _ in 0..500 {
            if let Some(s) = lobe.sample(&wo, &mut rng) {
                assert_eq!(s.lobe, LobeType::SPECULAR_REFLECTION);
            }
        }
    }

    #[test]
    fn test_index_matched_interface_transmits_straight() {
        let lobe = glass(0.01, 1.0, HalfVectorSampling::Ndf);
        let wo = Vector3f::new(0.0, 0.6, 0.8);
        assert!(lobe.eval(&wo, &-wo).is_black());
        assert_eq!(lobe.eval_pdf(&wo, &-wo), 0.0);
    }
}
