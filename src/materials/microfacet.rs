// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector2f, Vector3f, PI};

/// Smith masking-shadowing formulation used by the specular lobes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MaskingFunction {
    SmithGGXSeparable,
    SmithGGXCorrelated,
}

/// Half-vector sampling strategy used by the specular lobes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HalfVectorSampling {
    /// Sample the full normal distribution `D(h) cos(theta_h)`.
    Ndf,
    /// Sample the distribution of normals visible from `wo`.
    Vndf,
}

impl MaskingFunction {
    pub fn eval(&self, alpha: Float, cos_theta_o: Float, cos_theta_i: Float) -> Float {
        match self {
            MaskingFunction::SmithGGXSeparable => eval_masking_smith_ggx_separable(alpha, cos_theta_o, cos_theta_i),
            MaskingFunction::SmithGGXCorrelated => eval_masking_smith_ggx_correlated(alpha, cos_theta_o, cos_theta_i),
        }
    }
}

impl HalfVectorSampling {
    /// Draws a half vector around +z and returns it with its density.
    pub fn sample(&self, alpha: Float, wo: &Vector3f, u: &Vector2f) -> (Vector3f, Float) {
        match self {
            HalfVectorSampling::Ndf => sample_ggx_ndf(alpha, u),
            HalfVectorSampling::Vndf => sample_ggx_vndf(alpha, wo, u),
        }
    }

    pub fn pdf(&self, alpha: Float, wo: &Vector3f, h: &Vector3f) -> Float {
        match self {
            HalfVectorSampling::Ndf => eval_pdf_ggx_ndf(alpha, h.z),
            HalfVectorSampling::Vndf => eval_pdf_ggx_vndf(alpha, wo, h),
        }
    }

    /// `eval / pdf` of a microfacet lobe with the Fresnel term and the
    /// reflection/refraction Jacobian cancelled out.
    pub fn weight_factor(&self, alpha: Float, masking: MaskingFunction, wo: &Vector3f, wi_z: Float, h: &Vector3f) -> Float {
        let g = masking.eval(alpha, wo.z, wi_z);
        match self {
            HalfVectorSampling::Ndf => g * wo.dot(h) / (wo.z * h.z),
            // G / G1(wo) = G * (1 + Lambda(wo)) for both Smith variants.
            HalfVectorSampling::Vndf => g * (1.0 + eval_lambda_ggx(alpha * alpha, wo.z)),
        }
    }
}

/// GGX normal distribution `D(h)` for `cos_theta = h.z`.
pub fn eval_ndf_ggx(alpha: Float, cos_theta: Float) -> Float {
    if cos_theta <= 0.0 {
        return 0.0;
    }
    let a2 = alpha * alpha;
    let d = (cos_theta * a2 - cos_theta) * cos_theta + 1.0;
    a2 / (d * d * PI)
}

/// Density of `sample_ggx_ndf`, `D(h) h.z`.
pub fn eval_pdf_ggx_ndf(alpha: Float, cos_theta: Float) -> Float {
    eval_ndf_ggx(alpha, cos_theta) * cos_theta
}

pub fn sample_ggx_ndf(alpha: Float, u: &Vector2f) -> (Vector3f, Float) {
    let alpha_sqr = alpha * alpha;
    let phi = u.y * (2.0 * PI);
    let tan_theta_sqr = alpha_sqr * u.x / (1.0 - u.x);
    let cos_theta = 1.0 / (1.0 + tan_theta_sqr).sqrt();
    let r = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

    let h = Vector3f::new(phi.cos() * r, phi.sin() * r, cos_theta);
    (h, eval_pdf_ggx_ndf(alpha, cos_theta))
}

/// Density of visible normals, `G1(wo) D(h) max(0, wo.h) / wo.z`.
pub fn eval_pdf_ggx_vndf(alpha: Float, wo: &Vector3f, h: &Vector3f) -> Float {
    if wo.z <= 0.0 {
        return 0.0;
    }
    let g1 = eval_g1_ggx(alpha * alpha, wo.z);
    let d = eval_ndf_ggx(alpha, h.z);
    g1 * d * wo.dot(h).max(0.0) / wo.z
}

// Heitz 2018, "Sampling the GGX Distribution of Visible Normals".
pub fn sample_ggx_vndf(alpha: Float, wo: &Vector3f, u: &Vector2f) -> (Vector3f, Float) {
    // Stretch the view vector to the hemisphere configuration.
    let vh = Vector3f::new(alpha * wo.x, alpha * wo.y, wo.z).normalize();

    let t1 = if vh.z < 0.9999 {
        Vector3f::new(0.0, 0.0, 1.0).cross(&vh).normalize()
    } else {
        Vector3f::new(1.0, 0.0, 0.0)
    };
    let t2 = vh.cross(&t1);

    // Projected area of the hemisphere.
    let r = u.x.sqrt();
    let phi = 2.0 * PI * u.y;
    let t1p = r * phi.cos();
    let mut t2p = r * phi.sin();
    let s = 0.5 * (1.0 + vh.z);
    t2p = (1.0 - s) * (1.0 - t1p * t1p).max(0.0).sqrt() + s * t2p;

    let nh = t1 * t1p + t2 * t2p + vh * (1.0 - t1p * t1p - t2p * t2p).max(0.0).sqrt();
    let h = Vector3f::new(alpha * nh.x, alpha * nh.y, nh.z.max(0.0)).normalize();
    let pdf = eval_pdf_ggx_vndf(alpha, wo, &h);
    (h, pdf)
}

pub fn eval_g1_ggx(alpha_sqr: Float, cos_theta: Float) -> Float {
    if cos_theta <= 0.0 {
        return 0.0;
    }
    let cos_theta_sqr = cos_theta * cos_theta;
    let tan_theta_sqr = (1.0 - cos_theta_sqr).max(0.0) / cos_theta_sqr;
    2.0 / (1.0 + (1.0 + alpha_sqr * tan_theta_sqr).sqrt())
}

pub fn eval_lambda_ggx(alpha_sqr: Float, cos_theta: Float) -> Float {
    if cos_theta <= 0.0 {
        return 0.0;
    }
    let cos_theta_sqr = cos_theta * cos_theta;
    let tan_theta_sqr = (1.0 - cos_theta_sqr).max(0.0) / cos_theta_sqr;
    0.5 * (-1.0 + (1.0 + alpha_sqr * tan_theta_sqr).sqrt())
}

pub fn eval_masking_smith_ggx_separable(alpha: Float, cos_theta_o: Float, cos_theta_i: Float) -> Float {
    let alpha_sqr = alpha * alpha;
    let lambda_o = eval_lambda_ggx(alpha_sqr, cos_theta_o);
    let lambda_i = eval_lambda_ggx(alpha_sqr, cos_theta_i);
    1.0 / ((1.0 + lambda_o) * (1.0 + lambda_i))
}

pub fn eval_masking_smith_ggx_correlated(alpha: Float, cos_theta_o: Float, cos_theta_i: Float) -> Float {
    let alpha_sqr = alpha * alpha;
    let lambda_o = eval_lambda_ggx(alpha_sqr, cos_theta_o);
    let lambda_i = eval_lambda_ggx(alpha_sqr, cos_theta_i);
    1.0 / (1.0 + lambda_o + lambda_i)
}

pub fn reflect(wo: &Vector3f, h: &Vector3f) -> Vector3f {
    2.0 * wo.dot(h) * h - wo
}

/// Refracts `wo` through the microfacet `h`, given the transmitted cosine
/// returned by `eval_fresnel_dielectric`.
pub fn refract(wo: &Vector3f, h: &Vector3f, eta: Float, cos_theta_t: Float) -> Vector3f {
    (eta * wo.dot(h) - cos_theta_t) * h - eta * wo
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::{LcgRng, SampleGenerator};
    use crate::math::warp::{sample_uniform_hemisphere, sample_uniform_hemisphere_pdf};

    fn assert_close(a: Float, b: Float, tol: Float) {
        assert!((a - b).abs() <= tol, "expected {} ≈ {}", a, b);
    }

    // Integral of D(h) h.z over the hemisphere is one.
    #[test]
    fn test_ndf_projected_area_is_one() {
        for alpha in [0.3, 0.8].iter() {
            let mut rng = LcgRng::new(3);
            let n = 200000;
            let mut sum = 0.0;
            for _ in 0..n {
                let h = sample_uniform_hemisphere(&rng.next_2d());
                sum += eval_ndf_ggx(*alpha, h.z) * h.z / sample_uniform_hemisphere_pdf();
            }
            assert_close(sum / n as Float, 1.0, 0.05);
        }
    }

    #[test]
    fn test_g1_and_lambda_agree() {
        let alpha_sqr = 0.09;
        for cos_theta in [0.05, 0.3, 0.7, 1.0].iter() {
            let g1 = eval_g1_ggx(alpha_sqr, *cos_theta);
            let lambda = eval_lambda_ggx(alpha_sqr, *cos_theta);
            assert_close(g1, 1.0 / (1.0 + lambda), 1e-5);
        }
        assert_eq!(eval_g1_ggx(alpha_sqr, 0.0), 0.0);
        assert_eq!(eval_lambda_ggx(alpha_sqr, -0.5), 0.0);
    }

    #[test]
    fn test_masking_at_normal_incidence_is_one() {
        assert_close(eval_masking_smith_ggx_separable(0.5, 1.0, 1.0), 1.0, 1e-6);
        assert_close(eval_masking_smith_ggx_correlated(0.5, 1.0, 1.0), 1.0, 1e-6);
        let sep = eval_masking_smith_ggx_separable(0.5, 0.3, 0.4);
        let cor = eval_masking_smith_ggx_correlated(0.5, 0.3, 0.4);
        assert!(cor >= sep);
        assert!(cor <= 1.0);
    }

    #[test]
    fn test_sampled_half_vectors_match_pdf() {
        let alpha = 0.4;
        let wo = Vector3f::new(0.5, -0.2, 0.84).normalize();
        let mut rng = LcgRng::new(11);
        for strategy in [HalfVectorSampling::Ndf, HalfVectorSampling::Vndf].iter() {
            for _ in 0..1000 {
                let (h, pdf) = strategy.sample(alpha, &wo, &rng.next_2d());
                assert!((h.norm() - 1.0).abs() < 1e-4);
                assert!(h.z >= 0.0);
                assert_close(pdf, strategy.pdf(alpha, &wo, &h), 1e-3 * pdf.max(1.0));
            }
        }
    }

    #[test]
    fn test_reflect_and_refract_at_normal() {
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let wo = Vector3f::new(0.6, 0.0, 0.8);
        let r = reflect(&wo, &n);
        assert_close(r.x, -0.6, 1e-6);
        assert_close(r.z, 0.8, 1e-6);

        let t = refract(&n, &n, 0.5, 1.0);
        assert_close(t.z, -1.0, 1e-6);
    }
}
