// Copyright @yucwang 2026

use crate::math::constants::Float;
use crate::math::spectrum::RGBSpectrum;

fn schlick_weight(cos_theta: Float) -> Float {
    let m = (1.0 - cos_theta).max(0.0);
    let m2 = m * m;
    m2 * m2 * m
}

pub fn eval_fresnel_schlick(f0: RGBSpectrum, f90: RGBSpectrum, cos_theta: Float) -> RGBSpectrum {
    f0 + (f90 - f0) * schlick_weight(cos_theta)
}

pub fn eval_fresnel_schlick_scalar(f0: Float, f90: Float, cos_theta: Float) -> Float {
    f0 + (f90 - f0) * schlick_weight(cos_theta)
}

/// Unpolarized dielectric Fresnel reflectance.
///
/// `eta` is the relative index of refraction, incident side over
/// transmitted side. A negative `cos_theta_i` means the incident direction
/// is on the other side of the interface, in which case `eta` is inverted.
/// Returns the reflectance together with the cosine of the refracted
/// direction; total internal reflection gives `(1, 0)`.
pub fn eval_fresnel_dielectric(eta: Float, cos_theta_i: Float) -> (Float, Float) {
    let (eta, cos_theta_i) = if cos_theta_i < 0.0 {
        (1.0 / eta, -cos_theta_i)
    } else {
        (eta, cos_theta_i)
    };

    let sin_theta_t_sqr = eta * eta * (1.0 - cos_theta_i * cos_theta_i);
    if sin_theta_t_sqr >= 1.0 {
        return (1.0, 0.0);
    }

    let cos_theta_t = (1.0 - sin_theta_t_sqr).sqrt();
    let rs = (eta * cos_theta_i - cos_theta_t) / (eta * cos_theta_i + cos_theta_t);
    let rp = (cos_theta_i - eta * cos_theta_t) / (cos_theta_i + eta * cos_theta_t);
    (0.5 * (rs * rs + rp * rp), cos_theta_t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Float, b: Float, tol: Float) {
        assert!((a - b).abs() <= tol, "expected {} ≈ {}", a, b);
    }

    #[test]
    fn test_schlick_endpoints() {
        assert_close(eval_fresnel_schlick_scalar(0.04, 1.0, 1.0), 0.04, 1e-7);
        assert_close(eval_fresnel_schlick_scalar(0.04, 1.0, 0.0), 1.0, 1e-7);
        let f = eval_fresnel_schlick(RGBSpectrum::new(0.1, 0.2, 0.3), RGBSpectrum::one(), 0.5);
        assert!(f[0] > 0.1 && f[2] > 0.3 && f[2] < 1.0);
    }

    #[test]
    fn test_dielectric_normal_incidence() {
        // ((1 - 1.5) / (1 + 1.5))^2
        let (f, cos_t) = eval_fresnel_dielectric(1.0 / 1.5, 1.0);
        assert_close(f, 0.04, 1e-5);
        assert_close(cos_t, 1.0, 1e-6);
        let (f_inside, _) = eval_fresnel_dielectric(1.5, 1.0);
        assert_close(f_inside, 0.04, 1e-5);
    }

    #[test]
    fn test_dielectric_total_internal_reflection() {
        // Critical angle from glass is asin(1/1.5) ~ 41.8 degrees.
        let (f, cos_t) = eval_fresnel_dielectric(1.5, 0.5);
        assert_eq!(f, 1.0);
        assert_eq!(cos_t, 0.0);
        let (f, _) = eval_fresnel_dielectric(1.0 / 1.5, -0.5);
        assert_eq!(f, 1.0);
    }

    #[test]
    fn test_dielectric_grazing_is_total() {
        let (f, _) = eval_fresnel_dielectric(1.0 / 1.5, 0.0);
        assert_close(f, 1.0, 1e-6);
    }
}
