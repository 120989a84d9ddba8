// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFSample, BSDFValue, BxDF};
use crate::core::material::MaterialDescription;
use crate::core::rng::SampleGenerator;
use crate::materials::diffuse::{DiffuseModel, DiffuseReflection};
use crate::materials::microfacet::{HalfVectorSampling, MaskingFunction};
use crate::materials::specular_reflection::SpecularReflectionMicrofacet;
use crate::materials::specular_reflection_transmission::SpecularReflectionTransmissionMicrofacet;
use crate::math::constants::{Float, Vector3f};
use crate::math::frame::Frame;
use crate::math::spectrum::RGBSpectrum;

fn clamp01(v: Float) -> Float {
    v.max(0.0).min(1.0)
}

/// Strategy choices of the standard material. Fixed for the lifetime of
/// every `StandardBSDF` set up from it; the default follows the crate
/// features.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BSDFConfig {
    pub diffuse: DiffuseModel,
    pub masking: MaskingFunction,
    pub sampling: HalfVectorSampling,
}

impl Default for BSDFConfig {
    fn default() -> Self {
        let diffuse = if cfg!(feature = "diffuse-frostbite") {
            DiffuseModel::Frostbite
        } else if cfg!(feature = "diffuse-disney") {
            DiffuseModel::Disney
        } else {
            DiffuseModel::Lambert
        };
        let masking = if cfg!(feature = "masking-separable") {
            MaskingFunction::SmithGGXSeparable
        } else {
            MaskingFunction::SmithGGXCorrelated
        };
        let sampling = if cfg!(feature = "vndf-sampling") {
            HalfVectorSampling::Vndf
        } else {
            HalfVectorSampling::Ndf
        };
        Self { diffuse, masking, sampling }
    }
}

impl BSDFConfig {
    /// Derives lobes and selection probabilities from a material.
    pub fn setup(&self, material: &MaterialDescription) -> StandardBSDF {
        let alpha = material.alpha();
        let diffuse_reflection = DiffuseReflection::new(self.diffuse, material.diffuse, material.linear_roughness);
        let specular_reflection = SpecularReflectionMicrofacet::new(material.specular, alpha, self.masking, self.sampling);
        let specular_reflection_transmission = SpecularReflectionTransmissionMicrofacet::new(
            material.transmission, alpha, material.eta, self.masking, self.sampling);

        let metallic = clamp01(material.metallic);
        let mut specular_transmission = clamp01(material.specular_transmission);

        let metallic_brdf = metallic;
        let specular_bsdf = (1.0 - metallic) * specular_transmission;
        let dielectric_brdf = (1.0 - metallic) * (1.0 - specular_transmission);

        let probabilities = SelectionProbabilities::from_weights(
            dielectric_brdf,
            metallic_brdf + dielectric_brdf,
            specular_bsdf);
        if probabilities.is_fallback() {
            log::warn!("Degenerate material weights, falling back to an even diffuse/specular split.");
            // The transmission lobe is unreachable in the fallback split, so
            // it carries no energy either.
            specular_transmission = 0.0;
        }
        log::debug!("StandardBSDF setup: {:?}", probabilities);

        StandardBSDF {
            config: *self,
            diffuse_reflection,
            specular_reflection,
            specular_reflection_transmission,
            specular_transmission,
            probabilities,
        }
    }
}

/// Probabilities of picking each lobe when sampling.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SelectionProbabilities {
    pub diffuse: Float,
    pub specular_reflection: Float,
    pub specular_transmission: Float,
}

impl SelectionProbabilities {
    pub const FALLBACK: SelectionProbabilities = SelectionProbabilities {
        diffuse: 0.5,
        specular_reflection: 0.5,
        specular_transmission: 0.0,
    };

    /// Normalizes raw lobe weights. Negative and non-finite weights count
    /// as zero; if nothing is left the fixed fallback split is returned.
    pub fn from_weights(diffuse: Float, specular_reflection: Float, specular_transmission: Float) -> Self {
        let sanitize = |w: Float| if w.is_finite() && w > 0.0 { w } else { 0.0 };
        let diffuse = sanitize(diffuse);
        let specular_reflection = sanitize(specular_reflection);
        let specular_transmission = sanitize(specular_transmission);

        let norm = diffuse + specular_reflection + specular_transmission;
        if !(norm > 0.0) || !norm.is_finite() {
            return Self::FALLBACK;
        }

        let inv_norm = 1.0 / norm;
        Self {
            diffuse: diffuse * inv_norm,
            specular_reflection: specular_reflection * inv_norm,
            specular_transmission: specular_transmission * inv_norm,
        }
    }

    pub fn is_fallback(&self) -> bool {
        *self == Self::FALLBACK
    }

    pub fn sum(&self) -> Float {
        self.diffuse + self.specular_reflection + self.specular_transmission
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Lobe {
    DiffuseReflection,
    SpecularReflection,
    SpecularReflectionTransmission,
}

/// Diffuse + specular reflection + specular transmission material.
///
/// Only `BSDFConfig::setup` creates values of this type, so every instance
/// is fully configured. Instances are immutable and can be shared freely
/// between threads.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StandardBSDF {
    config: BSDFConfig,
    diffuse_reflection: DiffuseReflection,
    specular_reflection: SpecularReflectionMicrofacet,
    specular_reflection_transmission: SpecularReflectionTransmissionMicrofacet,
    specular_transmission: Float,
    probabilities: SelectionProbabilities,
}

impl StandardBSDF {
    /// Sets up a material with the feature-selected default strategies.
    pub fn setup(material: &MaterialDescription) -> Self {
        BSDFConfig::default().setup(material)
    }

    pub fn config(&self) -> &BSDFConfig {
        &self.config
    }

    pub fn probabilities(&self) -> &SelectionProbabilities {
        &self.probabilities
    }

    pub fn specular_transmission(&self) -> Float {
        self.specular_transmission
    }

    pub fn diffuse_reflection(&self) -> &DiffuseReflection {
        &self.diffuse_reflection
    }

    pub fn specular_reflection(&self) -> &SpecularReflectionMicrofacet {
        &self.specular_reflection
    }

    pub fn specular_reflection_transmission(&self) -> &SpecularReflectionTransmissionMicrofacet {
        &self.specular_reflection_transmission
    }

    fn select(&self, u: Float) -> Lobe {
        let p = &self.probabilities;
        if u < p.diffuse {
            Lobe::DiffuseReflection
        } else if u < p.diffuse + p.specular_reflection {
            Lobe::SpecularReflection
        } else if p.specular_transmission > 0.0 {
            Lobe::SpecularReflectionTransmission
        } else if p.specular_reflection > 0.0 {
            // Rounding left a sliver of [0, 1) past the last active lobe.
            Lobe::SpecularReflection
        } else {
            Lobe::DiffuseReflection
        }
    }

    fn selection_probability(&self, lobe: Lobe) -> Float {
        match lobe {
            Lobe::DiffuseReflection => self.probabilities.diffuse,
            Lobe::SpecularReflection => self.probabilities.specular_reflection,
            Lobe::SpecularReflectionTransmission => self.probabilities.specular_transmission,
        }
    }

    fn energy_scale(&self, lobe: Lobe) -> Float {
        match lobe {
            Lobe::SpecularReflectionTransmission => self.specular_transmission,
            _ => 1.0 - self.specular_transmission,
        }
    }

    fn lobe_pdf(&self, lobe: Lobe, wo: &Vector3f, wi: &Vector3f) -> Float {
        match lobe {
            Lobe::DiffuseReflection => self.diffuse_reflection.eval_pdf(wo, wi),
            Lobe::SpecularReflection => self.specular_reflection.eval_pdf(wo, wi),
            Lobe::SpecularReflectionTransmission => self.specular_reflection_transmission.eval_pdf(wo, wi),
        }
    }

    // Selection-weighted density of every active lobe except `skip`.
    fn mixture_pdf(&self, wo: &Vector3f, wi: &Vector3f, skip: Option<Lobe>) -> Float {
        let mut pdf = 0.0;
        for lobe in [Lobe::DiffuseReflection, Lobe::SpecularReflection, Lobe::SpecularReflectionTransmission].iter() {
            let p = self.selection_probability(*lobe);
            if p > 0.0 && skip != Some(*lobe) {
                pdf += p * self.lobe_pdf(*lobe, wo, wi);
            }
        }
        pdf
    }

    pub fn eval_world(&self, frame: &Frame, wo: &Vector3f, wi: &Vector3f) -> BSDFValue {
        self.eval(&frame.to_local(wo), &frame.to_local(wi))
    }

    pub fn sample_world(&self, frame: &Frame, wo: &Vector3f, sg: &mut dyn SampleGenerator) -> Option<BSDFSample> {
        let mut sample = self.sample(&frame.to_local(wo), sg)?;
        sample.wi = frame.from_local(&sample.wi);
        Some(sample)
    }

    pub fn eval_pdf_world(&self, frame: &Frame, wo: &Vector3f, wi: &Vector3f) -> Float {
        self.eval_pdf(&frame.to_local(wo), &frame.to_local(wi))
    }
}

impl BxDF for StandardBSDF {
    fn eval(&self, wo: &Vector3f, wi: &Vector3f) -> BSDFValue {
        let p = &self.probabilities;
        let mut result = RGBSpectrum::zero();
        if p.diffuse > 0.0 {
            result += self.diffuse_reflection.eval(wo, wi) * (1.0 - self.specular_transmission);
        }
        if p.specular_reflection > 0.0 {
            result += self.specular_reflection.eval(wo, wi) * (1.0 - self.specular_transmission);
        }
        if p.specular_transmission > 0.0 {
            result += self.specular_reflection_transmission.eval(wo, wi) * self.specular_transmission;
        }
        result
    }

    fn sample(&self, wo: &Vector3f, sg: &mut dyn SampleGenerator) -> Option<BSDFSample> {
        let lobe = self.select(sg.next_1d());
        let mut sample = match lobe {
            Lobe::DiffuseReflection => self.diffuse_reflection.sample(wo, sg),
            Lobe::SpecularReflection => self.specular_reflection.sample(wo, sg),
            Lobe::SpecularReflectionTransmission => self.specular_reflection_transmission.sample(wo, sg),
        }?;

        let p = self.selection_probability(lobe);
        sample.weight *= self.energy_scale(lobe) / p;
        sample.pdf = p * sample.pdf + self.mixture_pdf(wo, &sample.wi, Some(lobe));
        Some(sample)
    }

    fn eval_pdf(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        self.mixture_pdf(wo, wi, None)
    }
}
