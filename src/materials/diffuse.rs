// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFSample, BSDFValue, BxDF};
use crate::core::rng::SampleGenerator;
use crate::materials::disney_diffuse::DisneyDiffuseBRDF;
use crate::materials::frostbite_diffuse::FrostbiteDiffuseBRDF;
use crate::materials::lambertian_diffuse::LambertianDiffuseBRDF;
use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::RGBSpectrum;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DiffuseModel {
    Lambert,
    Disney,
    Frostbite,
}

/// The diffuse reflection lobe of the standard material.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum DiffuseReflection {
    Lambert(LambertianDiffuseBRDF),
    Disney(DisneyDiffuseBRDF),
    Frostbite(FrostbiteDiffuseBRDF),
}

impl DiffuseReflection {
    pub fn new(model: DiffuseModel, albedo: RGBSpectrum, roughness: Float) -> Self {
        match model {
            DiffuseModel::Lambert => DiffuseReflection::Lambert(LambertianDiffuseBRDF::new(albedo)),
            DiffuseModel::Disney => DiffuseReflection::Disney(DisneyDiffuseBRDF::new(albedo, roughness)),
            DiffuseModel::Frostbite => DiffuseReflection::Frostbite(FrostbiteDiffuseBRDF::new(albedo, roughness)),
        }
    }

    pub fn model(&self) -> DiffuseModel {
        match self {
            DiffuseReflection::Lambert(_) => DiffuseModel::Lambert,
            DiffuseReflection::Disney(_) => DiffuseModel::Disney,
            DiffuseReflection::Frostbite(_) => DiffuseModel::Frostbite,
        }
    }

    pub fn albedo(&self) -> RGBSpectrum {
        match self {
            DiffuseReflection::Lambert(lobe) => lobe.albedo,
            DiffuseReflection::Disney(lobe) => lobe.albedo,
            DiffuseReflection::Frostbite(lobe) => lobe.albedo,
        }
    }
}

impl BxDF for DiffuseReflection {
    fn name(&self) -> &'static str {
        match self {
            DiffuseReflection::Lambert(lobe) => lobe.name(),
            DiffuseReflection::Disney(lobe) => lobe.name(),
            DiffuseReflection::Frostbite(lobe) => lobe.name(),
        }
    }

    fn eval(&self, wo: &Vector3f, wi: &Vector3f) -> BSDFValue {
        match self {
            DiffuseReflection::Lambert(lobe) => lobe.eval(wo, wi),
            DiffuseReflection::Disney(lobe) => lobe.eval(wo, wi),
            DiffuseReflection::Frostbite(lobe) => lobe.eval(wo, wi),
        }
    }

    fn sample(&self, wo: &Vector3f, sg: &mut dyn SampleGenerator) -> Option<BSDFSample> {
        match self {
            DiffuseReflection::Lambert(lobe) => lobe.sample(wo, sg),
            DiffuseReflection::Disney(lobe) => lobe.sample(wo, sg),
            DiffuseReflection::Frostbite(lobe) => lobe.sample(wo, sg),
        }
    }

    fn eval_pdf(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        match self {
            DiffuseReflection::Lambert(lobe) => lobe.eval_pdf(wo, wi),
            DiffuseReflection::Disney(lobe) => lobe.eval_pdf(wo, wi),
            DiffuseReflection::Frostbite(lobe) => lobe.eval_pdf(wo, wi),
        }
    }
}
