// Copyright @yucwang 2026

pub mod diffuse;
pub mod disney_diffuse;
pub mod fresnel;
pub mod frostbite_diffuse;
pub mod lambertian_diffuse;
pub mod microfacet;
pub mod specular_reflection;
pub mod specular_reflection_transmission;
pub mod standard;
