// Copyright @yucwang 2026

pub mod bsdf;
pub mod material;
pub mod rng;
