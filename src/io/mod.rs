// Copyright @yucwang 2026

pub mod exr_utils;
pub mod material_loader;
