// Copyright @yucwang 2026

pub mod core;
pub mod io;
pub mod materials;
pub mod math;
pub mod validation;
