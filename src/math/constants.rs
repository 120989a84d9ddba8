/* Copyright 2020 @Yuchen Wong */

#[cfg(not(feature = "float-as-double"))]
pub type Float = f32;
#[cfg(feature = "float-as-double")]
pub type Float = f64;

pub type Vector2f = nalgebra::Vector2<Float>;
pub type Vector3f = nalgebra::Vector3<Float>;

pub const PI: Float = 3.14159265359;
pub const INV_PI: Float = 0.31830988618;

// Cosine threshold below which a direction counts as grazing.
pub const MIN_COS_THETA: Float = 1e-6;
// Smallest GGX width used anywhere; keeps D and Lambda finite.
pub const MIN_GGX_ALPHA: Float = 0.0064;
