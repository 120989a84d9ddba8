// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector2f};

/// Source of independent uniform numbers in [0, 1).
pub trait SampleGenerator {
    fn next_1d(&mut self) -> Float;

    fn next_2d(&mut self) -> Vector2f {
        let x = self.next_1d();
        let y = self.next_1d();
        Vector2f::new(x, y)
    }
}

pub struct LcgRng {
    state: u64,
}

impl LcgRng {
    pub fn new(seed: u64) -> Self {
        // Mix the seed so small neighbouring seeds give unrelated streams.
        let mut rng = Self { state: seed ^ 0x9E37_79B9_7F4A_7C15 };
        rng.next_u32();
        rng
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.state >> 32) as u32
    }

    pub fn next_f32(&mut self) -> Float {
        // 24 bits keep the result strictly below one for f32.
        ((self.next_u32() >> 8) as Float) * (1.0 / 16777216.0)
    }
}

impl SampleGenerator for LcgRng {
    fn next_1d(&mut self) -> Float {
        self.next_f32()
    }
}
