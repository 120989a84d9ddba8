// Copyright @yucwang 2023

use crate::math::constants::{ Vector3f };

/// Orthonormal shading frame. `z` is the shading normal.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    pub x: Vector3f,
    pub y: Vector3f,
    pub z: Vector3f
}

impl Default for Frame {
    fn default() -> Self {
        Frame {
            x: Vector3f::new(1.0, 0.0, 0.0),
            y: Vector3f::new(0.0, 1.0, 0.0),
            z: Vector3f::new(0.0, 0.0, 1.0)
        }
    }
}

impl Frame {
    pub fn new(new_x: Vector3f, new_y: Vector3f, new_z: Vector3f) -> Frame {
        Frame {
            x: new_x,
            y: new_y,
            z: new_z
        }
    }

    pub fn from_normal(n: &Vector3f) -> Frame {
        let n = n.normalize();
        let up = if n.z.abs() < 0.999 {
            Vector3f::new(0.0, 0.0, 1.0)
        } else {
            Vector3f::new(1.0, 0.0, 0.0)
        };
        let tangent = up.cross(&n).normalize();
        let bitangent = n.cross(&tangent).normalize();
        Frame::new(tangent, bitangent, n)
    }

    pub fn to_local(&self, v: &Vector3f) -> Vector3f {
        Vector3f::new(v.dot(&self.x), v.dot(&self.y), v.dot(&self.z))
    }

    pub fn from_local(&self, v: &Vector3f) -> Vector3f {
        v.x * self.x + v.y * self.y + v.z * self.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec_close(a: &Vector3f, b: &Vector3f) {
        assert!((a - b).norm() < 1e-5, "expected {:?} ≈ {:?}", a, b);
    }

    #[test]
    fn test_from_normal_is_orthonormal() {
        for n in [Vector3f::new(0.0, 0.0, 1.0),
                  Vector3f::new(0.0, 0.0, -1.0),
                  Vector3f::new(0.3, -0.4, 0.5),
                  Vector3f::new(1.0, 0.0, 0.0)].iter() {
            let frame = Frame::from_normal(n);
            assert!(frame.x.dot(&frame.y).abs() < 1e-5);
            assert!(frame.x.dot(&frame.z).abs() < 1e-5);
            assert!(frame.y.dot(&frame.z).abs() < 1e-5);
            assert!((frame.x.cross(&frame.y) - frame.z).norm() < 1e-5);
            assert_vec_close(&frame.z, &n.normalize());
        }
    }

    #[test]
    fn test_local_round_trip() {
        let frame = Frame::from_normal(&Vector3f::new(0.2, 0.9, -0.1));
        let v = Vector3f::new(0.6, -0.3, 0.74).normalize();
        assert_vec_close(&frame.from_local(&frame.to_local(&v)), &v);
        let local_n = frame.to_local(&frame.z);
        assert_vec_close(&local_n, &Vector3f::new(0.0, 0.0, 1.0));
    }
}
